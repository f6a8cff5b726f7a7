use crate::error::WarnCode;

fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_line(code: WarnCode, folder: &str, document: &str, reason: &str) -> String {
    format!(
        "TIDY_WARN code={} folder={} document={} reason={}",
        code.as_str(),
        sanitize_value(folder),
        sanitize_value(document),
        sanitize_value(reason),
    )
}

/// One greppable warning record on stderr.
pub fn emit(code: WarnCode, folder: &str, document: &str, reason: &str) {
    eprintln!("{}", format_line(code, folder, document, reason));
}
