use regex::Regex;
use std::sync::LazyLock;

static HEX32_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-f]{32}$").expect("hex token regex"));

static HEX32_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[0-9a-f]{32}$").expect("hex tail regex"));

pub const DEFAULT_LECTURE_MARKER: &str = "강";

/// True when `name` ends in a 32-character hexadecimal export id.
pub fn has_hash_suffix(name: &str) -> bool {
    HEX32_TAIL.is_match(name)
}

/// Drop a trailing whitespace-separated 32-hex token and any `' '`, `'|'`,
/// `'_'` left dangling before it. Names without such a token come back as-is.
pub fn strip_hash(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.split_last() {
        Some((last, rest)) if HEX32_TOKEN.is_match(last) => rest
            .join(" ")
            .trim_end_matches([' ', '|', '_'])
            .to_string(),
        _ => name.to_string(),
    }
}

pub fn remove_brackets(s: &str) -> String {
    s.replace(['[', ']'], "").trim().to_string()
}

/// Hash first, brackets second.
pub fn clean_name(name: &str) -> String {
    remove_brackets(&strip_hash(name))
}

fn zero_pad(digits: &str) -> String {
    format!("{digits:0>2}")
}

/// Recognises `0x<digits><ws><marker>` titles, e.g. `0x03강`.
#[derive(Debug, Clone)]
pub struct LectureNumbering {
    pattern: Regex,
}

impl LectureNumbering {
    pub fn new(marker: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?i)0x(\d+)\s*{}", regex::escape(marker)))?;
        Ok(Self { pattern })
    }

    /// Two-digit lecture number parsed from `title`, or `fallback_idx` padded.
    pub fn extract(&self, title: &str, fallback_idx: usize) -> String {
        match self.pattern.captures(title).and_then(|caps| caps.get(1)) {
            Some(digits) => zero_pad(digits.as_str()),
            None => zero_pad(&fallback_idx.to_string()),
        }
    }
}

impl Default for LectureNumbering {
    fn default() -> Self {
        Self::new(DEFAULT_LECTURE_MARKER).expect("default lecture marker pattern")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef";

    fn extract_number(title: &str, fallback_idx: usize) -> String {
        LectureNumbering::default().extract(title, fallback_idx)
    }

    #[test]
    fn strip_hash_drops_trailing_token_and_separators() {
        assert_eq!(strip_hash(&format!("Intro [draft] {HASH}")), "Intro [draft]");
        assert_eq!(strip_hash(&format!("Notes | {HASH}")), "Notes");
        assert_eq!(strip_hash(&format!("Notes _ {HASH}")), "Notes");
        assert_eq!(strip_hash(&format!("Upper {}", HASH.to_uppercase())), "Upper");
    }

    #[test]
    fn strip_hash_is_idempotent() {
        let once = strip_hash(&format!("0x01강 Basics {HASH}"));
        assert_eq!(strip_hash(&once), once);
    }

    #[test]
    fn strip_hash_leaves_middle_tokens_alone() {
        let name = format!("{HASH} middle tail");
        assert_eq!(strip_hash(&name), name);
    }

    #[test]
    fn strip_hash_ignores_non_hash_tails() {
        assert_eq!(strip_hash("Plain title"), "Plain title");
        assert_eq!(strip_hash("short abc123"), "short abc123");
        // 31 hex chars
        assert_eq!(
            strip_hash("x 0123456789abcdef0123456789abcde"),
            "x 0123456789abcdef0123456789abcde"
        );
    }

    #[test]
    fn remove_brackets_strips_and_trims() {
        assert_eq!(remove_brackets(" [Intro] [draft] "), "Intro draft");
        let once = remove_brackets("[[x]]");
        assert_eq!(once, "x");
        assert_eq!(remove_brackets(&once), once);
    }

    #[test]
    fn remove_brackets_keeps_interior_space_runs() {
        assert_eq!(remove_brackets("Intro  [draft]"), "Intro  draft");
        assert_eq!(remove_brackets("Intro [draft] "), "Intro draft");
    }

    #[test]
    fn clean_name_applies_hash_before_brackets() {
        assert_eq!(clean_name(&format!("Intro [draft] {HASH}")), "Intro draft");
    }

    #[test]
    fn extract_number_prefers_title_pattern() {
        assert_eq!(extract_number("0x03강 기초", 9), "03");
        assert_eq!(extract_number("0X3 강 기초", 9), "03");
        assert_eq!(extract_number("0x123강", 1), "123");
    }

    #[test]
    fn extract_number_falls_back_to_index() {
        assert_eq!(extract_number("Intro draft", 7), "07");
        assert_eq!(extract_number("0x03 without marker", 12), "12");
    }

    #[test]
    fn custom_marker_is_escaped() {
        let numbering = LectureNumbering::new("(L)").expect("pattern");
        assert_eq!(numbering.extract("0x5 (L) intro", 1), "05");
        assert_eq!(numbering.extract("0x5L intro", 1), "01");
    }

    #[test]
    fn hash_suffix_detection_anchors_at_end() {
        assert!(has_hash_suffix(&format!("Intro {HASH}")));
        assert!(has_hash_suffix(&format!("Intro{}", HASH.to_uppercase())));
        assert!(!has_hash_suffix(&format!("{HASH} Intro")));
        assert!(!has_hash_suffix("lecture 01"));
    }
}
