use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::tidy::backup::Backup;
use crate::tidy::paths::relative_posix;

// Capture group 1 is the link target.
static IMAGE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").expect("image link regex"));

// Matches image links too; callers skip matches starting with `!`.
static ANY_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[[^\]]*\]\(([^)]+)\)").expect("link regex"));

/// Everything except ASCII alphanumerics and `_.-~/:()` is escaped.
const LINK_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/')
    .remove(b':')
    .remove(b'(')
    .remove(b')');

pub fn decode_link(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

pub fn encode_link(path: &str) -> String {
    utf8_percent_encode(path, LINK_PATH).to_string()
}

/// Path segments the way a filesystem path splits: empty and `.` segments vanish,
/// a leading `/` is its own segment.
fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    if path.starts_with('/') {
        out.push("/");
    }
    out.extend(
        path.split('/')
            .filter(|seg| !seg.is_empty() && *seg != "."),
    );
    out
}

#[derive(Debug, Clone)]
pub struct LinkRewriter {
    variants: Vec<String>,
    replacement: String,
}

impl LinkRewriter {
    /// `variants` are the old folder names to look for; `replacement` becomes the
    /// first path segment of every link that mentions one of them.
    pub fn new<I, S>(variants: I, replacement: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = variants
            .into_iter()
            .map(Into::into)
            .filter(|v| !v.is_empty())
            .collect();
        let mut variants: Vec<String> = unique.into_iter().collect();
        variants.sort_by(|a, b| b.len().cmp(&a.len()));
        Self {
            variants,
            replacement: replacement.into(),
        }
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn targets(&self, raw: &str) -> bool {
        let decoded = decode_link(raw);
        self.variants
            .iter()
            .any(|v| raw.contains(v.as_str()) || decoded.contains(v.as_str()))
    }

    /// New link target for `raw`, or `None` when the link is left alone.
    pub fn rewrite_path(&self, raw: &str) -> Option<String> {
        if !self.targets(raw) {
            return None;
        }
        let decoded = decode_link(raw);
        let parts = segments(&decoded);
        let (_, rest) = parts.split_first()?;

        let mut joined = self.replacement.clone();
        for seg in rest {
            joined.push('/');
            joined.push_str(seg);
        }
        Some(encode_link(&joined))
    }

    fn rewrite_pass(&self, re: &Regex, text: &str, skip_images: bool) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;
        let mut rewritten = 0usize;
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if skip_images && whole.as_str().starts_with('!') {
                continue;
            }
            let Some(next) = self.rewrite_path(target.as_str()) else {
                continue;
            };
            out.push_str(&text[last..target.start()]);
            out.push_str(&next);
            last = target.end();
            rewritten += 1;
        }
        out.push_str(&text[last..]);
        (out, rewritten)
    }

    /// Rewrite image links, then plain links. Returns the new text and how many links changed.
    pub fn rewrite_content(&self, content: &str) -> (String, usize) {
        let (after_images, images) = self.rewrite_pass(&IMAGE_LINK_RE, content, false);
        let (after_links, links) = self.rewrite_pass(&ANY_LINK_RE, &after_images, true);
        (after_links, images + links)
    }
}

/// Decoded image link targets in `content` that do not resolve to an existing file under `base_dir`.
pub fn missing_image_links(base_dir: &Path, content: &str) -> Vec<String> {
    IMAGE_LINK_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_link(m.as_str()))
        .filter(|link| !base_dir.join(link).exists())
        .collect()
}

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    pub document: PathBuf,
    pub rewritten_links: usize,
    /// Pre-rewrite copy of the document; always taken before the write.
    pub backup: Backup,
    pub missing: Vec<String>,
}

/// Point every link in `document` that names one of `old_variants` at `new_folder`.
pub fn rewrite_document(
    document: &Path,
    old_variants: &[String],
    new_folder: &Path,
) -> Result<RewriteOutcome> {
    let content = fs::read_to_string(document)
        .with_context(|| format!("failed to read {}", document.display()))?;
    let doc_dir = document
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let rewriter = LinkRewriter::new(old_variants.iter().cloned(), relative_posix(&doc_dir, new_folder));
    let (next, rewritten_links) = rewriter.rewrite_content(&content);

    let backup = Backup::snapshot(document)?;
    fs::write(document, &next)
        .with_context(|| format!("failed to write {}", document.display()))?;

    Ok(RewriteOutcome {
        document: document.to_path_buf(),
        rewritten_links,
        backup,
        missing: missing_image_links(&doc_dir, &next),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const OLD: &str = "Intro [draft] 0123456789abcdef0123456789abcdef";

    fn rewriter() -> LinkRewriter {
        LinkRewriter::new([OLD, "Intro [draft]", "Intro draft"], "lecture 01")
    }

    #[test]
    fn image_link_first_segment_is_replaced() {
        let (out, n) = rewriter().rewrite_content(&format!("![x]({OLD}/img1.png)"));
        assert_eq!(out, "![x](lecture%2001/img1.png)");
        assert_eq!(n, 1);
    }

    #[test]
    fn encoded_links_are_recognised() {
        let encoded = "Intro%20%5Bdraft%5D%200123456789abcdef0123456789abcdef/a%20b.png";
        let (out, n) = rewriter().rewrite_content(&format!("![]({encoded})"));
        assert_eq!(out, "![](lecture%2001/a%20b.png)");
        assert_eq!(n, 1);
    }

    #[test]
    fn encoded_variant_matches_encoded_link_text() {
        let rw = LinkRewriter::new(["Intro%20draft"], "lecture 01");
        assert!(rw.targets("Intro%20draft/a.png"));
        assert_eq!(
            rw.rewrite_path("Intro%20draft/a.png").as_deref(),
            Some("lecture%2001/a.png")
        );
        assert!(rw.rewrite_path("Intro draft/a.png").is_none());
    }

    #[test]
    fn tail_segments_keep_their_text() {
        let (out, _) = rewriter().rewrite_content(&format!("![x]({OLD}/sub dir/file_1-v2.png)"));
        assert_eq!(out, "![x](lecture%2001/sub%20dir/file_1-v2.png)");
    }

    #[test]
    fn encoding_keeps_path_punctuation() {
        assert_eq!(encode_link("a b/c_(1)-d.e:f~g"), "a%20b/c_(1)-d.e:f~g");
        assert_eq!(encode_link("a#b?c"), "a%23b%3Fc");
    }

    #[test]
    fn non_ascii_is_percent_encoded() {
        let (out, _) = rewriter().rewrite_content(&format!("![x]({OLD}/그림.png)"));
        assert_eq!(out, "![x](lecture%2001/%EA%B7%B8%EB%A6%BC.png)");
    }

    #[test]
    fn plain_links_are_rewritten_and_alt_text_untouched() {
        let text = "see [Intro draft/notes.pdf](Intro draft/notes.pdf) and [site](https://example.com)";
        let (out, n) = rewriter().rewrite_content(text);
        assert_eq!(
            out,
            "see [Intro draft/notes.pdf](lecture%2001/notes.pdf) and [site](https://example.com)"
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn unrelated_links_are_left_byte_identical() {
        let text = "![a](other%20dir/x.png)\n[b](./local.md)\n";
        let (out, n) = rewriter().rewrite_content(text);
        assert_eq!(out, text);
        assert_eq!(n, 0);
    }

    #[test]
    fn image_links_are_not_rewritten_twice() {
        let text = format!("![a]({OLD}/1.png) [b]({OLD}/2.png)");
        let (out, n) = rewriter().rewrite_content(&text);
        assert_eq!(out, "![a](lecture%2001/1.png) [b](lecture%2001/2.png)");
        assert_eq!(n, 2);
    }

    #[test]
    fn empty_variants_never_match() {
        let rw = LinkRewriter::new(["", "abc"], "lecture 01");
        assert_eq!(rw.variants(), ["abc".to_string()]);
        assert!(!rw.targets("x.png"));
    }

    #[test]
    fn variants_sorted_longest_first() {
        let rw = LinkRewriter::new(["ab", "abcd", "abc", "ab"], "x");
        assert_eq!(rw.variants(), ["abcd", "abc", "ab"]);
    }

    #[test]
    fn segments_match_filesystem_splitting() {
        assert_eq!(segments("./a//b/./c"), vec!["a", "b", "c"]);
        assert_eq!(segments("/a/b"), vec!["/", "a", "b"]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn rewrite_document_backs_up_and_reports_missing() {
        let tmp = tempdir().expect("tempdir");
        let new_folder = tmp.path().join("lecture 01");
        fs::create_dir_all(&new_folder).expect("mkdir");
        fs::write(new_folder.join("img1.png"), "png").expect("write img");

        let doc = tmp.path().join("Intro [draft].md");
        let original = format!("# Intro\n![x]({OLD}/img1.png)\n![y]({OLD}/gone.png)\n");
        fs::write(&doc, &original).expect("write doc");

        let variants = vec![OLD.to_string(), "Intro [draft]".to_string()];
        let outcome = rewrite_document(&doc, &variants, &new_folder).expect("rewrite");

        assert_eq!(outcome.rewritten_links, 2);
        assert_eq!(outcome.backup.backup_path, tmp.path().join("Intro [draft].md.bak"));
        assert_eq!(
            fs::read_to_string(&outcome.backup.backup_path).expect("read bak"),
            original
        );
        assert_eq!(
            fs::read_to_string(&doc).expect("read doc"),
            "# Intro\n![x](lecture%2001/img1.png)\n![y](lecture%2001/gone.png)\n"
        );
        assert_eq!(outcome.missing, vec!["lecture 01/gone.png".to_string()]);
    }
}
