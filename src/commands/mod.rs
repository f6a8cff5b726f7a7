pub mod tidy;

use crate::error::WarnCode;
use crate::tidy::warn;

#[derive(Debug, Clone)]
pub struct CommandReport {
    pub command: String,
    pub dry_run: bool,
    pub processed: usize,
    pub details: Vec<String>,
    pub warnings: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            dry_run: false,
            processed: 0,
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    /// Record a human-facing warning and mirror it as a structured stderr line.
    pub fn warn(&mut self, code: WarnCode, folder: &str, document: &str, text: impl Into<String>) {
        let text = text.into();
        warn::emit(code, folder, document, &text);
        self.warnings.push(text);
    }

    /// Continuation line under the previous warning; not mirrored to stderr.
    pub fn warn_more(&mut self, text: impl Into<String>) {
        self.warnings.push(text.into());
    }
}
