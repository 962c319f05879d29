//! Line-oriented echo of console output into the log.

use crate::util::printable_line;

/// Longest partial line kept while waiting for a line terminator.
const MAX_PARTIAL: usize = 4096;

/// Assembles decoded console text into complete lines.
///
/// Carriage returns and newlines both terminate a line, since menu redraws
/// often use bare `\r`. A partial line that grows past the limit is flushed
/// as if it had been terminated.
#[derive(Debug, Default)]
pub struct LineEcho {
    partial: String,
}

impl LineEcho {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed decoded text and return the printable complete lines it finished.
    pub fn feed(&mut self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for c in text.chars() {
            if c == '\n' || c == '\r' {
                self.flush_into(&mut lines);
            } else {
                self.partial.push(c);
                if self.partial.len() >= MAX_PARTIAL {
                    self.flush_into(&mut lines);
                }
            }
        }
        lines
    }

    /// Take whatever partial line is left.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.partial);
        printable_line(&rest)
    }

    fn flush_into(&mut self, lines: &mut Vec<String>) {
        if let Some(line) = printable_line(&self.partial) {
            lines.push(line);
        }
        self.partial.clear();
    }
}
