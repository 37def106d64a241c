//! SQL text buffer — ordered fragments joined into one statement.

/// Fragments appended by the caller; joined with newlines.
#[derive(Debug, Clone, Default)]
pub struct SqlText {
    lines: Vec<String>,
}

impl SqlText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.lines.push(fragment.into());
        self
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Raw concatenated text.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Folds `\r` into `\n` and indents every continuation line by one space.
pub fn normalize_newlines(sql: &str) -> String {
    sql.replace('\r', "\n").replace('\n', "\n ")
}
