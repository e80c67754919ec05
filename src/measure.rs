use unicode_width::UnicodeWidthStr;

/// Line width budget for emitted source.
#[derive(Debug, Clone)]
pub struct LineMetrics {
    pub max_width: usize,
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for LineMetrics {
    fn default() -> Self {
        Self {
            max_width: 100,
            indent: 4,
        }
    }
}

impl LineMetrics {
    pub fn text_width(&self, text: &str) -> usize {
        UnicodeWidthStr::width(text)
    }

    pub fn pad(&self, level: usize) -> String {
        " ".repeat(level * self.indent)
    }

    /// Render `head` + comma-separated `items` + `tail` at indentation
    /// `level`. Falls back to one item per line, one level deeper, when the
    /// single-line form is wider than `max_width`.
    pub fn wrap_list(&self, level: usize, head: &str, items: &[String], tail: &str) -> String {
        let pad = self.pad(level);
        let line = format!("{}{}{}{}", pad, head, items.join(", "), tail);
        if items.len() < 2 || self.text_width(&line) <= self.max_width {
            return line;
        }
        self.break_list(level, head, items, tail)
    }

    /// Always one item per line.
    pub fn break_list(&self, level: usize, head: &str, items: &[String], tail: &str) -> String {
        let pad = self.pad(level);
        let inner = self.pad(level + 1);
        let body: Vec<String> = items.iter().map(|item| format!("{inner}{item}")).collect();
        format!("{pad}{}\n{}{tail}", head.trim_end(), body.join(",\n"))
    }
}
