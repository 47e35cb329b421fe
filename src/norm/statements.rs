/// Comma-separated fragments of a single statement, e.g. call arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementParts(pub Vec<String>);

impl StatementParts {
    /// Join with `", "`.
    pub fn merge_parts(&self) -> String {
        self.0.join(", ")
    }

    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self(self.0.iter().map(|part| format!("{prefix}{part}")).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Whole statements, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementLines(pub Vec<String>);

impl StatementLines {
    /// Join with `"\n"`.
    pub fn merge_lines(&self) -> String {
        self.0.join("\n")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for StatementParts {
    fn from(parts: Vec<String>) -> Self {
        Self(parts)
    }
}

impl From<Vec<String>> for StatementLines {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge() {
        let parts = StatementParts::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(parts.merge_parts(), "a, b");
        assert_eq!(parts.with_prefix("&").merge_parts(), "&a, &b");

        let lines = StatementLines::from(vec!["var a int".to_string(), "var b string".to_string()]);
        assert_eq!(lines.merge_lines(), "var a int\nvar b string");
        assert_eq!(StatementLines::default().merge_lines(), "");
    }
}
