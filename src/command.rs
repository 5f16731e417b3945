//! Input Line Classification
//!
//! Decides how a console line is dispatched:
//! - lines ending in the script suffix are run as a batch script
//! - lines starting with `select ` are query commands
//! - everything else is sent as-is
//!
//! Classification looks only at the shape of the line. It never validates the
//! engine's command language.

use std::path::PathBuf;

/// Suffix that marks a line as a script reference
pub const SCRIPT_SUFFIX: &str = ".grn";

/// Keyword (with its trailing space) that marks a select command
pub const SELECT_PREFIX: &str = "select ";

/// Dispatch category of a trimmed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Run the file in a fresh engine process
    Script(PathBuf),
    /// Query command, eligible for the row-record formatter
    Select,
    /// Any other command
    Other,
}

impl CommandKind {
    /// Classify a line (callers pass it trimmed)
    #[must_use]
    pub fn classify(line: &str) -> Self {
        if line.ends_with(SCRIPT_SUFFIX) {
            Self::Script(PathBuf::from(line))
        } else if line.starts_with(SELECT_PREFIX) {
            Self::Select
        } else {
            Self::Other
        }
    }

    /// Whether this line should use the row-record formatter
    #[must_use]
    pub fn wants_select_format(&self, format_select: bool) -> bool {
        format_select && matches!(self, Self::Select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_reference() {
        assert_eq!(
            CommandKind::classify("fixtures/load.grn"),
            CommandKind::Script(PathBuf::from("fixtures/load.grn"))
        );
        // A bare suffix is still a script reference; opening it reports the error.
        assert_eq!(CommandKind::classify(".grn"), CommandKind::Script(PathBuf::from(".grn")));
    }

    #[test]
    fn test_select_needs_trailing_space() {
        assert_eq!(CommandKind::classify("select Users --limit 10"), CommandKind::Select);
        assert_eq!(CommandKind::classify("select"), CommandKind::Other);
        assert_eq!(CommandKind::classify("selector"), CommandKind::Other);
        assert_eq!(CommandKind::classify("SELECT Users"), CommandKind::Other);
    }

    #[test]
    fn test_script_wins_over_select() {
        assert_eq!(
            CommandKind::classify("select queries.grn"),
            CommandKind::Script(PathBuf::from("select queries.grn"))
        );
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(CommandKind::classify("table_list"), CommandKind::Other);
        assert_eq!(CommandKind::classify(""), CommandKind::Other);
    }

    #[test]
    fn test_select_format_policy() {
        assert!(CommandKind::Select.wants_select_format(true));
        assert!(!CommandKind::Select.wants_select_format(false));
        assert!(!CommandKind::Other.wants_select_format(true));
        assert!(!CommandKind::Script(PathBuf::from("a.grn")).wants_select_format(true));
    }
}
