//! Script error kinds.
//!
//! Every failure in the expression engine is one of these. They propagate
//! up the evaluation call chain with `?` until the boundary that started
//! the evaluation reports them.

use thiserror::Error;

/// Result alias used throughout the engine.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// An error raised while parsing or evaluating a script.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// Malformed script, sort specification or regular expression.
    #[error("parse error at {position}: {message}")]
    Parse { message: String, position: usize },

    /// Operation on incompatible value kinds.
    #[error("type error: {0}")]
    Type(String),

    /// Unresolved variable.
    #[error("variable not set: {0}")]
    Name(String),

    /// Semantically invalid call.
    #[error("{0}")]
    Usage(String),

    /// Unsupported format specifier.
    #[error("unsupported format: '{0}'")]
    Format(String),

    /// Call depth exceeded the configured limit.
    #[error("recursion limit of {limit} calls exceeded")]
    Recursion { limit: usize },
}

impl ScriptError {
    /// Parse error without a meaningful source position (rule specs, regexes).
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position: 0,
        }
    }

    /// Parse error at a byte offset in the script source.
    pub fn parse_at(message: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }

    /// Type error for a value of the wrong kind.
    pub fn expected(expected: &str, found: &str) -> Self {
        Self::Type(format!("expected {expected}, found {found}"))
    }

    /// Type error for a binary operator.
    pub fn operands(op: &str, left: &str, right: &str) -> Self {
        Self::Type(format!("can not apply '{op}' to {left} and {right}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ScriptError::Name("foo".into()).to_string(),
            "variable not set: foo"
        );
        assert_eq!(
            ScriptError::Format("%q".into()).to_string(),
            "unsupported format: '%q'"
        );
        assert_eq!(
            ScriptError::parse_at("unexpected ')'", 4).to_string(),
            "parse error at 4: unexpected ')'"
        );
    }

    #[test]
    fn test_expected() {
        let err = ScriptError::expected("integer", "string");
        assert_eq!(err, ScriptError::Type("expected integer, found string".into()));
    }
}
