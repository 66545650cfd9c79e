use std::fmt;
use thiserror::Error;

/// Errors raised while setting up an observed function.
///
/// Only setup can fail: once a function is wrapped, documentation problems
/// are logged and never surface to the caller.
#[derive(Error, Debug)]
pub enum AutodocError {
    #[error("Python parsing error: {message}")]
    ParseError {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("Function '{name}' not found in {file}")]
    FunctionNotFound { name: String, file: String },

    #[error(
        "Introspection error: {message}{}",
        .location.as_ref().map(|l| format!(" at {l}")).unwrap_or_default()
    )]
    Introspection {
        message: String,
        location: Option<ErrorLocation>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Where in the Python source an introspected function is declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
    pub function: String,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{file}:{}:{}", self.line, self.column)?,
            None => write!(f, "line {}:{}", self.line, self.column)?,
        }
        write!(f, " (def {})", self.function)
    }
}

impl AutodocError {
    /// Attach a declaration site to an introspection error that has none
    pub fn at(self, location: ErrorLocation) -> Self {
        match self {
            AutodocError::Introspection {
                message,
                location: None,
            } => AutodocError::Introspection {
                message,
                location: Some(location),
            },
            other => other,
        }
    }
}

/// Parse error
pub fn parse_error(
    message: impl Into<String>,
    line: Option<usize>,
    column: Option<usize>,
) -> AutodocError {
    AutodocError::ParseError {
        message: message.into(),
        line,
        column,
    }
}

/// Function lookup failure
pub fn function_not_found(name: impl Into<String>, file: impl Into<String>) -> AutodocError {
    AutodocError::FunctionNotFound {
        name: name.into(),
        file: file.into(),
    }
}

/// Introspection error (missing parameter list, unusable source identity)
pub fn introspection_error(
    message: impl Into<String>,
    location: Option<ErrorLocation>,
) -> AutodocError {
    AutodocError::Introspection {
        message: message.into(),
        location,
    }
}

/// Configuration error
pub fn config_error(message: impl Into<String>) -> AutodocError {
    AutodocError::Config(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let location = ErrorLocation {
            file: Some("shapes.py".to_string()),
            line: 12,
            column: 1,
            function: "area".to_string(),
        };
        assert_eq!(location.to_string(), "shapes.py:12:1 (def area)");

        let err = introspection_error("no parameters", None).at(location.clone());
        assert_eq!(
            err.to_string(),
            "Introspection error: no parameters at shapes.py:12:1 (def area)"
        );
    }

    #[test]
    fn test_at_keeps_existing_location() {
        let first = ErrorLocation {
            file: None,
            line: 3,
            column: 5,
            function: "cell".to_string(),
        };
        let second = ErrorLocation {
            line: 9,
            ..first.clone()
        };
        let err = introspection_error("x", Some(first.clone())).at(second);
        assert!(matches!(err, AutodocError::Introspection { location: Some(l), .. } if l == first));
        assert!(matches!(
            config_error("bad").at(first),
            AutodocError::Config(_)
        ));
    }

    #[test]
    fn test_not_found_message() {
        let err = function_not_found("area", "shapes.py");
        assert_eq!(err.to_string(), "Function 'area' not found in shapes.py");
    }
}
