//! Input text validation and sanitisation.

use thiserror::Error;

/// Reasons an input text is rejected before analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextValidationError {
    #[error("Please enter some text to analyze.")]
    Empty,

    #[error("Text is too short. Need {missing} more characters (minimum {min}).")]
    TooShort { missing: usize, min: usize },

    #[error("Text is too long by {excess} characters (maximum {max}).")]
    TooLong { excess: usize, max: usize },
}

/// Check the trimmed text against the configured length bounds.
pub fn validate_text(text: &str, min: usize, max: usize) -> Result<(), TextValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TextValidationError::Empty);
    }

    let length = trimmed.chars().count();
    if length < min {
        return Err(TextValidationError::TooShort {
            missing: min - length,
            min,
        });
    }
    if length > max {
        return Err(TextValidationError::TooLong {
            excess: length - max,
            max,
        });
    }

    Ok(())
}

/// Strip NUL bytes and non-printable characters and collapse whitespace runs
/// into single spaces.
pub fn sanitize_text(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    collapsed
        .chars()
        .filter(|c| *c != '\0' && (!c.is_control() || *c == '\n' || *c == '\t'))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert_eq!(validate_text("", 50, 5000), Err(TextValidationError::Empty));
        assert_eq!(
            validate_text("   \n\t ", 50, 5000),
            Err(TextValidationError::Empty)
        );
    }

    #[test]
    fn test_too_short_reports_missing_count() {
        let err = validate_text("short text", 50, 5000).unwrap_err();
        assert_eq!(
            err,
            TextValidationError::TooShort {
                missing: 40,
                min: 50
            }
        );
        assert!(err.to_string().contains("40 more characters"));
    }

    #[test]
    fn test_too_long_reports_excess() {
        let text = "a".repeat(5010);
        let err = validate_text(&text, 50, 5000).unwrap_err();
        assert_eq!(
            err,
            TextValidationError::TooLong {
                excess: 10,
                max: 5000
            }
        );
    }

    #[test]
    fn test_valid_length_accepted() {
        let text = "b".repeat(100);
        assert!(validate_text(&text, 50, 5000).is_ok());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(validate_text(&"x".repeat(50), 50, 5000).is_ok());
        assert!(validate_text(&"x".repeat(5000), 50, 5000).is_ok());
    }

    #[test]
    fn test_length_counted_after_trim() {
        let padded = format!("   {}   ", "y".repeat(50));
        assert!(validate_text(&padded, 50, 5000).is_ok());
    }

    #[test]
    fn test_sanitize_strips_nul_and_collapses_whitespace() {
        let dirty = "hello\0 world\n\n\t  again";
        assert_eq!(sanitize_text(dirty), "hello world again");
    }

    #[test]
    fn test_sanitize_plain_text_unchanged() {
        assert_eq!(sanitize_text("plain sentence"), "plain sentence");
    }
}
