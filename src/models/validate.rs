use thiserror::Error;

/// A rejected field value on an entity constructor or setter.
///
/// The display text is the fixed, field-specific message for the rule that
/// failed, so callers can surface it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Blank(&'static str),

    #[error("{0}")]
    TooLong(&'static str),

    #[error("{0}")]
    TooShort(&'static str),

    #[error("{0}")]
    Negative(&'static str),

    #[error("{0}")]
    OutOfRange(&'static str),
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Blank(msg)
            | Self::TooLong(msg)
            | Self::TooShort(msg)
            | Self::Negative(msg)
            | Self::OutOfRange(msg) => msg,
        }
    }
}

/// Rejects values that are empty or whitespace only.
pub(crate) fn not_blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(message));
    }
    Ok(())
}

/// Length must stay strictly below `ceiling` characters.
pub(crate) fn below(value: &str, ceiling: usize, message: &'static str) -> Result<(), ValidationError> {
    if value.chars().count() >= ceiling {
        return Err(ValidationError::TooLong(message));
    }
    Ok(())
}

/// Numeric strings such as masses may not carry a minus sign anywhere.
pub(crate) fn unsigned(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.contains('-') {
        return Err(ValidationError::Negative(message));
    }
    Ok(())
}

/// Shared rule for the optional mass fields on rockets and payloads.
pub(crate) fn mass(
    value: &str,
    blank_message: &'static str,
    negative_message: &'static str,
) -> Result<String, ValidationError> {
    not_blank(value, blank_message)?;
    unsigned(value, negative_message)?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_rejects_value_at_the_ceiling() {
        let at_ceiling = "a".repeat(128);
        assert_eq!(
            below(&at_ceiling, 128, "too long"),
            Err(ValidationError::TooLong("too long"))
        );
        assert!(below(&"a".repeat(127), 128, "too long").is_ok());
    }

    #[test]
    fn below_counts_characters_not_bytes() {
        let accented = "é".repeat(100);
        assert!(accented.len() > 128);
        assert!(below(&accented, 128, "too long").is_ok());
    }

    #[test]
    fn not_blank_trims_whitespace() {
        for value in ["", " ", "  ", "\t\n"] {
            assert_eq!(not_blank(value, "blank"), Err(ValidationError::Blank("blank")));
        }
        assert!(not_blank(" x ", "blank").is_ok());
    }

    #[test]
    fn mass_rejects_any_minus_sign() {
        for value in ["-1", "-0.1", "1e-3"] {
            assert_eq!(
                mass(value, "blank", "negative"),
                Err(ValidationError::Negative("negative"))
            );
        }
        assert_eq!(mass("15000", "blank", "negative"), Ok("15000".to_string()));
    }

    #[test]
    fn message_matches_display() {
        let err = ValidationError::OutOfRange("year out of range");
        assert_eq!(err.message(), err.to_string());
    }
}
