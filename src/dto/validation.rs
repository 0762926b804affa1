//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a story name carries visible characters and stays within
/// the length the shared display can render.
pub fn validate_story_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("story_name_empty");
        err.message = Some("Story name must not be empty".into());
        return Err(err);
    }

    if name.chars().count() > 120 {
        let mut err = ValidationError::new("story_name_length");
        err.message = Some("Story name must be at most 120 characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates an explicitly supplied login identity.
pub fn validate_identity(identity: &str) -> Result<(), ValidationError> {
    if identity.trim().is_empty() {
        let mut err = ValidationError::new("identity_empty");
        err.message = Some("Identity must not be empty".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_story_name_valid() {
        assert!(validate_story_name("The Long Night").is_ok());
        assert!(validate_story_name("x").is_ok());
    }

    #[test]
    fn test_validate_story_name_invalid() {
        assert!(validate_story_name("").is_err());
        assert!(validate_story_name("   ").is_err());
        assert!(validate_story_name(&"a".repeat(121)).is_err());
    }

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity("alice").is_ok());
        assert!(validate_identity("").is_err());
        assert!(validate_identity(" \t").is_err());
    }
}
