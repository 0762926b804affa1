use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::{validate_identity, validate_story_name};

/// Login request for a station; an absent identity logs in the station guest.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Registered identity to log in with; omit for a guest login.
    pub identity: Option<String>,
    /// Credential for a registered identity; ignored for guests.
    pub credential: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(identity) = &self.identity
            && let Err(err) = validate_identity(identity)
        {
            errors.add("identity", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Text submitted at the end of a writing turn.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitTextRequest {
    /// Contributed text; may be empty.
    pub text: String,
}

/// Draft text a participant discarded with the clear button.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClearTextRequest {
    /// The discarded draft; its character count feeds the trashed counter.
    pub text: String,
}

/// Final contribution closing the active story.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FinishStoryRequest {
    /// Final text; may be empty.
    pub text: String,
}

/// Logout request carrying any unsaved draft text.
#[derive(Debug, Deserialize, ToSchema, Validate, Default)]
pub struct LogoutRequest {
    /// Unsaved draft still held at the station; persisted before logout.
    #[serde(default)]
    pub text: String,
}

/// Name for the story about to be written.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoryNameRequest {
    /// Story name shown on the shared display and stored on creation.
    pub name: String,
}

impl Validate for StoryNameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_story_name(&self.name) {
            errors.add("name", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_login_request_is_valid() {
        let request = LoginRequest {
            identity: None,
            credential: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_identity_is_rejected() {
        let request = LoginRequest {
            identity: Some("  ".into()),
            credential: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_story_name_is_rejected() {
        let request = StoryNameRequest { name: "".into() };
        assert!(request.validate().is_err());
    }
}
