//! Navigation context evaluated by guards.

use crate::error::{GuardError, Result};
use serde::{Deserialize, Serialize};

/// Snapshot of the facts a guard decides on.
///
/// Built fresh by the caller for every navigation attempt. Guards receive it
/// by shared reference and never modify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PartialGuardContext")]
pub struct GuardContext {
    /// Whether the visitor has an authenticated session.
    pub is_authenticated: bool,

    /// Whether the authenticated user was just created.
    pub is_new_user: bool,

    /// Whether the user has finished onboarding.
    pub onboarding_complete: bool,

    /// The path being navigated to.
    pub current_path: String,
}

impl GuardContext {
    /// Creates an unauthenticated context for `current_path`.
    pub fn new(current_path: impl Into<String>) -> Self {
        Self {
            is_authenticated: false,
            is_new_user: false,
            onboarding_complete: false,
            current_path: current_path.into(),
        }
    }

    /// Sets the authentication flag.
    pub fn authenticated(mut self, is_authenticated: bool) -> Self {
        self.is_authenticated = is_authenticated;
        self
    }

    /// Sets the new-user flag.
    pub fn new_user(mut self, is_new_user: bool) -> Self {
        self.is_new_user = is_new_user;
        self
    }

    /// Sets the onboarding completion flag.
    pub fn onboarding_complete(mut self, onboarding_complete: bool) -> Self {
        self.onboarding_complete = onboarding_complete;
        self
    }

    /// Returns a copy of this context pointed at another path.
    pub fn at_path(&self, current_path: impl Into<String>) -> Self {
        Self {
            current_path: current_path.into(),
            ..self.clone()
        }
    }

    /// Parses a context from JSON, failing on the first missing field.
    pub fn from_json(json: &str) -> Result<Self> {
        let partial: PartialGuardContext = serde_json::from_str(json)?;
        partial.validate()
    }
}

/// Context as supplied by an untyped caller, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialGuardContext {
    is_authenticated: Option<bool>,
    is_new_user: Option<bool>,
    onboarding_complete: Option<bool>,
    current_path: Option<String>,
}

impl PartialGuardContext {
    /// Validates that every field is present.
    fn validate(self) -> Result<GuardContext> {
        let is_authenticated = self
            .is_authenticated
            .ok_or_else(|| GuardError::MissingField("isAuthenticated".to_string()))?;
        let is_new_user = self
            .is_new_user
            .ok_or_else(|| GuardError::MissingField("isNewUser".to_string()))?;
        let onboarding_complete = self
            .onboarding_complete
            .ok_or_else(|| GuardError::MissingField("onboardingComplete".to_string()))?;
        let current_path = self
            .current_path
            .ok_or_else(|| GuardError::MissingField("currentPath".to_string()))?;

        Ok(GuardContext {
            is_authenticated,
            is_new_user,
            onboarding_complete,
            current_path,
        })
    }
}

impl TryFrom<PartialGuardContext> for GuardContext {
    type Error = GuardError;

    fn try_from(partial: PartialGuardContext) -> Result<Self> {
        partial.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let ctx = GuardContext::new("/dashboard")
            .authenticated(true)
            .new_user(false)
            .onboarding_complete(true);

        assert!(ctx.is_authenticated);
        assert!(!ctx.is_new_user);
        assert!(ctx.onboarding_complete);
        assert_eq!(ctx.current_path, "/dashboard");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "isAuthenticated": true,
            "isNewUser": true,
            "onboardingComplete": false,
            "currentPath": "/onboarding/step-2"
        }"#;

        let ctx = GuardContext::from_json(json).unwrap();
        assert!(ctx.is_authenticated);
        assert!(ctx.is_new_user);
        assert!(!ctx.onboarding_complete);
        assert_eq!(ctx.current_path, "/onboarding/step-2");
    }

    #[test]
    fn test_from_json_missing_field() {
        let json = r#"{"isAuthenticated": true, "onboardingComplete": false, "currentPath": "/"}"#;

        match GuardContext::from_json(json) {
            Err(GuardError::MissingField(field)) => assert_eq!(field, "isNewUser"),
            other => panic!("expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_serde_deserialize_validates() {
        let json = r#"{"isAuthenticated": false, "isNewUser": false, "onboardingComplete": false}"#;
        assert!(serde_json::from_str::<GuardContext>(json).is_err());
    }

    #[test]
    fn test_at_path_keeps_flags() {
        let ctx = GuardContext::new("/a").authenticated(true);
        let moved = ctx.at_path("/b");
        assert!(moved.is_authenticated);
        assert_eq!(moved.current_path, "/b");
        assert_eq!(ctx.current_path, "/a");
    }
}
