//! Well-known navigation targets used by the built-in guards.

use crate::error::{GuardError, Result};
use crate::parser;
use serde::{Deserialize, Serialize};

/// Paths the built-in guards redirect to or special-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutePaths {
    /// Where unauthenticated visitors are sent.
    pub sign_in: String,

    /// Prefix shared by every onboarding step.
    pub onboarding_prefix: String,

    /// Entry point of the onboarding flow.
    pub onboarding_first_step: String,

    /// Main landing area for authenticated users.
    pub dashboard: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            sign_in: "/sign-in".to_string(),
            onboarding_prefix: "/onboarding".to_string(),
            onboarding_first_step: "/onboarding/step-1".to_string(),
            dashboard: "/dashboard".to_string(),
        }
    }
}

impl RoutePaths {
    /// Parses paths from YAML or JSON. Omitted fields keep their defaults.
    pub fn parse(content: &str) -> Result<Self> {
        let paths: RoutePaths = parser::parse_document(content)?;
        paths.validate()?;
        Ok(paths)
    }

    /// Validates the paths.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("sign_in", &self.sign_in),
            ("onboarding_prefix", &self.onboarding_prefix),
            ("onboarding_first_step", &self.onboarding_first_step),
            ("dashboard", &self.dashboard),
        ];

        for (name, value) in fields {
            if !value.starts_with('/') {
                return Err(GuardError::ValidationError(format!(
                    "path '{}' must start with '/', got {:?}",
                    name, value
                )));
            }
        }

        // Otherwise the onboarding guard would bounce new users out of the flow.
        if !self.onboarding_first_step.starts_with(&self.onboarding_prefix) {
            return Err(GuardError::ValidationError(format!(
                "onboarding_first_step '{}' is outside onboarding_prefix '{}'",
                self.onboarding_first_step, self.onboarding_prefix
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RoutePaths::default().validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
sign_in: /auth/login
dashboard: /app
"#;
        let paths = RoutePaths::parse(yaml).unwrap();
        assert_eq!(paths.sign_in, "/auth/login");
        assert_eq!(paths.dashboard, "/app");
        assert_eq!(paths.onboarding_prefix, "/onboarding");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"onboarding_prefix": "/welcome", "onboarding_first_step": "/welcome/1"}"#;
        let paths = RoutePaths::parse(json).unwrap();
        assert_eq!(paths.onboarding_first_step, "/welcome/1");
    }

    #[test]
    fn test_rejects_relative_path() {
        let err = RoutePaths::parse("sign_in: login").unwrap_err();
        assert!(matches!(err, GuardError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_first_step_outside_prefix() {
        let yaml = r#"
onboarding_prefix: /onboarding
onboarding_first_step: /setup/1
"#;
        assert!(RoutePaths::parse(yaml).is_err());
    }
}
