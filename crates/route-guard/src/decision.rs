//! Guard decision types.

use crate::error::{GuardError, Result};
use crate::paths::RoutePaths;
use serde::{Deserialize, Serialize};

/// Summary of a guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

/// The outcome of evaluating a guard.
///
/// A denial always carries a non-empty redirect target and usually a reason;
/// an allow carries neither. Results built with [`GuardResult::allow`] or
/// [`GuardResult::deny`], or deserialized, always satisfy this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGuardResult")]
pub struct GuardResult {
    allowed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_to: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl GuardResult {
    /// Creates an allow result.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            redirect_to: None,
            reason: None,
        }
    }

    /// Creates a denial redirecting to `redirect_to`.
    ///
    /// Fails with [`GuardError::InvalidRedirect`] when the target is empty.
    pub fn deny(redirect_to: impl Into<String>, reason: impl Into<String>) -> Result<Self> {
        Self::denial(redirect_to.into(), Some(reason.into()))
    }

    fn denial(redirect_to: String, reason: Option<String>) -> Result<Self> {
        if redirect_to.trim().is_empty() {
            return Err(GuardError::InvalidRedirect(redirect_to));
        }
        Ok(Self {
            allowed: false,
            redirect_to: Some(redirect_to),
            reason,
        })
    }

    /// Replaces the redirect target of a denial. Allows are returned unchanged.
    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Result<Self> {
        if self.allowed {
            return Ok(self);
        }
        let redirect_to = redirect_to.into();
        if redirect_to.trim().is_empty() {
            return Err(GuardError::InvalidRedirect(redirect_to));
        }
        self.redirect_to = Some(redirect_to);
        Ok(self)
    }

    /// Returns true if navigation is permitted.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns true if navigation is refused.
    pub fn is_denied(&self) -> bool {
        !self.allowed
    }

    /// Where the caller should navigate instead, for denials.
    pub fn redirect_to(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }

    /// Human-readable explanation, for denials.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Allow/deny summary of this result.
    pub fn decision(&self) -> Decision {
        if self.allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Serializes the result to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for GuardResult {
    fn default() -> Self {
        Self::allow()
    }
}

/// Unchecked wire form, validated into a [`GuardResult`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGuardResult {
    allowed: bool,
    #[serde(default)]
    redirect_to: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl TryFrom<RawGuardResult> for GuardResult {
    type Error = GuardError;

    fn try_from(raw: RawGuardResult) -> Result<Self> {
        if raw.allowed {
            if raw.redirect_to.is_some() || raw.reason.is_some() {
                return Err(GuardError::ValidationError(
                    "allowed result must not carry redirectTo or reason".to_string(),
                ));
            }
            return Ok(GuardResult::allow());
        }
        let redirect_to = raw
            .redirect_to
            .ok_or_else(|| GuardError::MissingField("redirectTo".to_string()))?;
        GuardResult::denial(redirect_to, raw.reason)
    }
}

/// Applies the most restrictive outcome to an undetermined evaluation.
///
/// Provider failures become a denial to the sign-in path, as if the user
/// were not authenticated. Other errors are returned unchanged.
pub fn fail_closed(result: Result<GuardResult>, paths: &RoutePaths) -> Result<GuardResult> {
    match result {
        Err(err) if err.is_indeterminate() => {
            tracing::warn!(error = %err, "guard evaluation indeterminate, failing closed");
            GuardResult::deny(&paths.sign_in, "Unable to determine access.")
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_result() {
        let result = GuardResult::allow();
        assert!(result.is_allowed());
        assert!(!result.is_denied());
        assert_eq!(result.redirect_to(), None);
        assert_eq!(result.reason(), None);
        assert_eq!(result.decision(), Decision::Allow);
    }

    #[test]
    fn test_deny_result() {
        let result = GuardResult::deny("/sign-in", "Authentication required.").unwrap();
        assert!(result.is_denied());
        assert_eq!(result.redirect_to(), Some("/sign-in"));
        assert_eq!(result.reason(), Some("Authentication required."));
        assert_eq!(result.decision(), Decision::Deny);
    }

    #[test]
    fn test_deny_requires_redirect() {
        assert!(matches!(
            GuardResult::deny("", "nope"),
            Err(GuardError::InvalidRedirect(_))
        ));
        assert!(GuardResult::deny("   ", "nope").is_err());
    }

    #[test]
    fn test_allow_serializes_without_extra_fields() {
        assert_eq!(
            GuardResult::allow().to_json().unwrap(),
            r#"{"allowed":true}"#
        );
    }

    #[test]
    fn test_deny_serializes_camel_case() {
        let json = GuardResult::deny("/dashboard", "Already authenticated.")
            .unwrap()
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"allowed":false,"redirectTo":"/dashboard","reason":"Already authenticated."}"#
        );
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_results() {
        let allow_with_redirect = r#"{"allowed":true,"redirectTo":"/x"}"#;
        assert!(serde_json::from_str::<GuardResult>(allow_with_redirect).is_err());

        let deny_without_redirect = r#"{"allowed":false,"reason":"no"}"#;
        assert!(serde_json::from_str::<GuardResult>(deny_without_redirect).is_err());
    }

    #[test]
    fn test_deny_without_reason_stays_without_reason() {
        let json = r#"{"allowed":false,"redirectTo":"/x"}"#;
        let result: GuardResult = serde_json::from_str(json).unwrap();
        assert!(result.is_denied());
        assert_eq!(result.reason(), None);
        assert_eq!(result.to_json().unwrap(), json);
    }

    #[test]
    fn test_with_redirect_leaves_allow_untouched() {
        let result = GuardResult::allow().with_redirect("/elsewhere").unwrap();
        assert_eq!(result, GuardResult::allow());

        let denied = GuardResult::deny("/sign-in", "Authentication required.")
            .unwrap()
            .with_redirect("/login")
            .unwrap();
        assert_eq!(denied.redirect_to(), Some("/login"));
        assert_eq!(denied.reason(), Some("Authentication required."));
    }

    #[test]
    fn test_fail_closed() {
        let paths = RoutePaths::default();

        let failed = fail_closed(Err(GuardError::provider("auth", "offline")), &paths).unwrap();
        assert!(failed.is_denied());
        assert_eq!(failed.redirect_to(), Some("/sign-in"));

        let allowed = fail_closed(Ok(GuardResult::allow()), &paths).unwrap();
        assert!(allowed.is_allowed());

        let config = fail_closed(Err(GuardError::MissingField("x".to_string())), &paths);
        assert!(matches!(config, Err(GuardError::MissingField(_))));
    }
}
