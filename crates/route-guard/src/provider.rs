//! Upstream sources of authentication and onboarding facts.
//!
//! Providers are read-only from the engine's point of view. Their failures
//! surface as [`GuardError::Provider`](crate::error::GuardError::Provider) and
//! are never turned into an allow or a deny.

use crate::context::GuardContext;
use crate::decision::GuardResult;
use crate::error::Result;
use crate::guard::{Guard, RequireOnboarding};
use crate::paths::RoutePaths;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Authentication facts for the current visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_new_user: bool,
}

/// Supplies the authentication state.
#[async_trait]
pub trait AuthStateProvider: Send + Sync {
    async fn auth_state(&self) -> Result<AuthState>;
}

/// Supplies whether the current user has finished onboarding.
#[async_trait]
pub trait OnboardingStatusProvider: Send + Sync {
    async fn onboarding_complete(&self) -> Result<bool>;
}

#[async_trait]
impl<P: AuthStateProvider + ?Sized> AuthStateProvider for Arc<P> {
    async fn auth_state(&self) -> Result<AuthState> {
        (**self).auth_state().await
    }
}

#[async_trait]
impl<P: OnboardingStatusProvider + ?Sized> OnboardingStatusProvider for Arc<P> {
    async fn onboarding_complete(&self) -> Result<bool> {
        (**self).onboarding_complete().await
    }
}

/// Fixed facts, for callers that already hold them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticProvider {
    pub auth: AuthState,
    pub onboarding_complete: bool,
}

#[async_trait]
impl AuthStateProvider for StaticProvider {
    async fn auth_state(&self) -> Result<AuthState> {
        Ok(self.auth)
    }
}

#[async_trait]
impl OnboardingStatusProvider for StaticProvider {
    async fn onboarding_complete(&self) -> Result<bool> {
        Ok(self.onboarding_complete)
    }
}

/// Builds a fresh [`GuardContext`] per navigation attempt from two providers.
pub struct ContextAssembler<A, O> {
    auth: A,
    onboarding: O,
}

impl<A, O> ContextAssembler<A, O>
where
    A: AuthStateProvider,
    O: OnboardingStatusProvider,
{
    pub fn new(auth: A, onboarding: O) -> Self {
        Self { auth, onboarding }
    }

    /// Queries the auth provider, then the onboarding provider, and returns a
    /// context for `current_path`.
    pub async fn snapshot(&self, current_path: impl Into<String>) -> Result<GuardContext> {
        let auth = self.auth.auth_state().await?;
        let onboarding_complete = self.onboarding.onboarding_complete().await?;

        Ok(GuardContext {
            is_authenticated: auth.is_authenticated,
            is_new_user: auth.is_new_user,
            onboarding_complete,
            current_path: current_path.into(),
        })
    }
}

/// Onboarding guard that re-fetches the status before deciding.
///
/// The supplied context's `onboarding_complete` is ignored in favor of the
/// provider's answer; the rest of the decision matches [`RequireOnboarding`].
pub struct FreshOnboarding<O> {
    provider: O,
    inner: RequireOnboarding,
}

impl<O> fmt::Debug for FreshOnboarding<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreshOnboarding")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<O: OnboardingStatusProvider> FreshOnboarding<O> {
    pub fn new(provider: O, paths: RoutePaths) -> Self {
        Self {
            provider,
            inner: RequireOnboarding::new(paths),
        }
    }
}

#[async_trait]
impl<O: OnboardingStatusProvider> Guard for FreshOnboarding<O> {
    fn name(&self) -> &str {
        "fresh_onboarding"
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        let onboarding_complete = self.provider.onboarding_complete().await?;
        let refreshed = GuardContext {
            onboarding_complete,
            ..context.clone()
        };
        self.inner.decide(&refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::combine_guards;
    use crate::error::GuardError;
    use crate::guard::require_auth;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FlakyOnboarding {
        calls: AtomicUsize,
        fail: bool,
        complete: bool,
    }

    #[async_trait]
    impl OnboardingStatusProvider for FlakyOnboarding {
        async fn onboarding_complete(&self) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                Err(GuardError::provider("onboarding", "status request failed"))
            } else {
                Ok(self.complete)
            }
        }
    }

    struct FailingAuth;

    #[async_trait]
    impl AuthStateProvider for FailingAuth {
        async fn auth_state(&self) -> Result<AuthState> {
            Err(GuardError::provider("auth", "session store offline"))
        }
    }

    #[tokio::test]
    async fn test_snapshot() {
        let provider = StaticProvider {
            auth: AuthState {
                is_authenticated: true,
                is_new_user: true,
            },
            onboarding_complete: false,
        };
        let assembler = ContextAssembler::new(provider, provider);

        let ctx = assembler.snapshot("/onboarding/step-1").await.unwrap();
        assert_eq!(
            ctx,
            GuardContext::new("/onboarding/step-1")
                .authenticated(true)
                .new_user(true)
                .onboarding_complete(false)
        );
    }

    #[tokio::test]
    async fn test_snapshot_propagates_auth_failure() {
        let onboarding = Arc::new(FlakyOnboarding::default());
        let assembler = ContextAssembler::new(FailingAuth, onboarding.clone());

        let err = assembler.snapshot("/dashboard").await.unwrap_err();
        assert!(err.is_indeterminate());
        assert_eq!(onboarding.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_onboarding_uses_provider_value() {
        let provider = FlakyOnboarding {
            complete: true,
            ..Default::default()
        };
        let guard = FreshOnboarding::new(provider, RoutePaths::default());

        // Stale context says incomplete; the provider says otherwise.
        let ctx = GuardContext::new("/dashboard").authenticated(true);
        assert!(guard.check(&ctx).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_fresh_onboarding_failure_is_not_a_decision() {
        let provider = FlakyOnboarding {
            fail: true,
            ..Default::default()
        };
        let guard = FreshOnboarding::new(provider, RoutePaths::default());

        let ctx = GuardContext::new("/dashboard").authenticated(true);
        let err = guard.check(&ctx).await.unwrap_err();
        assert!(matches!(err, GuardError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_fresh_onboarding_skipped_after_auth_denial() {
        let provider = Arc::new(FlakyOnboarding::default());
        let chain = combine_guards([
            Arc::new(require_auth()) as Arc<dyn Guard>,
            Arc::new(FreshOnboarding::new(
                provider.clone(),
                RoutePaths::default(),
            )) as Arc<dyn Guard>,
        ]);

        let result = chain.check(&GuardContext::new("/dashboard")).await.unwrap();
        assert_eq!(result.redirect_to(), Some("/sign-in"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
