//! The guard trait and the built-in navigation policies.
//!
//! Every policy, including composed ones, implements [`Guard`], so any guard
//! can be plugged into [`combine_guards`](crate::combinator::combine_guards).

use crate::context::GuardContext;
use crate::decision::GuardResult;
use crate::error::Result;
use crate::paths::RoutePaths;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Reason given by [`RequireAuth`] denials.
pub const REASON_AUTH_REQUIRED: &str = "Authentication required.";

/// Reason given by [`RequireOnboarding`] denials.
pub const REASON_ONBOARDING_REQUIRED: &str = "Please complete onboarding.";

/// Reason given by [`PublicOnly`] denials.
pub const REASON_ALREADY_AUTHENTICATED: &str = "Already authenticated.";

/// A navigation policy.
///
/// Guards must not mutate shared state: evaluating the same guard twice with
/// the same context yields the same result. An `Err` means the decision could
/// not be made (for example a provider failed), never that navigation was
/// refused.
#[async_trait]
pub trait Guard: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Evaluates this policy against the context.
    async fn check(&self, context: &GuardContext) -> Result<GuardResult>;
}

#[async_trait]
impl<G: Guard + ?Sized> Guard for Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        (**self).check(context).await
    }
}

#[async_trait]
impl<G: Guard + ?Sized> Guard for Box<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        (**self).check(context).await
    }
}

/// Denies unauthenticated visitors, sending them to sign-in.
#[derive(Debug, Clone, Default)]
pub struct RequireAuth {
    paths: RoutePaths,
}

impl RequireAuth {
    pub fn new(paths: RoutePaths) -> Self {
        Self { paths }
    }

    /// Synchronous form of [`Guard::check`].
    pub fn decide(&self, context: &GuardContext) -> Result<GuardResult> {
        if !context.is_authenticated {
            return GuardResult::deny(&self.paths.sign_in, REASON_AUTH_REQUIRED);
        }
        Ok(GuardResult::allow())
    }
}

#[async_trait]
impl Guard for RequireAuth {
    fn name(&self) -> &str {
        "require_auth"
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        self.decide(context)
    }
}

/// Denies users who have not finished onboarding.
///
/// New users already inside the onboarding flow are let through, otherwise
/// every onboarding step would redirect to the first one.
#[derive(Debug, Clone, Default)]
pub struct RequireOnboarding {
    paths: RoutePaths,
}

impl RequireOnboarding {
    pub fn new(paths: RoutePaths) -> Self {
        Self { paths }
    }

    /// Synchronous form of [`Guard::check`].
    pub fn decide(&self, context: &GuardContext) -> Result<GuardResult> {
        let in_onboarding = context
            .current_path
            .starts_with(&self.paths.onboarding_prefix);
        if context.is_new_user && in_onboarding {
            return Ok(GuardResult::allow());
        }
        if !context.onboarding_complete {
            return GuardResult::deny(
                &self.paths.onboarding_first_step,
                REASON_ONBOARDING_REQUIRED,
            );
        }
        Ok(GuardResult::allow())
    }
}

#[async_trait]
impl Guard for RequireOnboarding {
    fn name(&self) -> &str {
        "require_onboarding"
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        self.decide(context)
    }
}

/// Keeps authenticated users away from visitor-only pages such as sign-in.
#[derive(Debug, Clone, Default)]
pub struct PublicOnly {
    paths: RoutePaths,
}

impl PublicOnly {
    pub fn new(paths: RoutePaths) -> Self {
        Self { paths }
    }

    /// Synchronous form of [`Guard::check`].
    pub fn decide(&self, context: &GuardContext) -> Result<GuardResult> {
        if !context.is_authenticated {
            return Ok(GuardResult::allow());
        }
        let target = if context.onboarding_complete {
            &self.paths.dashboard
        } else {
            &self.paths.onboarding_first_step
        };
        GuardResult::deny(target, REASON_ALREADY_AUTHENTICATED)
    }
}

#[async_trait]
impl Guard for PublicOnly {
    fn name(&self) -> &str {
        "public_only"
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        self.decide(context)
    }
}

/// [`RequireAuth`] with default paths.
pub fn require_auth() -> RequireAuth {
    RequireAuth::default()
}

/// [`RequireOnboarding`] with default paths.
pub fn require_onboarding() -> RequireOnboarding {
    RequireOnboarding::default()
}

/// [`PublicOnly`] with default paths.
pub fn public_only() -> PublicOnly {
    PublicOnly::default()
}

/// A synchronous guard built from a closure.
pub struct FnGuard<F> {
    name: String,
    func: F,
}

impl<F> fmt::Debug for FnGuard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnGuard").field("name", &self.name).finish()
    }
}

/// Wraps a synchronous policy function as a guard.
pub fn guard_fn<F>(name: impl Into<String>, func: F) -> FnGuard<F>
where
    F: Fn(&GuardContext) -> GuardResult + Send + Sync,
{
    FnGuard {
        name: name.into(),
        func,
    }
}

#[async_trait]
impl<F> Guard for FnGuard<F>
where
    F: Fn(&GuardContext) -> GuardResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        Ok((self.func)(context))
    }
}

/// A suspending guard built from a closure returning a boxed future.
pub struct AsyncFnGuard<F> {
    name: String,
    func: F,
}

impl<F> fmt::Debug for AsyncFnGuard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnGuard")
            .field("name", &self.name)
            .finish()
    }
}

/// Wraps an asynchronous policy function as a guard.
pub fn async_guard_fn<F>(name: impl Into<String>, func: F) -> AsyncFnGuard<F>
where
    F: for<'a> Fn(&'a GuardContext) -> BoxFuture<'a, Result<GuardResult>> + Send + Sync,
{
    AsyncFnGuard {
        name: name.into(),
        func,
    }
}

#[async_trait]
impl<F> Guard for AsyncFnGuard<F>
where
    F: for<'a> Fn(&'a GuardContext) -> BoxFuture<'a, Result<GuardResult>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        (self.func)(context).await
    }
}
