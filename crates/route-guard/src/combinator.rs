//! Sequential, short-circuiting guard composition.

use crate::context::GuardContext;
use crate::decision::GuardResult;
use crate::error::Result;
use crate::guard::Guard;
use async_trait::async_trait;
use std::sync::Arc;

/// Progress of a guard chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    /// The guard at this index runs next.
    Running(usize),
    /// Every guard allowed.
    Allowed,
    /// A guard denied; its result is final.
    Denied(GuardResult),
}

impl ChainState {
    /// Advances the chain with the result of the guard at the current index.
    ///
    /// `len` is the number of guards in the chain. Terminal states are
    /// returned unchanged.
    pub fn step(self, result: GuardResult, len: usize) -> Self {
        match self {
            ChainState::Running(index) => {
                if result.is_denied() {
                    ChainState::Denied(result)
                } else if index + 1 >= len {
                    ChainState::Allowed
                } else {
                    ChainState::Running(index + 1)
                }
            }
            terminal => terminal,
        }
    }

    /// Returns true once the chain has reached a decision.
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ChainState::Running(_))
    }
}

/// A guard that runs other guards in order and stops at the first denial.
#[derive(Debug, Clone)]
pub struct CombinedGuard {
    name: String,
    guards: Vec<Arc<dyn Guard>>,
}

impl CombinedGuard {
    /// Creates an empty chain, which allows everything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guards: Vec::new(),
        }
    }

    /// Appends a guard to the chain.
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Appends a shared guard to the chain.
    pub fn with_shared(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Number of guards in the chain.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Names of the chained guards, in evaluation order.
    pub fn guard_names(&self) -> Vec<&str> {
        self.guards.iter().map(|g| g.name()).collect()
    }
}

/// Composes guards into one, evaluated strictly in the given order.
///
/// Each guard is awaited before the next one starts. The first denial is
/// returned as-is and the remaining guards are never invoked. An error from
/// any guard ends the chain and is returned unchanged. When every guard
/// allows, or the sequence is empty, the result is a plain allow.
pub fn combine_guards<I>(guards: I) -> CombinedGuard
where
    I: IntoIterator<Item = Arc<dyn Guard>>,
{
    let guards: Vec<Arc<dyn Guard>> = guards.into_iter().collect();
    let name = if guards.is_empty() {
        "combined()".to_string()
    } else {
        let names: Vec<&str> = guards.iter().map(|g| g.name()).collect();
        format!("combined({})", names.join(","))
    };
    CombinedGuard { name, guards }
}

#[async_trait]
impl Guard for CombinedGuard {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, context: &GuardContext) -> Result<GuardResult> {
        if self.guards.is_empty() {
            return Ok(GuardResult::allow());
        }

        let len = self.guards.len();
        let mut state = ChainState::Running(0);

        while let ChainState::Running(index) = state {
            let guard = &self.guards[index];
            let result = guard.check(context).await?;
            tracing::trace!(
                chain = %self.name,
                guard = guard.name(),
                index,
                allowed = result.is_allowed(),
                "guard evaluated"
            );
            state = state.step(result, len);
        }

        match state {
            ChainState::Denied(result) => {
                tracing::debug!(
                    chain = %self.name,
                    path = %context.current_path,
                    redirect_to = ?result.redirect_to(),
                    reason = ?result.reason(),
                    "navigation denied"
                );
                Ok(result)
            }
            _ => Ok(GuardResult::allow()),
        }
    }
}
