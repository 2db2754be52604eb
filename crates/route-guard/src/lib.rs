//! Route Guard Engine
//!
//! Composable navigation guards that decide whether a visitor may enter a
//! route and, if not, where to send them instead. The engine only decides;
//! the routing layer that calls it performs the redirect.
//!
//! Guards are async so that a policy may wait on an upstream provider, and
//! [`combine_guards`] chains them in order, stopping at the first denial.

pub mod combinator;
pub mod context;
pub mod decision;
pub mod error;
pub mod guard;
pub mod parser;
pub mod paths;
pub mod provider;
pub mod table;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use combinator::{combine_guards, CombinedGuard};
pub use context::GuardContext;
pub use decision::{fail_closed, Decision, GuardResult};
pub use error::{GuardError, Result};
pub use guard::{public_only, require_auth, require_onboarding, Guard};
pub use paths::RoutePaths;
pub use table::RouteTable;

/// Version of the guard engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::combinator::{combine_guards, CombinedGuard};
    pub use crate::context::GuardContext;
    pub use crate::decision::{fail_closed, Decision, GuardResult};
    pub use crate::error::{GuardError, Result};
    pub use crate::guard::*;
    pub use crate::paths::RoutePaths;
    pub use crate::provider::*;
    pub use crate::table::*;
}
