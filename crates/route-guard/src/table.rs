//! Declarative mapping from paths to guard chains.

use crate::combinator::{combine_guards, CombinedGuard};
use crate::context::GuardContext;
use crate::decision::GuardResult;
use crate::error::{GuardError, Result};
use crate::guard::{Guard, PublicOnly, RequireAuth, RequireOnboarding};
use crate::parser;
use crate::paths::RoutePaths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Prefix marking a route pattern as a regular expression.
pub const REGEX_PREFIX: &str = "re:";

/// Built-in guards a route can reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardKind {
    RequireAuth,
    RequireOnboarding,
    PublicOnly,
}

impl GuardKind {
    /// Instantiates the guard with the given paths.
    pub fn build(&self, paths: &RoutePaths) -> Arc<dyn Guard> {
        match self {
            GuardKind::RequireAuth => Arc::new(RequireAuth::new(paths.clone())),
            GuardKind::RequireOnboarding => Arc::new(RequireOnboarding::new(paths.clone())),
            GuardKind::PublicOnly => Arc::new(PublicOnly::new(paths.clone())),
        }
    }
}

/// A route and the guards protecting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Unique identifier for the route.
    pub id: String,

    /// Path prefix, or a regex written as `re:<pattern>`.
    pub prefix: String,

    /// Guards evaluated in order for this route.
    #[serde(default)]
    pub guards: Vec<GuardKind>,

    /// Redirect target used instead of the guard's own on denial.
    #[serde(default)]
    pub redirect_override: Option<String>,
}

impl RouteEntry {
    /// Creates an unguarded route.
    pub fn new(id: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prefix: prefix.into(),
            guards: Vec::new(),
            redirect_override: None,
        }
    }

    /// Appends a guard.
    pub fn guard(mut self, kind: GuardKind) -> Self {
        self.guards.push(kind);
        self
    }

    /// Sets the redirect override.
    pub fn redirect_override(mut self, target: impl Into<String>) -> Self {
        self.redirect_override = Some(target.into());
        self
    }

    fn pattern(&self) -> Option<&str> {
        self.prefix.strip_prefix(REGEX_PREFIX)
    }
}

/// Routes plus the paths their guards use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub paths: RoutePaths,

    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// A validated, ready-to-evaluate route table.
#[derive(Debug)]
pub struct CompiledRoutes {
    paths: RoutePaths,
    prefixed: Vec<CompiledRoute>,
    patterned: Vec<(Regex, CompiledRoute)>,
}

#[derive(Debug)]
struct CompiledRoute {
    entry: RouteEntry,
    guard: Arc<CombinedGuard>,
}

impl RouteTable {
    /// Creates a table with no routes.
    pub fn new(paths: RoutePaths) -> Self {
        Self {
            paths,
            routes: Vec::new(),
        }
    }

    /// Adds a route.
    pub fn with_route(mut self, route: RouteEntry) -> Self {
        self.routes.push(route);
        self
    }

    /// Parses a table from YAML or JSON.
    pub fn parse(content: &str) -> Result<Self> {
        let table: RouteTable = parser::parse_document(content)?;
        table.validate()?;
        Ok(table)
    }

    /// Serializes the table to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| GuardError::SerializationError(e.to_string()))
    }

    /// Validates the table.
    pub fn validate(&self) -> Result<()> {
        self.paths.validate()?;

        let mut seen = HashSet::new();
        let mut prefixes = HashSet::new();
        for route in &self.routes {
            if route.id.is_empty() {
                return Err(GuardError::ValidationError(
                    "Route ID is required".to_string(),
                ));
            }
            if !seen.insert(route.id.as_str()) {
                return Err(GuardError::ValidationError(format!(
                    "Duplicate route ID '{}'",
                    route.id
                )));
            }

            match route.pattern() {
                Some(pattern) => {
                    Regex::new(pattern)?;
                }
                None if !route.prefix.starts_with('/') => {
                    return Err(GuardError::ValidationError(format!(
                        "Route '{}' prefix must start with '/' or '{}'",
                        route.id, REGEX_PREFIX
                    )));
                }
                None => {
                    // "/x" and "/x/" match the same paths.
                    if !prefixes.insert(normalized_prefix(&route.prefix)) {
                        return Err(GuardError::ValidationError(format!(
                            "Route '{}' repeats the prefix '{}' of an earlier route",
                            route.id, route.prefix
                        )));
                    }
                }
            }

            if let Some(target) = &route.redirect_override {
                if !target.starts_with('/') {
                    return Err(GuardError::ValidationError(format!(
                        "Route '{}' redirect_override must start with '/'",
                        route.id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validates the table and builds the guard chain of every route.
    pub fn compile(&self) -> Result<CompiledRoutes> {
        self.validate()?;

        let mut prefixed = Vec::new();
        let mut patterned = Vec::new();

        for entry in &self.routes {
            let guard = Arc::new(combine_guards(
                entry.guards.iter().map(|kind| kind.build(&self.paths)),
            ));
            let compiled = CompiledRoute {
                entry: entry.clone(),
                guard,
            };
            match entry.pattern() {
                Some(pattern) => patterned.push((Regex::new(pattern)?, compiled)),
                None => prefixed.push(compiled),
            }
        }

        tracing::debug!(
            prefixed = prefixed.len(),
            patterned = patterned.len(),
            "compiled route table"
        );

        Ok(CompiledRoutes {
            paths: self.paths.clone(),
            prefixed,
            patterned,
        })
    }
}

impl CompiledRoutes {
    /// Paths used by this table's guards.
    pub fn paths(&self) -> &RoutePaths {
        &self.paths
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.prefixed.len() + self.patterned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the route for `path`.
    ///
    /// The longest matching prefix wins. Regex routes are tried next, in
    /// declaration order, and the root route (`/`) only catches what is left.
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.resolve_compiled(path).map(|route| &route.entry)
    }

    fn resolve_compiled(&self, path: &str) -> Option<&CompiledRoute> {
        let (root, nested): (Vec<&CompiledRoute>, Vec<&CompiledRoute>) = self
            .prefixed
            .iter()
            .filter(|route| path_has_prefix(path, &route.entry.prefix))
            .partition(|route| normalized_prefix(&route.entry.prefix).is_empty());

        nested
            .into_iter()
            .max_by_key(|route| normalized_prefix(&route.entry.prefix).len())
            .or_else(|| {
                self.patterned
                    .iter()
                    .find(|(regex, _)| regex.is_match(path))
                    .map(|(_, route)| route)
            })
            .or_else(|| root.into_iter().next())
    }

    /// The guard chain protecting `path`. Unmatched paths get an empty chain.
    pub fn guard_for(&self, path: &str) -> Arc<CombinedGuard> {
        match self.resolve_compiled(path) {
            Some(route) => route.guard.clone(),
            None => Arc::new(CombinedGuard::new("unguarded")),
        }
    }

    /// Evaluates the route matching `context.current_path`.
    ///
    /// On denial, the route's `redirect_override` replaces the guard's
    /// redirect target; the reason is kept.
    pub async fn evaluate(&self, context: &GuardContext) -> Result<GuardResult> {
        let Some(route) = self.resolve_compiled(&context.current_path) else {
            tracing::trace!(path = %context.current_path, "no route matched");
            return Ok(GuardResult::allow());
        };

        let result = route.guard.check(context).await?;
        match (&route.entry.redirect_override, result.is_denied()) {
            (Some(target), true) => {
                tracing::debug!(
                    route = %route.entry.id,
                    guard_redirect = ?result.redirect_to(),
                    override_redirect = %target,
                    "applying redirect override"
                );
                result.with_redirect(target.clone())
            }
            _ => Ok(result),
        }
    }
}

/// Prefix without trailing slashes; the root route normalizes to "".
fn normalized_prefix(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

/// Returns true when `path` equals `prefix` or continues it with a new segment.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = normalized_prefix(prefix);
    if prefix.is_empty() {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
