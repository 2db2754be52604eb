//! WASM bindings for the guard engine.

#![cfg(feature = "wasm")]

use crate::context::GuardContext;
use crate::decision::GuardResult;
use crate::error::GuardError;
use crate::table::{CompiledRoutes, RouteTable};
use futures::executor::block_on;
use wasm_bindgen::prelude::*;

fn to_js(err: GuardError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible route guard wrapper.
#[wasm_bindgen]
pub struct WasmGuardEngine {
    routes: CompiledRoutes,
}

impl WasmGuardEngine {
    fn decide(&self, context_json: &str) -> Result<GuardResult, JsValue> {
        let context = GuardContext::from_json(context_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid context: {}", e)))?;

        // Built-in guards never suspend, so this completes immediately.
        block_on(self.routes.evaluate(&context)).map_err(to_js)
    }
}

#[wasm_bindgen]
impl WasmGuardEngine {
    /// Creates an engine from a YAML or JSON route table.
    #[wasm_bindgen(constructor)]
    pub fn new(config: &str) -> Result<WasmGuardEngine, JsValue> {
        let routes = RouteTable::parse(config)
            .and_then(|table| table.compile())
            .map_err(to_js)?;
        Ok(Self { routes })
    }

    /// Evaluates a context (JSON string) and returns the result as JSON.
    #[wasm_bindgen]
    pub fn evaluate(&self, context_json: &str) -> Result<String, JsValue> {
        self.decide(context_json)?.to_json().map_err(to_js)
    }

    /// Evaluates a context given as a plain JS object.
    #[wasm_bindgen]
    pub fn evaluate_object(&self, context: &JsValue) -> Result<String, JsValue> {
        let json: String = js_sys::JSON::stringify(context)?.into();
        self.evaluate(&json)
    }

    /// Quick evaluation that returns just allow/deny as a boolean.
    #[wasm_bindgen]
    pub fn is_allowed(&self, context_json: &str) -> Result<bool, JsValue> {
        Ok(self.decide(context_json)?.is_allowed())
    }

    /// Returns the number of configured routes.
    #[wasm_bindgen]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

/// Logs a message to the console (for debugging).
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Returns the version of the guard engine.
#[wasm_bindgen]
pub fn version() -> String {
    crate::VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
routes:
  - id: app
    prefix: /dashboard
    guards: [require_auth]
"#;

    #[test]
    fn test_wasm_engine() {
        let engine = WasmGuardEngine::new(CONFIG).unwrap();
        assert_eq!(engine.route_count(), 1);

        let context = r#"{"isAuthenticated":false,"isNewUser":false,"onboardingComplete":false,"currentPath":"/dashboard"}"#;
        let result = engine.decide(context).unwrap();
        assert_eq!(result.redirect_to(), Some("/sign-in"));
    }
}
