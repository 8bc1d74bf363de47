//! API key resolution.
//!
//! Keys come from two places: process environment variables (local
//! development) and the key-value bindings the hosting platform supplies
//! per request (deployed workers). The process value wins when both are
//! set.

use std::collections::HashMap;

use crate::models::Provider;

/// Runtime-bound environment: key-value configuration supplied by the
/// hosting platform at request time, distinct from process env vars.
#[derive(Debug, Clone, Default)]
pub struct RuntimeEnv {
    bindings: HashMap<String, String>,
}

impl RuntimeEnv {
    /// Create an empty binding set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, builder-style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Look up a binding by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for RuntimeEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

/// Resolve the API key for a provider: first non-empty value among the
/// process environment variable and the runtime binding of the same name.
///
/// Returns `None` when neither source has a value. That is not an error at
/// this layer; the provider rejects the empty credential on the first call.
pub fn resolve_api_key(provider: Provider, env: &RuntimeEnv) -> Option<String> {
    let var = provider.api_key_env_var();
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| non_empty(env.get(var)))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
