//! Interface to the chat application hosting the extension

pub mod local;

pub use local::LocalHost;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::data::InjectionPayload;
use crate::functions::FunctionTool;
use crate::prompt::PromptParams;

/// Errors reported by a host
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Template substitution failed: {0}")]
    Template(String),

    #[error("Prompt injection failed: {0}")]
    Injection(String),

    #[error("Settings storage error: {0}")]
    Storage(String),

    #[error("Function tool not registered: {0}")]
    ToolNotRegistered(String),
}

/// Services the host application provides to the extension.
///
/// Every method is synchronous and cheap; implementations must not block
/// on I/O (persistence is expected to be deferred, see
/// [`HostContext::save_settings_debounced`]).
pub trait HostContext: Send + Sync {
    /// Replace the injection slot identified by `payload.key`
    fn set_extension_prompt(&self, payload: InjectionPayload) -> Result<(), HostError>;

    /// Resolve the placeholders of a user-edited template
    fn substitute_params_extended(
        &self,
        template: &str,
        params: &PromptParams,
    ) -> Result<String, HostError>;

    /// Make a tool callable by the language model (replaces a tool with the same name)
    fn register_function_tool(&self, tool: Arc<dyn FunctionTool>);

    /// Remove a tool by name; unknown names are ignored
    fn unregister_function_tool(&self, name: &str);

    /// Persisted settings object of an extension
    fn extension_settings(&self, module: &str) -> Option<Value>;

    /// Replace the settings object of an extension in memory
    fn set_extension_settings(&self, module: &str, settings: Value);

    /// Persist all extension settings at some later point
    fn save_settings_debounced(&self);
}
