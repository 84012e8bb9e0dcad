use std::sync::Arc;

use log::{debug, info};

use super::{FunctionTool, JukeBoxFunctionTool, JukeBoxTool};
use crate::host::HostContext;
use crate::jukebox::JukeBoxClient;
use crate::settings::Settings;

/// Keeps the host's function tool table in line with the settings
pub struct ToolRegistry {
    host: Arc<dyn HostContext>,
    tools: Vec<Arc<JukeBoxFunctionTool>>,
}

impl ToolRegistry {
    /// Create the registry with all four JukeBox tools bound to `client`
    pub fn new(host: Arc<dyn HostContext>, client: JukeBoxClient) -> Self {
        let tools = JukeBoxTool::all()
            .into_iter()
            .map(|tool| Arc::new(JukeBoxFunctionTool::new(tool, client.clone())))
            .collect();

        Self { host, tools }
    }

    /// Register every enabled tool and unregister the others.
    ///
    /// Idempotent; returns the names of the tools now registered.
    pub fn sync(&self, settings: &Settings) -> Vec<&'static str> {
        let mut registered = Vec::new();

        for tool in &self.tools {
            let kind = tool.tool();
            if settings.tool_enabled(kind) {
                self.host.register_function_tool(tool.clone() as Arc<dyn FunctionTool>);
                registered.push(kind.name());
            } else {
                self.host.unregister_function_tool(kind.name());
            }
        }

        debug!("Function tools registered: {:?}", registered);
        info!("Synced {} of {} JukeBox tools", registered.len(), self.tools.len());
        registered
    }

    /// Look up a tool definition by kind
    pub fn tool(&self, kind: JukeBoxTool) -> Option<Arc<JukeBoxFunctionTool>> {
        self.tools.iter().find(|tool| tool.tool() == kind).cloned()
    }
}
