use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use super::{HostContext, HostError};
use crate::data::InjectionPayload;
use crate::functions::{FunctionTool, ToolResult};
use crate::helpers::debounce::Debouncer;
use crate::helpers::json::safe_json_parse;
use crate::prompt::{substitute_params_extended, PromptParams};

/// A standalone host for running the extension outside a chat application.
///
/// Extension settings live in a JSON file, injected prompts and function
/// tools are kept in memory, and `{{user}}`/`{{char}}` style macros are
/// resolved from a fixed table.
pub struct LocalHost {
    settings_file: PathBuf,
    extension_settings: Arc<Mutex<Map<String, Value>>>,
    prompts: Mutex<HashMap<String, InjectionPayload>>,
    tools: Mutex<BTreeMap<String, Arc<dyn FunctionTool>>>,
    macros: PromptParams,
    saver: Debouncer,
}

impl LocalHost {
    /// Create a host backed by `settings_file`, saving at most once per `save_delay`
    pub fn new<P: AsRef<Path>>(settings_file: P, save_delay: Duration) -> Self {
        let settings_file = settings_file.as_ref().to_path_buf();
        let extension_settings = load_settings_file(&settings_file);

        LocalHost {
            settings_file,
            extension_settings: Arc::new(Mutex::new(extension_settings)),
            prompts: Mutex::new(HashMap::new()),
            tools: Mutex::new(BTreeMap::new()),
            macros: PromptParams::new(),
            saver: Debouncer::new(save_delay),
        }
    }

    /// Add a host macro such as `user` or `char`
    pub fn with_macro(mut self, name: &str, value: &str) -> Self {
        self.macros.insert(name.to_string(), value.to_string());
        self
    }

    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Current content of an injection slot
    pub fn extension_prompt(&self, key: &str) -> Option<InjectionPayload> {
        self.prompts.lock().ok().and_then(|prompts| prompts.get(key).cloned())
    }

    /// Names of the registered function tools, sorted
    pub fn registered_tools(&self) -> Vec<String> {
        match self.tools.lock() {
            Ok(tools) => tools.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Invoke a registered function tool the way the model would
    pub async fn call_function_tool(&self, name: &str, args: Value) -> Result<ToolResult, HostError> {
        let tool = self
            .tools
            .lock()
            .ok()
            .and_then(|tools| tools.get(name).cloned())
            .ok_or_else(|| HostError::ToolNotRegistered(name.to_string()))?;

        if !tool.should_register().await {
            return Err(HostError::ToolNotRegistered(name.to_string()));
        }

        debug!("Invoking function tool {} with {}", name, args);
        Ok(tool.invoke(args).await)
    }

    /// Write the settings file now, dropping any pending debounced save
    pub fn flush_settings(&self) -> Result<(), HostError> {
        self.saver.cancel();
        let snapshot = self
            .extension_settings
            .lock()
            .map_err(|_| HostError::Storage("settings lock poisoned".to_string()))?
            .clone();
        write_settings_file(&self.settings_file, &snapshot)
    }
}

fn load_settings_file(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            info!("No extension settings at {:?} ({}), starting empty", path, e);
            return Map::new();
        }
    };

    match safe_json_parse::<Map<String, Value>>(&content) {
        Some(settings) => {
            debug!("Loaded extension settings from {:?}", path);
            settings
        }
        None => {
            warn!("Extension settings file {:?} is not a JSON object, ignoring it", path);
            Map::new()
        }
    }
}

fn write_settings_file(path: &Path, settings: &Map<String, Value>) -> Result<(), HostError> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| HostError::Storage(format!("Failed to serialize settings: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| HostError::Storage(format!("Failed to create {:?}: {}", parent, e)))?;
    }

    fs::write(path, json)
        .map_err(|e| HostError::Storage(format!("Failed to write {:?}: {}", path, e)))?;

    debug!("Saved extension settings to {:?}", path);
    Ok(())
}

impl HostContext for LocalHost {
    fn set_extension_prompt(&self, payload: InjectionPayload) -> Result<(), HostError> {
        if payload.is_cleared() {
            debug!("Clearing extension prompt {}", payload.key);
        } else {
            info!(
                "Extension prompt {} ({}, depth {}, role {}): {}",
                payload.key, payload.position, payload.depth, payload.role, payload.text
            );
        }

        let mut prompts = self
            .prompts
            .lock()
            .map_err(|_| HostError::Injection("prompt table lock poisoned".to_string()))?;
        prompts.insert(payload.key.clone(), payload);
        Ok(())
    }

    fn substitute_params_extended(
        &self,
        template: &str,
        params: &PromptParams,
    ) -> Result<String, HostError> {
        let mut all = self.macros.clone();
        all.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(substitute_params_extended(template, &all))
    }

    fn register_function_tool(&self, tool: Arc<dyn FunctionTool>) {
        if let Ok(mut tools) = self.tools.lock() {
            debug!("Registering function tool {}", tool.name());
            tools.insert(tool.name().to_string(), tool);
        }
    }

    fn unregister_function_tool(&self, name: &str) {
        if let Ok(mut tools) = self.tools.lock() {
            if tools.remove(name).is_some() {
                debug!("Unregistered function tool {}", name);
            }
        }
    }

    fn extension_settings(&self, module: &str) -> Option<Value> {
        self.extension_settings
            .lock()
            .ok()
            .and_then(|settings| settings.get(module).cloned())
    }

    fn set_extension_settings(&self, module: &str, settings: Value) {
        if let Ok(mut all) = self.extension_settings.lock() {
            all.insert(module.to_string(), settings);
        }
    }

    fn save_settings_debounced(&self) {
        let path = self.settings_file.clone();
        let settings = self.extension_settings.clone();
        self.saver.call(move || {
            let snapshot = match settings.lock() {
                Ok(settings) => settings.clone(),
                Err(_) => {
                    error!("Settings lock poisoned, not saving");
                    return;
                }
            };
            if let Err(e) = write_settings_file(&path, &snapshot) {
                error!("{}", e);
            }
        });
    }
}
