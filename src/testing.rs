//! Test doubles for the HTTP layer and the host application

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::data::InjectionPayload;
use crate::functions::FunctionTool;
use crate::helpers::http_client::{HttpClient, HttpClientError};
use crate::host::{HostContext, HostError};
use crate::prompt::{substitute_params_extended, PromptParams};

/// Canned answer for requests whose path ends with a given suffix
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Unreachable,
    /// Answer with the inner reply once the delay has passed
    Delayed(Duration, Box<Reply>),
}

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<String, Reply>,
    calls: Vec<String>,
    posted: Vec<Value>,
}

/// HttpClient answering from a script and recording every request
#[derive(Debug, Clone, Default)]
pub struct ScriptedHttpClient {
    script: Arc<Mutex<Script>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose path ends with `suffix`; replaces an earlier reply
    pub fn reply(&self, suffix: &str, reply: Reply) {
        self.script.lock().unwrap().replies.insert(suffix.to_string(), reply);
    }

    /// Requests made so far, as "GET /path" or "POST /path"
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn posted_bodies(&self) -> Vec<Value> {
        self.script.lock().unwrap().posted.clone()
    }

    async fn answer(&self, method: &str, url: &str, body: Option<Value>) -> Result<Value, HttpClientError> {
        let path = url::Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());

        let mut reply = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(format!("{} {}", method, path));
            if let Some(body) = body {
                script.posted.push(body);
            }
            script
                .replies
                .iter()
                .find(|(suffix, _)| path.ends_with(suffix.as_str()))
                .map(|(_, reply)| reply.clone())
                .unwrap_or(Reply::Unreachable)
        };

        loop {
            match reply {
                Reply::Delayed(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
                Reply::Json(value) => return Ok(value),
                Reply::Status(status) => {
                    return Err(HttpClientError::ServerError {
                        status,
                        message: format!("scripted status {}", status),
                    })
                }
                Reply::Unreachable => {
                    return Err(HttpClientError::RequestError(format!(
                        "connection refused: {}",
                        url
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn post_json_value(&self, url: &str, payload: Value) -> Result<Value, HttpClientError> {
        self.answer("POST", url, Some(payload)).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, HttpClientError> {
        self.answer("GET", url, None).await
    }

    fn clone_box(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// In-memory host recording everything the extension asks of it
#[derive(Default)]
pub struct RecordingHost {
    settings: Mutex<HashMap<String, Value>>,
    prompts: Mutex<Vec<InjectionPayload>>,
    tools: Mutex<BTreeMap<String, Arc<dyn FunctionTool>>>,
    unregistered: Mutex<Vec<String>>,
    saves: Mutex<usize>,
    fail_substitution: Mutex<bool>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every template substitution fail
    pub fn fail_substitution(&self, fail: bool) {
        *self.fail_substitution.lock().unwrap() = fail;
    }

    /// Registered tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.lock().unwrap().keys().cloned().collect()
    }

    pub fn unregistered(&self) -> Vec<String> {
        self.unregistered.lock().unwrap().clone()
    }

    pub fn save_requests(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    /// Latest payload set for `key`
    pub fn prompt(&self, key: &str) -> Option<InjectionPayload> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|p| p.key == key)
            .cloned()
    }

    pub fn prompt_history(&self) -> Vec<InjectionPayload> {
        self.prompts.lock().unwrap().clone()
    }
}

impl HostContext for RecordingHost {
    fn set_extension_prompt(&self, payload: InjectionPayload) -> Result<(), HostError> {
        self.prompts.lock().unwrap().push(payload);
        Ok(())
    }

    fn substitute_params_extended(
        &self,
        template: &str,
        params: &PromptParams,
    ) -> Result<String, HostError> {
        if *self.fail_substitution.lock().unwrap() {
            return Err(HostError::Template("scripted failure".to_string()));
        }
        let mut all = PromptParams::new();
        all.insert("user".to_string(), "User".to_string());
        all.insert("char".to_string(), "Assistant".to_string());
        all.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(substitute_params_extended(template, &all))
    }

    fn register_function_tool(&self, tool: Arc<dyn FunctionTool>) {
        self.tools.lock().unwrap().insert(tool.name().to_string(), tool);
    }

    fn unregister_function_tool(&self, name: &str) {
        self.tools.lock().unwrap().remove(name);
        self.unregistered.lock().unwrap().push(name.to_string());
    }

    fn extension_settings(&self, module: &str) -> Option<Value> {
        self.settings.lock().unwrap().get(module).cloned()
    }

    fn set_extension_settings(&self, module: &str, settings: Value) {
        self.settings.lock().unwrap().insert(module.to_string(), settings);
    }

    fn save_settings_debounced(&self) {
        *self.saves.lock().unwrap() += 1;
    }
}
