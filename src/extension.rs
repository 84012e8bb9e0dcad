use std::sync::Arc;

use log::{debug, info, warn};

use crate::functions::ToolRegistry;
use crate::host::HostContext;
use crate::injection::{InjectionController, InjectionState};
use crate::jukebox::JukeBoxClient;
use crate::settings::{SettingEffect, SettingInput, Settings, SettingsError, SettingsStore};

/// The extension as the host sees it: settings, tools and the injection lifecycle
pub struct JukeBoxExtension {
    host: Arc<dyn HostContext>,
    client: JukeBoxClient,
    settings: SettingsStore,
    tools: ToolRegistry,
    controller: InjectionController,
}

impl JukeBoxExtension {
    /// Load the settings from the host and wire up the collaborators.
    ///
    /// Nothing is registered and no timer runs until [`JukeBoxExtension::init`].
    pub fn new(host: Arc<dyn HostContext>, client: JukeBoxClient) -> Result<Self, SettingsError> {
        let settings = SettingsStore::load(host.clone())?;
        let tools = ToolRegistry::new(host.clone(), client.clone());
        let controller = InjectionController::new(client.clone(), host.clone(), settings.clone());

        Ok(Self {
            host,
            client,
            settings,
            tools,
            controller,
        })
    }

    /// Host startup: register the enabled tools, start polling and persist the seeded settings
    pub async fn init(&self) -> bool {
        info!("Initializing JukeBox extension");
        self.sync_tools();
        let polling = self.controller.start_polling().await;
        self.host.save_settings_debounced();
        polling
    }

    /// Manual trigger for one refresh cycle
    pub async fn update_current_track(&self) -> InjectionState {
        self.controller.set_current_track().await
    }

    /// Apply one edit from the settings form and carry out its side effects.
    ///
    /// A rejected value leaves the settings untouched and saves nothing.
    pub async fn apply_setting(&self, input: SettingInput) -> Result<SettingEffect, SettingsError> {
        debug!("Applying setting {:?}", input);
        let effect = self.settings.update(|settings| input.apply(settings))??;

        match effect {
            SettingEffect::ResetInjection => self.controller.reset_inject(),
            SettingEffect::PositionChanged => {
                self.controller.reset_inject();
                if self.settings.snapshot().position.is_enabled() {
                    if !self.controller.is_polling() {
                        self.controller.start_polling().await;
                    }
                } else {
                    self.controller.stop_polling();
                }
            }
            SettingEffect::RestartPolling => {
                if self.settings.snapshot().position.is_enabled() {
                    self.controller.start_polling().await;
                }
            }
            SettingEffect::SyncTools => {
                self.sync_tools();
            }
            SettingEffect::None => {}
        }

        self.settings.save()?;
        Ok(effect)
    }

    /// Persist one edit without acting on it.
    ///
    /// For one-shot edits outside a running host: no timer, slot or plugin
    /// request is touched. The effect is returned for reporting only.
    pub fn store_setting(&self, input: SettingInput) -> Result<SettingEffect, SettingsError> {
        debug!("Storing setting {:?}", input);
        let effect = self.settings.update(|settings| input.apply(settings))??;
        self.settings.save()?;
        Ok(effect)
    }

    /// Re-register the tools according to the current flags
    pub fn sync_tools(&self) -> Vec<&'static str> {
        self.tools.sync(&self.settings.snapshot())
    }

    /// Stop the timer and clear the slot; cycles already running still finish
    pub fn shutdown(&self) {
        info!("Shutting down JukeBox extension");
        self.controller.stop_polling();
        self.controller.reset_inject();
        if let Err(e) = self.settings.save() {
            warn!("Failed to save settings on shutdown: {}", e);
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.snapshot()
    }

    pub fn client(&self) -> &JukeBoxClient {
        &self.client
    }

    pub fn controller(&self) -> &InjectionController {
        &self.controller
    }
}
