//! Settings form: rendering of the controls and the input bindings

use std::fmt::Write;

use super::{Settings, SettingsError};
use crate::data::{InjectionPosition, InjectionRole};
use crate::functions::JukeBoxTool;
use crate::helpers::sanitize::sanitize_text;

/// A value entered in one of the form controls
#[derive(Debug, Clone, PartialEq)]
pub enum SettingInput {
    Template(String),
    /// Raw value of the role select
    Role(String),
    /// Raw value of the checked position radio
    Position(String),
    Depth(String),
    Scan(bool),
    IncludeLyrics(bool),
    PollInterval(String),
    Tool(JukeBoxTool, bool),
}

/// What the extension must do after an input was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingEffect {
    /// Clear the injected prompt
    ResetInjection,
    /// Clear the injected prompt and start or stop polling
    PositionChanged,
    RestartPolling,
    SyncTools,
    None,
}

fn parse_int(field: &'static str, value: &str) -> Result<i64, SettingsError> {
    value.trim().parse::<i64>().map_err(|_| SettingsError::InvalidInput {
        field,
        value: value.to_string(),
    })
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidInput {
            field,
            value: value.to_string(),
        }),
    }
}

impl SettingInput {
    /// Build an input from a settings key (camelCase) or a form element id
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, SettingsError> {
        let input = match key {
            "template" | "roon_template" => SettingInput::Template(value.to_string()),
            "role" | "roon_role" => SettingInput::Role(value.to_string()),
            "position" | "roon_position" => SettingInput::Position(value.to_string()),
            "depth" | "roon_depth" => SettingInput::Depth(value.to_string()),
            "scan" | "roon_scan" => SettingInput::Scan(parse_bool("scan", value)?),
            "includeLyrics" | "roon_include_lyrics" => {
                SettingInput::IncludeLyrics(parse_bool("includeLyrics", value)?)
            }
            "pollInterval" | "roon_poll_interval" => SettingInput::PollInterval(value.to_string()),
            other => {
                let tool = JukeBoxTool::all()
                    .into_iter()
                    .find(|tool| tool.settings_key() == other || tool_control_id(*tool) == other)
                    .ok_or_else(|| SettingsError::InvalidInput {
                        field: "key",
                        value: other.to_string(),
                    })?;
                SettingInput::Tool(tool, parse_bool(tool.settings_key(), value)?)
            }
        };
        Ok(input)
    }

    /// Write the input into `settings`.
    ///
    /// Numeric inputs that do not parse leave the settings unchanged.
    pub fn apply(self, settings: &mut Settings) -> Result<SettingEffect, SettingsError> {
        let effect = match self {
            SettingInput::Template(template) => {
                settings.template = template;
                SettingEffect::ResetInjection
            }
            SettingInput::Role(value) => {
                settings.role = InjectionRole::try_from(parse_int("role", &value)?).map_err(|_| {
                    SettingsError::InvalidInput { field: "role", value }
                })?;
                SettingEffect::ResetInjection
            }
            SettingInput::Position(value) => {
                settings.position = InjectionPosition::try_from(parse_int("position", &value)?)
                    .map_err(|_| SettingsError::InvalidInput { field: "position", value })?;
                SettingEffect::PositionChanged
            }
            SettingInput::Depth(value) => {
                settings.depth = parse_int("depth", &value)?;
                SettingEffect::ResetInjection
            }
            SettingInput::Scan(scan) => {
                settings.scan = scan;
                SettingEffect::ResetInjection
            }
            SettingInput::IncludeLyrics(include) => {
                settings.include_lyrics = include;
                SettingEffect::None
            }
            SettingInput::PollInterval(value) => {
                let interval = parse_int("pollInterval", &value)?;
                settings.poll_interval = u64::try_from(interval).map_err(|_| {
                    SettingsError::InvalidInput { field: "pollInterval", value }
                })?;
                SettingEffect::RestartPolling
            }
            SettingInput::Tool(tool, enabled) => {
                settings.set_tool_enabled(tool, enabled);
                SettingEffect::SyncTools
            }
        };
        Ok(effect)
    }
}

/// Element id of a tool's checkbox
pub fn tool_control_id(tool: JukeBoxTool) -> &'static str {
    match tool {
        JukeBoxTool::GetCurrentTrack => "roon_tool_get_current_track",
        JukeBoxTool::GetCurrentLyrics => "roon_tool_get_current_lyrics",
        JukeBoxTool::SearchLyrics => "roon_tool_search_lyrics",
        JukeBoxTool::CheckConnection => "roon_tool_check_connection",
    }
}

fn position_label(position: InjectionPosition) -> &'static str {
    match position {
        InjectionPosition::None => "Disabled",
        InjectionPosition::AfterPrompt => "After main prompt",
        InjectionPosition::InChat => "In-chat @ depth",
        InjectionPosition::BeforePrompt => "Before main prompt",
    }
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

/// Renders the settings controls with the current values
pub struct SettingsForm;

impl SettingsForm {
    /// Control ids and their current values, in form order
    pub fn values(settings: &Settings) -> Vec<(&'static str, String)> {
        let mut values = vec![
            ("roon_template", settings.template.clone()),
            ("roon_role", settings.role.code().to_string()),
            ("roon_position", settings.position.code().to_string()),
            ("roon_depth", settings.depth.to_string()),
            ("roon_scan", settings.scan.to_string()),
            ("roon_include_lyrics", settings.include_lyrics.to_string()),
            ("roon_poll_interval", settings.poll_interval.to_string()),
        ];
        for tool in JukeBoxTool::all() {
            values.push((tool_control_id(tool), settings.tool_enabled(tool).to_string()));
        }
        values
    }

    /// HTML fragment of the settings drawer
    pub fn render_html(settings: &Settings) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(html, r#"<div class="roon-jukebox-settings">"#);
        let _ = writeln!(
            html,
            r#"  <label for="roon_template">Template</label>
  <textarea id="roon_template" rows="3">{}</textarea>"#,
            sanitize_text(&settings.template)
        );

        let _ = writeln!(html, r#"  <select id="roon_role">"#);
        for role in InjectionRole::all() {
            let selected = if role == settings.role { " selected" } else { "" };
            let _ = writeln!(
                html,
                r#"    <option value="{}"{}>{}</option>"#,
                role.code(),
                selected,
                role
            );
        }
        let _ = writeln!(html, "  </select>");

        for position in InjectionPosition::all() {
            let _ = writeln!(
                html,
                r#"  <label><input type="radio" name="roon_position" value="{}"{}> {}</label>"#,
                position.code(),
                checked(position == settings.position),
                position_label(position)
            );
        }

        let _ = writeln!(
            html,
            r#"  <input id="roon_depth" type="number" min="0" value="{}">"#,
            settings.depth
        );
        let _ = writeln!(
            html,
            r#"  <label><input id="roon_scan" type="checkbox"{}> Include in World Info scanning</label>"#,
            checked(settings.scan)
        );
        let _ = writeln!(
            html,
            r#"  <label><input id="roon_include_lyrics" type="checkbox"{}> Include lyrics</label>"#,
            checked(settings.include_lyrics)
        );
        let _ = writeln!(
            html,
            r#"  <input id="roon_poll_interval" type="number" min="1000" step="1000" value="{}">"#,
            settings.poll_interval
        );

        for tool in JukeBoxTool::all() {
            let _ = writeln!(
                html,
                r#"  <label><input id="{}" type="checkbox"{}> {}</label>"#,
                tool_control_id(tool),
                checked(settings.tool_enabled(tool)),
                sanitize_text(tool.display_name())
            );
        }
        let _ = writeln!(html, "</div>");
        html
    }
}
