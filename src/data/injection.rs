//! Injection slot metadata understood by the chat host

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the injected text is placed in the prompt.
///
/// Serialized as the host's integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum InjectionPosition {
    /// Injection disabled
    None,
    AfterPrompt,
    InChat,
    BeforePrompt,
}

impl InjectionPosition {
    /// Integer code used by the host
    pub fn code(self) -> i64 {
        match self {
            InjectionPosition::None => -1,
            InjectionPosition::AfterPrompt => 0,
            InjectionPosition::InChat => 1,
            InjectionPosition::BeforePrompt => 2,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != InjectionPosition::None
    }

    /// All positions, in the order the settings form lists them
    pub fn all() -> [InjectionPosition; 4] {
        [
            InjectionPosition::None,
            InjectionPosition::AfterPrompt,
            InjectionPosition::InChat,
            InjectionPosition::BeforePrompt,
        ]
    }
}

impl Default for InjectionPosition {
    fn default() -> Self {
        InjectionPosition::InChat
    }
}

impl TryFrom<i64> for InjectionPosition {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(InjectionPosition::None),
            0 => Ok(InjectionPosition::AfterPrompt),
            1 => Ok(InjectionPosition::InChat),
            2 => Ok(InjectionPosition::BeforePrompt),
            other => Err(format!("Unknown injection position: {}", other)),
        }
    }
}

impl From<InjectionPosition> for i64 {
    fn from(position: InjectionPosition) -> Self {
        position.code()
    }
}

impl FromStr for InjectionPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "disabled" => Ok(InjectionPosition::None),
            "after_prompt" | "after-prompt" => Ok(InjectionPosition::AfterPrompt),
            "in_chat" | "in-chat" => Ok(InjectionPosition::InChat),
            "before_prompt" | "before-prompt" => Ok(InjectionPosition::BeforePrompt),
            other => other
                .parse::<i64>()
                .map_err(|_| format!("Invalid injection position: {}", s))
                .and_then(InjectionPosition::try_from),
        }
    }
}

impl fmt::Display for InjectionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionPosition::None => write!(f, "none"),
            InjectionPosition::AfterPrompt => write!(f, "after_prompt"),
            InjectionPosition::InChat => write!(f, "in_chat"),
            InjectionPosition::BeforePrompt => write!(f, "before_prompt"),
        }
    }
}

/// Message role of the injected text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum InjectionRole {
    System,
    User,
    Assistant,
}

impl InjectionRole {
    pub fn code(self) -> i64 {
        match self {
            InjectionRole::System => 0,
            InjectionRole::User => 1,
            InjectionRole::Assistant => 2,
        }
    }

    pub fn all() -> [InjectionRole; 3] {
        [InjectionRole::System, InjectionRole::User, InjectionRole::Assistant]
    }
}

impl Default for InjectionRole {
    fn default() -> Self {
        InjectionRole::System
    }
}

impl TryFrom<i64> for InjectionRole {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InjectionRole::System),
            1 => Ok(InjectionRole::User),
            2 => Ok(InjectionRole::Assistant),
            other => Err(format!("Unknown injection role: {}", other)),
        }
    }
}

impl From<InjectionRole> for i64 {
    fn from(role: InjectionRole) -> Self {
        role.code()
    }
}

impl FromStr for InjectionRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(InjectionRole::System),
            "user" => Ok(InjectionRole::User),
            "assistant" => Ok(InjectionRole::Assistant),
            other => other
                .parse::<i64>()
                .map_err(|_| format!("Invalid injection role: {}", s))
                .and_then(InjectionRole::try_from),
        }
    }
}

impl fmt::Display for InjectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectionRole::System => write!(f, "system"),
            InjectionRole::User => write!(f, "user"),
            InjectionRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Content of the host's injection slot for one extension key.
///
/// The host keeps at most one payload per key; every write replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionPayload {
    pub key: String,
    pub text: String,
    pub position: InjectionPosition,
    pub depth: i64,
    pub scan: bool,
    pub role: InjectionRole,
}

impl InjectionPayload {
    /// The "no data" payload written at the start of every cycle
    pub fn cleared(key: &str) -> Self {
        Self {
            key: key.to_string(),
            text: String::new(),
            position: InjectionPosition::None,
            depth: 0,
            scan: false,
            role: InjectionRole::System,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.text.is_empty()
    }
}
