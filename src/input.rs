//! Hook input payload, shared by every subcommand.
//!
//! Claude Code writes one JSON object to stdin per event. Recognized string
//! fields are typed `Option<String>`, so a field of the wrong type fails the
//! whole parse and the hook stays silent; `null` reads as absent.

use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::io::{self, Read};

/// Event name Claude Code sends before condensing the conversation.
pub const PRE_COMPACT: &str = "PreCompact";

#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    /// The user's prompt text
    #[serde(default)]
    pub prompt: Option<String>,

    /// Current working directory
    #[serde(default)]
    pub cwd: Option<String>,

    #[serde(default)]
    pub hook_event: Option<String>,

    #[serde(default)]
    pub hook_event_name: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,

    /// Tool arguments; shape depends on the tool, so kept loose
    #[serde(default)]
    pub tool_input: Option<Value>,

    /// Set by Claude Code when a Stop hook already blocked once this turn
    #[serde(default)]
    pub stop_hook_active: Option<bool>,
}

impl HookInput {
    /// Parse a raw payload. Anything but a JSON object is an error.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_stdin() -> Result<Self> {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        Self::parse(&raw)
    }

    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or("")
    }

    /// Working directory, `None` when absent or empty.
    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref().filter(|c| !c.is_empty())
    }

    /// Event name from either spelling of the field.
    pub fn event(&self) -> &str {
        self.hook_event
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(self.hook_event_name.as_deref())
            .unwrap_or("")
    }

    pub fn is_compaction(&self) -> bool {
        self.event() == PRE_COMPACT
    }

    pub fn session_id(&self) -> &str {
        self.session_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("default")
    }

    /// `tool_input.command`, only when it is a string.
    pub fn command(&self) -> Option<&str> {
        self.tool_input.as_ref()?.get("command")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_objects() {
        assert!(HookInput::parse("").is_err());
        assert!(HookInput::parse("[]").is_err());
        assert!(HookInput::parse("{bad json}").is_err());
        assert!(HookInput::parse("\"prompt\"").is_err());
    }

    #[test]
    fn test_wrong_typed_prompt_is_an_error() {
        assert!(HookInput::parse(r#"{"prompt": {"bad": "type"}}"#).is_err());
        assert!(HookInput::parse(r#"{"prompt": 42}"#).is_err());
    }

    #[test]
    fn test_null_prompt_reads_as_empty() {
        let input = HookInput::parse(r#"{"prompt": null}"#).unwrap();
        assert_eq!(input.prompt(), "");
    }

    #[test]
    fn test_event_accepts_both_field_names() {
        let a = HookInput::parse(r#"{"hook_event": "PreCompact"}"#).unwrap();
        let b = HookInput::parse(r#"{"hook_event_name": "PreCompact"}"#).unwrap();
        let c = HookInput::parse(r#"{"hook_event_name": "UserPromptSubmit"}"#).unwrap();
        assert!(a.is_compaction());
        assert!(b.is_compaction());
        assert!(!c.is_compaction());
    }

    #[test]
    fn test_command_requires_string() {
        let ok = HookInput::parse(r#"{"tool_input": {"command": "npm test"}}"#).unwrap();
        assert_eq!(ok.command(), Some("npm test"));

        let nested =
            HookInput::parse(r#"{"tool_input": {"command": {"nested": "dict"}}}"#).unwrap();
        assert_eq!(nested.command(), None);

        let null = HookInput::parse(r#"{"tool_input": {"command": null}}"#).unwrap();
        assert_eq!(null.command(), None);
    }

    #[test]
    fn test_defaults() {
        let input = HookInput::parse("{}").unwrap();
        assert_eq!(input.session_id(), "default");
        assert_eq!(input.cwd(), None);
        assert_eq!(input.event(), "");
    }
}
