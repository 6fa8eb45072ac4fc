//! Hook responses. At most one is printed per invocation; printing nothing
//! means "no action".

use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum HookOutput {
    /// Advisory text injected into the conversation
    Message(SystemMessage),
    /// PreToolUse rewrite of the Bash command
    Rewrite(Rewrite),
    /// Stop hook refusal
    Block(Block),
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemMessage {
    pub ok: bool,
    pub system_message: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rewrite {
    pub ok: bool,
    pub hook_specific_output: PreToolUseDecision,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreToolUseDecision {
    /// Always "PreToolUse"
    pub hook_event_name: String,
    /// Always "allow"; redirects never gate a command
    pub permission_decision: String,
    pub permission_decision_reason: String,
    pub updated_input: UpdatedInput,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UpdatedInput {
    pub command: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Block {
    /// Always "block"
    pub decision: String,
    pub reason: String,
}

impl HookOutput {
    pub fn message(text: impl Into<String>) -> Self {
        HookOutput::Message(SystemMessage {
            ok: true,
            system_message: text.into(),
        })
    }

    pub fn rewrite(command: impl Into<String>, reason: impl Into<String>) -> Self {
        HookOutput::Rewrite(Rewrite {
            ok: true,
            hook_specific_output: PreToolUseDecision {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: "allow".to_string(),
                permission_decision_reason: reason.into(),
                updated_input: UpdatedInput {
                    command: command.into(),
                },
            },
        })
    }

    pub fn block(reason: impl Into<String>) -> Self {
        HookOutput::Block(Block {
            decision: "block".to_string(),
            reason: reason.into(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
