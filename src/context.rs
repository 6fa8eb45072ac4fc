//! Context re-injection on "continue"/"recap" prompts and on compaction,
//! plus one-time LOCAL.md injection per session.
//!
//! Negation ("don't continue") suppresses the recap block outright. LOCAL.md
//! injection is independent of it: first prompt of a session, or any
//! compaction. Every file problem means "that file contributes nothing".

use crate::config::{self, HooksConfig};
use crate::error::Result;
use crate::input::HookInput;
use crate::marker::SessionMarker;
use crate::output::HookOutput;
use crate::toolchain;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const REMINDERS: &str = "Development reminders:
- ALWAYS use make for build/lint/test/clean
- ALWAYS build/test/lint every ~50 lines - errors cascade
- NEVER improve beyond what's asked
- NEVER use git add -A
- NEVER use git commit --amend - make new commits
- NEVER add Co-Authored-By to commits";

pub const COMPACTION_NOTE: &str =
    "These instructions and the full wisdom context from CLAUDE.md should survive compaction.";

/// External rules prepended to the reminders, under ~/.claude/
const RULES_FILE: &str = "RECLAUDE.md";

/// Local instructions, under ~/.claude/ and the project root
const LOCAL_FILE: &str = "LOCAL.md";

/// Trimmed file content; `None` when missing, unreadable or blank.
fn read_trimmed(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => {
            let content = content.trim();
            (!content.is_empty()).then(|| content.to_string())
        }
        Err(e) => {
            debug!("Skipping {:?}: {}", path, e);
            None
        }
    }
}

#[derive(Debug)]
pub struct ContextInjector {
    recap: Regex,
    negation: Regex,
    /// `~/.claude`, if a home directory exists
    claude_home: Option<PathBuf>,
}

impl ContextInjector {
    pub fn from_config(config: &HooksConfig) -> Result<Self> {
        Ok(Self {
            recap: config::compile(&config.recap_pattern)?,
            negation: config::compile(&config.negation_pattern)?,
            claude_home: dirs::home_dir().map(|h| h.join(".claude")),
        })
    }

    #[cfg(test)]
    pub fn with_claude_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.claude_home = Some(dir.into());
        self
    }

    pub fn is_negated(&self, prompt: &str) -> bool {
        self.negation.is_match(&prompt.to_lowercase())
    }

    /// Whether the recap block should be injected. Negation always wins.
    pub fn recap_requested(&self, prompt: &str, compaction: bool) -> bool {
        if self.is_negated(prompt) {
            debug!("Negated recap request");
            return false;
        }
        compaction || self.recap.is_match(&prompt.to_lowercase())
    }

    /// External rules (if any), the reminders, and on compaction the note
    /// asking for all of it to be kept.
    pub fn recap_text(&self, compaction: bool) -> String {
        let mut text = self
            .claude_home
            .as_ref()
            .and_then(|home| read_trimmed(&home.join(RULES_FILE)))
            .map(|rules| format!("{}\n\n{}", rules, REMINDERS))
            .unwrap_or_else(|| REMINDERS.to_string());

        if compaction {
            text.push_str("\n\n");
            text.push_str(COMPACTION_NOTE);
        }
        text
    }

    /// Global then project LOCAL.md, whichever exist.
    pub fn local_instructions(&self, project_dir: &Path) -> Vec<String> {
        let global = self.claude_home.as_ref().map(|h| h.join(LOCAL_FILE));
        let project = Some(project_dir.join(LOCAL_FILE));

        [global, project]
            .into_iter()
            .flatten()
            .filter_map(|p| read_trimmed(&p))
            .collect()
    }

    pub fn run(&self, input: &HookInput) -> Option<HookOutput> {
        let prompt = input.prompt();
        let compaction = input.is_compaction();
        let project_dir = toolchain::project_dir(input.cwd());
        let mut parts = Vec::new();

        let marker = SessionMarker::new(&project_dir, input.session_id());
        let first_prompt = !marker.exists();
        if first_prompt || compaction {
            parts.extend(self.local_instructions(&project_dir));
        }
        if first_prompt {
            if let Err(e) = marker.create() {
                debug!("Could not create session marker {:?}: {}", marker.path(), e);
            }
        }

        if self.recap_requested(prompt, compaction) {
            info!("Injecting recap (compaction: {})", compaction);
            parts.push(self.recap_text(compaction));
        }

        if parts.is_empty() {
            return None;
        }
        Some(HookOutput::message(parts.join("\n\n")))
    }
}
