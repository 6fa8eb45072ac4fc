//! Pattern tables driving the hooks.
//!
//! Every table has a compiled-in default. A JSON file may override any subset
//! of them; keys left out keep their defaults. Tables are ordered and
//! evaluated first-match-wins, so entry order in the file is significant.

use crate::error::{HookError, Result};
use crate::toolchain::Intent;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ============================================================================
// Constants
// ============================================================================

/// Config file name under ~/.claude/hooks/
const CONFIG_FILE: &str = "hookrail.json";

/// Hooks directory under ~/.claude/
const HOOKS_DIR: &str = "hooks";

// ============================================================================
// Table entries
// ============================================================================

/// Exact/fuzzy keyword that points at an agent
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct KeywordEntry {
    pub keyword: String,
    pub agent: String,
    /// `false` for keys within a few edits of everyday words
    #[serde(default = "default_fuzzy")]
    pub fuzzy: bool,
}

fn default_fuzzy() -> bool {
    true
}

/// Regex fallback for agent selection, tried after the keyword table
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentTrigger {
    pub pattern: String,
    pub agent: String,
}

/// Shell command pattern mapped to a build intent
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Detector {
    pub pattern: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HooksConfig {
    /// Prompts about the hooks themselves; the classifier stays quiet on these
    pub meta_patterns: Vec<String>,
    pub commit_pattern: String,
    pub docs_pattern: String,
    pub keywords: Vec<KeywordEntry>,
    pub agent_triggers: Vec<AgentTrigger>,
    pub recap_pattern: String,
    pub negation_pattern: String,
    pub detectors: Vec<Detector>,
}

fn keyword(keyword: &str, agent: &str) -> KeywordEntry {
    KeywordEntry {
        keyword: keyword.to_string(),
        agent: agent.to_string(),
        fuzzy: true,
    }
}

fn exact_keyword(keyword: &str, agent: &str) -> KeywordEntry {
    KeywordEntry {
        fuzzy: false,
        ..self::keyword(keyword, agent)
    }
}

fn trigger(pattern: &str, agent: &str) -> AgentTrigger {
    AgentTrigger {
        pattern: pattern.to_string(),
        agent: agent.to_string(),
    }
}

fn detector(pattern: &str, intent: Intent) -> Detector {
    Detector {
        pattern: pattern.to_string(),
        intent,
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            meta_patterns: vec![
                r"\bhook\b".to_string(),
                r"\bagent\b.*\b(check|fix|issue)".to_string(),
                r"\b(check|fix|debug)\b.*(hook|agent|nudge|settings)".to_string(),
                r"invoke.*agent".to_string(),
            ],
            commit_pattern: r"\b(commit|save|checkpoint)\b".to_string(),
            docs_pattern: r"\b(readme|docs?|documentation|markdown|changelog)\b|\.md\b"
                .to_string(),
            // Exact-only keys sit within fuzzy reach of everyday words:
            // string/styling, usual/visual, response/responsive, ready/readme,
            // matter/pattern, lean/learn.
            keywords: vec![
                exact_keyword("styling", "/visual"),
                keyword("stylesheet", "/visual"),
                keyword("css", "/visual"),
                keyword("layout", "/visual"),
                exact_keyword("visual", "/visual"),
                exact_keyword("spacing", "/visual"),
                exact_keyword("responsive", "/visual"),
                exact_keyword("readme", "/readme"),
                keyword("documentation", "/readme"),
                keyword("architecture", "/readme"),
                exact_keyword("learn", "/learn"),
                exact_keyword("pattern", "/learn"),
                keyword("finalize", "/refine"),
            ],
            agent_triggers: vec![
                trigger(r"\b(ui|ux|css|styling|layout|visual)\b", "/visual"),
                trigger(r"\b(readme|docs|documentation|document|arch)\b", "/readme"),
                trigger(r"\b(learn|extract|pattern|skill)\b", "/learn"),
                trigger(
                    r"\b(refine|finalize|finish|complete|ship|wrap.?up)\b",
                    "/refine",
                ),
                trigger(
                    r"\b(improve|enhance|fix|cleanup|refactor|optimize|polish)\b",
                    "/improve",
                ),
            ],
            recap_pattern: r"\b(continue|recap|where\s+were\s+we|what'?s\s+next)\b".to_string(),
            negation_pattern: r"\b(don'?t|not|never)\s+\w*\s*(continue|recap)".to_string(),
            detectors: vec![
                detector(r"^(npm|yarn|pnpm)\s+(test|run\s+test)\b", Intent::Test),
                detector(r"^pytest\b", Intent::Test),
                detector(r"^go\s+test\b", Intent::Test),
                detector(r"^cargo\s+test\b", Intent::Test),
                detector(r"^python\s+-m\s+pytest\b", Intent::Test),
                detector(r"^uv\s+run\s+pytest\b", Intent::Test),
                detector(r"^(npm|yarn|pnpm)\s+(build|run\s+build)\b", Intent::Build),
                detector(r"^go\s+build\b", Intent::Build),
                detector(r"^cargo\s+build\b", Intent::Build),
                detector(r"^tsc\b", Intent::Build),
                detector(r"^(npm|yarn|pnpm)\s+(lint|run\s+lint)\b", Intent::Lint),
                detector(r"^cargo\s+clippy\b", Intent::Lint),
                detector(r"^go\s+vet\b", Intent::Lint),
                detector(r"^ruff\s+check\b", Intent::Lint),
                detector(r"\be2e\b", Intent::E2e),
                detector(r"\bintegration\b", Intent::E2e),
                detector(r"\bplaywright\b", Intent::E2e),
                detector(r"\bcypress\b", Intent::E2e),
                detector(r"\bsmoke\b", Intent::Smoke),
            ],
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Default config location, `~/.claude/hooks/hookrail.json`
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(HookError::NoHomeDir)?;
    Ok(home.join(".claude").join(HOOKS_DIR).join(CONFIG_FILE))
}

impl HooksConfig {
    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| HookError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| HookError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Resolve the effective config. An explicit path wins over the default
    /// location; a missing default file is not an error. Any failure falls
    /// back to the compiled-in tables.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Ok(p) if p.exists() => p,
                Ok(p) => {
                    debug!("No config at {:?}, using defaults", p);
                    return Self::default();
                }
                Err(e) => {
                    debug!("{}, using default config", e);
                    return Self::default();
                }
            },
        };

        match Self::read(&path) {
            Ok(config) => {
                debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}, using default config", e);
                Self::default()
            }
        }
    }
}

/// Compile a table pattern. Matching is always case-insensitive.
pub fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| HookError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_patterns_compile() {
        let config = HooksConfig::default();
        for p in &config.meta_patterns {
            compile(p).unwrap();
        }
        for t in &config.agent_triggers {
            compile(&t.pattern).unwrap();
        }
        for d in &config.detectors {
            compile(&d.pattern).unwrap();
        }
        compile(&config.commit_pattern).unwrap();
        compile(&config.docs_pattern).unwrap();
        compile(&config.recap_pattern).unwrap();
        compile(&config.negation_pattern).unwrap();
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"keywords": [{{"keyword": "benchmark", "agent": "/perf"}}],
                "detectors": [{{"pattern": "^bun\\s+test\\b", "intent": "test"}}]}}"#
        )
        .unwrap();

        let config = HooksConfig::read(file.path()).unwrap();
        assert_eq!(config.keywords, vec![keyword("benchmark", "/perf")]);
        assert_eq!(config.detectors.len(), 1);
        assert_eq!(config.detectors[0].intent, Intent::Test);
        assert_eq!(config.commit_pattern, HooksConfig::default().commit_pattern);
    }

    #[test]
    fn test_keyword_fuzzy_flag_defaults_on() {
        let config: HooksConfig = serde_json::from_str(
            r#"{"keywords": [
                {"keyword": "benchmark", "agent": "/perf"},
                {"keyword": "ready", "agent": "/ship", "fuzzy": false}
            ]}"#,
        )
        .unwrap();
        assert!(config.keywords[0].fuzzy);
        assert!(!config.keywords[1].fuzzy);
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert_eq!(HooksConfig::load(Some(file.path())), HooksConfig::default());

        let missing = Path::new("/nonexistent/hookrail.json");
        assert_eq!(HooksConfig::load(Some(missing)), HooksConfig::default());
    }

    #[test]
    fn test_compile_reports_bad_pattern() {
        let err = compile("(unclosed").unwrap_err();
        assert!(matches!(err, HookError::InvalidPattern { .. }));
    }

    #[test]
    fn test_compile_is_case_insensitive() {
        assert!(compile(r"^cargo\s+test\b").unwrap().is_match("Cargo Test"));
    }
}
