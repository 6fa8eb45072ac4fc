//! UserPromptSubmit nudge: suggest at most one agent, plus static rule
//! blocks for commits and doc naming.
//!
//! Evaluation order:
//! 1. Meta prompts (about hooks/agents themselves) produce nothing
//! 2. Doc nouns or a `.md` mention add the naming block
//! 3. Commit keywords add the commit block and end agent matching
//! 4. Keyword table (exact pass, then fuzzy pass), then the regex triggers

use crate::config::{self, HooksConfig, KeywordEntry};
use crate::error::Result;
use crate::input::HookInput;
use crate::output::HookOutput;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use tracing::debug;

// ============================================================================
// Rule blocks
// ============================================================================

pub const COMMIT_RULES: &str = "Commit rules:
- NEVER git add -A
- NEVER git commit --amend
- NEVER add Co-Authored-By
- Pre-commit reformats on first run - ALWAYS retry commit (2 attempts)
- Format: \"[section] Message\"
Invoke /commit agent.";

pub const DOCS_NAMING: &str = "Docs naming:
- Root docs are UPPERCASE.md (README.md, CHANGELOG.md, CONTRIBUTING.md)
- Files under docs/ are lowercase-kebab-case.md
- One topic per file; link instead of duplicating
- Update the existing doc before creating a new one";

/// Words shorter than this are never looked up
const MIN_WORD_LEN: usize = 3;

/// Words and keys shorter than this never fuzzy-match
const MIN_FUZZY_LEN: usize = 4;

lazy_static! {
    static ref RE_WORD: Regex = Regex::new(r"[a-z0-9_]+").unwrap();
}

// ============================================================================
// Fuzzy matching
// ============================================================================

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Tolerated distance for a key: 1 for short keys, 2 otherwise.
fn max_distance(key_len: usize) -> usize {
    if key_len <= 5 {
        1
    } else {
        2
    }
}

/// Lowercased ASCII word tokens of at least `MIN_WORD_LEN` chars.
fn words(prompt: &str) -> Vec<String> {
    RE_WORD
        .find_iter(&prompt.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .collect()
}

// ============================================================================
// Classifier
// ============================================================================

/// How an agent suggestion was reached
#[derive(Debug, Clone, PartialEq)]
pub enum MatchKind {
    Exact { word: String },
    Fuzzy { word: String, key: String, distance: usize },
    Trigger { pattern: String },
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact { word } => write!(f, "keyword '{}'", word),
            MatchKind::Fuzzy {
                word,
                key,
                distance,
            } => write!(f, "'{}' ~ '{}' (distance {})", word, key, distance),
            MatchKind::Trigger { pattern } => write!(f, "trigger /{}/", pattern),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentMatch {
    pub agent: String,
    pub kind: MatchKind,
}

#[derive(Debug)]
pub struct Classifier {
    meta: Vec<Regex>,
    commit: Regex,
    docs: Regex,
    keywords: Vec<KeywordEntry>,
    triggers: Vec<(Regex, String)>,
}

impl Classifier {
    pub fn from_config(config: &HooksConfig) -> Result<Self> {
        let meta = config
            .meta_patterns
            .iter()
            .map(|p| config::compile(p))
            .collect::<Result<Vec<_>>>()?;

        let triggers = config
            .agent_triggers
            .iter()
            .map(|t| -> Result<(Regex, String)> {
                Ok((config::compile(&t.pattern)?, t.agent.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let keywords = config
            .keywords
            .iter()
            .map(|k| KeywordEntry {
                keyword: k.keyword.to_lowercase(),
                ..k.clone()
            })
            .collect();

        Ok(Self {
            meta,
            commit: config::compile(&config.commit_pattern)?,
            docs: config::compile(&config.docs_pattern)?,
            keywords,
            triggers,
        })
    }

    pub fn is_meta(&self, prompt: &str) -> bool {
        self.meta.iter().any(|re| re.is_match(prompt))
    }

    fn exact(&self, word: &str) -> Option<&KeywordEntry> {
        self.keywords.iter().find(|k| k.keyword == word)
    }

    fn fuzzy(&self, word: &str) -> Option<(&KeywordEntry, usize)> {
        if word.chars().count() < MIN_FUZZY_LEN {
            return None;
        }
        self.keywords.iter().filter(|k| k.fuzzy).find_map(|k| {
            let key_len = k.keyword.chars().count();
            if key_len < MIN_FUZZY_LEN {
                return None;
            }
            let distance = edit_distance(word, &k.keyword);
            (distance <= max_distance(key_len)).then_some((k, distance))
        })
    }

    /// Pick one agent. An exact keyword anywhere in the prompt beats any
    /// fuzzy match; within a pass the earliest word wins. The regex triggers
    /// are only consulted when the keyword table has nothing.
    pub fn suggest_agent(&self, prompt: &str) -> Option<AgentMatch> {
        let words = words(prompt);

        for word in &words {
            if let Some(entry) = self.exact(word) {
                return Some(AgentMatch {
                    agent: entry.agent.clone(),
                    kind: MatchKind::Exact { word: word.clone() },
                });
            }
        }

        for word in &words {
            if let Some((entry, distance)) = self.fuzzy(word) {
                return Some(AgentMatch {
                    agent: entry.agent.clone(),
                    kind: MatchKind::Fuzzy {
                        word: word.clone(),
                        key: entry.keyword.clone(),
                        distance,
                    },
                });
            }
        }

        self.triggers
            .iter()
            .find(|(re, _)| re.is_match(prompt))
            .map(|(re, agent)| AgentMatch {
                agent: agent.clone(),
                kind: MatchKind::Trigger {
                    pattern: re.as_str().to_string(),
                },
            })
    }

    /// Advisory blocks for a prompt, in emission order.
    pub fn classify(&self, prompt: &str) -> Vec<String> {
        let mut blocks = Vec::new();

        if self.is_meta(prompt) {
            debug!("Meta prompt, staying quiet");
            return blocks;
        }

        if self.docs.is_match(prompt) {
            blocks.push(DOCS_NAMING.to_string());
        }

        if self.commit.is_match(prompt) {
            blocks.push(COMMIT_RULES.to_string());
            return blocks;
        }

        if let Some(m) = self.suggest_agent(prompt) {
            debug!("Agent {} via {}", m.agent, m.kind);
            blocks.push(format!("Invoke {} agent.", m.agent));
        }

        blocks
    }

    pub fn run(&self, input: &HookInput) -> Option<HookOutput> {
        let blocks = self.classify(input.prompt());
        if blocks.is_empty() {
            return None;
        }
        Some(HookOutput::message(blocks.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::from_config(&HooksConfig::default()).unwrap()
    }

    fn agent(prompt: &str) -> Option<String> {
        classifier().suggest_agent(prompt).map(|m| m.agent)
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("visual", "visual"), 0);
        assert_eq!(edit_distance("stylng", "styling"), 1);
    }

    #[test]
    fn test_fix_styling_prefers_visual() {
        assert_eq!(agent("fix styling").as_deref(), Some("/visual"));
        assert_eq!(agent("fix ui").as_deref(), Some("/visual"));
    }

    #[test]
    fn test_generic_agents() {
        assert_eq!(agent("improve code").as_deref(), Some("/improve"));
        assert_eq!(agent("refactor this").as_deref(), Some("/improve"));
        assert_eq!(agent("write docs").as_deref(), Some("/readme"));
        assert_eq!(agent("ship it").as_deref(), Some("/refine"));
        assert_eq!(agent("hello there"), None);
    }

    #[test]
    fn test_fuzzy_match() {
        let m = classifier().suggest_agent("the layuot is off").unwrap();
        assert_eq!(m.agent, "/visual");
        assert!(matches!(m.kind, MatchKind::Fuzzy { distance: 2, .. }));

        assert_eq!(agent("finalise the release").as_deref(), Some("/refine"));
    }

    #[test]
    fn test_everyday_words_do_not_fuzzy_match() {
        assert_eq!(agent("fix the string parsing").as_deref(), Some("/improve"));
        assert_eq!(agent("is it ready yet"), None);
        assert_eq!(agent("as usual"), None);
        assert_eq!(agent("doesn't matter"), None);
        assert_eq!(agent("lean build"), None);
        assert_eq!(agent("check the virtual response"), None);

        // exact-only keys still match exactly
        assert_eq!(agent("learn from this").as_deref(), Some("/learn"));
        assert_eq!(agent("update the readme").as_deref(), Some("/readme"));
    }

    #[test]
    fn test_words_are_ascii_tokens() {
        assert_eq!(words("Naïve LAYOUT, re_do"), vec!["layout", "re_do"]);
    }

    #[test]
    fn test_match_kind_display() {
        let m = classifier().suggest_agent("the layuot is off").unwrap();
        assert_eq!(m.kind.to_string(), "'layuot' ~ 'layout' (distance 2)");
    }

    #[test]
    fn test_exact_anywhere_beats_earlier_fuzzy() {
        // "layuot" fuzzy-matches first, but "readme" is exact
        let m = classifier().suggest_agent("layuot and readme").unwrap();
        assert_eq!(m.agent, "/readme");
        assert!(matches!(m.kind, MatchKind::Exact { .. }));
    }

    #[test]
    fn test_earlier_word_wins() {
        assert_eq!(agent("readme layout").as_deref(), Some("/readme"));
        assert_eq!(agent("layout readme").as_deref(), Some("/visual"));
    }

    #[test]
    fn test_commit_precedence() {
        let blocks = classifier().classify("commit and improve the code");
        assert_eq!(blocks, vec![COMMIT_RULES.to_string()]);
    }

    #[test]
    fn test_docs_naming_block() {
        let blocks = classifier().classify("write docs");
        assert_eq!(blocks[0], DOCS_NAMING);
        assert_eq!(blocks[1], "Invoke /readme agent.");

        let blocks = classifier().classify("move NOTES.md");
        assert_eq!(blocks, vec![DOCS_NAMING.to_string()]);
    }

    #[test]
    fn test_meta_prompts_are_silent() {
        let c = classifier();
        assert!(c.classify("why did the hook fire").is_empty());
        assert!(c.classify("debug the nudge settings").is_empty());
        assert!(c.classify("please invoke the readme agent").is_empty());
        assert!(c.classify("commit the hook changes").is_empty());
    }

    #[test]
    fn test_short_words_ignored_by_keyword_table() {
        // "css" is three letters: exact only, never fuzzy
        assert_eq!(agent("tweak css").as_deref(), Some("/visual"));
        assert_eq!(classifier().fuzzy("cs"), None);
    }

    #[test]
    fn test_run_output() {
        let c = classifier();
        let input = HookInput::parse(r#"{"prompt": "commit changes"}"#).unwrap();
        assert_eq!(c.run(&input), Some(HookOutput::message(COMMIT_RULES)));

        let empty = HookInput::parse(r#"{"prompt": null}"#).unwrap();
        assert_eq!(c.run(&empty), None);
    }
}
