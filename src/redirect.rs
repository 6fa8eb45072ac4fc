//! PreToolUse redirect: swap ad-hoc test/build/lint invocations for the
//! project's canonical command.

use crate::config::{self, HooksConfig};
use crate::error::Result;
use crate::input::HookInput;
use crate::output::HookOutput;
use crate::toolchain::{self, Intent};
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Prefix that opts a command out of redirection
const ESCAPE_PREFIX: char = '!';

#[derive(Debug)]
pub struct Redirector {
    detectors: Vec<(Regex, Intent)>,
}

impl Redirector {
    pub fn from_config(config: &HooksConfig) -> Result<Self> {
        let detectors = config
            .detectors
            .iter()
            .map(|d| -> Result<(Regex, Intent)> {
                Ok((config::compile(&d.pattern)?, d.intent))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { detectors })
    }

    /// Intent of the first detector matching `command`.
    pub fn detect(&self, command: &str) -> Option<Intent> {
        self.detectors
            .iter()
            .find(|(re, _)| re.is_match(command))
            .map(|(_, intent)| *intent)
    }

    /// Canonical replacement for `command` run in `dir`, if it differs.
    pub fn redirect(&self, command: &str, dir: &Path) -> Option<(String, Intent)> {
        if command.starts_with(ESCAPE_PREFIX) {
            debug!("Escape hatch, leaving command alone");
            return None;
        }

        let intent = self.detect(command)?;
        let canonical = toolchain::resolve(dir, intent)?;
        if canonical == command {
            debug!("Already canonical: {}", command);
            return None;
        }
        Some((canonical, intent))
    }

    pub fn run(&self, input: &HookInput) -> Option<HookOutput> {
        if input.tool_name.as_deref() != Some("Bash") {
            return None;
        }
        let command = input.command()?;
        let dir = toolchain::project_dir(input.cwd());

        let (canonical, intent) = self.redirect(command, &dir)?;
        info!("Redirecting {:?} -> {:?} ({})", command, canonical, intent);
        Some(HookOutput::rewrite(canonical, format!("Redirected: {}", intent)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn redirector() -> Redirector {
        Redirector::from_config(&HooksConfig::default()).unwrap()
    }

    fn bash(command: &str, cwd: &Path) -> HookInput {
        HookInput::parse(
            &serde_json::json!({
                "tool_name": "Bash",
                "tool_input": {"command": command},
                "cwd": cwd.to_str().unwrap(),
            })
            .to_string(),
        )
        .unwrap()
    }

    fn make_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Makefile"), "test:\n\tgo test ./...\n").unwrap();
        dir
    }

    #[test]
    fn test_detector_order() {
        let r = redirector();
        assert_eq!(r.detect("npm test"), Some(Intent::Test));
        assert_eq!(r.detect("pnpm run build"), Some(Intent::Build));
        assert_eq!(r.detect("cargo clippy --all"), Some(Intent::Lint));
        assert_eq!(r.detect("npx playwright test"), Some(Intent::E2e));
        assert_eq!(r.detect("./scripts/smoke.sh"), Some(Intent::Smoke));
        // Anchored test pattern wins over the later e2e pattern
        assert_eq!(r.detect("npm test -- e2e"), Some(Intent::Test));
        assert_eq!(r.detect("ls -la"), None);
    }

    #[test]
    fn test_npm_test_redirects_to_make() {
        let dir = make_project();
        let out = redirector().run(&bash("npm test", dir.path())).unwrap();
        assert_eq!(out, HookOutput::rewrite("make test", "Redirected: test"));
    }

    #[test]
    fn test_escape_hatch() {
        let dir = make_project();
        assert!(redirector().run(&bash("!npm test", dir.path())).is_none());
    }

    #[test]
    fn test_already_canonical_is_left_alone() {
        let dir = make_project();
        assert!(redirector().run(&bash("make test", dir.path())).is_none());
    }

    #[test]
    fn test_no_command_for_intent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        assert!(redirector().run(&bash("./run smoke", dir.path())).is_none());
    }

    #[test]
    fn test_non_bash_tool_ignored() {
        let dir = make_project();
        let mut input = bash("npm test", dir.path());
        input.tool_name = Some("Write".to_string());
        assert!(redirector().run(&input).is_none());
    }

    #[test]
    fn test_python_project_rewrites_cargo_test() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "").unwrap();
        let (cmd, intent) = redirector().redirect("cargo test", dir.path()).unwrap();
        assert_eq!(intent, Intent::Test);
        assert_eq!(cmd, "python -m pytest");
    }
}
