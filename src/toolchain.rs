//! Toolchain resolution: which build system governs a directory, and what
//! its canonical command is for a given intent.
//!
//! Priority, first applicable wins:
//! 1. `Makefile` defining the intent as a target
//! 2. `Cargo.toml`
//! 3. `go.mod`
//! 4. Node (`pnpm-lock.yaml` > `yarn.lock` > `package-lock.json` > `package.json`)
//! 5. `pyproject.toml` (`uv run` with `uv.lock`, else `python -m`)
//!
//! Only the Makefile tier falls through when it lacks the intent. A later
//! tier that applies but has no command for the intent resolves to nothing.

use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Intent
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Test,
    Build,
    E2e,
    Smoke,
    Lint,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Test,
        Intent::Build,
        Intent::E2e,
        Intent::Smoke,
        Intent::Lint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Test => "test",
            Intent::Build => "build",
            Intent::E2e => "e2e",
            Intent::Smoke => "smoke",
            Intent::Lint => "lint",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Toolchains
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Pnpm,
    Yarn,
    Npm,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
        }
    }

    /// Lockfiles in priority order; a bare `package.json` means pnpm.
    fn detect(dir: &Path) -> Option<Self> {
        const LOCKFILES: [(&str, PackageManager); 3] = [
            ("pnpm-lock.yaml", PackageManager::Pnpm),
            ("yarn.lock", PackageManager::Yarn),
            ("package-lock.json", PackageManager::Npm),
        ];

        LOCKFILES
            .iter()
            .find(|(file, _)| dir.join(file).exists())
            .map(|(_, pm)| *pm)
            .or_else(|| dir.join("package.json").exists().then_some(PackageManager::Pnpm))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    Make,
    Cargo,
    Go,
    Node(PackageManager),
    /// `uv` is true when a `uv.lock` sits next to `pyproject.toml`
    Python { uv: bool },
}

impl Toolchain {
    pub fn name(&self) -> String {
        match self {
            Toolchain::Make => "make".to_string(),
            Toolchain::Cargo => "cargo".to_string(),
            Toolchain::Go => "go".to_string(),
            Toolchain::Node(pm) => format!("node ({})", pm.as_str()),
            Toolchain::Python { uv: true } => "python (uv)".to_string(),
            Toolchain::Python { uv: false } => "python".to_string(),
        }
    }

    /// Canonical command for an intent, if this toolchain defines one.
    pub fn command(&self, intent: Intent) -> Option<String> {
        let cmd = match self {
            Toolchain::Make => format!("make {}", intent),
            Toolchain::Cargo => match intent {
                Intent::Test => "cargo test".to_string(),
                Intent::Build => "cargo build".to_string(),
                Intent::E2e => "cargo test --test '*'".to_string(),
                Intent::Lint => "cargo clippy".to_string(),
                Intent::Smoke => return None,
            },
            Toolchain::Go => match intent {
                Intent::Test => "go test ./...".to_string(),
                Intent::Build => "go build ./...".to_string(),
                Intent::E2e => "go test -tags=e2e ./...".to_string(),
                Intent::Lint => "go vet ./...".to_string(),
                Intent::Smoke => return None,
            },
            Toolchain::Node(pm) => {
                let pm = pm.as_str();
                match intent {
                    Intent::Test => format!("{} test", pm),
                    other => format!("{} run {}", pm, other),
                }
            }
            Toolchain::Python { uv } => {
                let runner = if *uv { "uv run" } else { "python -m" };
                match intent {
                    Intent::Test => format!("{} pytest", runner),
                    Intent::E2e => format!("{} pytest tests/", runner),
                    Intent::Smoke => format!("{} pytest --smoke", runner),
                    Intent::Lint => format!("{} ruff check .", runner),
                    Intent::Build => return None,
                }
            }
        };
        Some(cmd)
    }
}

/// Every toolchain whose marker file is present, in priority order.
pub fn detect(dir: &Path) -> Vec<Toolchain> {
    let mut found = Vec::new();
    if dir.join("Makefile").exists() {
        found.push(Toolchain::Make);
    }
    if dir.join("Cargo.toml").exists() {
        found.push(Toolchain::Cargo);
    }
    if dir.join("go.mod").exists() {
        found.push(Toolchain::Go);
    }
    if let Some(pm) = PackageManager::detect(dir) {
        found.push(Toolchain::Node(pm));
    }
    if dir.join("pyproject.toml").exists() {
        found.push(Toolchain::Python {
            uv: dir.join("uv.lock").exists(),
        });
    }
    found
}

/// Whether the Makefile in `dir` defines `target`: either `target:` appears,
/// or a `.PHONY:` declaration and the bare name both appear.
fn makefile_defines(dir: &Path, target: &str) -> bool {
    let content = match fs::read_to_string(dir.join("Makefile")) {
        Ok(c) => c,
        Err(e) => {
            debug!("Makefile unreadable in {:?}: {}", dir, e);
            return false;
        }
    };
    content.contains(&format!("{}:", target))
        || (content.contains(".PHONY:") && content.contains(target))
}

/// Canonical command for `intent` in `dir`, or `None` if undeterminable.
pub fn resolve(dir: &Path, intent: Intent) -> Option<String> {
    for toolchain in detect(dir) {
        if toolchain == Toolchain::Make {
            if makefile_defines(dir, intent.as_str()) {
                return toolchain.command(intent);
            }
            debug!("Makefile has no {} target, falling through", intent);
            continue;
        }
        return toolchain.command(intent);
    }
    None
}

/// Turn the hook's `cwd` field into a directory: empty means the process
/// cwd, a leading `~` is the home directory.
pub fn project_dir(cwd: Option<&str>) -> PathBuf {
    let cwd = match cwd {
        Some(c) => c,
        None => return std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    if cwd == "~" || cwd.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(cwd.trim_start_matches('~').trim_start_matches('/'));
        }
    }
    PathBuf::from(cwd)
}
