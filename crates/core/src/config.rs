use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub editor: EditorConfig,
    pub validation: ValidationConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SCENARIO_PROFILE`. When set (e.g. `STAGING`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SCENARIO_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            editor: EditorConfig::from_env_profiled(p),
            validation: ValidationConfig::from_env_profiled(p),
        }
    }

    /// Reject settings the editor cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.editor.accessor_link_depth == 0 {
            return Err(ScenarioError::Config(
                "ACCESSOR_LINK_DEPTH must be at least 1".to_string(),
            ));
        }
        if self.validation.timeout_ms == 0 {
            return Err(ScenarioError::Config(
                "VALIDATION_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  editor:      documents_dir={}, data_model={}",
            self.editor.documents_dir.display(),
            self.editor.data_model_path.display()
        );
        tracing::info!("  editor:      accessor_depth={}", self.editor.accessor_link_depth);
        tracing::info!("  validation:  timeout_ms={}", self.validation.timeout_ms);
    }
}

// ── Editor ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Directory holding scenario documents.
    pub documents_dir: PathBuf,
    /// Data model document describing tables, links and custom lists.
    pub data_model_path: PathBuf,
    /// Maximum link-path length when enumerating database accessors.
    pub accessor_link_depth: usize,
}

impl EditorConfig {
    fn from_env_profiled(p: &str) -> Self {
        let documents_dir = PathBuf::from(profiled_env_or(p, "SCENARIO_DIR", "data/scenarios"));
        let data_model_path = PathBuf::from(profiled_env_or(
            p,
            "DATA_MODEL_PATH",
            documents_dir.join("data-model.yml").to_str().unwrap_or("data/scenarios/data-model.yml"),
        ));
        Self {
            documents_dir,
            data_model_path,
            accessor_link_depth: profiled_env_usize(p, "ACCESSOR_LINK_DEPTH", 3),
        }
    }
}

// ── Validation round-trip ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Upper bound on a single validation call before it is reported as failed.
    pub timeout_ms: u64,
}

impl ValidationConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            timeout_ms: profiled_env_u64(p, "VALIDATION_TIMEOUT_MS", 5_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        // Unique keys so parallel tests never collide.
        env::set_var("CFGTEST_LINK_DEPTH", "7");
        assert_eq!(profiled_env_usize("CFGTEST", "LINK_DEPTH", 3), 7);
        assert_eq!(profiled_env_usize("", "CFGTEST_MISSING_KEY", 3), 3);
        env::remove_var("CFGTEST_LINK_DEPTH");
    }

    #[test]
    fn validate_rejects_zero_depth_and_timeout() {
        let mut cfg = Config::for_profile("CFGTEST_VALIDATE");
        cfg.editor.accessor_link_depth = 2;
        cfg.validation.timeout_ms = 100;
        assert!(cfg.validate().is_ok());

        cfg.editor.accessor_link_depth = 0;
        assert!(matches!(cfg.validate(), Err(ScenarioError::Config(_))));

        cfg.editor.accessor_link_depth = 1;
        cfg.validation.timeout_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn profile_label_defaults() {
        let cfg = Config::for_profile("");
        assert_eq!(cfg.profile_label(), "default");
        assert_eq!(Config::for_profile("staging").profile_label(), "STAGING");
    }
}
