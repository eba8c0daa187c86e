use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub brain: BrainConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrainConfig {
    /// Brain root directory; a leading `~` expands to the home directory.
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_max_results() -> usize {
    50
}
fn default_debounce_ms() -> u64 {
    300
}

impl Config {
    /// Fallback used when no config file is present: `~/brains` with
    /// default search settings.
    pub fn minimal() -> Self {
        Config {
            brain: BrainConfig {
                root: PathBuf::from("~/brains"),
            },
            search: SearchConfig::default(),
        }
    }

    /// The brain root with `~` expanded.
    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.brain.root)
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.brain.root.as_os_str().is_empty() {
        anyhow::bail!("brain.root must not be empty");
    }
    if config.search.max_results == 0 {
        anyhow::bail!("search.max_results must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_fill_missing_search_section() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bmap.toml");
        fs::write(&path, "[brain]\nroot = \"/data/brains\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.brain.root, PathBuf::from("/data/brains"));
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bmap.toml");
        fs::write(
            &path,
            "[brain]\nroot = \"/data/brains\"\n[search]\nmax_results = 0\n",
        )
        .unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let expanded = expand_tilde(Path::new("~/brains"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("brains"));
        }
        // Paths without a leading ~ pass through untouched.
        assert_eq!(
            expand_tilde(Path::new("/absolute/brains")),
            PathBuf::from("/absolute/brains")
        );
    }
}
