//! TOML configuration for the search and the auto-play driver.
//!
//! Every field is optional; missing ones take the tuned defaults.
//!
//! ```toml
//! [search]
//! heuristic_weight = 0.005
//! mirrored_damping = 0.9
//! depth_cap = 6
//!
//! [search.depth]
//! crowded_free_cells = 3
//! crowded_depth = 5
//!
//! [play]
//! delay_ms = 10
//! games = 8
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::expectimax::SearchConfig;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub play: PlayConfig,
}

/// Settings for the continuous-play loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Minimum pause between two moves.
    pub delay_ms: u64,
    /// Number of independent games to play.
    pub games: usize,
    /// Seed for the first game; game `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Stop a game after this many moves.
    pub max_moves: Option<u64>,
    /// Search at this depth instead of the adaptive schedule.
    pub fixed_depth: Option<u32>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self { delay_ms: 10, games: 1, seed: None, max_moves: None, fixed_depth: None }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.search;
        if !s.heuristic_weight.is_finite() || s.heuristic_weight < 0.0 {
            return Err(ConfigError::Invalid(format!("heuristic_weight must be >= 0, got {}", s.heuristic_weight)));
        }
        if !s.mirrored_damping.is_finite() || s.mirrored_damping < 0.0 {
            return Err(ConfigError::Invalid(format!("mirrored_damping must be >= 0, got {}", s.mirrored_damping)));
        }
        if s.depth.crowded_free_cells > s.depth.busy_free_cells {
            return Err(ConfigError::Invalid("crowded_free_cells must not exceed busy_free_cells".into()));
        }
        if self.play.games == 0 {
            return Err(ConfigError::Invalid("games must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.search.heuristic_weight, 0.005);
        assert_eq!(cfg.search.mirrored_damping, 0.9);
        assert_eq!(cfg.play.delay_ms, 10);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [search]
            depth_cap = 4

            [search.depth]
            open_depth = 2

            [play]
            games = 3
            seed = 99
            "#,
        )
        .unwrap();
        assert_eq!(cfg.search.depth_cap, Some(4));
        assert_eq!(cfg.search.depth.open_depth, 2);
        assert_eq!(cfg.search.depth.crowded_depth, 5);
        assert_eq!(cfg.search.mirrored_damping, 0.9);
        assert_eq!(cfg.play.games, 3);
        assert_eq!(cfg.play.seed, Some(99));
        assert_eq!(cfg.play.delay_ms, 10);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(Config::from_toml_str("[play]\ngames = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            Config::from_toml_str("[search]\nheuristic_weight = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(Config::from_toml_str("[search]\nheuristic_weight = \"x\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reads_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "[play]\ndelay_ms = 0\nfixed_depth = 2").unwrap();
        let cfg = Config::from_toml(tmp.path()).unwrap();
        assert_eq!(cfg.play.delay_ms, 0);
        assert_eq!(cfg.play.fixed_depth, Some(2));

        let missing = Config::from_toml(tmp.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn serializes_back_to_toml() {
        let cfg = Config::default();
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), cfg);
    }
}
