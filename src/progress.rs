//! Persist progress to disk (XDG config or ~/.config/matchtui): best score, unlocked
//! levels, stars per level and the level in play.

use anyhow::Result;
use matchtui::SavedLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const FILENAME: &str = "progress.json";

/// Returns the path to the progress file (config dir / matchtui / progress.json).
pub fn config_path() -> PathBuf {
    let home_config = || {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home_config(),
    };
    base.join("matchtui").join(FILENAME)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub best_score: u32,
    /// Number of levels the player may pick; always at least one.
    pub unlocked: usize,
    /// Best star rating per level index, 0 for never won.
    pub stars: Vec<u8>,
    /// Level left mid-play.
    pub saved: Option<SavedLevel>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            best_score: 0,
            unlocked: 1,
            stars: Vec::new(),
            saved: None,
        }
    }
}

impl Progress {
    /// Load progress, falling back to a fresh profile on any error.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(p) => p,
            Err(e) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable progress file");
                }
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut progress: Self = serde_json::from_str(&s)?;
        progress.unlocked = progress.unlocked.max(1);
        Ok(progress)
    }

    /// Save progress. Creates the config directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn stars_for(&self, level: usize) -> u8 {
        self.stars.get(level).copied().unwrap_or(0)
    }

    pub fn is_unlocked(&self, level: usize) -> bool {
        level < self.unlocked
    }

    /// Keep the best stars for `level` and unlock the one after it, up to `level_count`.
    pub fn record_win(&mut self, level: usize, stars: u8, level_count: usize) {
        if self.stars.len() <= level {
            self.stars.resize(level + 1, 0);
        }
        self.stars[level] = self.stars[level].max(stars);
        self.unlocked = self.unlocked.max((level + 2).min(level_count));
    }

    pub fn record_score(&mut self, score: u32) {
        self.best_score = self.best_score.max(score);
    }
}
