//! Levels: descriptors, the built-in pack, run-time objective state and star rating.

use crate::error::{ConfigError, LevelLoadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Points per cleared cell.
pub const POINTS_PER_CELL: u32 = 10;
/// Points per matched group beyond the first in one cascade step.
pub const POINTS_PER_EXTRA_GROUP: u32 = 20;

/// Score for one cascade step.
pub fn step_score(cleared: usize, groups: usize) -> u32 {
    let cleared = u32::try_from(cleared).unwrap_or(u32::MAX);
    let extra = u32::try_from(groups.saturating_sub(1)).unwrap_or(u32::MAX);
    cleared
        .saturating_mul(POINTS_PER_CELL)
        .saturating_add(extra.saturating_mul(POINTS_PER_EXTRA_GROUP))
}

/// Stars for a win with `moves_left` of `budget` moves unused: 3 at 40% or more,
/// 2 at 20% or more, otherwise 1.
pub fn star_rating(moves_left: u32, budget: u32) -> u8 {
    if budget == 0 {
        return 1;
    }
    let (left, budget) = (u64::from(moves_left) * 5, u64::from(budget));
    if left >= budget * 2 {
        3
    } else if left >= budget {
        2
    } else {
        1
    }
}

const fn default_ice_strength() -> u8 {
    1
}

/// Immutable description of one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    pub move_budget: u32,
    pub target_score: u32,
    /// Tile type -> number of tiles of that type to clear.
    #[serde(default)]
    pub collectibles: BTreeMap<u8, u32>,
    #[serde(default)]
    pub ice_cell_count: u32,
    #[serde(default = "default_ice_strength")]
    pub ice_strength: u8,
}

impl LevelDescriptor {
    /// Check the descriptor against the board it will be played on.
    pub fn validate(&self, level: usize, kinds: u8, cells: usize) -> Result<(), ConfigError> {
        if self.move_budget == 0 {
            return Err(ConfigError::ZeroMoveBudget { level });
        }
        if let Some(&kind) = self.collectibles.keys().find(|&&k| k >= kinds) {
            return Err(ConfigError::CollectibleOutOfRange { level, kind, kinds });
        }
        if self.ice_cell_count as usize > cells {
            return Err(ConfigError::TooMuchIce {
                level,
                count: self.ice_cell_count,
                cells,
            });
        }
        if self.ice_cell_count > 0 && self.ice_strength == 0 {
            return Err(ConfigError::ZeroIceStrength { level });
        }
        Ok(())
    }
}

/// Ordered list of levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelPack {
    levels: Vec<LevelDescriptor>,
}

impl LevelPack {
    pub fn new(levels: Vec<LevelDescriptor>) -> Self {
        Self { levels }
    }

    /// The three levels the game ships with.
    pub fn builtin() -> Self {
        fn level(
            move_budget: u32,
            target_score: u32,
            collect: &[(u8, u32)],
            ice_cell_count: u32,
        ) -> LevelDescriptor {
            LevelDescriptor {
                move_budget,
                target_score,
                collectibles: collect.iter().copied().collect(),
                ice_cell_count,
                ice_strength: 1,
            }
        }
        Self::new(vec![
            level(20, 800, &[(0, 12), (3, 10)], 8),
            level(22, 1200, &[(2, 14), (5, 12)], 12),
            level(25, 1800, &[(1, 18), (4, 14)], 16),
        ])
    }

    /// Parse a JSON array of level descriptors.
    pub fn from_json(s: &str) -> Result<Self, LevelLoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read a JSON level pack from disk.
    pub fn load(path: &Path) -> Result<Self, LevelLoadError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    /// Check every level against the board it will be played on.
    pub fn validate(&self, kinds: u8, cells: usize) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyLevelPack);
        }
        self.levels
            .iter()
            .enumerate()
            .try_for_each(|(i, level)| level.validate(i, kinds, cells))
    }

    pub fn get(&self, index: usize) -> Result<&LevelDescriptor, ConfigError> {
        self.levels.get(index).ok_or(ConfigError::NoSuchLevel {
            index,
            len: self.levels.len(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Something a level still needs before it counts as won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    Score { missing: u32 },
    Collect { kind: u8, remaining: u32 },
    Ice { remaining: u32 },
}

/// Run-time state of the level being played. All counters are unsigned and floored
/// at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub index: usize,
    pub score: u32,
    pub target_score: u32,
    pub move_budget: u32,
    pub moves_left: u32,
    pub collect: BTreeMap<u8, u32>,
    pub ice_left: u32,
}

impl LevelState {
    pub fn new(index: usize, descriptor: &LevelDescriptor) -> Self {
        Self {
            index,
            score: 0,
            target_score: descriptor.target_score,
            move_budget: descriptor.move_budget,
            moves_left: descriptor.move_budget,
            collect: descriptor.collectibles.clone(),
            ice_left: descriptor.ice_cell_count,
        }
    }

    /// Score reached, no ice left and every collectible count at zero.
    pub fn is_objective_complete(&self) -> bool {
        self.score >= self.target_score
            && self.ice_left == 0
            && self.collect.values().all(|&n| n == 0)
    }

    pub fn is_out_of_moves(&self) -> bool {
        self.moves_left == 0
    }

    pub fn spend_move(&mut self) {
        self.moves_left = self.moves_left.saturating_sub(1);
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Count one cleared tile of `kind` toward its collectible objective, if any.
    pub fn collect_tile(&mut self, kind: u8) {
        if let Some(remaining) = self.collect.get_mut(&kind) {
            *remaining = remaining.saturating_sub(1);
        }
    }

    /// A cell's last ice layer broke.
    pub fn melt_ice(&mut self) {
        self.ice_left = self.ice_left.saturating_sub(1);
    }

    pub fn stars(&self) -> u8 {
        star_rating(self.moves_left, self.move_budget)
    }

    /// What is still missing, in display order: score, collectibles, ice.
    pub fn shortfalls(&self) -> Vec<Shortfall> {
        let mut out = Vec::new();
        if self.score < self.target_score {
            out.push(Shortfall::Score {
                missing: self.target_score - self.score,
            });
        }
        out.extend(
            self.collect
                .iter()
                .filter(|&(_, &n)| n > 0)
                .map(|(&kind, &remaining)| Shortfall::Collect { kind, remaining }),
        );
        if self.ice_left > 0 {
            out.push(Shortfall::Ice {
                remaining: self.ice_left,
            });
        }
        out
    }
}
