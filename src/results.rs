//! End-of-session grading
//!
//! Handed to whatever persists or displays results; the core never stores it.

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::consts::NO_DAMAGE_BONUS;
use crate::sim::state::Stats;

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Cleared,
    Failed,
}

/// Barrier-economy grade: barriers used relative to the stage target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EconomyRank {
    S,
    A,
    B,
    None,
}

impl EconomyRank {
    pub fn grade(barriers_used: u32, target: u32) -> Self {
        if target == 0 {
            return EconomyRank::None;
        }
        let ratio = barriers_used as f64 / target as f64;
        if ratio <= 0.5 {
            EconomyRank::S
        } else if ratio <= 0.75 {
            EconomyRank::A
        } else if ratio <= 1.0 {
            EconomyRank::B
        } else {
            EconomyRank::None
        }
    }

    pub fn bonus(&self) -> u64 {
        match self {
            EconomyRank::S => 2000,
            EconomyRank::A => 1000,
            EconomyRank::B => 500,
            EconomyRank::None => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EconomyRank::S => "S",
            EconomyRank::A => "A",
            EconomyRank::B => "B",
            EconomyRank::None => "-",
        }
    }
}

/// Completion bonuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonuses {
    pub economy: EconomyRank,
    pub no_damage: bool,
    pub multi_kill_count: u32,
}

impl Bonuses {
    pub fn grade(stats: &Stats, target_barriers: u32) -> Self {
        Self {
            economy: EconomyRank::grade(stats.barriers_used, target_barriers),
            no_damage: stats.damage_taken == 0,
            multi_kill_count: stats.multi_kill_count,
        }
    }

    /// Points credited on a clear (multi-kill points were paid as they happened)
    pub fn total(&self) -> u64 {
        let no_damage = if self.no_damage { NO_DAMAGE_BONUS } else { 0 };
        self.economy.bonus() + no_damage
    }
}

/// Final report for a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub outcome: Outcome,
    pub stage_id: u32,
    pub difficulty: Difficulty,
    /// Final score, including bonuses on a clear
    pub score: u64,
    /// Coin reward (stage reward on clear, nothing on failure)
    pub reward: u64,
    pub waves_reached: usize,
    pub total_waves: usize,
    pub target_barriers: u32,
    pub stats: Stats,
    pub bonuses: Bonuses,
}
