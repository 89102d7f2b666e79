//! Cross-room player state
//!
//! The maze layer owns one of these for the whole session and lends it to
//! whichever room currently hosts the player.

use serde::{Deserialize, Serialize};

/// Shield value a fresh ship starts with
pub const STARTING_SHIELD: i32 = 99;

/// Score and shield state shared by every room the player visits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    pub score: u64,
    /// Shield counter; below zero the ship is dying/respawning and
    /// contacts no longer register
    pub shield: i32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            score: 0,
            shield: STARTING_SHIELD,
        }
    }
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit destruction or pickup points
    pub fn add_score(&mut self, points: u32) {
        self.score += u64::from(points);
    }

    pub fn drain_shield(&mut self, amount: i32) {
        self.shield -= amount;
    }

    /// A non-negative shield counter means contacts still register
    pub fn vulnerable(&self) -> bool {
        self.shield >= 0
    }
}
