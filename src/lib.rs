//! Cavern Strike - simulation core for a 2D scrolling maze shooter
//!
//! Core modules:
//! - `sim`: Deterministic per-room simulation (entities, collisions, frame pipeline)
//! - `audio`: Cue identifiers and the injected playback collaborator
//! - `player`: Score/shield state carried across rooms
//! - `settings`: Persisted sound/music preferences

pub mod audio;
pub mod player;
pub mod settings;
pub mod sim;

pub use player::PlayerStats;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Visible playfield width in pixels
    pub const SCREEN_WIDTH: i32 = 320;
    /// Visible playfield height in pixels
    pub const SCREEN_HEIGHT: i32 = 224;
    /// Side of one level block in pixels
    pub const BLOCK_SIZE: i32 = 32;
    /// Block columns per room
    pub const GRID_COLS: usize = 10;
    /// Block rows per room; the block grid starts one block below the screen
    /// top, leaving a HUD band above it
    pub const GRID_ROWS: usize = 6;
    /// Non-player entities may not move above this line
    pub const CEILING_Y: i32 = 32;
    /// Number of block types addressable by the 5-bit layout encoding
    pub const BLOCK_TYPES: usize = 32;
    /// Index of the non-solid background block
    pub const BACKGROUND_BLOCK: u8 = (BLOCK_TYPES - 1) as u8;
    /// Hard cap on active entities in one room
    pub const MAX_ENTITIES_PER_ROOM: usize = 64;
    /// Fixed record count of the entity placement stream
    pub const PLACED_ENTITIES_PER_ROOM: usize = 16;
    /// Explosions tile an exploding entity's bounding box in cells this big
    pub const EXPLOSION_CELL: i32 = 16;
    /// Debris entities per burst
    pub const DEBRIS_PER_BURST: usize = 8;
}

/// Pixel origin of a block cell; row 0 sits one block below the screen top
#[inline]
pub fn cell_origin(row: usize, col: usize) -> Vec2 {
    Vec2::new(
        (consts::BLOCK_SIZE * col as i32) as f32,
        (consts::BLOCK_SIZE * (row as i32 + 1)) as f32,
    )
}
