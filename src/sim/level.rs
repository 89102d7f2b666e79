//! Level data decoding and the entity factory
//!
//! A room is built from two binary streams extracted from the level data: a
//! run-length encoded block layout and a fixed-count entity placement list.
//! Decoding failures surface as [`LevelError`]; a bad placement inside an
//! otherwise valid stream is skipped, not fatal.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::{Entity, PickupKind};
use super::rect::Rect;
use crate::consts::{BACKGROUND_BLOCK, BLOCK_SIZE, PLACED_ENTITIES_PER_ROOM};

/// Sprite lookup table indexed by placement type code
pub type SpriteTable<'a> = &'a [usize];

/// Sprite index for explosions the simulation spawns on its own
pub const EXPLOSION_SPRITE: usize = 62;
/// Sprite index for debris
pub const DEBRIS_SPRITE: usize = 63;

/// Decode failures for the two level streams
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LevelError {
    #[error("block stream fills only {filled} cells of a {rows}x{cols} grid")]
    GridUnderfill {
        filled: usize,
        rows: usize,
        cols: usize,
    },
    #[error("block stream overflows a {rows}x{cols} grid")]
    GridOverflow { rows: usize, cols: usize },
    #[error("entity stream holds {got} records, expected {want}")]
    ShortEntityStream { got: usize, want: usize },
    #[error("room entity capacity ({max}) exceeded")]
    TooManyEntities { max: usize },
}

/// Decoded block layout of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockGrid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl BlockGrid {
    /// All-background grid
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![BACKGROUND_BLOCK; rows * cols],
        }
    }

    /// Decode a run-length encoded block stream into a rows x cols grid.
    ///
    /// Each byte packs a repeat count in its high 3 bits and a stream block
    /// type in its low 5 bits; a whole zero byte terminates. Stream type
    /// t > 0 maps to block index t - 1, stream type 0 to the background
    /// block. The stream must fill the grid exactly.
    pub fn decode(stream: &[u8], rows: usize, cols: usize) -> Result<Self, LevelError> {
        let mut grid = Self::empty(rows, cols);
        let mut filled = 0;

        for &byte in stream {
            if byte == 0 {
                break;
            }
            let stream_type = byte & 0x1F;
            let block = if stream_type > 0 {
                stream_type - 1
            } else {
                BACKGROUND_BLOCK
            };
            let repeat = (byte & 0xE0) >> 5;

            for _ in 0..repeat {
                if filled >= rows * cols {
                    return Err(LevelError::GridOverflow { rows, cols });
                }
                grid.cells[filled] = block;
                filled += 1;
            }
        }

        if filled != rows * cols {
            return Err(LevelError::GridUnderfill { filled, rows, cols });
        }
        Ok(grid)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }
}

/// Obstacle rectangles contributed by one block, as offsets within its cell
fn block_obstacles(block: u8) -> &'static [(i32, i32, i32, i32)] {
    match block {
        3 => &[(0, 0, 32, 16)],
        4 => &[(8, 0, 32, 16), (8, 16, 16, 32)],
        5 => &[(0, 0, 24, 16), (16, 16, 24, 32)],
        6 => &[(0, 24, 32, 32)],
        13 => &[(0, 0, 32, 8), (0, 24, 32, 32)],
        b if b == BACKGROUND_BLOCK => &[],
        _ => &[(0, 0, 32, 32)],
    }
}

/// Build the static obstacle set for a decoded grid.
///
/// Cell origins sit one block row below the screen top; every rectangle must
/// land inside the visible playfield.
pub fn build_obstacles(grid: &BlockGrid) -> Vec<Rect> {
    let mut obstacles = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            for &(left, top, right, bottom) in block_obstacles(grid.get(row, col)) {
                let rect = Rect::new(
                    BLOCK_SIZE * col as i32 + left,
                    BLOCK_SIZE * (row as i32 + 1) + top,
                    BLOCK_SIZE * col as i32 + right,
                    BLOCK_SIZE * (row as i32 + 1) + bottom,
                );
                debug_assert!(rect.within_playfield(), "obstacle outside playfield");
                obstacles.push(rect);
            }
        }
    }
    obstacles
}

/// Decode the fixed-count placement stream into (position, type code) pairs.
///
/// Records are (y, x, unused, type) bytes. Platform codes sit 16 pixels lower
/// than their recorded position.
pub fn decode_placements(stream: &[u8]) -> Result<Vec<(Vec2, u8)>, LevelError> {
    let want = PLACED_ENTITIES_PER_ROOM;
    let got = stream.len() / 4;
    if got < want {
        return Err(LevelError::ShortEntityStream { got, want });
    }

    let mut placements = Vec::with_capacity(want);
    for record in stream.chunks_exact(4).take(want) {
        let mut y = i32::from(record[0]);
        let x = i32::from(record[1]);
        let code = record[3];
        if code == 2 || code == 3 {
            y -= 16;
        }
        placements.push((Vec2::new(x as f32, y as f32), code));
    }
    Ok(placements)
}

fn score_for(code: u8) -> u32 {
    match code {
        1 => 200,
        4 => 150,
        10 | 11 => 100,
        13..=19 => 150,
        20..=26 => 250,
        27..=30 => 500,
        _ => 0,
    }
}

fn pickup_for(code: u8) -> PickupKind {
    match code {
        31 => PickupKind::Fuel,
        32 => PickupKind::Ammo,
        33 => PickupKind::Bombs,
        34 => PickupKind::Missiles,
        35 => PickupKind::Orbs,
        36 => PickupKind::Shield,
        37 => PickupKind::Random,
        _ => PickupKind::Stars,
    }
}

/// Map a placement type code to an entity, or None for codes that place nothing
pub fn spawn_entity(code: u8, pos: Vec2, sprites: SpriteTable) -> Option<Entity> {
    let sprite = *sprites.get(code as usize)?;

    let entity = match code {
        0 | 5..=8 => return None,
        1 => Entity::sentry(pos, sprite, score_for(code)).with_size(32, 16),
        2 | 3 => Entity::platform(pos, sprite),
        4 => Entity::ball(pos, sprite, score_for(code)),
        9 | 12 => Entity::prop(pos, sprite),
        16 | 17 | 18 | 21 | 22 | 25 | 26 => Entity::drone(pos, sprite, score_for(code)),
        10..=30 => Entity::sentry(pos, sprite, score_for(code)),
        31..=38 => Entity::pickup(pickup_for(code), pos, sprite, 500),
        _ => Entity::prop(pos, sprite),
    };
    Some(entity)
}
