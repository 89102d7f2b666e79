//! Obstacle collision queries and axis-separated movement resolution
//!
//! Movement resolves each axis on its own: the horizontal probe keeps the
//! original y and the vertical probe keeps the original x. When both
//! single-axis probes are free but the combined move is blocked, both axes
//! are flagged so nothing cuts a corner diagonally.

use glam::Vec2;

use super::rect::Rect;
use crate::consts::{CEILING_Y, SCREEN_HEIGHT, SCREEN_WIDTH};

/// True if a width x height box at `pos` overlaps any obstacle
pub fn overlaps_obstacles(obstacles: &[Rect], pos: Vec2, width: i32, height: i32) -> bool {
    let bounds = Rect::from_origin(pos.x as i32, pos.y as i32, width, height);
    obstacles.iter().any(|o| bounds.intersects(o))
}

/// Per-axis collision flags for one movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisHits {
    pub horizontal: bool,
    pub vertical: bool,
}

impl AxisHits {
    #[inline]
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }
}

/// Resolve one movement step from `pos` to `new_pos` against the obstacles.
///
/// Leaving the screen counts as a collision on that axis unless
/// `may_leave_screen` is set (the player crossing into the next room).
pub fn resolve_motion(
    obstacles: &[Rect],
    pos: Vec2,
    new_pos: Vec2,
    width: i32,
    height: i32,
    may_leave_screen: bool,
) -> AxisHits {
    let mut horizontal =
        if (new_pos.x as i32) < 0 || new_pos.x as i32 + width > SCREEN_WIDTH {
            !may_leave_screen
        } else {
            overlaps_obstacles(obstacles, Vec2::new(new_pos.x, pos.y), width, height)
        };

    let mut vertical =
        if (new_pos.y as i32) < CEILING_Y || new_pos.y as i32 + height > SCREEN_HEIGHT {
            !may_leave_screen
        } else {
            overlaps_obstacles(obstacles, Vec2::new(pos.x, new_pos.y), width, height)
        };

    if !horizontal && !vertical && overlaps_obstacles(obstacles, new_pos, width, height) {
        horizontal = true;
        vertical = true;
    }

    AxisHits {
        horizontal,
        vertical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps_obstacles() {
        let obstacles = vec![Rect::new(64, 64, 96, 96)];
        assert!(overlaps_obstacles(&obstacles, Vec2::new(60.0, 60.0), 16, 16));
        assert!(!overlaps_obstacles(&obstacles, Vec2::new(40.0, 40.0), 16, 16));
        // edge contact is not an overlap
        assert!(!overlaps_obstacles(&obstacles, Vec2::new(48.0, 64.0), 16, 16));
    }

    #[test]
    fn test_free_move() {
        let hits = resolve_motion(&[], Vec2::new(100.0, 100.0), Vec2::new(104.0, 102.0), 16, 16, false);
        assert!(!hits.any());
    }

    #[test]
    fn test_single_axis_hits() {
        let obstacles = vec![Rect::new(64, 32, 96, 224)];
        // moving right into a wall; the vertical probe stays clear
        let hits = resolve_motion(
            &obstacles,
            Vec2::new(40.0, 100.0),
            Vec2::new(50.0, 100.0),
            16,
            16,
            false,
        );
        assert!(hits.horizontal);
        assert!(!hits.vertical);
    }

    #[test]
    fn test_diagonal_gap_blocks_both_axes() {
        let obstacles = vec![Rect::new(64, 64, 96, 96)];
        // each single-axis probe is free, only the combined move clips the corner
        let hits = resolve_motion(
            &obstacles,
            Vec2::new(40.0, 40.0),
            Vec2::new(50.0, 50.0),
            16,
            16,
            false,
        );
        assert!(hits.horizontal);
        assert!(hits.vertical);
    }

    #[test]
    fn test_screen_edges_stop_everyone_but_the_player() {
        let pos = Vec2::new(300.0, 100.0);
        let out = Vec2::new(310.0, 100.0);
        let hits = resolve_motion(&[], pos, out, 16, 16, false);
        assert!(hits.horizontal);
        let hits = resolve_motion(&[], pos, out, 16, 16, true);
        assert!(!hits.any());
    }

    #[test]
    fn test_ceiling_is_a_wall() {
        let hits = resolve_motion(
            &[],
            Vec2::new(100.0, 34.0),
            Vec2::new(100.0, 30.0),
            16,
            16,
            false,
        );
        assert!(hits.vertical);
        assert!(!hits.horizontal);
    }
}
