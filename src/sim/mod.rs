//! Deterministic simulation module
//!
//! All per-room gameplay logic lives here. This module must be pure and
//! deterministic:
//! - Fixed per-frame steps only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod level;
pub mod rect;
pub mod room;
pub mod tick;

pub use collision::{AxisHits, overlaps_obstacles, resolve_motion};
pub use entity::{Entity, EntityId, EntityKind, Lifetime, PickupKind};
pub use level::{BlockGrid, LevelError, SpriteTable, build_obstacles};
pub use rect::Rect;
pub use room::{DrawCmd, Room};
pub use tick::TickContext;
