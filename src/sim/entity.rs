//! Entities and their lifecycle
//!
//! Everything inhabiting a room is an [`Entity`]: a kind tag plus the shared
//! position/velocity/lifetime state the room pipeline operates on. The room
//! never asks what an entity *is*, only what it *can do*, through the
//! capability queries below.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Frames a bullet flies before it expires
pub const BULLET_RANGE_FRAMES: i32 = 48;
/// Frames in one explosion animation cycle
pub const EXPLOSION_FRAMES: u32 = 8;

/// Room-unique entity identifier; assigned on admission, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Retention classification; bulk purges remove everything at or above a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lifetime {
    /// Lives for the whole play session
    Session,
    /// Lives until a new game starts
    Game,
    /// Lives only while the player stays in the room
    Room,
    /// Travels with the player between rooms
    FollowPlayer,
    /// Lives for one animation cycle
    Animation,
    /// Lives until the first wall contact
    Collision,
}

/// Collectible payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Fuel,
    Ammo,
    Bombs,
    Missiles,
    Orbs,
    Shield,
    Random,
    Stars,
}

/// Concrete entity kinds; the room depends only on the capability queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// The shared player ship
    Player,
    /// Stationary gun emplacement
    Sentry,
    /// Free-flying enemy
    Drone,
    /// Bouncing enemy
    Ball,
    /// Carrier that a linked rider sits on
    Platform,
    /// Collectible bonus
    Pickup(PickupKind),
    /// Player projectile
    Bullet,
    /// Companion orb that follows the player between rooms
    Escort,
    /// One cell of an explosion
    Explosion,
    /// Flying rubble
    Debris,
    /// Inert decoration
    Prop,
}

/// One unit inhabiting a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub lifetime: Lifetime,
    /// Sprite table index for the renderer
    pub sprite: usize,
    spawn_pos: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Per-frame acceleration applied by the movement pass
    pub steering: Vec2,
    pub width: i32,
    pub height: i32,
    pub enabled: bool,
    garbage: bool,
    /// Frame countdown; the kind's expiry hook fires once when it hits zero
    pub timer: i32,
    /// Weak link to the platform this entity rides on
    pub platform: Option<EntityId>,
    /// Points credited to the player when this entity is destroyed
    pub score: u32,
    frame: u32,
    frame_count: u32,
}

impl Entity {
    /// Inert base entity: enabled, stationary, non-enemy
    pub fn new(kind: EntityKind, pos: Vec2) -> Self {
        Self {
            id: EntityId(0),
            kind,
            lifetime: Lifetime::Session,
            sprite: 0,
            spawn_pos: pos,
            pos,
            vel: Vec2::ZERO,
            steering: Vec2::ZERO,
            width: 16,
            height: 16,
            enabled: true,
            garbage: false,
            timer: 0,
            platform: None,
            score: 0,
            frame: 0,
            frame_count: 1,
        }
    }

    pub fn with_sprite(mut self, sprite: usize) -> Self {
        self.sprite = sprite;
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    // === Kind constructors ===

    pub fn player(pos: Vec2, sprite: usize) -> Self {
        Self::new(EntityKind::Player, pos).with_sprite(sprite)
    }

    pub fn sentry(pos: Vec2, sprite: usize, score: u32) -> Self {
        Self::new(EntityKind::Sentry, pos)
            .with_sprite(sprite)
            .with_score(score)
    }

    pub fn drone(pos: Vec2, sprite: usize, score: u32) -> Self {
        let mut e = Self::new(EntityKind::Drone, pos)
            .with_sprite(sprite)
            .with_score(score);
        e.vel = Vec2::new(1.0, 0.0);
        e
    }

    pub fn ball(pos: Vec2, sprite: usize, score: u32) -> Self {
        let mut e = Self::new(EntityKind::Ball, pos)
            .with_sprite(sprite)
            .with_score(score);
        e.vel = Vec2::new(1.0, 1.0);
        e
    }

    pub fn platform(pos: Vec2, sprite: usize) -> Self {
        Self::new(EntityKind::Platform, pos).with_sprite(sprite)
    }

    pub fn pickup(kind: PickupKind, pos: Vec2, sprite: usize, bonus: u32) -> Self {
        Self::new(EntityKind::Pickup(kind), pos)
            .with_sprite(sprite)
            .with_score(bonus)
    }

    pub fn bullet(pos: Vec2, vel: Vec2, sprite: usize) -> Self {
        let mut e = Self::new(EntityKind::Bullet, pos)
            .with_sprite(sprite)
            .with_size(4, 4);
        e.lifetime = Lifetime::Collision;
        e.vel = vel;
        e.timer = BULLET_RANGE_FRAMES;
        e
    }

    pub fn escort(pos: Vec2, sprite: usize) -> Self {
        let mut e = Self::new(EntityKind::Escort, pos)
            .with_sprite(sprite)
            .with_size(8, 8);
        e.lifetime = Lifetime::FollowPlayer;
        e
    }

    pub fn explosion(pos: Vec2, sprite: usize) -> Self {
        let mut e = Self::new(EntityKind::Explosion, pos).with_sprite(sprite);
        e.lifetime = Lifetime::Animation;
        e.frame_count = EXPLOSION_FRAMES;
        e
    }

    pub fn debris(pos: Vec2, vel: Vec2, sprite: usize) -> Self {
        let mut e = Self::new(EntityKind::Debris, pos)
            .with_sprite(sprite)
            .with_size(4, 4);
        e.lifetime = Lifetime::Collision;
        e.vel = vel;
        e.steering = Vec2::new(0.0, 0.25);
        e
    }

    pub fn prop(pos: Vec2, sprite: usize) -> Self {
        Self::new(EntityKind::Prop, pos).with_sprite(sprite)
    }

    // === Capability queries ===

    /// Whether the movement pass integrates this entity
    pub fn is_movable(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Player
                | EntityKind::Drone
                | EntityKind::Ball
                | EntityKind::Bullet
                | EntityKind::Escort
                | EntityKind::Debris
        )
    }

    pub fn is_enemy(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Sentry | EntityKind::Drone | EntityKind::Ball
        )
    }

    /// Whether the pairwise pass tests this entity against the player
    pub fn collides_with_player(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Sentry | EntityKind::Drone | EntityKind::Ball | EntityKind::Pickup(_)
        )
    }

    /// Whether the pairwise pass tests this entity against enemies
    pub fn collides_with_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Bullet | EntityKind::Escort)
    }

    /// Whether a forced detonation affects this entity
    pub fn is_explodable(&self) -> bool {
        !matches!(
            self.kind,
            EntityKind::Player | EntityKind::Bullet | EntityKind::Explosion | EntityKind::Debris
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin(self.pos.x as i32, self.pos.y as i32, self.width, self.height)
    }

    pub fn overlaps(&self, other: &Entity) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    pub fn is_garbage(&self) -> bool {
        self.garbage
    }

    pub fn set_garbage(&mut self) {
        self.garbage = true;
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    // === Lifecycle ===

    /// Restore spawn state: spawn position, zero velocity, enabled, no timer
    pub fn reset(&mut self) {
        self.pos = self.spawn_pos;
        self.vel = Vec2::ZERO;
        self.enabled = true;
        self.garbage = false;
        self.timer = 0;
        self.frame = 0;
    }

    /// Advance the animation frame; one full cycle ends an Animation entity
    pub fn animate(&mut self) {
        if self.frame_count == 0 {
            return;
        }
        let old = self.frame;
        self.frame = (self.frame + 1) % self.frame_count;
        if self.lifetime == Lifetime::Animation && old > 0 && self.frame == 0 {
            self.garbage = true;
        }
    }

    /// Tick the countdown timer, firing the expiry hook exactly once at zero
    pub fn update(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
            if self.timer == 0 {
                self.on_timer();
            }
        }
    }

    fn on_timer(&mut self) {
        match self.kind {
            // out of range
            EntityKind::Bullet => self.garbage = true,
            _ => {}
        }
    }

    /// React to hitting the obstacle grid on the flagged axes
    pub fn on_obstacle_collision(&mut self, horizontal: bool, vertical: bool) {
        let bounces = matches!(
            self.kind,
            EntityKind::Drone | EntityKind::Ball | EntityKind::Escort
        );
        if horizontal {
            self.vel.x = if bounces { -self.vel.x } else { 0.0 };
        }
        if vertical {
            self.vel.y = if bounces { -self.vel.y } else { 0.0 };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_purge_order() {
        assert!(Lifetime::Session < Lifetime::Game);
        assert!(Lifetime::Game < Lifetime::Room);
        assert!(Lifetime::Room < Lifetime::FollowPlayer);
        assert!(Lifetime::FollowPlayer < Lifetime::Animation);
        assert!(Lifetime::Animation < Lifetime::Collision);
    }

    #[test]
    fn test_reset_restores_spawn_state() {
        let mut e = Entity::drone(Vec2::new(100.0, 50.0), 3, 150);
        e.pos = Vec2::new(10.0, 200.0);
        e.vel = Vec2::new(-4.0, 2.0);
        e.enabled = false;
        e.timer = 30;
        e.animate();

        e.reset();
        assert_eq!(e.pos, Vec2::new(100.0, 50.0));
        assert_eq!(e.vel, Vec2::ZERO);
        assert!(e.enabled);
        assert_eq!(e.timer, 0);
        assert_eq!(e.frame(), 0);
    }

    #[test]
    fn test_animation_cycle_ends_explosion() {
        let mut e = Entity::explosion(Vec2::ZERO, 0);
        for _ in 0..EXPLOSION_FRAMES - 1 {
            e.animate();
            assert!(!e.is_garbage());
        }
        // wrapping back to frame zero retires the entity
        e.animate();
        assert_eq!(e.frame(), 0);
        assert!(e.is_garbage());
    }

    #[test]
    fn test_animation_wrap_ignored_for_other_lifetimes() {
        let mut e = Entity::drone(Vec2::ZERO, 0, 100);
        e.frame_count = 2;
        for _ in 0..10 {
            e.animate();
        }
        assert!(!e.is_garbage());
    }

    #[test]
    fn test_bullet_expires_once_at_zero() {
        let mut e = Entity::bullet(Vec2::ZERO, Vec2::new(4.0, 0.0), 0);
        e.timer = 2;
        e.update();
        assert!(!e.is_garbage());
        e.update();
        assert!(e.is_garbage());
        assert_eq!(e.timer, 0);
        // a zero timer never re-fires
        e.update();
        assert_eq!(e.timer, 0);
    }

    #[test]
    fn test_bounce_reflects_only_blocked_axes() {
        let mut e = Entity::ball(Vec2::ZERO, 0, 100);
        e.vel = Vec2::new(2.0, 3.0);
        e.on_obstacle_collision(true, false);
        assert_eq!(e.vel, Vec2::new(-2.0, 3.0));
        e.on_obstacle_collision(false, true);
        assert_eq!(e.vel, Vec2::new(-2.0, -3.0));
    }

    #[test]
    fn test_non_bouncer_stops_on_blocked_axes() {
        let mut e = Entity::player(Vec2::ZERO, 0);
        e.vel = Vec2::new(2.0, 3.0);
        e.on_obstacle_collision(true, true);
        assert_eq!(e.vel, Vec2::ZERO);
    }

    #[test]
    fn test_overlap_uses_pixel_bounds() {
        let a = Entity::prop(Vec2::new(0.0, 0.0), 0);
        let mut b = Entity::prop(Vec2::new(15.0, 15.0), 0);
        assert!(a.overlaps(&b));
        b.pos = Vec2::new(16.0, 0.0);
        assert!(!a.overlaps(&b));
    }
}
