//! Room state: one maze cell's static geometry plus its entity population
//!
//! The room owns every entity it stores. The player moves between rooms by
//! value: `on_player_enter` takes it, `on_player_exit` hands it back together
//! with everything that follows the player.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::overlaps_obstacles;
use super::entity::{Entity, EntityId, EntityKind, Lifetime};
use super::level::{
    self, BlockGrid, DEBRIS_SPRITE, EXPLOSION_SPRITE, LevelError, SpriteTable,
};
use super::rect::Rect;
use crate::cell_origin;
use crate::consts::{
    DEBRIS_PER_BURST, EXPLOSION_CELL, GRID_COLS, GRID_ROWS, MAX_ENTITIES_PER_ROOM, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
use crate::player::PlayerStats;

/// Initial speed of a debris fragment
const DEBRIS_SPEED: f32 = 2.0;
/// Attempt budget for the wall-adjacent explosion sampler
const PLACEMENT_ATTEMPTS: u32 = 100;

/// Draw command emitted by [`Room::render`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCmd {
    pub sprite: usize,
    pub pos: Vec2,
    pub frame: u32,
}

/// One maze cell: block grid, derived obstacles, and the live entity set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    grid: BlockGrid,
    pub(super) obstacles: Vec<Rect>,
    pub(super) entities: Vec<Entity>,
    /// Admission queue; joins the active set at the top of the next frame
    pub(super) pending: Vec<Entity>,
    pub(super) player_id: Option<EntityId>,
    next_id: u32,
}

impl Room {
    /// Empty room: all-background grid, no obstacles, no entities
    pub fn new() -> Self {
        Self {
            grid: BlockGrid::empty(GRID_ROWS, GRID_COLS),
            obstacles: Vec::new(),
            entities: Vec::with_capacity(MAX_ENTITIES_PER_ROOM),
            pending: Vec::new(),
            player_id: None,
            next_id: 1,
        }
    }

    /// Build a room from its two level streams.
    ///
    /// Placements that map to nothing are skipped; a platform's rider is the
    /// next placed entity after it in the stream.
    pub fn from_level_data(
        block_stream: &[u8],
        entity_stream: &[u8],
        sprites: SpriteTable,
    ) -> Result<Self, LevelError> {
        let grid = BlockGrid::decode(block_stream, GRID_ROWS, GRID_COLS)?;
        let obstacles = level::build_obstacles(&grid);

        let mut room = Self::new();
        room.grid = grid;
        room.obstacles = obstacles;

        let mut platform: Option<EntityId> = None;
        for (pos, code) in level::decode_placements(entity_stream)? {
            if code == 0 {
                continue;
            }
            let Some(entity) = level::spawn_entity(code, pos, sprites) else {
                log::debug!("placement code {code} at {pos} places nothing");
                continue;
            };
            let Some(id) = room.add_game_entity(entity) else {
                return Err(LevelError::TooManyEntities {
                    max: MAX_ENTITIES_PER_ROOM,
                });
            };

            if let Some(platform_id) = platform.take()
                && let Some(rider) = room.entities.last_mut()
            {
                rider.platform = Some(platform_id);
            } else if code == 2 || code == 3 {
                platform = Some(id);
            }
        }
        Ok(room)
    }

    // === Accessors ===

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub(super) fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub(super) fn assign_id(&mut self, entity: &mut Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        id
    }

    // === Admission ===

    /// Queue an entity for admission at the top of the next frame
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = self.assign_id(&mut entity);
        self.pending.push(entity);
        id
    }

    /// Admit a level entity immediately with `Game` lifetime.
    ///
    /// Returns `None` when the room is at capacity; the entity is dropped,
    /// never squeezed in.
    pub fn add_game_entity(&mut self, mut entity: Entity) -> Option<EntityId> {
        if self.entities.len() >= MAX_ENTITIES_PER_ROOM {
            log::warn!("room is full ({MAX_ENTITIES_PER_ROOM}); rejecting entity");
            return None;
        }
        entity.lifetime = Lifetime::Game;
        let id = self.assign_id(&mut entity);
        self.entities.push(entity);
        Some(id)
    }

    /// Throw an 8-way debris burst from a point
    pub fn add_debris(&mut self, pos: Vec2) {
        for i in 0..DEBRIS_PER_BURST {
            let angle = std::f32::consts::TAU * i as f32 / DEBRIS_PER_BURST as f32;
            let vel = Vec2::new(angle.cos(), angle.sin()) * DEBRIS_SPEED;
            self.add_entity(Entity::debris(pos, vel, DEBRIS_SPRITE));
        }
    }

    /// Place an explosion flush against an obstacle at a random grid-aligned
    /// spot, with a debris burst on top.
    ///
    /// Rejection-samples positions that touch but do not overlap a wall; an
    /// open room can defeat the sampler, so attempts are bounded.
    pub fn add_explosion<R: Rng>(&mut self, rng: &mut R) {
        let (w, h) = (EXPLOSION_CELL, EXPLOSION_CELL);
        for _ in 0..PLACEMENT_ATTEMPTS {
            let x = rng.random_range(0..SCREEN_WIDTH / w) * w;
            let y = (2 + rng.random_range(0..SCREEN_HEIGHT / h - 2)) * h;
            let pos = Vec2::new(x as f32, y as f32);

            let clear = !overlaps_obstacles(&self.obstacles, pos, w, h);
            let cell = w as f32;
            let touching = [
                Vec2::new(cell, 0.0),
                Vec2::new(0.0, cell),
                Vec2::new(-cell, 0.0),
                Vec2::new(0.0, -cell),
            ]
            .into_iter()
            .any(|offset| overlaps_obstacles(&self.obstacles, pos + offset, w, h));

            if clear && touching {
                self.add_entity(Entity::explosion(pos, EXPLOSION_SPRITE));
                self.add_debris(pos);
                return;
            }
        }
        log::warn!("no wall-adjacent spot for an explosion after {PLACEMENT_ATTEMPTS} attempts");
    }

    // === Removal ===

    /// Remove every entity with lifetime at or above the threshold,
    /// preserving the order of the rest
    pub fn remove_entities(&mut self, threshold: Lifetime) {
        self.entities.retain(|e| e.lifetime < threshold);
        if let Some(player_id) = self.player_id
            && self.index_of(player_id).is_none()
        {
            self.player_id = None;
        }
    }

    /// New-game reset: purge per the session threshold, then restore every
    /// survivor to its spawn state
    pub fn reset(&mut self) {
        self.remove_entities(Lifetime::Session);
        for entity in &mut self.entities {
            entity.reset();
        }
    }

    // === Player transitions ===

    /// Queue the player for admission; it joins the room next frame
    pub fn on_player_enter(&mut self, player: Entity) -> EntityId {
        debug_assert!(player.kind == EntityKind::Player);
        let id = self.add_entity(player);
        self.player_id = Some(id);
        id
    }

    /// Pull the player and everything that follows it out of the room, then
    /// purge room-scoped entities. The extracted entities are handed back to
    /// the caller for the next room.
    pub fn on_player_exit(&mut self) -> Vec<Entity> {
        let player_id = self.player_id.take();
        let mut extracted = Vec::new();

        // the pending queue too, so an enter/exit pair can't strand the player
        for list in [&mut self.entities, &mut self.pending] {
            let mut i = 0;
            while i < list.len() {
                if Some(list[i].id) == player_id || list[i].lifetime == Lifetime::FollowPlayer {
                    extracted.push(list.remove(i));
                } else {
                    i += 1;
                }
            }
        }

        self.remove_entities(Lifetime::Room);
        extracted
    }

    // === Explosions ===

    /// Blow up the entity at `index`: disable it, credit its score, tile its
    /// bounding box with explosion cells plus one debris burst, and take a
    /// linked platform down with it.
    pub(super) fn explode_entity(&mut self, index: usize, stats: &mut PlayerStats) {
        if let Some(platform_id) = self.detonate(index, stats)
            && let Some(platform_index) = self.index_of(platform_id)
        {
            self.detonate(platform_index, stats);
        }
    }

    /// Returns the platform link of the detonated entity, if any
    fn detonate(&mut self, index: usize, stats: &mut PlayerStats) -> Option<EntityId> {
        let entity = &mut self.entities[index];
        if !entity.enabled {
            return None;
        }
        entity.enabled = false;
        stats.add_score(entity.score);

        let pos = entity.pos;
        let (width, height) = (entity.width, entity.height);
        let link = entity.platform.take();

        for row in (0..height).step_by(EXPLOSION_CELL as usize) {
            for col in (0..width).step_by(EXPLOSION_CELL as usize) {
                let cell_pos = pos + Vec2::new(col as f32, row as f32);
                self.add_entity(Entity::explosion(cell_pos, EXPLOSION_SPRITE));
            }
        }
        self.add_debris(pos + Vec2::new(4.0, 4.0));

        link
    }

    /// Chain-detonate the whole room, sparing the player and anything that
    /// already is an explosion or rubble
    pub fn explode_all_entities_except_player(&mut self, stats: &mut PlayerStats) {
        for index in 0..self.entities.len() {
            let entity = &self.entities[index];
            if !entity.enabled || Some(entity.id) == self.player_id || !entity.is_explodable() {
                continue;
            }
            if entity.lifetime == Lifetime::Animation || entity.lifetime == Lifetime::Collision {
                continue;
            }
            self.explode_entity(index, stats);
        }
    }

    // === Rendering ===

    /// Append draw commands for the block grid and every enabled entity
    pub fn render(&self, block_sprites: &[usize], out: &mut Vec<DrawCmd>) {
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let block = self.grid.get(row, col) as usize;
                let Some(&sprite) = block_sprites.get(block) else {
                    debug_assert!(false, "block {block} has no sprite");
                    log::error!("block {block} has no sprite; dropping block pass");
                    return;
                };
                out.push(DrawCmd {
                    sprite,
                    pos: cell_origin(row, col),
                    frame: 0,
                });
            }
        }

        for entity in &self.entities {
            if entity.enabled {
                out.push(DrawCmd {
                    sprite: entity.sprite,
                    pos: entity.pos,
                    frame: entity.frame(),
                });
            }
        }
    }
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}
