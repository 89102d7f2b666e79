//! Per-frame room pipeline
//!
//! The order is fixed: pending adds land first, movement resolves against the
//! obstacle grid, entities react to each other, everything updates and
//! animates, and garbage is swept last. Entities spawned by any of these
//! steps sit in the pending queue until the next frame.

use crate::audio::{AudioSink, Cue};
use crate::consts::MAX_ENTITIES_PER_ROOM;
use crate::player::PlayerStats;
use crate::settings::Settings;

use super::collision::{overlaps_obstacles, resolve_motion};
use super::entity::{EntityKind, Lifetime};
use super::room::Room;

/// Everything outside the room that one frame may touch
pub struct TickContext<'a> {
    pub stats: &'a mut PlayerStats,
    pub audio: &'a mut dyn AudioSink,
    pub settings: &'a Settings,
    /// Enemy bases left in the whole maze; the shield cue goes quiet at zero
    pub bases_left: u32,
}

impl Room {
    /// Advance the room by one frame
    pub fn update(&mut self, ctx: &mut TickContext) {
        self.commit_pending();
        self.resolve_wall_collisions();
        self.resolve_entity_collisions(ctx);
        self.update_entities();
        self.collect_garbage(ctx);
    }

    /// Splice the pending queue into the active set
    fn commit_pending(&mut self) {
        for entity in self.pending.drain(..) {
            if self.entities.len() >= MAX_ENTITIES_PER_ROOM {
                debug_assert!(false, "room entity capacity exceeded");
                log::warn!("dropping queued entity: room is full");
                if Some(entity.id) == self.player_id {
                    self.player_id = None;
                }
                continue;
            }
            self.entities.push(entity);
        }
    }

    /// Integrate every enabled movable entity and resolve wall contacts
    fn resolve_wall_collisions(&mut self) {
        let mut i = 0;
        while i < self.entities.len() {
            let (pos, vel, acc, width, height, lifetime, id) = {
                let e = &self.entities[i];
                if !e.enabled || !e.is_movable() {
                    i += 1;
                    continue;
                }
                (e.pos, e.vel, e.steering, e.width, e.height, e.lifetime, e.id)
            };

            debug_assert!(
                !overlaps_obstacles(&self.obstacles, pos, width, height),
                "entity starts the frame inside a wall"
            );

            let mut new_vel = vel + acc;
            let new_pos = pos + vel + 0.5 * acc;
            let hits = resolve_motion(
                &self.obstacles,
                pos,
                new_pos,
                width,
                height,
                Some(id) == self.player_id,
            );

            if hits.any() {
                if lifetime == Lifetime::Collision {
                    self.entities.remove(i);
                    continue;
                }
                let e = &mut self.entities[i];
                e.on_obstacle_collision(hits.horizontal, hits.vertical);
                new_vel = e.vel + acc;
            }

            let mut final_pos = pos;
            if !hits.horizontal {
                final_pos.x = new_pos.x;
            }
            if !hits.vertical {
                final_pos.y = new_pos.y;
            }

            let e = &mut self.entities[i];
            e.pos = final_pos;
            e.vel = new_vel;

            debug_assert!(
                !overlaps_obstacles(&self.obstacles, final_pos, width, height),
                "entity moved into a wall"
            );
            i += 1;
        }
    }

    /// Pairwise pass: the player against its colliders, every enemy against
    /// theirs, in entity order
    fn resolve_entity_collisions(&mut self, ctx: &mut TickContext) {
        let mut enemy_touched_player = false;

        let mut i = 0;
        while i < self.entities.len() {
            if !self.entities[i].enabled {
                i += 1;
                continue;
            }

            if Some(self.entities[i].id) == self.player_id {
                if ctx.stats.vulnerable() {
                    let player_bounds = self.entities[i].bounds();
                    let mut j = 0;
                    while j < self.entities.len() {
                        if j != i {
                            let other = &self.entities[j];
                            if other.enabled
                                && other.collides_with_player()
                                && other.bounds().intersects(&player_bounds)
                            {
                                if other.is_enemy() {
                                    enemy_touched_player = true;
                                }
                                self.react_to_player(j, ctx);
                            }
                        }
                        j += 1;
                    }
                }
            } else if self.entities[i].is_enemy() {
                let enemy_bounds = self.entities[i].bounds();
                let mut j = 0;
                while j < self.entities.len() {
                    if j != i {
                        let other = &self.entities[j];
                        if other.enabled
                            && other.collides_with_enemy()
                            && other.bounds().intersects(&enemy_bounds)
                        {
                            self.react_to_enemy(j, i, ctx);
                        }
                    }
                    j += 1;
                }
            }
            i += 1;
        }

        // shield drain loops only while contact continues and the fight is on
        if enemy_touched_player && ctx.stats.vulnerable() && ctx.bases_left > 0 {
            if !ctx.audio.is_playing(Cue::ShieldDrain) {
                ctx.audio.play(Cue::ShieldDrain, 0);
            }
        } else if ctx.audio.is_playing(Cue::ShieldDrain) {
            ctx.audio.stop(Cue::ShieldDrain);
        }
    }

    /// Reaction of the entity at `index` to touching the player
    fn react_to_player(&mut self, index: usize, ctx: &mut TickContext) {
        let entity = &mut self.entities[index];
        match entity.kind {
            EntityKind::Pickup(_) => {
                // collected: gone until the room resets
                entity.enabled = false;
                ctx.stats.add_score(entity.score);
                ctx.audio.play(Cue::Pickup, 0);
            }
            _ if entity.is_enemy() => {
                ctx.stats.drain_shield(1);
            }
            _ => {}
        }
    }

    /// Reaction of the entity at `index` to touching the enemy at `enemy_index`
    fn react_to_enemy(&mut self, index: usize, enemy_index: usize, ctx: &mut TickContext) {
        match self.entities[index].kind {
            EntityKind::Bullet => {
                self.entities[index].set_garbage();
                self.explode_entity(enemy_index, ctx.stats);
                ctx.audio.play(Cue::Explosion, 0);
            }
            EntityKind::Escort => {
                self.explode_entity(enemy_index, ctx.stats);
                ctx.audio.play(Cue::Explosion, 0);
            }
            _ => {}
        }
    }

    /// Run update + animate on live entities, dropping any that retire mid-pass
    fn update_entities(&mut self) {
        let mut i = 0;
        while i < self.entities.len() {
            let e = &mut self.entities[i];
            if !e.is_garbage() && e.enabled {
                e.update();
                e.animate();
                if e.is_garbage() {
                    self.entities.remove(i);
                    continue;
                }
            }
            i += 1;
        }
    }

    /// Sweep garbage and keep the idle-room cue in step with room emptiness
    fn collect_garbage(&mut self, ctx: &mut TickContext) {
        self.entities.retain(|e| !e.is_garbage());

        let room_is_empty = self.entities.iter().all(|e| !e.enabled);
        if room_is_empty {
            // the idle hum marks a cleared room, but never competes with music
            if ctx.settings.sound_effects && !ctx.settings.music {
                if !ctx.audio.is_playing(Cue::EmptyRoom) {
                    ctx.audio.play(Cue::EmptyRoom, -1);
                }
            }
        } else if ctx.audio.is_playing(Cue::EmptyRoom) {
            ctx.audio.stop(Cue::EmptyRoom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::sim::entity::Entity;
    use crate::sim::rect::Rect;
    use glam::Vec2;
    use proptest::prelude::*;

    #[derive(Default)]
    struct RecordingAudio {
        playing: Vec<Cue>,
        log: Vec<(Cue, i32)>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, cue: Cue, loops: i32) {
            self.log.push((cue, loops));
            if !self.playing.contains(&cue) {
                self.playing.push(cue);
            }
        }

        fn stop(&mut self, cue: Cue) {
            self.playing.retain(|c| *c != cue);
        }

        fn is_playing(&self, cue: Cue) -> bool {
            self.playing.contains(&cue)
        }
    }

    fn run_frame(room: &mut Room, stats: &mut PlayerStats, audio: &mut dyn AudioSink) {
        run_frame_with(room, stats, audio, &Settings::default(), 1);
    }

    fn run_frame_with(
        room: &mut Room,
        stats: &mut PlayerStats,
        audio: &mut dyn AudioSink,
        settings: &Settings,
        bases_left: u32,
    ) {
        let mut ctx = TickContext {
            stats,
            audio,
            settings,
            bases_left,
        };
        room.update(&mut ctx);
    }

    #[test]
    fn test_pending_commits_at_frame_start() {
        let mut room = Room::new();
        room.add_entity(Entity::drone(Vec2::new(100.0, 100.0), 0, 100));
        assert!(room.entities.is_empty());

        run_frame(&mut room, &mut PlayerStats::new(), &mut NullAudio);
        assert_eq!(room.entities.len(), 1);
        assert!(room.pending.is_empty());
    }

    #[test]
    fn test_reaction_spawns_wait_one_frame() {
        let mut room = Room::new();
        room.add_game_entity(Entity::sentry(Vec2::new(100.0, 100.0), 0, 200))
            .unwrap();
        let mut bullet = Entity::bullet(Vec2::new(104.0, 104.0), Vec2::ZERO, 0);
        room.assign_id(&mut bullet);
        room.entities.push(bullet);
        let mut stats = PlayerStats::new();

        run_frame(&mut room, &mut stats, &mut NullAudio);

        // the sentry detonated, but its explosion is only queued
        assert!(!room.entities.iter().any(|e| e.kind == EntityKind::Explosion));
        assert!(room.pending.iter().any(|e| e.kind == EntityKind::Explosion));
        assert_eq!(stats.score, 200);

        run_frame(&mut room, &mut stats, &mut NullAudio);
        assert!(room.entities.iter().any(|e| e.kind == EntityKind::Explosion));
    }

    #[test]
    fn test_wall_contact_removes_collision_lifetime() {
        let mut room = Room::new();
        room.obstacles.push(Rect::new(0, 192, 320, 224));
        let mut debris = Entity::debris(Vec2::new(100.0, 180.0), Vec2::new(0.0, 20.0), 0);
        room.assign_id(&mut debris);
        room.entities.push(debris);

        run_frame(&mut room, &mut PlayerStats::new(), &mut NullAudio);
        assert!(room.entities.is_empty());
    }

    #[test]
    fn test_diagonal_corner_blocks_both_axes() {
        let mut room = Room::new();
        room.obstacles.push(Rect::new(64, 64, 96, 96));
        let mut ball = Entity::ball(Vec2::new(40.0, 40.0), 0, 100);
        ball.vel = Vec2::new(10.0, 10.0);
        room.assign_id(&mut ball);
        room.entities.push(ball);

        run_frame(&mut room, &mut PlayerStats::new(), &mut NullAudio);

        let ball = &room.entities[0];
        // both probes were free alone; the combined move was not, so the
        // ball stays put and bounces on both axes
        assert_eq!(ball.pos, Vec2::new(40.0, 40.0));
        assert_eq!(ball.vel, Vec2::new(-10.0, -10.0));
    }

    #[test]
    fn test_enemy_contact_drains_shield_and_cues() {
        let mut room = Room::new();
        room.add_game_entity(Entity::sentry(Vec2::new(100.0, 100.0), 0, 200))
            .unwrap();
        room.on_player_enter(Entity::player(Vec2::new(100.0, 100.0), 63));
        let mut stats = PlayerStats::new();
        let shield = stats.shield;
        let mut audio = RecordingAudio::default();

        run_frame(&mut room, &mut stats, &mut audio);
        assert_eq!(stats.shield, shield - 1);
        assert!(audio.is_playing(Cue::ShieldDrain));

        // contact continues: drain again but never restart the cue
        run_frame(&mut room, &mut stats, &mut audio);
        assert_eq!(stats.shield, shield - 2);
        assert_eq!(
            audio.log.iter().filter(|(c, _)| *c == Cue::ShieldDrain).count(),
            1
        );

        // with no bases left the fight is over and the cue stops
        run_frame_with(&mut room, &mut stats, &mut audio, &Settings::default(), 0);
        assert!(!audio.is_playing(Cue::ShieldDrain));
    }

    #[test]
    fn test_invulnerable_player_takes_no_contact() {
        let mut room = Room::new();
        room.add_game_entity(Entity::sentry(Vec2::new(100.0, 100.0), 0, 200))
            .unwrap();
        room.on_player_enter(Entity::player(Vec2::new(100.0, 100.0), 63));
        let mut stats = PlayerStats::new();
        stats.shield = -1;
        let mut audio = RecordingAudio::default();

        run_frame(&mut room, &mut stats, &mut audio);
        assert_eq!(stats.shield, -1);
        assert!(!audio.is_playing(Cue::ShieldDrain));
    }

    #[test]
    fn test_pickup_collection_credits_score() {
        let mut room = Room::new();
        room.add_game_entity(Entity::pickup(
            crate::sim::PickupKind::Fuel,
            Vec2::new(100.0, 100.0),
            0,
            500,
        ))
        .unwrap();
        room.on_player_enter(Entity::player(Vec2::new(100.0, 100.0), 63));
        let mut stats = PlayerStats::new();
        let mut audio = RecordingAudio::default();

        run_frame(&mut room, &mut stats, &mut audio);

        assert!(!room.entities[0].enabled);
        assert_eq!(stats.score, 500);
        assert!(audio.log.contains(&(Cue::Pickup, 0)));
        assert!(!audio.is_playing(Cue::ShieldDrain));
    }

    #[test]
    fn test_idle_room_cue_follows_emptiness() {
        let mut room = Room::new();
        let mut stats = PlayerStats::new();
        let mut audio = RecordingAudio::default();

        run_frame(&mut room, &mut stats, &mut audio);
        assert!(audio.is_playing(Cue::EmptyRoom));
        assert!(audio.log.contains(&(Cue::EmptyRoom, -1)));

        run_frame(&mut room, &mut stats, &mut audio);
        assert_eq!(
            audio.log.iter().filter(|(c, _)| *c == Cue::EmptyRoom).count(),
            1
        );

        room.add_game_entity(Entity::sentry(Vec2::new(100.0, 100.0), 0, 200))
            .unwrap();
        run_frame(&mut room, &mut stats, &mut audio);
        assert!(!audio.is_playing(Cue::EmptyRoom));
    }

    #[test]
    fn test_idle_room_cue_muted_under_music() {
        let mut room = Room::new();
        let mut stats = PlayerStats::new();
        let mut audio = RecordingAudio::default();
        let settings = Settings {
            music: true,
            ..Settings::default()
        };

        run_frame_with(&mut room, &mut stats, &mut audio, &settings, 1);
        assert!(!audio.is_playing(Cue::EmptyRoom));
    }

    #[test]
    fn test_escort_detonates_enemies_it_touches() {
        let mut room = Room::new();
        room.add_game_entity(Entity::sentry(Vec2::new(100.0, 100.0), 0, 200))
            .unwrap();
        let mut escort = Entity::escort(Vec2::new(104.0, 104.0), 0);
        room.assign_id(&mut escort);
        room.entities.push(escort);
        let mut stats = PlayerStats::new();
        let mut audio = RecordingAudio::default();

        run_frame(&mut room, &mut stats, &mut audio);

        assert!(!room.entities[0].enabled);
        assert_eq!(stats.score, 200);
        assert!(audio.log.contains(&(Cue::Explosion, 0)));
        // the escort survives the blast it caused
        assert!(room.entities.iter().any(|e| e.kind == EntityKind::Escort));
    }

    #[test]
    fn test_retiring_mid_update_keeps_iteration_sound() {
        let mut room = Room::new();
        let mut expiring = Entity::bullet(Vec2::new(50.0, 100.0), Vec2::ZERO, 0);
        expiring.timer = 1;
        room.assign_id(&mut expiring);
        room.entities.push(expiring);
        room.add_game_entity(Entity::sentry(Vec2::new(200.0, 100.0), 0, 200))
            .unwrap();

        run_frame(&mut room, &mut PlayerStats::new(), &mut NullAudio);

        // the expired bullet left mid-pass; the sentry still got its turn
        assert_eq!(room.entities.len(), 1);
        assert_eq!(room.entities[0].kind, EntityKind::Sentry);
    }

    proptest! {
        #[test]
        fn prop_no_movable_entity_ends_inside_a_wall(
            cells in proptest::collection::vec((0usize..6, 0usize..10), 0..8),
            spawns in proptest::collection::vec(
                (32.0f32..288.0, 48.0f32..192.0, -8.0f32..8.0, -8.0f32..8.0),
                1..8,
            ),
        ) {
            let mut room = Room::new();
            for (row, col) in cells {
                let rect = Rect::new(
                    32 * col as i32,
                    32 * (row as i32 + 1),
                    32 * col as i32 + 32,
                    32 * (row as i32 + 1) + 32,
                );
                if !room.obstacles.contains(&rect) {
                    room.obstacles.push(rect);
                }
            }
            for (x, y, vx, vy) in spawns {
                let pos = Vec2::new(x, y);
                if overlaps_obstacles(&room.obstacles, pos, 16, 16) {
                    continue;
                }
                let mut e = Entity::drone(pos, 0, 100);
                e.vel = Vec2::new(vx, vy);
                room.add_game_entity(e);
            }

            let mut stats = PlayerStats::new();
            let settings = Settings::default();
            let mut audio = NullAudio;
            for _ in 0..4 {
                let mut ctx = TickContext {
                    stats: &mut stats,
                    audio: &mut audio,
                    settings: &settings,
                    bases_left: 1,
                };
                room.update(&mut ctx);
            }

            for e in room.entities() {
                if e.enabled && e.is_movable() {
                    prop_assert!(!overlaps_obstacles(
                        room.obstacles(),
                        e.pos,
                        e.width,
                        e.height
                    ));
                }
            }
        }
    }
}
