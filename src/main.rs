//! Cavern Strike headless demo
//!
//! Builds one room from embedded level data, drops the player in, fires a
//! shot, and runs the simulation for a fixed number of frames.

use std::path::Path;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use cavern_strike::audio::NullAudio;
use cavern_strike::player::PlayerStats;
use cavern_strike::settings::Settings;
use cavern_strike::sim::{Entity, Room, TickContext};

const FRAMES: u32 = 600;

/// 10x6 block layout: open space with a three-block ledge and a solid floor
const DEMO_BLOCKS: &[u8] = &[
    0xE0, 0xE0, 0xC0, // rows 0-1: background
    0x80, 0x62, 0x60, // row 2: 4 background, 3 solid, 3 background
    0xE0, 0xE0, 0xC0, // rows 3-4: background
    0xE2, 0x62, // row 5: solid floor
    0x00,
];

/// Placement records (y, x, unused, type): a sentry on the ledge, a platform
/// carrying a fuel pod, a patrolling drone, and an ammo pickup on the floor
const DEMO_ENTITIES: &[u8] = &[
    80, 128, 0, 15, //
    160, 64, 0, 2, //
    144, 80, 0, 31, //
    64, 200, 0, 17, //
    176, 48, 0, 32, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, //
];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let sprites: Vec<usize> = (0..64).collect();
    let mut room = match Room::from_level_data(DEMO_BLOCKS, DEMO_ENTITIES, &sprites) {
        Ok(room) => room,
        Err(err) => {
            log::error!("level data rejected: {err}");
            return;
        }
    };
    log::info!(
        "room ready: {} obstacles, {} entities",
        room.obstacles().len(),
        room.entities().len()
    );

    let mut stats = PlayerStats::new();
    let settings = Settings::load(Path::new("cavern-strike-settings.json"));
    let mut audio = NullAudio;
    let mut rng = Pcg32::seed_from_u64(0xCAFE);

    room.on_player_enter(Entity::player(Vec2::new(160.0, 64.0), 63));

    for frame in 0..FRAMES {
        if frame == 30 {
            // one shot at the ledge sentry
            room.add_entity(Entity::bullet(
                Vec2::new(200.0, 86.0),
                Vec2::new(-4.0, 0.0),
                61,
            ));
        }
        if frame % 150 == 149 {
            // ambient wall blast
            room.add_explosion(&mut rng);
        }

        let mut ctx = TickContext {
            stats: &mut stats,
            audio: &mut audio,
            settings: &settings,
            bases_left: 1,
        };
        room.update(&mut ctx);

        if frame % 120 == 0 {
            let live = room.entities().iter().filter(|e| e.enabled).count();
            log::info!("frame {frame}: {live} live entities, score {}", stats.score);
        }
    }

    log::info!(
        "ran {FRAMES} frames: score {}, shield {}, {} entities left",
        stats.score,
        stats.shield,
        room.entities().len()
    );
}
