//! Headless demo: runs the simulation with a trivial aim-bot player and
//! logs the event stream. Useful for balance passes and soak runs.

use glam::Vec3;

use korber_core::events::GameEvent;
use korber_core::{scene, SimulationWorld};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42u64);
    let ticks: u32 = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(60 * 120);

    log::info!("seed={seed} ticks={ticks}");
    let mut world = SimulationWorld::new(seed);
    world.set_environment(scene::city_block(seed));

    let dt = 1.0 / 60.0;
    for tick in 0..ticks {
        // aim at the nearest agent's torso and fire a few times a second
        if tick % 12 == 0 {
            let eye = world.player.pos;
            let nearest = world
                .zombies
                .iter()
                .min_by(|a, b| {
                    a.pos.distance_squared(eye).total_cmp(&b.pos.distance_squared(eye))
                })
                .map(|z| z.pos + Vec3::new(0.0, 1.2, 0.0));
            if let Some(target) = nearest {
                let d = target - eye;
                let yaw = d.x.atan2(d.z);
                let pitch = d.y.atan2((d.x * d.x + d.z * d.z).sqrt());
                world.set_player_look(yaw, pitch);
                world.fire();
            }
        }
        world.step(dt);

        for ev in world.drain_events() {
            match ev {
                GameEvent::WaveStarted { wave, quota } => {
                    log::info!("wave {wave} started, quota {quota}")
                }
                GameEvent::WaveCompleted { wave } => log::info!("wave {wave} completed"),
                GameEvent::ZombieKilled { id, .. } => log::debug!("{id:?} down"),
                GameEvent::PlayerDamaged { hp_after, .. } => {
                    log::info!("player hit, hp {hp_after:.0}")
                }
                GameEvent::GameOver { wave, kills } => {
                    log::info!("game over at wave {wave} with {kills} kills");
                    return;
                }
                _ => {}
            }
        }
    }
    log::info!(
        "run finished: wave {} score {} kills {}",
        world.director.wave,
        world.score,
        world.kills
    );
}
