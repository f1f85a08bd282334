//! Clearing a wave must schedule the next one after the inter-wave delay,
//! with no spawns leaking out during the pause.

use glam::Vec3;
use korber_core::events::GameEvent;
use korber_core::tuning::Tuning;
use korber_core::SimulationWorld;

/// Aim the player at an agent's torso and fire once.
fn shoot_at(w: &mut SimulationWorld, target: Vec3) {
    let eye = w.player.pos;
    let d = target + Vec3::new(0.0, 1.2, 0.0) - eye;
    let yaw = d.x.atan2(d.z);
    let pitch = d.y.atan2((d.x * d.x + d.z * d.z).sqrt());
    w.set_player_look(yaw, pitch);
    w.fire();
}

#[test]
fn next_wave_starts_only_after_the_delay() {
    let mut t = Tuning::default();
    // single-agent waves so the test can clear them with one shot each
    t.wave_base_quota = 0;
    t.wave_quota_per_wave = 1;
    t.spawn_interval_s = 0.5;
    let wave_delay = t.wave_delay_s;
    let mut w = SimulationWorld::with_tuning(13, t);

    let dt = 1.0 / 60.0;
    let mut completed_at = None;
    let mut spawned_during_pause = false;
    let mut second_wave_at = None;

    for _ in 0..60 * 30 {
        w.step(dt);
        for ev in w.drain_events() {
            match ev {
                GameEvent::WaveCompleted { wave: 1 } => completed_at = Some(w.time),
                GameEvent::ZombieSpawned { .. } => {
                    if completed_at.is_some() && second_wave_at.is_none() {
                        spawned_during_pause = true;
                    }
                }
                GameEvent::WaveStarted { wave: 2, .. } => second_wave_at = Some(w.time),
                _ => {}
            }
        }
        if second_wave_at.is_some() {
            break;
        }
        // clear anything alive with a well-aimed shot per tick
        if let Some(pos) = w.zombies.first().map(|z| z.pos) {
            shoot_at(&mut w, pos);
        }
    }

    let completed = completed_at.expect("wave 1 never completed");
    let restarted = second_wave_at.expect("wave 2 never started");
    assert!(
        !spawned_during_pause,
        "an agent spawned during the inter-wave delay"
    );
    assert!(
        restarted - completed >= wave_delay - 0.1,
        "delay too short: {:.2}s",
        restarted - completed
    );
    assert!(
        restarted - completed <= wave_delay + 0.5,
        "delay too long: {:.2}s",
        restarted - completed
    );
}

#[test]
fn first_wave_waits_for_its_own_delay() {
    let t = Tuning::default();
    let first_delay = t.first_wave_delay_s;
    let mut w = SimulationWorld::with_tuning(14, t);
    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0;
    while elapsed + dt < first_delay - 1e-3 {
        w.step(dt);
        elapsed += dt;
    }
    assert!(w
        .drain_events()
        .iter()
        .all(|e| !matches!(e, GameEvent::WaveStarted { .. })));
    for _ in 0..12 {
        w.step(dt);
    }
    assert!(w
        .drain_events()
        .iter()
        .any(|e| matches!(e, GameEvent::WaveStarted { wave: 1, .. })));
}
