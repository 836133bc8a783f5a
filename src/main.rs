//! Headless driver: builds a small valley world and walks the controller
//! through a scripted session, logging what happens.

use std::env;
use std::f32::consts::FRAC_PI_2;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::info;

use valley_walker::controller::{ClipMap, InputEvent, InputTracker, Simulation};
use valley_walker::model::{GroundPlane, PlatformCollider, PlatformSet, TerrainMesh, World};
use valley_walker::{logging, ControllerConfig};

const VALLEY_SIZE: f32 = 180.0;
const VALLEY_BASE: f32 = -4.5;
const FLOOR_HEIGHT: f32 = -2.5;
const FLOOR_HALF_EXTENT: f32 = 120.0;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("invalid value for {key}: {v:?}")),
        Err(_) => Ok(default),
    }
}

fn build_valley() -> Result<TerrainMesh> {
    let mesh = TerrainMesh::from_heightfield("valley", 64, 64, 1.0, |x, z| {
        let dx = x - 32.0;
        let dz = z - 32.0;
        (dx * dx + dz * dz) * 0.01 + (x * 0.3).sin() * 0.8
    })?;
    Ok(mesh.fit_footprint(VALLEY_SIZE, VALLEY_BASE))
}

/// Staircase of floating platforms heading +X from the valley floor
fn build_platforms(probe: &World) -> PlatformSet {
    (0..4)
        .map(|i| {
            let x = 8.0 + i as f32 * 3.5;
            let ground = probe
                .terrain
                .cast_down(Vec3::new(x, 100.0, 0.0), f32::INFINITY)
                .unwrap_or(FLOOR_HEIGHT);
            let top = ground + 1.2 * (i + 1) as f32;
            PlatformCollider::from_center_size(Vec3::new(x, top - 0.25, 0.0), Vec3::new(3.0, 0.5, 3.0))
        })
        .collect()
}

fn build_world() -> Result<World> {
    let valley = build_valley().context("building valley terrain")?;

    // platforms are placed relative to the terrain, so measure it first
    let mut probe = World::empty();
    probe.register_surface(valley.clone());
    let platforms = build_platforms(&probe);

    let mut world = World::new(platforms);
    world.register_surface(GroundPlane::bounded(FLOOR_HEIGHT, FLOOR_HALF_EXTENT));
    world.register_surface(valley);
    Ok(world)
}

/// Keys held during each phase of the scripted session, by start second
const SCRIPT: &[(f32, &[&str])] = &[
    (0.0, &[]),
    (1.0, &["w"]),
    (3.0, &["s"]),
    (5.0, &["w", " "]),
    (9.0, &[]),
    (10.0, &["w", "Shift"]),
    (22.0, &[]),
];

fn phase_at(t: f32) -> usize {
    SCRIPT.iter().rposition(|(start, _)| t >= *start).unwrap_or(0)
}

fn main() -> Result<()> {
    logging::init()?;

    let seconds: f32 = env_or("VALLEY_DEMO_SECONDS", 24.0)?;
    let hz: f32 = env_or("VALLEY_DEMO_HZ", 60.0)?;
    anyhow::ensure!(hz > 0.0 && seconds > 0.0, "demo length and rate must be positive");

    let world = build_world()?;
    let clips = ClipMap::from_clip_names(&["Idle", "Run", "Jump"]);
    let mut sim = Simulation::new(ControllerConfig::default(), clips)?;

    let dt = 1.0 / hz;
    let total_ticks = (seconds * hz).ceil() as u64;
    let mut input = InputTracker::default();
    input.process_event(&InputEvent::PointerLockChanged { locked: true });
    let mut phase = usize::MAX;
    let mut turned = false;
    let mut respawns = 0;

    info!(seconds, hz, surfaces = world.terrain.len(), platforms = world.platforms().len(), "starting session");

    for tick in 0..total_ticks {
        let t = tick as f32 * dt;

        let next = phase_at(t);
        if next != phase {
            phase = next;
            input.process_event(&InputEvent::FocusLost);
            for key in SCRIPT[phase].1 {
                input.process_event(&InputEvent::KeyDown(key.to_string()));
            }
        } else if SCRIPT[phase].1.contains(&" ") && tick % hz.max(1.0) as u64 == 0 {
            // jumps are per press, so tap space again once a second
            input.process_event(&InputEvent::KeyUp(" ".to_string()));
            input.process_event(&InputEvent::KeyDown(" ".to_string()));
        }

        // face +X once the walk-around is done, toward the platforms
        if !turned && t >= 5.0 {
            let yaw_delta = -FRAC_PI_2 - sim.camera().basis.yaw;
            let dx = -yaw_delta / sim.config().mouse_sensitivity;
            input.process_event(&InputEvent::MouseMove { dx, dy: 0.0 });
            turned = true;
        }
        let (dx, dy) = input.consume_look();
        sim.apply_look(dx, dy);

        let report = sim.tick(&world, &input.snapshot(), dt);
        if report.respawned {
            respawns += 1;
        }

        if tick % hz.max(1.0) as u64 == 0 {
            let snap = sim.snapshot();
            info!(
                t = %format!("{t:.1}"),
                pos = %format!("({:.2}, {:.2}, {:.2})", snap.position.x, snap.position.y, snap.position.z),
                height = snap.height,
                grounded = snap.grounded,
                anim = %snap.animation.state,
                rate = snap.animation.playback_rate,
                "status"
            );
        }
    }

    info!(ticks = sim.ticks(), respawns, final_pos = ?sim.player().position, "session finished");
    Ok(())
}
