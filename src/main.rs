//! Headless demo: a melee and a ranged agent hunting a wandering player
//! through a small walled arena.
//!
//! Pass a RON config path as the first argument to override the defaults.

use gridnav::prelude::*;

const TICK: f32 = 1.0 / 60.0;
const SECONDS: u32 = 12;

/// Arena with its walls, grid and agents
struct Demo {
    physics: Physics,
    grid: Grid,
    world: hecs::World,
    player: hecs::Entity,
    time: f32,
}

impl Demo {
    fn new(config: &NavConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let mut physics = Physics::new();

        // Two offset walls force agents around corners
        physics.add_wall(Vec3::new(-4.0, 1.0, 2.0), Vec3::new(0.5, 1.0, 8.0));
        physics.add_wall(Vec3::new(4.0, 1.0, -2.0), Vec3::new(0.5, 1.0, 8.0));
        physics.add_wall(Vec3::new(0.0, 1.0, 12.0), Vec3::new(6.0, 1.0, 0.5));
        physics.update_queries();

        let grid = Grid::build(&config.grid, &physics.obstacles(config.grid.obstacle_mask))?;

        let mut world = hecs::World::new();
        let player = world.spawn((
            Name::new("player"),
            Transform::from_position(Vec3::new(0.0, 0.89, 0.0)),
        ));

        let steering = config.steering.clone();
        world.spawn((
            Name::new("brute"),
            Transform::from_position(Vec3::new(-12.0, 0.89, -10.0)),
            SteeringController::new(steering.clone()),
            Pursuer::new(player, GoalPolicy::melee()),
            LocomotionTrack::new(),
        ));
        world.spawn((
            Name::new("archer"),
            Transform::from_position(Vec3::new(12.0, 0.89, 10.0)),
            SteeringController::new(steering.with_speed(3.0)),
            Pursuer::new(player, GoalPolicy::ranged()),
            LocomotionTrack::new(),
            LookPivot::default(),
        ));

        Ok(Self {
            physics,
            grid,
            world,
            player,
            time: 0.0,
        })
    }

    fn update(&mut self, dt: f32) -> usize {
        self.time += dt;

        // Player strolls in a slow circle around the arena centre
        if let Ok(mut transform) = self.world.get::<&mut Transform>(self.player) {
            let angle = self.time * 0.3;
            transform.position = Vec3::new(angle.cos() * 6.0, 0.89, angle.sin() * 6.0);
        }

        let obstacles = self.physics.obstacles(layers::OBSTACLE);
        let nav = Navigator::new(&self.grid, &obstacles);
        update_agents(&mut self.world, &nav, dt)
    }

    fn report(&self) {
        let mut query = self
            .world
            .query::<(&Name, &Transform, Option<&LocomotionTrack>)>();
        for (_, (name, transform, track)) in query.iter() {
            match track {
                Some(track) => log::info!(
                    "{:>8} at ({:6.2}, {:6.2}) {:?} x{:.2}",
                    name.0,
                    transform.position.x,
                    transform.position.z,
                    track.state(),
                    track.playback_rate()
                ),
                None => log::info!(
                    "{:>8} at ({:6.2}, {:6.2})",
                    name.0,
                    transform.position.x,
                    transform.position.z
                ),
            }
        }
    }
}

fn load_config() -> Result<NavConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            Ok(NavConfig::load_ron(path)?)
        }
        None => Ok(NavConfig::default()),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let mut demo = Demo::new(&config)?;

    for tick in 0..SECONDS * 60 {
        let walking = demo.update(TICK);
        if tick % 60 == 0 {
            log::info!("t = {:.1}s, {} agents walking", demo.time, walking);
            demo.report();
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Demo error: {}", e);
    }
}
