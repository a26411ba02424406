//! Birds: movement, sensing, jump decisions, fitness and score bookkeeping.

use crate::config::GameConfig;
use crate::nn::{DecisionNetwork, INPUT_SIZE};
use crate::pipe::Pipe;
use rand::Rng;
use tracing::trace;

/// Network outputs strictly above this trigger a jump.
pub const JUMP_THRESHOLD: f64 = 0.5;

/// Stand-in distance for pipes already behind the bird so they are never picked as closest.
pub const PASSED_PIPE_DISTANCE: f64 = 1e6;

/// Added to the vertical offset in the proximity term of the fitness formula.
pub const FITNESS_OFFSET: f64 = 1e4;

pub fn should_jump(network_output: f64) -> bool {
    network_output > JUMP_THRESHOLD
}

/// What decides whether a bird jumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pilot {
    /// The bird's own decision network; accumulates fitness.
    Network,
    /// External input calls [`Bird::jump`]; the network is never consulted.
    Manual,
}

/// One sensor snapshot, in network input order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorReading {
    /// Gap midpoint of the closest upcoming pipe minus the bird's y. Positive: gap is below.
    pub vertical_offset: f64,
    /// Centre of the closest upcoming pipe minus the bird's x.
    pub horizontal_offset: f64,
    pub altitude: f64,
}

impl SensorReading {
    pub fn as_input(&self) -> [f64; INPUT_SIZE] {
        [self.vertical_offset, self.horizontal_offset, self.altitude]
    }
}

#[derive(Clone, Debug)]
pub struct Bird {
    pub position: [f64; 2],
    pub velocity: f64,
    pub alive: bool,
    pub score: u32,
    fitness: f64,
    pilot: Pilot,
    network: DecisionNetwork,
    last_sensors: Option<SensorReading>,
}

impl Bird {
    pub fn new(pilot: Pilot, position: [f64; 2], network: DecisionNetwork) -> Self {
        Self {
            position,
            velocity: 0.0,
            alive: true,
            score: 0,
            fitness: 0.0,
            pilot,
            network,
            last_sensors: None,
        }
    }

    /// Network-piloted bird with a freshly sampled network at the spawn point.
    pub fn ai<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        Self::new(Pilot::Network, config.spawn_point(), DecisionNetwork::random(rng))
    }

    pub fn manual<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        Self::new(Pilot::Manual, config.spawn_point(), DecisionNetwork::random(rng))
    }

    pub fn pilot(&self) -> Pilot {
        self.pilot
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn network(&self) -> &DecisionNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut DecisionNetwork {
        &mut self.network
    }

    pub fn last_sensors(&self) -> Option<&SensorReading> {
        self.last_sensors.as_ref()
    }

    pub fn jump(&mut self, config: &GameConfig) {
        self.velocity = -config.jump_velocity;
    }

    /// One tick of gravity followed by the position update.
    pub fn advance(&mut self, config: &GameConfig) {
        self.velocity += config.gravity;
        self.position[1] += self.velocity;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Read the closest upcoming pipe and cache the result.
    ///
    /// # Panics
    ///
    /// Panics if `pipes` is empty; the environment must always present at least one pipe.
    pub fn sense(&mut self, pipes: &[Pipe], config: &GameConfig) -> SensorReading {
        assert!(!pipes.is_empty(), "sensing requires at least one pipe");
        let [x, y] = self.position;

        let mut closest = &pipes[0];
        let mut closest_distance = f64::INFINITY;
        for pipe in pipes {
            let mut distance = pipe.x - x;
            if distance < 0.0 {
                distance = PASSED_PIPE_DISTANCE;
            }
            if distance < closest_distance {
                closest_distance = distance;
                closest = pipe;
            }
        }

        let reading = SensorReading {
            vertical_offset: closest.gap_midpoint() - y,
            horizontal_offset: closest.checkpoint(config.pipe_width) - x,
            altitude: y,
        };
        self.last_sensors = Some(reading);
        reading
    }

    /// Sense, run the network and jump if it says so. Returns whether the bird jumped.
    ///
    /// Manual birds never decide for themselves and always return `false`.
    pub fn decide(&mut self, pipes: &[Pipe], config: &GameConfig) -> bool {
        if self.pilot == Pilot::Manual {
            return false;
        }
        let reading = self.sense(pipes, config);
        let output = self.network.forward(&reading.as_input());
        let jumped = should_jump(output);
        if jumped {
            self.jump(config);
        }
        trace!(output, jumped, "jump decision");
        jumped
    }

    /// Add this tick's reward: survival plus proximity to the gap midpoint.
    ///
    /// The offset enters signed and unsquared, so being above the gap and below it are not symmetric.
    /// An offset of exactly `-FITNESS_OFFSET` divides by zero and drives fitness to infinity;
    /// screen-sized courses never get there.
    pub fn update_fitness(&mut self, config: &GameConfig) {
        match self.pilot {
            Pilot::Manual => {}
            Pilot::Network => {
                let Some(reading) = self.last_sensors else {
                    trace!("no sensor reading yet; fitness unchanged");
                    return;
                };
                self.fitness +=
                    config.survival_reward() + 1.0 / (reading.vertical_offset + FITNESS_OFFSET);
            }
        }
    }

    /// Count pipes whose checkpoint is less than one tick of travel ahead of the bird.
    pub fn update_score(&mut self, pipes: &[Pipe], config: &GameConfig) {
        let x = self.position[0];
        for pipe in pipes {
            let ahead = pipe.checkpoint(config.pipe_width) - x;
            if ahead > 0.0 && ahead < config.pipe_speed {
                self.score += 1;
            }
        }
    }
}
