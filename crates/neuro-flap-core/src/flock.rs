use crate::agent::Bird;
use crate::config::{ConfigError, GameConfig};
use crate::pipe::Pipe;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum FlockError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub tick: u64,
    pub alive: usize,
    pub jumps: usize,
    /// Pipes passed this tick, summed over birds.
    pub passed: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlockStats {
    pub tick: u64,
    pub population: usize,
    pub alive: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub best_score: u32,
}

/// Birds stepped together on one course. Pipes and collisions belong to the caller.
pub struct Flock {
    birds: Vec<Bird>,
    config: GameConfig,
    tick: u64,
}

impl Flock {
    pub fn new(config: GameConfig, birds: Vec<Bird>) -> Result<Self, FlockError> {
        config.validate()?;
        Ok(Self {
            birds,
            config,
            tick: 0,
        })
    }

    /// `count` network-piloted birds with fresh networks at the spawn point.
    pub fn spawn_random<R: Rng + ?Sized>(
        config: GameConfig,
        count: usize,
        rng: &mut R,
    ) -> Result<Self, FlockError> {
        let birds = (0..count).map(|_| Bird::ai(&config, &mut *rng)).collect();
        Self::new(config, birds)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn birds(&self) -> &[Bird] {
        &self.birds
    }

    pub fn birds_mut(&mut self) -> &mut [Bird] {
        &mut self.birds
    }

    pub fn into_birds(self) -> Vec<Bird> {
        self.birds
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn alive_count(&self) -> usize {
        self.birds.iter().filter(|b| b.alive).count()
    }

    /// Advance every living bird one tick: physics, decision, fitness, score.
    ///
    /// Each bird is handed to exactly one rayon worker, so no network is touched
    /// by anyone else while its forward pass runs.
    ///
    /// # Panics
    ///
    /// Panics if `pipes` is empty while a network-piloted bird is alive.
    pub fn step(&mut self, pipes: &[Pipe]) -> StepReport {
        let config = &self.config;
        let (jumps, passed) = self
            .birds
            .par_iter_mut()
            .filter(|bird| bird.alive)
            .map(|bird| {
                let score_before = bird.score;
                bird.advance(config);
                let jumped = bird.decide(pipes, config);
                bird.update_fitness(config);
                bird.update_score(pipes, config);
                (usize::from(jumped), bird.score - score_before)
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        self.tick += 1;
        let report = StepReport {
            tick: self.tick,
            alive: self.alive_count(),
            jumps,
            passed,
        };
        trace!(?report, "flock step");
        report
    }

    /// Bird with the highest fitness, dead or alive.
    pub fn fittest(&self) -> Option<&Bird> {
        self.birds
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    pub fn stats(&self) -> FlockStats {
        let population = self.birds.len();
        let fitness_sum: f64 = self.birds.iter().map(Bird::fitness).sum();
        FlockStats {
            tick: self.tick,
            population,
            alive: self.alive_count(),
            best_fitness: self.fittest().map_or(0.0, Bird::fitness),
            mean_fitness: if population > 0 {
                fitness_sum / population as f64
            } else {
                0.0
            },
            best_score: self.birds.iter().map(|b| b.score).max().unwrap_or(0),
        }
    }
}
