//! Forest driver: owns the trees, the season cycle, the sun and the random source

use crate::colors::TREE_PALETTE;
use crate::config::ForestConfig;
use crate::growth::{grow_tree, Frame};
use crate::season::SeasonCycle;
use crate::surface::Surface;
use crate::tree::{Planting, Tree};
use glam::Vec2;
use rand::prelude::*;
use tracing::debug;

pub struct Forest {
    config: ForestConfig,
    rng: StdRng,
    trees: Vec<Tree>,
    season: SeasonCycle,
    canvas: Vec2,
    orbit: f32, // radians
    sun: Vec2,
    frames: u64,
}

impl Forest {
    /// Plant a forest on a canvas of `canvas` dots
    pub fn new(config: ForestConfig, canvas: Vec2) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let season = SeasonCycle::new(config.season.clone(), &mut rng);
        let count = config.trees.sample(&mut rng) as usize;

        let trees = (0..count)
            .map(|slot| {
                let planting = Planting::sample(&config, canvas, palette(slot), &mut rng);
                Tree::plant(planting, &config.rules, &mut rng)
            })
            .collect();

        let mut forest = Self {
            config,
            rng,
            trees,
            season,
            canvas,
            orbit: 0.0,
            sun: canvas * 0.5,
            frames: 0,
        };
        forest.sun = forest.orbit_position();
        forest
    }

    /// Replant every tree, e.g. after the canvas changed size
    pub fn reset(&mut self, canvas: Vec2) {
        self.canvas = canvas;
        for slot in 0..self.trees.len() {
            self.replant(slot);
        }
        self.sun = self.orbit_position();
    }

    /// Advance and draw one frame
    pub fn frame<S: Surface + ?Sized>(&mut self, dt: f32, pointer: Option<Vec2>, surface: &mut S) {
        self.frames += 1;

        if self.season.advance(dt, &mut self.rng) {
            debug!(season = self.season.season().name(), "season turned");
        }
        surface.clear(self.season.color());

        self.orbit = (self.orbit + self.config.orbit_speed * dt) % std::f32::consts::TAU;
        self.sun = pointer.unwrap_or_else(|| self.orbit_position());

        for slot in 0..self.trees.len() {
            self.trees[slot].age += dt;
            if self.trees[slot].is_done() {
                self.replant(slot);
            }

            let frame = Frame {
                dt,
                sun: self.sun,
                rules: &self.config.rules,
            };
            grow_tree(&mut self.trees[slot], &frame, &mut self.rng, surface);
        }
    }

    fn replant(&mut self, slot: usize) {
        let planting = Planting::sample(&self.config, self.canvas, palette(slot), &mut self.rng);
        debug!(
            slot,
            max_generations = planting.max_generations,
            lifespan = ?planting.lifespan,
            "replanting tree"
        );
        self.trees[slot].replant(planting, &self.config.rules, &mut self.rng);
    }

    fn orbit_position(&self) -> Vec2 {
        let center = self.canvas * 0.5;
        let radius = self.config.orbit_radius * self.canvas.x.min(self.canvas.y);
        center + Vec2::new(self.orbit.cos(), self.orbit.sin()) * radius
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn season(&self) -> &SeasonCycle {
        &self.season
    }

    pub fn sun(&self) -> Vec2 {
        self.sun
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn branch_count(&self) -> usize {
        self.trees.iter().map(Tree::len).sum()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

#[cfg(test)]
impl Forest {
    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }
}

fn palette(slot: usize) -> crate::colors::Rgb {
    TREE_PALETTE[slot % TREE_PALETTE.len()]
}
