//! Branch arena for one tree

use crate::branch::{Branch, BranchId};
use crate::colors::Rgb;
use crate::config::{BranchRules, ForestConfig};
use glam::Vec2;
use rand::Rng;

/// Parameters for a fresh root, sampled once per (re)planting
#[derive(Clone, Debug, PartialEq)]
pub struct Planting {
    pub root: Vec2,
    pub size: f32,
    pub angle: f32, // degrees
    pub thickness: f32,
    pub max_generations: u32,
    pub color: Rgb,
    pub lifespan: Option<f32>,
    pub branch_cap: Option<usize>,
}

impl Planting {
    /// Sample a planting for a canvas of `canvas` dots
    pub fn sample<R: Rng>(config: &ForestConfig, canvas: Vec2, color: Rgb, rng: &mut R) -> Self {
        let x = rng.gen_range(0.1_f32..=0.9) * canvas.x;
        let y = (canvas.y - 1.0).max(0.0);
        Self {
            root: Vec2::new(x, y),
            size: config.trunk_size.sample(rng) * canvas.y,
            angle: -90.0 + config.root_jitter.sample(rng),
            thickness: config.trunk_thickness.sample(rng),
            max_generations: config.generations.sample(rng),
            color,
            lifespan: config.tree_age.map(|age| age.sample(rng)),
            branch_cap: config.branch_cap,
        }
    }
}

pub struct Tree {
    branches: Vec<Branch>,
    pub max_generations: u32,
    pub color: Rgb,
    pub age: f32,
    pub lifespan: Option<f32>,
    pub branch_cap: Option<usize>,
}

impl Tree {
    pub const ROOT: BranchId = 0;

    pub fn plant<R: Rng>(planting: Planting, rules: &BranchRules, rng: &mut R) -> Self {
        let root = Branch::new(
            planting.root,
            planting.size,
            planting.angle,
            0,
            planting.thickness,
            rules,
            rng,
        );

        Self {
            branches: vec![root],
            max_generations: planting.max_generations,
            color: planting.color,
            age: 0.0,
            lifespan: planting.lifespan,
            branch_cap: planting.branch_cap,
        }
    }

    /// Throw away every branch and start over from a new root
    pub fn replant<R: Rng>(&mut self, planting: Planting, rules: &BranchRules, rng: &mut R) {
        *self = Tree::plant(planting, rules, rng);
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id]
    }

    pub fn branch_mut(&mut self, id: BranchId) -> &mut Branch {
        &mut self.branches[id]
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether `count` more branches fit under the tree-wide cap
    pub fn has_room(&self, count: usize) -> bool {
        match self.branch_cap {
            Some(cap) => self.branches.len() + count <= cap,
            None => true,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.lifespan, Some(lifespan) if self.age >= lifespan)
    }

    /// Append `child` under `parent`, returning its id
    pub fn add_child(&mut self, parent: BranchId, child: Branch) -> BranchId {
        debug_assert_eq!(child.generation, self.branches[parent].generation + 1);
        let id = self.branches.len();
        self.branches.push(child);
        self.branches[parent].adopt(id);
        id
    }
}

#[cfg(test)]
impl Tree {
    pub fn root(&self) -> &Branch {
        &self.branches[Self::ROOT]
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Parent/child id pairs in arena order
    pub fn edges(&self) -> impl Iterator<Item = (BranchId, BranchId)> + '_ {
        self.branches
            .iter()
            .enumerate()
            .flat_map(|(id, b)| b.children().iter().map(move |&c| (id, c)))
    }
}
