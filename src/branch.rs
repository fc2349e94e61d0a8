//! A single branch: one straight segment of a tree

use crate::config::{BranchRules, PhasePlan};
use glam::Vec2;
use rand::Rng;

/// Index of a branch inside its tree's arena
pub type BranchId = usize;

/// What a branch is doing this frame, derived from its age
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Growing,
    Branching,
    Thickening,
}

impl Phase {
    pub fn at(life: f32, branch_at: f32, thicken_at: f32) -> Phase {
        if life < branch_at {
            Phase::Growing
        } else if life < thicken_at {
            Phase::Branching
        } else {
            Phase::Thickening
        }
    }
}

/// End point of a segment of `size` leaving `start` at `angle` degrees
pub fn project(start: Vec2, size: f32, angle: f32) -> Vec2 {
    let rad = angle.to_radians();
    start + Vec2::new(rad.cos(), rad.sin()) * size
}

#[derive(Clone, Debug)]
pub struct Branch {
    pub start: Vec2,
    pub tip: Vec2,
    pub target: Vec2,
    pub angle: f32, // degrees
    pub size: f32,
    pub generation: u32,
    pub life: f32, // seconds
    pub thickness: f32,
    pub grow_duration: f32,
    pub max_children: Option<u32>,
    pub branch_at: f32,
    pub thicken_at: f32,
    children: Vec<BranchId>,
}

impl Branch {
    pub fn new<R: Rng>(
        start: Vec2,
        size: f32,
        angle: f32,
        generation: u32,
        thickness: f32,
        rules: &BranchRules,
        rng: &mut R,
    ) -> Self {
        let grow_duration = rules.grow_duration.sample(rng);
        let max_children = rules.children.map(|c| c.sample(rng));
        let (branch_at, thicken_at) = match rules.phases {
            PhasePlan::AlwaysBranching => (0.0, f32::INFINITY),
            PhasePlan::AfterGrowth { window } => (grow_duration, grow_duration + window),
            PhasePlan::Fixed {
                branch_at,
                thicken_at,
            } => (branch_at, thicken_at),
        };

        Self {
            start,
            tip: start,
            target: project(start, size, angle),
            angle,
            size,
            generation,
            life: 0.0,
            thickness,
            grow_duration,
            max_children,
            branch_at,
            thicken_at,
            children: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::at(self.life, self.branch_at, self.thicken_at)
    }

    /// Growth progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.grow_duration <= 0.0 {
            return 1.0;
        }
        (self.life / self.grow_duration).clamp(0.0, 1.0)
    }

    /// Where the tip sits for the current progress when growing by interpolation
    pub fn interpolated_tip(&self) -> Vec2 {
        self.start.lerp(self.target, self.progress())
    }

    pub fn children(&self) -> &[BranchId] {
        &self.children
    }

    /// Whether `count` more children fit under this branch's cap
    pub fn has_room_for(&self, count: u32) -> bool {
        match self.max_children {
            Some(cap) => self.children.len() as u32 + count <= cap,
            None => true,
        }
    }

    pub(crate) fn adopt(&mut self, child: BranchId) {
        self.children.push(child);
    }
}
