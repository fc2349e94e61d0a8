//! Per-frame branch growth, spawning and drawing
//!
//! Each frame walks a tree parent-first, children in insertion order:
//! 1. Age the branch by `dt`
//! 2. Derive its phase from age
//! 3. Grow: interpolated tips follow age, seeking tips step toward the sun
//! 4. Branching phase: maybe spawn one child (or a left/right pair)
//! 5. Thickening phase: add a random amount of thickness
//! 6. Draw the segment
//! 7. Descend into the children that existed before this frame

use crate::branch::{Branch, BranchId, Phase};
use crate::config::{BranchRules, Growth, SpawnChance, SpawnShape, StrokeRule};
use crate::surface::Surface;
use crate::tree::Tree;
use glam::Vec2;
use rand::Rng;

/// Per-frame inputs shared by every branch of a tree
pub struct Frame<'a> {
    pub dt: f32,
    pub sun: Vec2,
    pub rules: &'a BranchRules,
}

/// Advance and draw every branch of `tree` for one frame
pub fn grow_tree<R: Rng, S: Surface + ?Sized>(
    tree: &mut Tree,
    frame: &Frame,
    rng: &mut R,
    surface: &mut S,
) {
    // Explicit stack keeps deep trees off the call stack
    let mut stack: Vec<BranchId> = Vec::with_capacity(64);
    stack.push(Tree::ROOT);

    while let Some(id) = stack.pop() {
        let existing = tree.branch(id).children().len();

        step_branch(tree, id, frame, rng);
        draw_branch(tree, id, frame.rules, surface);

        // Children spawned this frame wait until the next one
        let children = &tree.branch(id).children()[..existing];
        stack.extend(children.iter().rev().copied());
    }
}

/// Steps 1-5 for a single branch
pub fn step_branch<R: Rng>(tree: &mut Tree, id: BranchId, frame: &Frame, rng: &mut R) {
    let rules = frame.rules;

    let phase = {
        let branch = tree.branch_mut(id);
        branch.life += frame.dt;
        if rules.growth == Growth::Interpolate {
            branch.tip = branch.interpolated_tip();
        }
        branch.phase()
    };

    match phase {
        Phase::Growing => {
            if rules.growth == Growth::SeekLight {
                seek(tree.branch_mut(id), frame.sun, rules, rng);
            }
        }
        Phase::Branching => {
            try_spawn(tree, id, rules, rng);
        }
        Phase::Thickening => {
            tree.branch_mut(id).thickness += rules.thicken.sample(rng);
        }
    }
}

/// Move the tip a random distance straight toward the sun
fn seek<R: Rng>(branch: &mut Branch, sun: Vec2, rules: &BranchRules, rng: &mut R) {
    let dir = (sun - branch.tip).normalize_or_zero();
    branch.tip += dir * rules.step.sample(rng);
}

/// Roll for a spawn and, if it succeeds, attach the new children.
/// Returns how many branches were added.
pub fn try_spawn<R: Rng>(tree: &mut Tree, id: BranchId, rules: &BranchRules, rng: &mut R) -> usize {
    let count = rules.shape.count();
    let parent = tree.branch(id);

    if parent.generation >= tree.max_generations
        || !parent.has_room_for(count)
        || !tree.has_room(count as usize)
    {
        return 0;
    }

    let chance = match rules.chance {
        SpawnChance::Progress => parent.progress(),
        SpawnChance::Fixed(p) => p,
    };
    let roll: f32 = rng.gen();
    if roll >= chance {
        return 0;
    }

    let along = rules.spawn_along.sample(rng);
    let at = parent.start.lerp(parent.tip, along);
    let (size, thickness, angle) = (parent.size, parent.thickness, parent.angle);
    let generation = parent.generation + 1;

    for side in 0..count {
        let offset = rules.angle.sample(rng);
        // Second child of a pair bends the other way
        let offset = if rules.shape == SpawnShape::Pair && side == 1 {
            -offset
        } else {
            offset
        };
        let decay = rules.decay.sample(rng);
        let child = Branch::new(
            at,
            size * decay,
            angle + offset,
            generation,
            thickness * decay,
            rules,
            rng,
        );
        tree.add_child(id, child);
    }

    count as usize
}

pub fn stroke_width(rule: StrokeRule, branch: &Branch, max_generations: u32) -> f32 {
    match rule {
        StrokeRule::Fixed(w) => w,
        StrokeRule::GenerationInverse => max_generations as f32 / (branch.generation + 1) as f32,
        StrokeRule::Thickness => branch.thickness,
    }
}

fn draw_branch<S: Surface + ?Sized>(tree: &Tree, id: BranchId, rules: &BranchRules, surface: &mut S) {
    let branch = tree.branch(id);
    surface.set_stroke(tree.color, stroke_width(rules.stroke, branch, tree.max_generations));
    surface.line(branch.start, branch.tip);
}
