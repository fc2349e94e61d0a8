use crate::colors::{Rgb, SEASON_COLORS};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range a value is sampled from
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMax<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> MinMax<T> {
    /// Build a range, swapping the bounds if they are given backwards
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn fixed(v: T) -> Self {
        Self { min: v, max: v }
    }

    /// Same range with the bounds in order
    pub fn ordered(self) -> Self {
        Self::new(self.min, self.max)
    }
}

#[cfg(test)]
impl<T: PartialOrd + Copy> MinMax<T> {
    pub fn contains(&self, v: T) -> bool {
        v >= self.min && v <= self.max
    }
}

impl MinMax<f32> {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        let r = self.ordered();
        if r.min == r.max {
            return r.min;
        }
        rng.gen_range(r.min..=r.max)
    }
}

impl MinMax<u32> {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        let r = self.ordered();
        rng.gen_range(r.min..=r.max)
    }
}

/// Growth behavior presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Branches stretch to a fixed length and sprout one twig at a time
    Sprout,
    /// Branch tips crawl toward the sun, then thicken
    Seek,
    /// Branches grow, then split into a left/right pair
    Fork,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Sprout => "sprout",
            Variant::Seek => "seek",
            Variant::Fork => "fork",
        }
    }
}

/// How a branch's tip advances
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Growth {
    /// Tip slides from start to a precomputed target over the grow duration
    Interpolate,
    /// Tip takes random-length steps toward the sun
    SeekLight,
}

/// How phase thresholds are derived for a new branch
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhasePlan {
    /// Eligible to branch for its whole life, never thickens
    AlwaysBranching,
    /// Branching window opens once growth finishes and lasts `window` seconds
    AfterGrowth { window: f32 },
    /// Absolute thresholds in seconds of branch life
    Fixed { branch_at: f32, thicken_at: f32 },
}

/// Per-frame probability of spawning while in the branching phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnChance {
    /// Probability equals growth progress (0..1)
    Progress,
    Fixed(f32),
}

/// How many children one spawn event produces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnShape {
    Single,
    /// One child bent left and one bent right
    Pair,
}

impl SpawnShape {
    pub fn count(self) -> u32 {
        match self {
            SpawnShape::Single => 1,
            SpawnShape::Pair => 2,
        }
    }
}

/// Stroke width used when drawing a branch
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokeRule {
    Fixed(f32),
    /// `max_generations / (generation + 1)`
    GenerationInverse,
    /// Accumulated branch thickness
    Thickness,
}

/// Branch growth rules for one variant
#[derive(Clone, Debug, PartialEq)]
pub struct BranchRules {
    pub growth: Growth,
    pub phases: PhasePlan,
    pub chance: SpawnChance,
    pub shape: SpawnShape,
    pub grow_duration: MinMax<f32>, // seconds
    pub children: Option<MinMax<u32>>,
    pub spawn_along: MinMax<f32>,   // fraction of the parent segment
    pub decay: MinMax<f32>,         // child size/thickness multiplier
    pub angle: MinMax<f32>,         // degrees added to the parent angle
    pub step: MinMax<f32>,          // dots per frame when seeking
    pub thicken: MinMax<f32>,       // thickness added per frame
    pub stroke: StrokeRule,
}

impl BranchRules {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Sprout => Self {
                growth: Growth::Interpolate,
                phases: PhasePlan::AlwaysBranching,
                chance: SpawnChance::Progress,
                shape: SpawnShape::Single,
                grow_duration: MinMax::new(1.0, 2.5),
                children: Some(MinMax::new(1, 3)),
                spawn_along: MinMax::new(0.7, 1.0),
                decay: MinMax::new(0.7, 0.9),
                angle: MinMax::new(-15.0, 15.0),
                step: MinMax::fixed(0.0),
                thicken: MinMax::fixed(0.0),
                stroke: StrokeRule::Fixed(2.0),
            },
            Variant::Seek => Self {
                growth: Growth::SeekLight,
                phases: PhasePlan::Fixed {
                    branch_at: 1.5,
                    thicken_at: 4.0,
                },
                chance: SpawnChance::Fixed(0.10),
                shape: SpawnShape::Single,
                grow_duration: MinMax::new(1.0, 2.0),
                children: None,
                spawn_along: MinMax::new(0.3, 1.0),
                decay: MinMax::new(0.7, 0.9),
                angle: MinMax::new(-30.0, 30.0),
                step: MinMax::new(0.2, 0.8),
                thicken: MinMax::new(0.0, 0.05),
                stroke: StrokeRule::Thickness,
            },
            Variant::Fork => Self {
                growth: Growth::Interpolate,
                phases: PhasePlan::AfterGrowth { window: 1.0 },
                chance: SpawnChance::Fixed(0.25),
                shape: SpawnShape::Pair,
                grow_duration: MinMax::new(0.8, 1.6),
                children: Some(MinMax::fixed(2)),
                spawn_along: MinMax::new(0.7, 1.0),
                decay: MinMax::new(0.65, 0.85),
                angle: MinMax::new(15.0, 35.0),
                step: MinMax::fixed(0.0),
                thicken: MinMax::new(0.0, 0.03),
                stroke: StrokeRule::GenerationInverse,
            },
        }
    }

    /// Total branches one tree may hold, if the variant bounds it
    pub fn default_branch_cap(variant: Variant) -> Option<usize> {
        match variant {
            Variant::Seek => Some(400),
            Variant::Sprout | Variant::Fork => None,
        }
    }
}

/// Seasonal background cycle
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonConfig {
    pub colors: [Rgb; 4],
    pub duration: MinMax<f32>, // seconds per season
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            colors: SEASON_COLORS,
            duration: MinMax::new(2.0, 4.0),
        }
    }
}

/// Lifespan range trees are replanted after, in seconds
pub const DEFAULT_TREE_AGE: MinMax<f32> = MinMax {
    min: 8.0,
    max: 20.0,
};

/// Everything the forest driver needs to plant and grow trees
#[derive(Clone, Debug, PartialEq)]
pub struct ForestConfig {
    pub variant: Variant,
    pub rules: BranchRules,
    pub trees: MinMax<u32>,
    pub generations: MinMax<u32>,
    pub trunk_size: MinMax<f32>,      // fraction of canvas height
    pub trunk_thickness: MinMax<f32>, // dots
    pub root_jitter: MinMax<f32>,     // degrees around straight up
    pub tree_age: Option<MinMax<f32>>,
    pub branch_cap: Option<usize>,
    pub orbit_radius: f32, // fraction of the smaller canvas side
    pub orbit_speed: f32,  // radians per second
    pub season: SeasonConfig,
    pub seed: u64,
}

impl ForestConfig {
    pub fn new(variant: Variant, seed: u64) -> Self {
        Self {
            variant,
            rules: BranchRules::for_variant(variant),
            trees: MinMax::new(1, 5),
            generations: MinMax::new(5, 7),
            trunk_size: MinMax::new(0.08, 0.16),
            trunk_thickness: MinMax::new(2.0, 4.0),
            root_jitter: MinMax::new(-10.0, 10.0),
            tree_age: Some(DEFAULT_TREE_AGE),
            branch_cap: BranchRules::default_branch_cap(variant),
            orbit_radius: 0.4,
            orbit_speed: 0.4,
            season: SeasonConfig::default(),
            seed,
        }
    }

    /// Switch variant, resetting the rules and branch cap to that variant's preset
    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
        self.rules = BranchRules::for_variant(variant);
        self.branch_cap = BranchRules::default_branch_cap(variant);
    }
}

/// Longest accepted delay between frames, in seconds
pub const MAX_FRAME_DELAY: f32 = 1.0;

const DEFAULT_FRAME_DELAY: f32 = 0.03;

/// Clamp a requested frame delay into `[0, MAX_FRAME_DELAY]`
pub fn frame_delay(seconds: f32) -> f32 {
    if seconds.is_nan() {
        return DEFAULT_FRAME_DELAY;
    }
    seconds.clamp(0.0, MAX_FRAME_DELAY)
}

/// Options for a garden run
#[derive(Clone)]
pub struct GardenConfig {
    pub print: bool,
    pub time_step: f32,
    pub frames: u32,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub hud: bool,
    pub seed: Option<u64>,
    pub forest: ForestConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_minmax_swaps_backwards_bounds() {
        let r = MinMax::new(0.9_f32, 0.7);
        assert_eq!(r.min, 0.7);
        assert_eq!(r.max, 0.9);
    }

    #[test]
    fn test_minmax_float_sample_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = MinMax::new(0.7_f32, 0.9);
        for _ in 0..1000 {
            assert!(r.contains(r.sample(&mut rng)));
        }
    }

    #[test]
    fn test_minmax_int_sample_is_inclusive() {
        let mut rng = StdRng::seed_from_u64(2);
        let r = MinMax::new(5_u32, 7);
        let mut seen = [false; 3];
        for _ in 0..1000 {
            let v = r.sample(&mut rng);
            assert!(r.contains(v));
            seen[(v - 5) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_minmax_sample_unordered_fields() {
        let mut rng = StdRng::seed_from_u64(3);
        let r = MinMax { min: 4.0_f32, max: 2.0 };
        let v = r.sample(&mut rng);
        assert!((2.0..=4.0).contains(&v));
    }

    #[test]
    fn test_minmax_fixed() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(MinMax::fixed(1.0_f32).sample(&mut rng), 1.0);
        assert_eq!(MinMax::fixed(2_u32).sample(&mut rng), 2);
    }

    #[test]
    fn test_presets_have_sane_fractions() {
        for v in [Variant::Sprout, Variant::Seek, Variant::Fork] {
            let rules = BranchRules::for_variant(v);
            assert!(rules.spawn_along.min >= 0.0 && rules.spawn_along.max <= 1.0);
            assert!(rules.decay.max < 1.0);
            assert!(rules.grow_duration.min > 0.0);
        }
    }

    #[test]
    fn test_fork_cap_fits_one_pair() {
        let rules = BranchRules::for_variant(Variant::Fork);
        assert_eq!(rules.shape.count(), 2);
        assert_eq!(rules.children, Some(MinMax::fixed(2)));
    }

    #[test]
    fn test_set_variant_swaps_rules() {
        let mut cfg = ForestConfig::new(Variant::Sprout, 0);
        cfg.set_variant(Variant::Seek);
        assert_eq!(cfg.rules.growth, Growth::SeekLight);
        assert_eq!(cfg.branch_cap, Some(400));
    }

    #[test]
    fn test_frame_delay_is_bounded() {
        assert_eq!(frame_delay(0.05), 0.05);
        assert_eq!(frame_delay(-1.0), 0.0);
        assert_eq!(frame_delay(1e30), MAX_FRAME_DELAY);
        assert_eq!(frame_delay(f32::INFINITY), MAX_FRAME_DELAY);
        assert_eq!(frame_delay(f32::NAN), DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn test_sprout_spread_is_narrow() {
        let rules = BranchRules::for_variant(Variant::Sprout);
        assert_eq!(rules.angle, MinMax::new(-15.0, 15.0));
    }
}
