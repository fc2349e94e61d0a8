use crate::colors::Rgb;
use crate::config::{BranchRules, ForestConfig, MinMax, Variant, DEFAULT_TREE_AGE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// User settings from `config.toml`. Every field is optional; missing ones
/// keep the built-in defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub forest: ForestSettings,
    #[serde(default)]
    pub season: SeasonSettings,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSettings {
    pub variant: Option<Variant>,
    pub trees: Option<MinMax<u32>>,
    pub generations: Option<MinMax<u32>>,
    pub trunk_size: Option<MinMax<f32>>,
    pub trunk_thickness: Option<MinMax<f32>>,
    pub root_jitter: Option<MinMax<f32>>,
    pub replant: Option<bool>,         // false: trees grow forever
    pub tree_age: Option<MinMax<f32>>, // seconds before a tree is replanted
    pub limit_branches: Option<bool>,  // false: no per-tree branch cap
    pub branch_cap: Option<usize>,
    pub orbit_radius: Option<f32>,
    pub orbit_speed: Option<f32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSettings {
    pub colors: Option<[String; 4]>, // spring, summer, autumn, winter
    pub duration: Option<MinMax<f32>>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown color {0:?}")]
    Color(String),
    #[error("{field} out of range: {reason}")]
    Range {
        field: &'static str,
        reason: &'static str,
    },
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

impl Settings {
    /// Load from the default location; a missing file means defaults
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seasonwood")
            .join("config.toml")
    }

    /// Overlay these settings on `config`. Nothing changes unless every
    /// value is valid.
    pub fn apply(&self, config: &mut ForestConfig) -> Result<(), SettingsError> {
        let mut next = config.clone();
        let f = &self.forest;

        if let Some(variant) = f.variant {
            next.set_variant(variant);
        }
        if let Some(trees) = f.trees {
            next.trees = trees.ordered();
        }
        if let Some(generations) = f.generations {
            next.generations = generations.ordered();
        }
        if let Some(size) = f.trunk_size {
            next.trunk_size = size.ordered();
        }
        if let Some(thickness) = f.trunk_thickness {
            next.trunk_thickness = thickness.ordered();
        }
        if let Some(jitter) = f.root_jitter {
            next.root_jitter = jitter.ordered();
        }
        if let Some(age) = f.tree_age {
            next.tree_age = Some(age.ordered());
        }
        if let Some(cap) = f.branch_cap {
            next.branch_cap = Some(cap);
        }
        match f.replant {
            Some(false) => next.tree_age = None,
            Some(true) if next.tree_age.is_none() => next.tree_age = Some(DEFAULT_TREE_AGE),
            _ => {}
        }
        match f.limit_branches {
            Some(false) => next.branch_cap = None,
            Some(true) if next.branch_cap.is_none() => {
                next.branch_cap = BranchRules::default_branch_cap(next.variant)
            }
            _ => {}
        }
        if let Some(radius) = f.orbit_radius {
            next.orbit_radius = radius;
        }
        if let Some(speed) = f.orbit_speed {
            next.orbit_speed = speed;
        }

        if let Some(names) = &self.season.colors {
            for (slot, name) in names.iter().enumerate() {
                next.season.colors[slot] =
                    Rgb::parse(name).ok_or_else(|| SettingsError::Color(name.clone()))?;
            }
        }
        if let Some(duration) = self.season.duration {
            next.season.duration = duration.ordered();
        }

        validate(&next)?;
        *config = next;
        Ok(())
    }

    /// Settings that reproduce `config` exactly, for `seasonwood config`
    pub fn describe(config: &ForestConfig, log_file: Option<PathBuf>) -> Self {
        Self {
            log_file,
            forest: ForestSettings {
                variant: Some(config.variant),
                trees: Some(config.trees),
                generations: Some(config.generations),
                trunk_size: Some(config.trunk_size),
                trunk_thickness: Some(config.trunk_thickness),
                root_jitter: Some(config.root_jitter),
                replant: Some(config.tree_age.is_some()),
                tree_age: config.tree_age,
                limit_branches: Some(config.branch_cap.is_some()),
                branch_cap: config.branch_cap,
                orbit_radius: Some(config.orbit_radius),
                orbit_speed: Some(config.orbit_speed),
            },
            season: SeasonSettings {
                colors: Some(config.season.colors.map(|c| c.to_string())),
                duration: Some(config.season.duration),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn validate(config: &ForestConfig) -> Result<(), SettingsError> {
    let range = |field: &'static str, reason: &'static str| -> Result<(), SettingsError> {
        Err(SettingsError::Range { field, reason })
    };

    let mut ranges = vec![
        ("trunk_size", config.trunk_size),
        ("trunk_thickness", config.trunk_thickness),
        ("root_jitter", config.root_jitter),
        ("season.duration", config.season.duration),
    ];
    if let Some(age) = config.tree_age {
        ranges.push(("tree_age", age));
    }
    for (field, r) in ranges {
        if !r.min.is_finite() || !r.max.is_finite() {
            return range(field, "bounds must be finite numbers");
        }
    }
    for (field, v) in [
        ("orbit_radius", config.orbit_radius),
        ("orbit_speed", config.orbit_speed),
    ] {
        if !v.is_finite() {
            return range(field, "must be a finite number");
        }
    }

    if config.generations.min < 1 {
        return range("generations", "trees need at least one generation");
    }
    if config.trunk_size.min <= 0.0 || config.trunk_size.max > 1.0 {
        return range("trunk_size", "must be a fraction in (0, 1]");
    }
    if config.trunk_thickness.min < 0.0 {
        return range("trunk_thickness", "must not be negative");
    }
    if let Some(age) = config.tree_age {
        if age.min <= 0.0 {
            return range("tree_age", "must be positive");
        }
    }
    if config.orbit_radius < 0.0 {
        return range("orbit_radius", "must not be negative");
    }
    if config.season.duration.min <= 0.0 {
        return range("season.duration", "must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::SEASON_COLORS;

    fn defaults() -> ForestConfig {
        ForestConfig::new(Variant::Sprout, 1)
    }

    #[test]
    fn test_empty_file_is_default() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());

        let mut config = defaults();
        settings.apply(&mut config).unwrap();
        assert_eq!(config, defaults());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("seasonwood-no-such-dir/config.toml");
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_and_apply() {
        let settings = Settings::parse(
            r##"
log_file = "/tmp/seasonwood.log"

[forest]
variant = "seek"
trees = { min = 4, max = 2 }
orbit_speed = 1.5

[season]
colors = ["green", "#ffd700", "orange", "#fff"]
duration = { min = 1.0, max = 1.0 }
"##,
        )
        .unwrap();
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/seasonwood.log")));

        let mut config = defaults();
        settings.apply(&mut config).unwrap();
        assert_eq!(config.variant, Variant::Seek);
        assert_eq!(config.branch_cap, Some(400));
        assert_eq!(config.trees, MinMax::new(2, 4));
        assert_eq!(config.orbit_speed, 1.5);
        assert_eq!(config.season.colors[1], Rgb::new(255, 215, 0));
        assert_eq!(config.season.colors[3], Rgb::new(255, 255, 255));
        assert_eq!(config.season.duration, MinMax::fixed(1.0));
    }

    #[test]
    fn test_bad_color_rejected_without_changes() {
        let settings = Settings::parse(
            r#"
[forest]
orbit_speed = 9.0

[season]
colors = ["cyan", "blue", "nope", "white"]
"#,
        )
        .unwrap();
        let mut config = defaults();
        match settings.apply(&mut config) {
            Err(SettingsError::Color(name)) => assert_eq!(name, "nope"),
            other => panic!("expected color error, got {other:?}"),
        }
        assert_eq!(config, defaults());
        assert_eq!(config.season.colors, SEASON_COLORS);
    }

    #[test]
    fn test_range_checked() {
        let settings = Settings::parse("[forest]\ntrunk_size = { min = 0.5, max = 3.0 }\n").unwrap();
        let mut config = defaults();
        assert!(matches!(
            settings.apply(&mut config),
            Err(SettingsError::Range { field: "trunk_size", .. })
        ));

        let settings = Settings::parse("[season]\nduration = { min = 0.0, max = 2.0 }\n").unwrap();
        assert!(matches!(
            settings.apply(&mut config),
            Err(SettingsError::Range { field: "season.duration", .. })
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected_without_changes() {
        let cases = [
            ("[season]\nduration = { min = nan, max = 2.0 }\n", "season.duration"),
            ("[forest]\ntree_age = { min = 1.0, max = inf }\n", "tree_age"),
            ("[forest]\nroot_jitter = { min = -inf, max = 0.0 }\n", "root_jitter"),
            ("[forest]\ntrunk_thickness = { min = 1.0, max = nan }\n", "trunk_thickness"),
            ("[forest]\norbit_speed = nan\n", "orbit_speed"),
            ("[forest]\norbit_radius = inf\n", "orbit_radius"),
        ];
        for (text, expected) in cases {
            let settings = Settings::parse(text).unwrap();
            let mut config = defaults();
            match settings.apply(&mut config) {
                Err(SettingsError::Range { field, .. }) => assert_eq!(field, expected),
                other => panic!("{text:?}: expected range error, got {other:?}"),
            }
            assert_eq!(config, defaults());
        }
    }

    #[test]
    fn test_applied_settings_can_plant_a_forest() {
        let settings = Settings::parse(
            "[forest]\ntree_age = { min = 1.0, max = 3.0 }\n[season]\nduration = { min = 0.5, max = 2.0 }\n",
        )
        .unwrap();
        let mut config = defaults();
        settings.apply(&mut config).unwrap();
        let forest = crate::forest::Forest::new(config, glam::Vec2::new(80.0, 48.0));
        assert!(!forest.trees().is_empty());
    }

    #[test]
    fn test_replanting_and_branch_cap_can_be_switched_off() {
        let settings =
            Settings::parse("[forest]\nvariant = \"seek\"\nreplant = false\nlimit_branches = false\n")
                .unwrap();
        let mut config = defaults();
        settings.apply(&mut config).unwrap();
        assert_eq!(config.variant, Variant::Seek);
        assert_eq!(config.tree_age, None);
        assert_eq!(config.branch_cap, None);

        // Switching back on restores the built-in ranges
        let settings = Settings::parse("[forest]\nreplant = true\nlimit_branches = true\n").unwrap();
        settings.apply(&mut config).unwrap();
        assert_eq!(config.tree_age, Some(DEFAULT_TREE_AGE));
        assert_eq!(config.branch_cap, Some(400));
    }

    #[test]
    fn test_describe_keeps_disabled_replanting() {
        let mut config = defaults();
        config.tree_age = None;
        let text = Settings::describe(&config, None).to_toml().unwrap();
        assert!(text.contains("replant = false"));

        let mut rebuilt = defaults();
        Settings::parse(&text).unwrap().apply(&mut rebuilt).unwrap();
        assert_eq!(rebuilt.tree_age, None);
    }

    #[test]
    fn test_wrong_color_count_fails_to_parse() {
        assert!(Settings::parse("[season]\ncolors = [\"red\", \"blue\"]\n").is_err());
    }

    #[test]
    fn test_describe_round_trips_through_toml() {
        let mut config = ForestConfig::new(Variant::Fork, 3);
        config.season.colors[2] = Rgb::new(12, 34, 56);
        let text = Settings::describe(&config, None).to_toml().unwrap();
        assert!(text.contains("variant = \"fork\""));
        assert!(text.contains("#0c2238"));

        let mut rebuilt = ForestConfig::new(Variant::Sprout, 3);
        Settings::parse(&text).unwrap().apply(&mut rebuilt).unwrap();
        assert_eq!(rebuilt, config);
    }

    #[test]
    fn test_read_error_names_path() {
        let dir = std::env::temp_dir();
        let err = Settings::load_from(&dir).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
        assert!(err.to_string().contains(&dir.display().to_string()));
    }
}
