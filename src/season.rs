//! Background color cycling through the four seasons

use crate::colors::Rgb;
use crate::config::SeasonConfig;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

pub struct SeasonCycle {
    config: SeasonConfig,
    index: usize,
    elapsed: f32,
    length: f32,
    t: f32,
    color: Rgb,
}

impl SeasonCycle {
    pub fn new<R: Rng>(config: SeasonConfig, rng: &mut R) -> Self {
        let length = config.duration.sample(rng);
        let color = config.colors[0];
        Self {
            config,
            index: 0,
            elapsed: 0.0,
            length,
            t: 0.0,
            color,
        }
    }

    /// Advance by `dt` seconds. Returns true when a new season began.
    pub fn advance<R: Rng>(&mut self, dt: f32, rng: &mut R) -> bool {
        let count = self.config.colors.len();
        self.elapsed += dt;

        let turned = self.elapsed >= self.length;
        if turned {
            self.elapsed = 0.0;
            self.length = self.config.duration.sample(rng);
            self.index = (self.index + 1) % count;
        }

        self.t = if self.length > 0.0 {
            (self.elapsed / self.length).min(1.0)
        } else {
            0.0
        };
        let next = (self.index + 1) % count;
        self.color = self.config.colors[self.index].mix(self.config.colors[next], self.t);
        turned
    }

    pub fn season(&self) -> Season {
        Season::ALL[self.index]
    }

    /// Fraction of the current season already elapsed
    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

#[cfg(test)]
impl SeasonCycle {
    pub fn index(&self) -> usize {
        self.index
    }
}
