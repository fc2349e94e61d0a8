use crossterm::style::Color;
use std::fmt;

/// 24-bit color used throughout the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward `other` by `t` (0.0 = self, 1.0 = other), per channel in RGB space
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }

    /// Parse a CSS color name ("cyan") or hex triplet ("#00ffff", "0ff")
    pub fn parse(s: &str) -> Option<Rgb> {
        let s = s.trim();
        if let Some(rgb) = named(&s.to_ascii_lowercase()) {
            return Some(rgb);
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Rgb::new(r, g, b))
            }
            3 => {
                // Short form: each digit is doubled (#0af -> #00aaff)
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
                Some(Rgb::new(digit(0)?, digit(1)?, digit(2)?))
            }
            _ => None,
        }
    }

    pub fn to_color(self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Look up a named color
pub fn named(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "silver" => Rgb::new(192, 192, 192),
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "blue" => Rgb::new(0, 0, 255),
        "navy" => Rgb::new(0, 0, 128),
        "cyan" | "aqua" => Rgb::new(0, 255, 255),
        "teal" => Rgb::new(0, 128, 128),
        "magenta" | "fuchsia" => Rgb::new(255, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "orange" => Rgb::new(255, 165, 0),
        "brown" => Rgb::new(165, 42, 42),
        "olive" => Rgb::new(128, 128, 0),
        "purple" => Rgb::new(128, 0, 128),
        "pink" => Rgb::new(255, 192, 203),
        _ => return None,
    };
    Some(rgb)
}

/// Reference colors for spring, summer, autumn and winter
pub const SEASON_COLORS: [Rgb; 4] = [
    Rgb::new(0, 255, 255),   // cyan
    Rgb::new(0, 0, 255),     // blue
    Rgb::new(128, 128, 128), // gray
    Rgb::new(255, 255, 255), // white
];

/// Wood tones handed out to trees in planting order
pub const TREE_PALETTE: [Rgb; 6] = [
    Rgb::new(101, 67, 33),  // dark brown
    Rgb::new(139, 90, 43),  // light brown
    Rgb::new(34, 139, 34),  // forest green
    Rgb::new(70, 50, 40),   // bark
    Rgb::new(160, 82, 45),  // sienna
    Rgb::new(85, 107, 47),  // olive drab
];

/// Color of the sun marker
pub const SUN: Rgb = Rgb::new(255, 215, 0);

/// HUD text color
pub const HUD_TEXT: Rgb = Rgb::new(20, 20, 20);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints() {
        let a = Rgb::new(0, 255, 255);
        let b = Rgb::new(0, 0, 255);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
    }

    #[test]
    fn test_mix_midpoint() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        assert_eq!(black.mix(white, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_mix_clamps_fraction() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(a.mix(b, -1.0), a);
        assert_eq!(a.mix(b, 3.0), b);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Rgb::parse("cyan"), Some(Rgb::new(0, 255, 255)));
        assert_eq!(Rgb::parse(" Gray "), Some(Rgb::new(128, 128, 128)));
        assert_eq!(Rgb::parse("grey"), Rgb::parse("gray"));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#ff8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::parse("00ff00"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(Rgb::parse("#0af"), Some(Rgb::new(0, 170, 255)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Rgb::parse("chartreuse-ish"), None);
        assert_eq!(Rgb::parse("#12345"), None);
        assert_eq!(Rgb::parse("#gg0000"), None);
        assert_eq!(Rgb::parse(""), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let c = Rgb::new(1, 171, 255);
        assert_eq!(c.to_string(), "#01abff");
        assert_eq!(Rgb::parse(&c.to_string()), Some(c));
    }

    #[test]
    fn test_season_defaults_match_names() {
        assert_eq!(Some(SEASON_COLORS[0]), named("cyan"));
        assert_eq!(Some(SEASON_COLORS[1]), named("blue"));
        assert_eq!(Some(SEASON_COLORS[2]), named("gray"));
        assert_eq!(Some(SEASON_COLORS[3]), named("white"));
    }
}
