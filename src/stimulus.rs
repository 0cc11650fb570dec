use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Probability of drawing the bad identity on any presentation
pub const BAD_FREQUENCY: f64 = 0.1;

const GOOD_LETTERS: [char; 15] = [
    'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'R', 'S', 'T',
];
const BAD_LETTER: char = 'X';

const GOOD_IMAGES: [&str; 11] = [
    "bighair", "blonde", "brunette", "cowboy", "eyeball", "fez", "french", "hair", "hawaiin",
    "sombraro", "space",
];
const BAD_IMAGE: &str = "aubergine";

/// Which kind of stimulus a session shows
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    #[default]
    Letter,
    Image,
}

impl FromStr for Variant {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "letter" => Ok(Variant::Letter),
            "image" => Ok(Variant::Image),
            _ => Err(GameError::UnknownVariant(s.to_string())),
        }
    }
}

/// One visual item: a character or a named image
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StimulusIdentity {
    Letter(char),
    Image(&'static str),
}

impl fmt::Display for StimulusIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StimulusIdentity::Letter(c) => write!(f, "{c}"),
            StimulusIdentity::Image(name) => f.write_str(name),
        }
    }
}

impl Serialize for StimulusIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fixed set of good identities plus the one bad identity
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusPool {
    good: Vec<StimulusIdentity>,
    bad: StimulusIdentity,
    bad_frequency: f64,
}

impl StimulusPool {
    pub fn for_variant(variant: Variant, bad_frequency: f64) -> Self {
        let (good, bad) = match variant {
            Variant::Letter => (
                GOOD_LETTERS.iter().copied().map(StimulusIdentity::Letter).collect(),
                StimulusIdentity::Letter(BAD_LETTER),
            ),
            Variant::Image => (
                GOOD_IMAGES.iter().copied().map(StimulusIdentity::Image).collect(),
                StimulusIdentity::Image(BAD_IMAGE),
            ),
        };
        Self {
            good,
            bad,
            bad_frequency,
        }
    }

    /// Bad identity with probability `bad_frequency`, otherwise a uniform good one
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> StimulusIdentity {
        if rng.gen::<f64>() <= self.bad_frequency {
            self.bad
        } else {
            self.good[rng.gen_range(0..self.good.len())]
        }
    }

    pub fn is_bad(&self, identity: &StimulusIdentity) -> bool {
        *identity == self.bad
    }

    pub fn bad(&self) -> StimulusIdentity {
        self.bad
    }

    pub fn good(&self) -> &[StimulusIdentity] {
        &self.good
    }
}
