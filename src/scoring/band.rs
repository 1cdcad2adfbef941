use serde::{Deserialize, Serialize};
use std::fmt;

/// Cutoffs used to bucket composite scores.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    /// Lowest score rated `Standard` (default: 525)
    pub standard_from: u16,

    /// Lowest score rated `Good` (default: 710)
    pub good_from: u16,

    /// Highest score on the bad side of the binary cut, inclusive (default: 590)
    pub bad_up_to: u16,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            standard_from: 525,
            good_from: 710,
            bad_up_to: 590,
        }
    }
}

/// Three-way credit rating, encoded 0/1/2 in the cleaned training table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    Bad,
    Standard,
    Good,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 3] = [ScoreBand::Bad, ScoreBand::Standard, ScoreBand::Good];

    pub fn classify(score: u16, bands: &BandConfig) -> Self {
        if score < bands.standard_from {
            ScoreBand::Bad
        } else if score < bands.good_from {
            ScoreBand::Standard
        } else {
            ScoreBand::Good
        }
    }

    /// Parse a rating label or its 0/1/2 code.
    pub fn from_label(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        match lower.as_str() {
            "bad" | "poor" | "0" => Some(ScoreBand::Bad),
            "standard" | "std" | "1" => Some(ScoreBand::Standard),
            "good" | "2" => Some(ScoreBand::Good),
            _ => None,
        }
    }

    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(ScoreBand::Bad),
            1 => Some(ScoreBand::Standard),
            2 => Some(ScoreBand::Good),
            _ => None,
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            ScoreBand::Bad => 0,
            ScoreBand::Standard => 1,
            ScoreBand::Good => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreBand::Bad => "Bad",
            ScoreBand::Standard => "Standard",
            ScoreBand::Good => "Good",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary good/bad category: 0 up to and including `bad_up_to`, 1 above it.
pub fn binary_category(score: u16, bands: &BandConfig) -> u8 {
    if score > bands.bad_up_to {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        let bands = BandConfig::default();
        assert_eq!(ScoreBand::classify(300, &bands), ScoreBand::Bad);
        assert_eq!(ScoreBand::classify(524, &bands), ScoreBand::Bad);
        assert_eq!(ScoreBand::classify(525, &bands), ScoreBand::Standard);
        assert_eq!(ScoreBand::classify(709, &bands), ScoreBand::Standard);
        assert_eq!(ScoreBand::classify(710, &bands), ScoreBand::Good);
        assert_eq!(ScoreBand::classify(850, &bands), ScoreBand::Good);
    }

    #[test]
    fn test_binary_category() {
        let bands = BandConfig::default();
        assert_eq!(binary_category(589, &bands), 0);
        assert_eq!(binary_category(590, &bands), 0);
        assert_eq!(binary_category(591, &bands), 1);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(ScoreBand::from_label("Good"), Some(ScoreBand::Good));
        assert_eq!(ScoreBand::from_label(" poor "), Some(ScoreBand::Bad));
        assert_eq!(ScoreBand::from_label("Std"), Some(ScoreBand::Standard));
        assert_eq!(ScoreBand::from_label("2"), Some(ScoreBand::Good));
        assert_eq!(ScoreBand::from_label("_"), None);
    }

    #[test]
    fn test_ordinal_roundtrip() {
        for band in ScoreBand::ALL {
            assert_eq!(ScoreBand::from_ordinal(band.ordinal()), Some(band));
        }
        assert_eq!(ScoreBand::from_ordinal(3), None);
    }

    #[test]
    fn test_band_config_parse() {
        let yaml = "standard_from: 500\ngood_from: 700\nbad_up_to: 580\n";
        let bands: BandConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(bands.standard_from, 500);
        assert_eq!(bands.bad_up_to, 580);
    }
}
