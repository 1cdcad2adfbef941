use serde::Serialize;
use std::fmt;

const SAFE_Z: f64 = 2.99;
const GREY_Z: f64 = 1.81;
const LOW_PD: f64 = 0.05;
const ELEVATED_PD: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Decision {
    Approve,
    NeedsReview,
    Deny,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "Approve",
            Decision::NeedsReview => "Needs Further Review",
            Decision::Deny => "Deny",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine an Altman Z-score and a Merton default probability.
pub fn credit_decision(z_score: f64, default_probability: f64) -> Decision {
    if z_score >= SAFE_Z && default_probability <= LOW_PD {
        Decision::Approve
    } else if (GREY_Z..SAFE_Z).contains(&z_score)
        || (default_probability > LOW_PD && default_probability <= ELEVATED_PD)
    {
        Decision::NeedsReview
    } else {
        Decision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve() {
        assert_eq!(credit_decision(3.0, 0.01), Decision::Approve);
        assert_eq!(credit_decision(2.99, 0.05), Decision::Approve);
    }

    #[test]
    fn test_grey_zone_needs_review() {
        assert_eq!(credit_decision(2.0, 0.01), Decision::NeedsReview);
        assert_eq!(credit_decision(1.81, 0.5), Decision::NeedsReview);
    }

    #[test]
    fn test_elevated_pd_needs_review() {
        assert_eq!(credit_decision(3.0, 0.08), Decision::NeedsReview);
        assert_eq!(credit_decision(1.0, 0.10), Decision::NeedsReview);
    }

    #[test]
    fn test_deny() {
        assert_eq!(credit_decision(1.0, 0.2), Decision::Deny);
        assert_eq!(credit_decision(3.0, 0.2), Decision::Deny);
    }

    #[test]
    fn test_display() {
        assert_eq!(Decision::NeedsReview.to_string(), "Needs Further Review");
    }
}
