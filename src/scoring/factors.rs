use anyhow::{bail, Context, Result};

use super::config::ScoreBucket;

/// A threshold condition from a rule table row.
///
/// Accepted forms: `<N`, `<=N`, `>N`, `>=N`, `N`, `A-B` (inclusive) and
/// interval notation `(A,B]`, `[A,B)`, `(A,B)`, `[A,B]`.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOp {
    LessThan(f64),
    LessEqual(f64),
    GreaterThan(f64),
    GreaterEqual(f64),
    Equal(f64),
    Between(f64, f64), // Inclusive range: A-B
    Interval {
        low: f64,
        low_inclusive: bool,
        high: f64,
        high_inclusive: bool,
    },
}

impl RangeOp {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Empty range");
        }
        if let Some(val) = s.strip_prefix(">=") {
            Ok(RangeOp::GreaterEqual(parse_bound(val)?))
        } else if let Some(val) = s.strip_prefix("<=") {
            Ok(RangeOp::LessEqual(parse_bound(val)?))
        } else if let Some(val) = s.strip_prefix('>') {
            Ok(RangeOp::GreaterThan(parse_bound(val)?))
        } else if let Some(val) = s.strip_prefix('<') {
            Ok(RangeOp::LessThan(parse_bound(val)?))
        } else if s.starts_with('(') || s.starts_with('[') {
            parse_interval(s)
        } else if let Ok(value) = parse_bound(s) {
            Ok(RangeOp::Equal(value))
        } else if let Some((low, high)) = s.split_once('-').filter(|_| !s.starts_with('-')) {
            let low = parse_bound(low)?;
            let high = parse_bound(high)?;
            if low > high {
                bail!("Range low end exceeds high end: {}", s)
            }
            Ok(RangeOp::Between(low, high))
        } else {
            bail!("Invalid range format: {}", s)
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::LessEqual(n) => value <= *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Between(low, high) => value >= *low && value <= *high,
            RangeOp::Interval {
                low,
                low_inclusive,
                high,
                high_inclusive,
            } => {
                let above = if *low_inclusive { value >= *low } else { value > *low };
                let below = if *high_inclusive { value <= *high } else { value < *high };
                above && below
            }
        }
    }
}

fn parse_bound(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("'{}' is not a number", raw.trim()))?;
    if value.is_nan() {
        bail!("NaN is not a valid bound");
    }
    Ok(value)
}

fn parse_interval(s: &str) -> Result<RangeOp> {
    let low_inclusive = s.starts_with('[');
    let high_inclusive = if s.ends_with(']') {
        true
    } else if s.ends_with(')') {
        false
    } else {
        bail!("Interval must end with ']' or ')': {}", s)
    };
    let inner = &s[1..s.len() - 1];
    let Some((low, high)) = inner.split_once(',') else {
        bail!("Interval needs two bounds separated by ',': {}", s)
    };
    let low = parse_bound(low)?;
    let high = parse_bound(high)?;
    if low > high {
        bail!("Interval low end exceeds high end: {}", s)
    }
    Ok(RangeOp::Interval {
        low,
        low_inclusive,
        high,
        high_inclusive,
    })
}

/// A rule table compiled from configuration. Rows are checked in order and
/// the first matching row wins.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    rows: Vec<(RangeOp, String, f64)>,
    default_score: f64,
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketMatch {
    pub score: f64,
    pub matched_range: Option<String>,
}

impl ThresholdTable {
    pub fn compile(buckets: &[ScoreBucket], default_score: f64) -> Result<Self> {
        let rows = buckets
            .iter()
            .map(|bucket| {
                RangeOp::parse(&bucket.range)
                    .map(|op| (op, bucket.range.clone(), bucket.score))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows,
            default_score,
        })
    }

    pub fn lookup(&self, value: f64) -> BucketMatch {
        self.rows
            .iter()
            .find(|(op, _, _)| op.matches(value))
            .map(|(_, range, score)| BucketMatch {
                score: *score,
                matched_range: Some(range.clone()),
            })
            .unwrap_or(BucketMatch {
                score: self.default_score,
                matched_range: None,
            })
    }
}
