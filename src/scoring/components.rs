//! The five per-factor scorers.
//!
//! Each scorer is compiled once from its rule section and then maps profile
//! fields to a 0-100 sub-score plus a short human readable explanation.

use anyhow::Result;

use super::config::{
    CreditMixRule, DelayedPaymentsRule, LoanMixRule, OrdinalMixRule, PaymentHistoryRule,
    ScoreTable, ShortHistoryRule,
};
use super::factors::{RangeOp, ThresholdTable};
use crate::profile::{CreditMix, DelayHistory, LoanPortfolio};

/// A sub-score before weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct SubScore {
    pub value: f64,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct PaymentHistoryScorer {
    base_score: f64,
    buckets: Vec<(RangeOp, String, f64)>,
    delayed_payments: Option<DelayedPaymentsRule>,
    short_history: Option<ShortHistoryRule>,
}

impl PaymentHistoryScorer {
    pub fn compile(rule: &PaymentHistoryRule) -> Result<Self> {
        let buckets = rule
            .buckets
            .iter()
            .map(|bucket| {
                RangeOp::parse(&bucket.range)
                    .map(|op| (op, bucket.range.clone(), bucket.deduction))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            base_score: rule.base_score,
            buckets,
            delayed_payments: rule.delayed_payments.clone(),
            short_history: rule.short_history.clone(),
        })
    }

    /// Score one summary delay value (counts as at most one late payment).
    pub fn score_single(&self, delay: f64, delayed_payments: f64, months_on_file: f64) -> SubScore {
        let counts = self.bucket_counts(std::iter::once(delay));
        self.finish(&counts, delayed_payments, months_on_file)
    }

    /// Score a full delay history, counting every late payment.
    pub fn score_series(
        &self,
        delays: &[f64],
        delayed_payments: f64,
        months_on_file: f64,
    ) -> SubScore {
        let counts = self.bucket_counts(delays.iter().copied());
        self.finish(&counts, delayed_payments, months_on_file)
    }

    pub fn score(
        &self,
        delays: &DelayHistory,
        delayed_payments: f64,
        months_on_file: f64,
    ) -> SubScore {
        match delays {
            DelayHistory::Single(delay) => {
                self.score_single(*delay, delayed_payments, months_on_file)
            }
            DelayHistory::Series(delays) => {
                self.score_series(delays, delayed_payments, months_on_file)
            }
        }
    }

    fn bucket_counts(&self, delays: impl Iterator<Item = f64>) -> Vec<u32> {
        let mut counts = vec![0u32; self.buckets.len()];
        for delay in delays {
            if let Some(index) = self.buckets.iter().position(|(op, _, _)| op.matches(delay)) {
                counts[index] += 1;
            }
        }
        counts
    }

    fn finish(&self, counts: &[u32], delayed_payments: f64, months_on_file: f64) -> SubScore {
        let mut notes = Vec::new();

        let mut deductions = 0.0;
        for ((_, range, deduction), count) in self.buckets.iter().zip(counts) {
            if *count > 0 {
                deductions += *count as f64 * deduction;
                notes.push(format!("{} in {} (-{})", count, range, *count as f64 * deduction));
            }
        }

        if let Some(rule) = &self.delayed_payments {
            let extra = (rule.per_payment * delayed_payments.max(0.0)).min(rule.cap);
            if extra > 0.0 {
                deductions += extra;
                notes.push(format!("{} delayed payments (-{})", delayed_payments, extra));
            }
        }

        let mut raw = (self.base_score - deductions).max(0.0);

        if let Some(rule) = &self.short_history {
            if months_on_file < rule.below_months && rule.span_months > 0.0 {
                let factor = rule.base_factor + months_on_file / rule.span_months;
                raw *= factor;
                notes.push(format!("{} months on file (x{:.3})", months_on_file, factor));
            }
        }

        let detail = if notes.is_empty() {
            "no late payments".to_string()
        } else {
            notes.join(", ")
        };

        SubScore {
            value: raw.min(100.0),
            detail,
        }
    }
}

/// Scorer backed by a single threshold table (utilization, history length, inquiries).
#[derive(Debug, Clone)]
pub struct TableScorer {
    table: ThresholdTable,
}

impl TableScorer {
    pub fn compile(table: &ScoreTable) -> Result<Self> {
        Ok(Self {
            table: ThresholdTable::compile(&table.buckets, table.default_score)?,
        })
    }

    pub fn score(&self, value: f64) -> SubScore {
        let hit = self.table.lookup(value);
        let detail = match hit.matched_range {
            Some(range) => format!("{} matched '{}'", value, range),
            None => format!("{} matched no bucket, default", value),
        };
        SubScore {
            value: hit.score.min(100.0),
            detail,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreditMixScorer {
    default_score: f64,
    ordinal: OrdinalMixRule,
    labels: Vec<(Vec<String>, f64)>,
    loans: LoanMixScorer,
}

impl CreditMixScorer {
    pub fn compile(rule: &CreditMixRule) -> Result<Self> {
        let labels = rule
            .labels
            .iter()
            .map(|label| {
                let keywords = label.keywords.iter().map(|k| k.to_lowercase()).collect();
                (keywords, label.score)
            })
            .collect();
        Ok(Self {
            default_score: rule.default_score,
            ordinal: rule.ordinal.clone(),
            labels,
            loans: LoanMixScorer::compile(&rule.loans)?,
        })
    }

    pub fn score(&self, mix: &CreditMix) -> SubScore {
        match mix {
            CreditMix::Unknown => SubScore {
                value: self.default_score,
                detail: "no credit mix reported, default".to_string(),
            },
            CreditMix::Ordinal(value) => self.score_ordinal(*value),
            CreditMix::Rating(label) => self.score_label(label),
            CreditMix::Loans(portfolio) => self.loans.score(portfolio),
        }
    }

    fn score_ordinal(&self, value: i64) -> SubScore {
        // Codes past either end clamp to the nearest rating.
        let (score, name) = match value {
            v if v <= 0 => (self.ordinal.bad, "bad"),
            1 => (self.ordinal.standard, "standard"),
            _ => (self.ordinal.good, "good"),
        };
        SubScore {
            value: score.min(100.0),
            detail: format!("mix code {} ({})", value, name),
        }
    }

    fn score_label(&self, label: &str) -> SubScore {
        let lower = label.to_lowercase();
        let matched = self
            .labels
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k.as_str())));
        match matched {
            Some((_, score)) => SubScore {
                value: score.min(100.0),
                detail: format!("rated '{}'", label),
            },
            None => SubScore {
                value: self.default_score,
                detail: format!("rating '{}' not recognised, default", label),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct LoanMixScorer {
    rule: LoanMixRule,
    diversity: ThresholdTable,
}

impl LoanMixScorer {
    fn compile(rule: &LoanMixRule) -> Result<Self> {
        Ok(Self {
            rule: rule.clone(),
            diversity: ThresholdTable::compile(
                &rule.diversity.buckets,
                rule.diversity.default_score,
            )?,
        })
    }

    fn score(&self, portfolio: &LoanPortfolio) -> SubScore {
        if portfolio.count <= 0.0 {
            return SubScore {
                value: self.rule.no_loans_score,
                detail: "no loans on file".to_string(),
            };
        }

        let distinct = portfolio.distinct_types();
        let ratio = if self.rule.canonical_types > 0.0 {
            distinct.len() as f64 / self.rule.canonical_types
        } else {
            0.0
        };
        let diversity_score = self.diversity.lookup(ratio).score;

        let has_any = |keywords: &[String]| {
            distinct
                .iter()
                .any(|loan| keywords.iter().any(|k| loan.contains(&k.to_lowercase())))
        };
        let good_mix = has_any(&self.rule.revolving_keywords)
            && has_any(&self.rule.installment_keywords);
        let mix_score = if good_mix {
            self.rule.good_mix_score
        } else {
            self.rule.plain_mix_score
        };

        let raw = diversity_score * self.rule.diversity_weight + mix_score * self.rule.mix_weight;
        SubScore {
            value: raw.min(100.0),
            detail: format!(
                "{} distinct loan types (diversity {}), {}",
                distinct.len(),
                diversity_score,
                if good_mix {
                    "revolving + installment"
                } else {
                    "unbalanced mix"
                }
            ),
        }
    }
}
