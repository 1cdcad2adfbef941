use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::band::{BandConfig, ScoreBand};
use super::components::{CreditMixScorer, PaymentHistoryScorer, SubScore, TableScorer};
use super::config::{RuleSet, Scale, ScoringConfig, Weights};
use crate::profile::CreditProfile;

/// The five 0-100 sub-scores, after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub payment_history: f64,
    pub utilization: f64,
    pub history_length: f64,
    pub credit_mix: f64,
    pub inquiries: f64,
}

impl ComponentScores {
    /// Sub-scores in combination order: payment, utilization, history, mix, inquiries
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.payment_history,
            self.utilization,
            self.history_length,
            self.credit_mix,
            self.inquiries,
        ]
    }
}

/// Each sub-score multiplied by its weight. Sums to the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedScores {
    pub payment_history: f64,
    pub utilization: f64,
    pub history_length: f64,
    pub credit_mix: f64,
    pub inquiries: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Payment History", "Amounts Owed"
    pub description: String, // e.g. "0.35 matched '<=0.40'"
    pub sub_score: f64,
    pub weight: f64,
    pub contribution: f64, // sub_score * weight
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub customer_id: String,
    pub score: u16,
    /// Weighted sum of the sub-scores, 0-100
    pub composite: f64,
    pub components: ComponentScores,
    pub weighted: WeightedScores,
    pub band: ScoreBand,
    pub recorded_band: Option<ScoreBand>,
    pub breakdown: Vec<FactorContribution>,
}

/// Compiled scoring rules. Build once, score any number of profiles.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: Weights,
    scale: Scale,
    bands: BandConfig,
    payment_history: PaymentHistoryScorer,
    utilization: TableScorer,
    history_length: TableScorer,
    credit_mix: CreditMixScorer,
    inquiries: TableScorer,
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        Self::from_rules(&config.rules())
    }

    pub fn from_rules(rules: &RuleSet) -> Result<Self> {
        Ok(Self {
            weights: rules.weights.clone(),
            scale: rules.scale.clone(),
            bands: rules.bands.clone(),
            payment_history: PaymentHistoryScorer::compile(&rules.payment_history)
                .context("scoring.payment_history")?,
            utilization: TableScorer::compile(&rules.utilization)
                .context("scoring.utilization")?,
            history_length: TableScorer::compile(&rules.history_length)
                .context("scoring.history_length")?,
            credit_mix: CreditMixScorer::compile(&rules.credit_mix)
                .context("scoring.credit_mix")?,
            inquiries: TableScorer::compile(&rules.inquiries).context("scoring.inquiries")?,
        })
    }

    pub fn bands(&self) -> &BandConfig {
        &self.bands
    }

    pub fn calculate_score(&self, profile: &CreditProfile) -> ScoreResult {
        let payment = self.payment_history.score(
            &profile.delays,
            profile.delayed_payments,
            profile.months_on_file,
        );
        let utilization = self.utilization.score(profile.utilization_ratio);
        let history = self.history_length.score(profile.history_age_months);
        let mix = self.credit_mix.score(&profile.credit_mix);
        let inquiries = self.inquiries.score(profile.inquiries);

        let components = ComponentScores {
            payment_history: clamp_sub_score(payment.value),
            utilization: clamp_sub_score(utilization.value),
            history_length: clamp_sub_score(history.value),
            credit_mix: clamp_sub_score(mix.value),
            inquiries: clamp_sub_score(inquiries.value),
        };
        let weighted = WeightedScores {
            payment_history: components.payment_history * self.weights.payment_history,
            utilization: components.utilization * self.weights.utilization,
            history_length: components.history_length * self.weights.history_length,
            credit_mix: components.credit_mix * self.weights.credit_mix,
            inquiries: components.inquiries * self.weights.inquiries,
        };

        let breakdown = [
            ("Payment History", payment, components.payment_history, self.weights.payment_history),
            ("Amounts Owed", utilization, components.utilization, self.weights.utilization),
            ("Length of History", history, components.history_length, self.weights.history_length),
            ("Credit Mix", mix, components.credit_mix, self.weights.credit_mix),
            ("Inquiries", inquiries, components.inquiries, self.weights.inquiries),
        ]
        .into_iter()
        .map(|(label, sub, clamped, weight)| contribution(label, sub, clamped, weight))
        .collect::<Vec<_>>();

        // Fixed order keeps the float sum reproducible.
        let composite = breakdown.iter().fold(0.0, |acc, f| acc + f.contribution);
        let score = self.rescale(composite);
        let band = ScoreBand::classify(score, &self.bands);

        debug!(
            customer = %profile.customer_id,
            score,
            composite,
            band = %band,
            "scored profile"
        );

        ScoreResult {
            customer_id: profile.customer_id.clone(),
            score,
            composite,
            components,
            weighted,
            band,
            recorded_band: profile.recorded_band,
            breakdown,
        }
    }

    pub fn score_batch(&self, profiles: &[CreditProfile]) -> Vec<ScoreResult> {
        profiles
            .iter()
            .map(|profile| self.calculate_score(profile))
            .collect()
    }

    /// Map a 0-100 composite onto the scale, truncating toward zero.
    pub fn rescale(&self, composite: f64) -> u16 {
        let min = self.scale.min as f64;
        let max = self.scale.max as f64;
        let raw = min + (composite / 100.0) * (max - min);
        if !raw.is_finite() {
            return self.scale.min;
        }
        (raw as i64).clamp(self.scale.min as i64, self.scale.max as i64) as u16
    }
}

/// Score a single profile with a one-off scorer.
pub fn calculate_score(profile: &CreditProfile, config: &ScoringConfig) -> Result<ScoreResult> {
    Ok(Scorer::new(config)?.calculate_score(profile))
}

fn clamp_sub_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn contribution(label: &str, sub: SubScore, clamped: f64, weight: f64) -> FactorContribution {
    FactorContribution {
        label: label.to_string(),
        description: sub.detail,
        sub_score: clamped,
        weight,
        contribution: clamped * weight,
    }
}
