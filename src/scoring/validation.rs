use super::band::BandConfig;
use super::config::{
    CreditMixRule, PaymentHistoryRule, Scale, ScoreTable, ScoringConfig, Weights,
};
use super::factors::RangeOp;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Only sections the user wrote are checked; preset sections are known good.
    if let Some(ref weights) = config.weights {
        validate_weights(weights, &mut errors);
    }
    if let Some(ref scale) = config.scale {
        validate_scale(scale, &mut errors);
    }
    if let Some(ref rule) = config.payment_history {
        validate_payment_history(rule, &mut errors);
    }
    if let Some(ref table) = config.utilization {
        validate_table("scoring.utilization", table, &mut errors);
    }
    if let Some(ref table) = config.history_length {
        validate_table("scoring.history_length", table, &mut errors);
    }
    if let Some(ref rule) = config.credit_mix {
        validate_credit_mix(rule, &mut errors);
    }
    if let Some(ref table) = config.inquiries {
        validate_table("scoring.inquiries", table, &mut errors);
    }

    // Bands are checked against the effective scale.
    let rules = config.rules();
    if config.bands.is_some() || config.scale.is_some() {
        validate_bands(&rules.bands, &rules.scale, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_weights(weights: &Weights, errors: &mut Vec<String>) {
    let named = [
        ("payment_history", weights.payment_history),
        ("utilization", weights.utilization),
        ("history_length", weights.history_length),
        ("credit_mix", weights.credit_mix),
        ("inquiries", weights.inquiries),
    ];
    for (name, weight) in named {
        if !weight.is_finite() || weight < 0.0 {
            errors.push(format!(
                "scoring.weights.{}: must be a non-negative number, got {}",
                name, weight
            ));
        }
    }
    let total = weights.total();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.push(format!("scoring.weights: must sum to 1.0, got {}", total));
    }
}

fn validate_scale(scale: &Scale, errors: &mut Vec<String>) {
    if scale.min >= scale.max {
        errors.push(format!(
            "scoring.scale: min ({}) must be below max ({})",
            scale.min, scale.max
        ));
    }
}

fn validate_payment_history(rule: &PaymentHistoryRule, errors: &mut Vec<String>) {
    check_score("scoring.payment_history.base_score", rule.base_score, errors);

    for (i, bucket) in rule.buckets.iter().enumerate() {
        if let Err(e) = RangeOp::parse(&bucket.range) {
            errors.push(format!(
                "scoring.payment_history.buckets[{}].range: invalid '{}' - {}",
                i, bucket.range, e
            ));
        }
        if !bucket.deduction.is_finite() || bucket.deduction < 0.0 {
            errors.push(format!(
                "scoring.payment_history.buckets[{}].deduction: must be non-negative",
                i
            ));
        }
    }

    if let Some(ref delayed) = rule.delayed_payments {
        if !delayed.per_payment.is_finite() || delayed.per_payment < 0.0 {
            errors.push(
                "scoring.payment_history.delayed_payments.per_payment: must be non-negative"
                    .to_string(),
            );
        }
        if !delayed.cap.is_finite() || delayed.cap < 0.0 {
            errors.push(
                "scoring.payment_history.delayed_payments.cap: must be non-negative".to_string(),
            );
        }
    }

    if let Some(ref short) = rule.short_history {
        if short.span_months.is_nan() || short.span_months <= 0.0 {
            errors.push(
                "scoring.payment_history.short_history.span_months: must be positive".to_string(),
            );
        }
        if !short.base_factor.is_finite() || short.base_factor < 0.0 {
            errors.push(
                "scoring.payment_history.short_history.base_factor: must be non-negative"
                    .to_string(),
            );
        }
    }
}

fn validate_table(path: &str, table: &ScoreTable, errors: &mut Vec<String>) {
    if table.buckets.is_empty() {
        errors.push(format!("{}.buckets: at least one bucket is required", path));
    }
    for (i, bucket) in table.buckets.iter().enumerate() {
        if let Err(e) = RangeOp::parse(&bucket.range) {
            errors.push(format!(
                "{}.buckets[{}].range: invalid '{}' - {}",
                path, i, bucket.range, e
            ));
        }
        check_score(&format!("{}.buckets[{}].score", path, i), bucket.score, errors);
    }
    check_score(&format!("{}.default_score", path), table.default_score, errors);
}

fn validate_credit_mix(rule: &CreditMixRule, errors: &mut Vec<String>) {
    check_score("scoring.credit_mix.default_score", rule.default_score, errors);
    check_score("scoring.credit_mix.ordinal.bad", rule.ordinal.bad, errors);
    check_score("scoring.credit_mix.ordinal.standard", rule.ordinal.standard, errors);
    check_score("scoring.credit_mix.ordinal.good", rule.ordinal.good, errors);

    for (i, label) in rule.labels.iter().enumerate() {
        if label.keywords.is_empty() || label.keywords.iter().any(|k| k.trim().is_empty()) {
            errors.push(format!(
                "scoring.credit_mix.labels[{}].keywords: must be non-empty",
                i
            ));
        }
        check_score(&format!("scoring.credit_mix.labels[{}].score", i), label.score, errors);
    }

    let loans = &rule.loans;
    check_score("scoring.credit_mix.loans.no_loans_score", loans.no_loans_score, errors);
    check_score("scoring.credit_mix.loans.good_mix_score", loans.good_mix_score, errors);
    check_score("scoring.credit_mix.loans.plain_mix_score", loans.plain_mix_score, errors);
    if loans.canonical_types.is_nan() || loans.canonical_types <= 0.0 {
        errors.push("scoring.credit_mix.loans.canonical_types: must be positive".to_string());
    }
    validate_table("scoring.credit_mix.loans.diversity", &loans.diversity, errors);

    let blend = loans.diversity_weight + loans.mix_weight;
    if loans.diversity_weight < 0.0 || loans.mix_weight < 0.0 || (blend - 1.0).abs() > WEIGHT_TOLERANCE
    {
        errors.push(format!(
            "scoring.credit_mix.loans: diversity_weight + mix_weight must be non-negative and sum to 1.0, got {}",
            blend
        ));
    }
    if loans.revolving_keywords.is_empty() {
        errors.push("scoring.credit_mix.loans.revolving_keywords: must be non-empty".to_string());
    }
    if loans.installment_keywords.is_empty() {
        errors.push("scoring.credit_mix.loans.installment_keywords: must be non-empty".to_string());
    }
}

fn validate_bands(bands: &BandConfig, scale: &Scale, errors: &mut Vec<String>) {
    if bands.standard_from > bands.good_from {
        errors.push(format!(
            "scoring.bands: standard_from ({}) must not exceed good_from ({})",
            bands.standard_from, bands.good_from
        ));
    }
    for (name, value) in [
        ("standard_from", bands.standard_from),
        ("good_from", bands.good_from),
        ("bad_up_to", bands.bad_up_to),
    ] {
        if value < scale.min || value > scale.max {
            errors.push(format!(
                "scoring.bands.{}: {} is outside the score scale {}-{}",
                name, value, scale.min, scale.max
            ));
        }
    }
}

fn check_score(path: &str, score: f64, errors: &mut Vec<String>) {
    if !(0.0..=100.0).contains(&score) {
        errors.push(format!("{}: must be between 0 and 100, got {}", path, score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{DelayBucket, Preset, ScoreBucket};

    #[test]
    fn test_empty_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_full_presets_are_valid() {
        for preset in [Preset::Standard, Preset::Aggregated, Preset::Traditional] {
            assert!(validate_scoring(&ScoringConfig::from_preset(preset)).is_ok());
        }
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let config = ScoringConfig {
            weights: Some(Weights {
                payment_history: 0.5,
                ..Weights::default()
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scoring.weights: must sum to 1.0"));
    }

    #[test]
    fn test_negative_weight() {
        let config = ScoringConfig {
            weights: Some(Weights {
                payment_history: 0.75,
                inquiries: -0.30,
                ..Weights::default()
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("scoring.weights.inquiries")));
    }

    #[test]
    fn test_scale_inverted() {
        let config = ScoringConfig {
            scale: Some(Scale { min: 850, max: 300 }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.scale"));
    }

    #[test]
    fn test_invalid_table_range() {
        let config = ScoringConfig {
            inquiries: Some(ScoreTable {
                buckets: vec![ScoreBucket {
                    range: "invalid".to_string(),
                    score: 50.0,
                }],
                default_score: 0.0,
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.inquiries.buckets[0].range"));
    }

    #[test]
    fn test_table_score_out_of_range() {
        let config = ScoringConfig {
            utilization: Some(ScoreTable {
                buckets: vec![ScoreBucket {
                    range: "<=1".to_string(),
                    score: 120.0,
                }],
                default_score: 0.0,
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.utilization.buckets[0].score"));
    }

    #[test]
    fn test_negative_deduction() {
        let mut rule = Preset::Standard.rules().payment_history;
        rule.buckets.push(DelayBucket {
            range: ">90".to_string(),
            deduction: -5.0,
        });
        let config = ScoringConfig {
            payment_history: Some(rule),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.payment_history.buckets[3].deduction"));
    }

    #[test]
    fn test_mix_blend_and_keywords() {
        let mut rule = Preset::Standard.rules().credit_mix;
        rule.loans.mix_weight = 0.5;
        rule.labels[0].keywords.clear();
        let config = ScoringConfig {
            credit_mix: Some(rule),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("labels[0].keywords")));
        assert!(errors.iter().any(|e| e.contains("diversity_weight + mix_weight")));
    }

    #[test]
    fn test_bands_out_of_order() {
        let config = ScoringConfig {
            bands: Some(BandConfig {
                standard_from: 720,
                good_from: 700,
                bad_up_to: 590,
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.bands"));
    }

    #[test]
    fn test_bands_checked_against_custom_scale() {
        let config = ScoringConfig {
            scale: Some(Scale { min: 0, max: 100 }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ScoringConfig {
            scale: Some(Scale { min: 500, max: 500 }), // Error 1
            weights: Some(Weights {
                credit_mix: 0.5, // Error 2 (sum)
                ..Weights::default()
            }),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        // scale, weight sum, and all three band cutoffs outside 500-500
        assert_eq!(errors.len(), 5);
    }
}
