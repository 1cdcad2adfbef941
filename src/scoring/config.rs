use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::band::BandConfig;

/// Named, complete rule sets.
///
/// `Standard` is the five-factor table used for raw monthly records: 30/60/90
/// day delay buckets, utilization steps every 10%, and history steps out to
/// 20 years. `Aggregated` is tuned for per-customer averages: 15 day delay
/// buckets, a utilization table that is flat up to 30%, and a history table
/// that tops out at 10 years. `Traditional` scores the cleaned training
/// table: one averaged delay, outstanding debt in place of a utilization
/// ratio, and mix weighted at 20%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Standard,
    Aggregated,
    Traditional,
}

/// Scoring configuration as written in the config file.
///
/// Every section is optional; anything left out comes from `preset`
/// (default: `standard`).
///
/// Example YAML:
/// ```yaml
/// scoring:
///   preset: aggregated
///   weights:
///     payment_history: 0.35
///     utilization: 0.30
///     history_length: 0.15
///     credit_mix: 0.10
///     inquiries: 0.10
///   inquiries:
///     buckets:
///       - { range: "0", score: 100 }
///       - { range: "<=3", score: 70 }
///       - { range: ">3", score: 40 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Weights>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_history: Option<PaymentHistoryRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<ScoreTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_length: Option<ScoreTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_mix: Option<CreditMixRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inquiries: Option<ScoreTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<BandConfig>,
}

impl ScoringConfig {
    /// A config that spells out every section of `preset`
    pub fn from_preset(preset: Preset) -> Self {
        let rules = preset.rules();
        Self {
            preset: Some(preset),
            weights: Some(rules.weights),
            scale: Some(rules.scale),
            payment_history: Some(rules.payment_history),
            utilization: Some(rules.utilization),
            history_length: Some(rules.history_length),
            credit_mix: Some(rules.credit_mix),
            inquiries: Some(rules.inquiries),
            bands: Some(rules.bands),
        }
    }

    /// Resolve the effective rule set: explicit sections override the preset.
    pub fn rules(&self) -> RuleSet {
        let base = self.preset.unwrap_or_default().rules();
        RuleSet {
            weights: self.weights.clone().unwrap_or(base.weights),
            scale: self.scale.clone().unwrap_or(base.scale),
            payment_history: self
                .payment_history
                .clone()
                .unwrap_or(base.payment_history),
            utilization: self.utilization.clone().unwrap_or(base.utilization),
            history_length: self.history_length.clone().unwrap_or(base.history_length),
            credit_mix: self.credit_mix.clone().unwrap_or(base.credit_mix),
            inquiries: self.inquiries.clone().unwrap_or(base.inquiries),
            bands: self.bands.clone().unwrap_or(base.bands),
        }
    }
}

/// Fully specified rule tables and weights.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub weights: Weights,
    pub scale: Scale,
    pub payment_history: PaymentHistoryRule,
    pub utilization: ScoreTable,
    pub history_length: ScoreTable,
    pub credit_mix: CreditMixRule,
    pub inquiries: ScoreTable,
    pub bands: BandConfig,
}

impl Default for RuleSet {
    fn default() -> Self {
        Preset::Standard.rules()
    }
}

/// Component weights. Must sum to 1.0.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub payment_history: f64,
    pub utilization: f64,
    pub history_length: f64,
    pub credit_mix: f64,
    pub inquiries: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            payment_history: 0.35,
            utilization: 0.30,
            history_length: 0.15,
            credit_mix: 0.10,
            inquiries: 0.10,
        }
    }
}

impl Weights {
    /// Weights in combination order: payment, utilization, history, mix, inquiries
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.payment_history,
            self.utilization,
            self.history_length,
            self.credit_mix,
            self.inquiries,
        ]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Output range of the composite score (default 300-850)
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scale {
    pub min: u16,
    pub max: u16,
}

impl Default for Scale {
    fn default() -> Self {
        Self { min: 300, max: 850 }
    }
}

/// Payment history deductions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PaymentHistoryRule {
    /// Score before deductions (default: 100)
    pub base_score: f64,

    /// Delay buckets in days; each delay counts toward the first bucket it matches
    pub buckets: Vec<DelayBucket>,

    /// Extra deduction per reported delayed payment
    #[serde(default)]
    pub delayed_payments: Option<DelayedPaymentsRule>,

    /// Penalty for short credit files
    #[serde(default)]
    pub short_history: Option<ShortHistoryRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DelayBucket {
    /// Range of days past due, e.g. "(30,60]"
    pub range: String,

    /// Points deducted per delay falling in this bucket
    pub deduction: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DelayedPaymentsRule {
    pub per_payment: f64,
    pub cap: f64,
}

/// Files younger than `below_months` are scaled by
/// `base_factor + months / span_months`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShortHistoryRule {
    pub below_months: f64,
    pub base_factor: f64,
    pub span_months: f64,
}

impl Default for ShortHistoryRule {
    fn default() -> Self {
        Self {
            below_months: 12.0,
            base_factor: 0.5,
            span_months: 24.0,
        }
    }
}

/// Piecewise-constant lookup table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoreTable {
    pub buckets: Vec<ScoreBucket>,

    /// Score when no bucket matches
    #[serde(default)]
    pub default_score: f64,
}

/// Maps a range expression to a 0-100 sub-score.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoreBucket {
    pub range: String,
    pub score: f64,
}

/// Credit mix scoring for the three shapes mix data comes in.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreditMixRule {
    /// Used for missing or unrecognised mix values
    pub default_score: f64,
    pub ordinal: OrdinalMixRule,
    pub labels: Vec<LabelRule>,
    pub loans: LoanMixRule,
}

/// Scores for the 0/1/2 encoded mix. Values above 2 score as `good`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OrdinalMixRule {
    pub bad: f64,
    pub standard: f64,
    pub good: f64,
}

/// Case-insensitive substring match on a mix rating label.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LabelRule {
    pub keywords: Vec<String>,
    pub score: f64,
}

/// Loan-portfolio based mix: blend of type diversity and revolving/installment balance.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoanMixRule {
    pub no_loans_score: f64,
    pub canonical_types: f64,
    /// Keyed on distinct types / canonical types
    pub diversity: ScoreTable,
    pub good_mix_score: f64,
    pub plain_mix_score: f64,
    pub diversity_weight: f64,
    pub mix_weight: f64,
    pub revolving_keywords: Vec<String>,
    pub installment_keywords: Vec<String>,
}

fn table(rows: &[(&str, f64)]) -> ScoreTable {
    ScoreTable {
        buckets: rows
            .iter()
            .map(|(range, score)| ScoreBucket {
                range: range.to_string(),
                score: *score,
            })
            .collect(),
        default_score: 0.0,
    }
}

fn delay_buckets(rows: &[(&str, f64)]) -> Vec<DelayBucket> {
    rows.iter()
        .map(|(range, deduction)| DelayBucket {
            range: range.to_string(),
            deduction: *deduction,
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn standard_credit_mix() -> CreditMixRule {
    CreditMixRule {
        default_score: 60.0,
        ordinal: OrdinalMixRule {
            bad: 20.0,
            standard: 60.0,
            good: 100.0,
        },
        labels: mix_labels(100.0, 70.0, 40.0),
        loans: loan_mix(),
    }
}

fn traditional_credit_mix() -> CreditMixRule {
    CreditMixRule {
        default_score: 65.0,
        ordinal: OrdinalMixRule {
            bad: 30.0,
            standard: 65.0,
            good: 100.0,
        },
        labels: mix_labels(100.0, 65.0, 30.0),
        loans: loan_mix(),
    }
}

fn mix_labels(good: f64, standard: f64, bad: f64) -> Vec<LabelRule> {
    vec![
        LabelRule {
            keywords: strings(&["good"]),
            score: good,
        },
        LabelRule {
            keywords: strings(&["std", "standard"]),
            score: standard,
        },
        LabelRule {
            keywords: strings(&["bad", "poor"]),
            score: bad,
        },
    ]
}

fn loan_mix() -> LoanMixRule {
    LoanMixRule {
        no_loans_score: 30.0,
        canonical_types: 4.0,
        diversity: ScoreTable {
            default_score: 40.0,
            ..table(&[(">=0.75", 100.0), (">=0.50", 80.0), (">=0.25", 60.0)])
        },
        good_mix_score: 100.0,
        plain_mix_score: 70.0,
        diversity_weight: 0.60,
        mix_weight: 0.40,
        revolving_keywords: strings(&["card", "retail"]),
        installment_keywords: strings(&["installment", "mortgage"]),
    }
}

impl Preset {
    pub fn rules(self) -> RuleSet {
        match self {
            Preset::Standard => RuleSet {
                weights: Weights::default(),
                scale: Scale::default(),
                payment_history: PaymentHistoryRule {
                    base_score: 100.0,
                    buckets: delay_buckets(&[("(0,30]", 10.0), ("(30,60]", 20.0), ("(60,90]", 40.0)]),
                    delayed_payments: None,
                    short_history: Some(ShortHistoryRule::default()),
                },
                utilization: table(&[
                    ("<=0.10", 100.0),
                    ("<=0.20", 90.0),
                    ("<=0.30", 80.0),
                    ("<=0.40", 70.0),
                    ("<=0.50", 60.0),
                    ("<=0.60", 50.0),
                    ("<=0.70", 40.0),
                    ("<=0.80", 30.0),
                    ("<=0.90", 20.0),
                    (">0.90", 10.0),
                ]),
                history_length: table(&[
                    (">=240", 100.0),
                    (">=180", 95.0),
                    (">=120", 90.0),
                    (">=60", 80.0),
                    (">=24", 65.0),
                    (">=12", 50.0),
                    ("<12", 30.0),
                ]),
                credit_mix: standard_credit_mix(),
                inquiries: table(&[
                    ("0", 100.0),
                    ("1", 90.0),
                    ("2", 75.0),
                    ("<=4", 60.0),
                    (">4", 40.0),
                ]),
                bands: BandConfig::default(),
            },
            Preset::Aggregated => RuleSet {
                weights: Weights::default(),
                scale: Scale::default(),
                payment_history: PaymentHistoryRule {
                    base_score: 100.0,
                    buckets: delay_buckets(&[
                        ("(0,15]", 10.0),
                        ("(15,30]", 30.0),
                        ("(30,45]", 50.0),
                        (">45", 70.0),
                    ]),
                    delayed_payments: None,
                    short_history: Some(ShortHistoryRule::default()),
                },
                utilization: table(&[
                    ("<=0.30", 100.0),
                    ("<=0.40", 90.0),
                    ("<=0.50", 80.0),
                    ("<=0.60", 70.0),
                    ("<=0.70", 60.0),
                    ("<=0.80", 50.0),
                    ("<=0.90", 40.0),
                    (">0.90", 20.0),
                ]),
                history_length: table(&[
                    (">=120", 100.0),
                    (">=100", 95.0),
                    (">=80", 90.0),
                    (">=60", 80.0),
                    (">=24", 65.0),
                    (">=12", 50.0),
                    ("<12", 30.0),
                ]),
                credit_mix: standard_credit_mix(),
                // Counts strictly between 5 and 6 fall through to the lowest score.
                inquiries: table(&[
                    ("0", 100.0),
                    ("<=2", 90.0),
                    ("<=5", 75.0),
                    ("(5,6)", 40.0),
                    (">=6", 50.0),
                ]),
                bands: BandConfig::default(),
            },
            Preset::Traditional => RuleSet {
                weights: Weights {
                    payment_history: 0.35,
                    utilization: 0.15,
                    history_length: 0.15,
                    credit_mix: 0.20,
                    inquiries: 0.15,
                },
                scale: Scale::default(),
                payment_history: PaymentHistoryRule {
                    base_score: 100.0,
                    buckets: delay_buckets(&[
                        ("(0,5)", 10.0),
                        ("[5,15)", 30.0),
                        ("[15,30)", 60.0),
                        (">=30", 90.0),
                    ]),
                    delayed_payments: None,
                    short_history: None,
                },
                // Keyed on outstanding debt, not a ratio.
                utilization: table(&[
                    ("0", 100.0),
                    ("<500", 90.0),
                    ("<1500", 75.0),
                    ("<3000", 50.0),
                    (">=3000", 20.0),
                ]),
                history_length: table(&[
                    ("<12", 20.0),
                    ("<24", 40.0),
                    ("<48", 60.0),
                    ("<96", 80.0),
                    (">=96", 100.0),
                ]),
                credit_mix: traditional_credit_mix(),
                inquiries: table(&[
                    ("0", 100.0),
                    ("<=2", 90.0),
                    ("<=5", 70.0),
                    ("<=10", 40.0),
                    (">10", 10.0),
                ]),
                bands: BandConfig::default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config_resolves_to_standard() {
        let config = ScoringConfig::default();
        assert_eq!(config.rules(), Preset::Standard.rules());
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = Weights::default();
        assert!((weights.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::from_preset(Preset::Aggregated);
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_scoring_config_parse() {
        let yaml = r#"
preset: aggregated
scale:
  min: 0
  max: 1000
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.preset, Some(Preset::Aggregated));
        let rules = config.rules();
        assert_eq!(rules.scale, Scale { min: 0, max: 1000 });
        assert_eq!(
            rules.history_length,
            Preset::Aggregated.rules().history_length
        );
    }

    #[test]
    fn test_table_override_parse() {
        let yaml = r#"
inquiries:
  buckets:
    - range: "0"
      score: 100
    - range: ">0"
      score: 50
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        let rules = config.rules();
        assert_eq!(rules.inquiries.buckets.len(), 2);
        assert_eq!(rules.inquiries.default_score, 0.0);
        assert_eq!(rules.utilization, Preset::Standard.rules().utilization);
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.preset.is_none());
        assert!(config.weights.is_none());
        assert!(config.payment_history.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "preset: standard\nbogus: 1\n";
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }

    #[test]
    fn test_presets_differ_in_delay_buckets() {
        let standard = Preset::Standard.rules();
        let aggregated = Preset::Aggregated.rules();
        assert_eq!(standard.payment_history.buckets.len(), 3);
        assert_eq!(aggregated.payment_history.buckets.len(), 4);
        assert_eq!(aggregated.payment_history.buckets[3].range, ">45");
    }

    #[test]
    fn test_traditional_weights_favour_mix() {
        let weights = Preset::Traditional.rules().weights;
        assert!((weights.total() - 1.0).abs() < 1e-12);
        assert_eq!(weights.credit_mix, 0.20);
        assert_eq!(weights.utilization, 0.15);
    }

    #[test]
    fn test_preset_parse_traditional() {
        let config: ScoringConfig = serde_saphyr::from_str("preset: traditional\n").unwrap();
        assert_eq!(config.preset, Some(Preset::Traditional));
        assert_eq!(config.rules().payment_history.short_history, None);
    }
}
