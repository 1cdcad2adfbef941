use serde::{Deserialize, Serialize};

use crate::scoring::ScoreBand;

/// Days past due, either one summary value or the full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DelayHistory {
    Single(f64),
    Series(Vec<f64>),
}

impl Default for DelayHistory {
    fn default() -> Self {
        DelayHistory::Series(Vec::new())
    }
}

impl DelayHistory {
    /// Number of delay observations carried by this history
    pub fn len(&self) -> usize {
        match self {
            DelayHistory::Single(_) => 1,
            DelayHistory::Series(delays) => delays.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loans held by a customer, as reported by `num_of_loan` / `type_of_loan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanPortfolio {
    pub count: f64,
    pub types: Vec<String>,
}

impl LoanPortfolio {
    /// Build a portfolio from a comma separated loan type list such as
    /// `"Auto Loan, Credit-Builder Loan, and Personal Loan"`.
    pub fn from_type_list(count: f64, type_list: &str) -> Self {
        let types = type_list
            .split(',')
            .map(|t| t.trim())
            .map(|t| t.strip_prefix("and ").unwrap_or(t).trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();
        Self { count, types }
    }

    /// Distinct loan types, lowercased
    pub fn distinct_types(&self) -> Vec<String> {
        let mut distinct: Vec<String> = self.types.iter().map(|t| t.to_lowercase()).collect();
        distinct.sort();
        distinct.dedup();
        distinct
    }
}

/// Credit mix as it appears in the source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CreditMix {
    #[default]
    Unknown,
    /// Encoded mix: 0 = bad, 1 = standard, 2 = good
    Ordinal(i64),
    /// Free-text rating such as "Good" or "Standard"
    Rating(String),
    Loans(LoanPortfolio),
}

impl CreditMix {
    /// Interpret a raw `credit_mix` cell. Numbers become `Ordinal`, text becomes
    /// `Rating`, blanks and placeholders become `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
            return CreditMix::Unknown;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CreditMix::Ordinal(value.round() as i64),
            Ok(_) => CreditMix::Unknown,
            Err(_) => CreditMix::Rating(trimmed.to_string()),
        }
    }

    /// 0/1/2 encoding used by the cleaned training table
    pub fn ordinal(&self) -> Option<i64> {
        match self {
            CreditMix::Ordinal(value) => Some(*value),
            CreditMix::Rating(label) => ScoreBand::from_label(label).map(|band| band.ordinal()),
            CreditMix::Unknown | CreditMix::Loans(_) => None,
        }
    }
}

/// Per-customer inputs to the composite scorer.
///
/// Every field has a neutral default so partially populated records still
/// score: missing numbers are 0, missing delays are an empty history and a
/// missing mix is `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub customer_id: String,
    pub delays: DelayHistory,
    pub delayed_payments: f64,
    pub months_on_file: f64,
    /// Amounts-owed input: a utilization ratio, or outstanding debt under `traditional`
    pub utilization_ratio: f64,
    pub history_age_months: f64,
    pub credit_mix: CreditMix,
    pub inquiries: f64,
    pub recorded_band: Option<ScoreBand>,
}

impl CreditProfile {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delays = DelayHistory::Single(delay);
        self
    }

    pub fn with_delays(mut self, delays: Vec<f64>) -> Self {
        self.delays = DelayHistory::Series(delays);
        self
    }

    /// Sets both months on file and history age, which the source data
    /// reports as a single column.
    pub fn with_history(mut self, months: f64) -> Self {
        self.months_on_file = months;
        self.history_age_months = months;
        self
    }

    pub fn with_months_on_file(mut self, months: f64) -> Self {
        self.months_on_file = months;
        self
    }

    pub fn with_utilization(mut self, ratio: f64) -> Self {
        self.utilization_ratio = ratio;
        self
    }

    pub fn with_credit_mix(mut self, mix: CreditMix) -> Self {
        self.credit_mix = mix;
        self
    }

    pub fn with_inquiries(mut self, inquiries: f64) -> Self {
        self.inquiries = inquiries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_empty() {
        let profile = CreditProfile::default();
        assert!(profile.delays.is_empty());
        assert_eq!(profile.credit_mix, CreditMix::Unknown);
        assert_eq!(profile.utilization_ratio, 0.0);
    }

    #[test]
    fn test_with_history_sets_both_fields() {
        let profile = CreditProfile::new("C1").with_history(36.0);
        assert_eq!(profile.months_on_file, 36.0);
        assert_eq!(profile.history_age_months, 36.0);
    }

    #[test]
    fn test_parse_mix_numeric() {
        assert_eq!(CreditMix::parse("2"), CreditMix::Ordinal(2));
        assert_eq!(CreditMix::parse(" 1.0 "), CreditMix::Ordinal(1));
    }

    #[test]
    fn test_parse_mix_text_and_placeholder() {
        assert_eq!(CreditMix::parse("Good"), CreditMix::Rating("Good".to_string()));
        assert_eq!(CreditMix::parse("_"), CreditMix::Unknown);
        assert_eq!(CreditMix::parse(""), CreditMix::Unknown);
    }

    #[test]
    fn test_mix_ordinal_from_rating() {
        assert_eq!(CreditMix::Rating("Standard".to_string()).ordinal(), Some(1));
        assert_eq!(CreditMix::Rating("bad".to_string()).ordinal(), Some(0));
        assert_eq!(CreditMix::Rating("weird".to_string()).ordinal(), None);
    }

    #[test]
    fn test_loan_portfolio_from_type_list() {
        let loans = LoanPortfolio::from_type_list(
            3.0,
            "Auto Loan, Credit-Builder Loan, and Personal Loan",
        );
        assert_eq!(loans.types, vec!["Auto Loan", "Credit-Builder Loan", "Personal Loan"]);
    }

    #[test]
    fn test_loan_portfolio_distinct_types() {
        let loans = LoanPortfolio::from_type_list(3.0, "Credit Card, credit card, Mortgage");
        assert_eq!(loans.distinct_types(), vec!["credit card", "mortgage"]);
    }

    #[test]
    fn test_delay_history_len() {
        assert_eq!(DelayHistory::Single(3.0).len(), 1);
        assert_eq!(DelayHistory::Series(vec![1.0, 2.0]).len(), 2);
        assert!(DelayHistory::default().is_empty());
    }
}
