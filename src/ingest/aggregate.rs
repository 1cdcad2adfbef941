use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::parser::RawRecord;
use crate::profile::{CreditMix, CreditProfile, DelayHistory, LoanPortfolio};
use crate::scoring::{Preset, ScoreBand};

/// How a customer's monthly delays feed payment history scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DelayMode {
    /// Mean delay, rounded, scored as one value
    #[default]
    Average,
    /// Every monthly delay scored and counted
    Series,
}

/// Which columns describe the credit mix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MixSource {
    /// The `credit_mix` rating column
    #[default]
    Rating,
    /// `num_of_loan` and `type_of_loan`
    Loans,
}

/// Which value feeds the amounts-owed factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AmountsOwed {
    /// Mean `credit_utilization_ratio`, unrounded
    #[default]
    Ratio,
    /// Mean `outstanding_debt`, rounded
    OutstandingDebt,
}

impl AmountsOwed {
    /// The input a preset's amounts-owed table is keyed on.
    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Traditional => AmountsOwed::OutstandingDebt,
            Preset::Standard | Preset::Aggregated => AmountsOwed::Ratio,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestOptions {
    #[serde(default)]
    pub delays: DelayMode,

    #[serde(default)]
    pub mix_source: MixSource,

    /// Unset follows the scoring preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amounts_owed: Option<AmountsOwed>,

    /// Collapse the recorded rating to good/bad (2 becomes 1) in cleaned output
    #[serde(default)]
    pub binary_labels: bool,
}

impl IngestOptions {
    /// Fill in anything left to follow the scoring preset.
    pub fn resolve(&mut self, preset: Preset) {
        self.amounts_owed.get_or_insert_with(|| AmountsOwed::for_preset(preset));
    }
}

/// One customer's rows reduced to summary values.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub rows: usize,
    /// Every reported delay, in row order
    pub delays: Vec<f64>,
    pub avg_delay: i64,
    pub delayed_payments: i64,
    pub months_on_file: i64,
    pub avg_credit_history: i64,
    /// Mean ratio, unrounded
    pub utilization: f64,
    pub avg_num_inquires: i64,
    pub avg_outstanding_debt: i64,
    pub credit_mix: CreditMix,
    pub loans: LoanPortfolio,
    /// Mean recorded rating on the 0/1/2 encoding, rounded
    pub credit_label: Option<i64>,
}

/// Row of the cleaned training table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRow {
    pub customer_id: String,
    pub avg_credit_history: i64,
    pub avg_delay: i64,
    pub avg_num_inquires: i64,
    pub avg_outstanding_debt: i64,
    pub avg_credit_mix: String,
    pub avg_credit_score: Option<i64>,
}

impl CustomerSummary {
    pub fn to_profile(&self, options: &IngestOptions) -> CreditProfile {
        let delays = match options.delays {
            DelayMode::Average => DelayHistory::Single(self.avg_delay as f64),
            DelayMode::Series => DelayHistory::Series(self.delays.clone()),
        };
        let credit_mix = match options.mix_source {
            MixSource::Rating => self.credit_mix.clone(),
            MixSource::Loans => CreditMix::Loans(self.loans.clone()),
        };
        let amounts_owed = match options.amounts_owed.unwrap_or_default() {
            AmountsOwed::Ratio => self.utilization,
            AmountsOwed::OutstandingDebt => self.avg_outstanding_debt as f64,
        };
        CreditProfile {
            customer_id: self.customer_id.clone(),
            delays,
            delayed_payments: self.delayed_payments as f64,
            months_on_file: self.months_on_file as f64,
            utilization_ratio: amounts_owed,
            history_age_months: self.avg_credit_history as f64,
            credit_mix,
            inquiries: self.avg_num_inquires as f64,
            recorded_band: self.credit_label.and_then(ScoreBand::from_ordinal),
        }
    }

    pub fn clean_row(&self, binary_labels: bool) -> CleanRow {
        let avg_credit_mix = match &self.credit_mix {
            CreditMix::Rating(label) => self
                .credit_mix
                .ordinal()
                .map(|ordinal| ordinal.to_string())
                .unwrap_or_else(|| label.clone()),
            other => other.ordinal().map(|o| o.to_string()).unwrap_or_default(),
        };
        let avg_credit_score = self.credit_label.map(|label| {
            if binary_labels && label == 2 {
                1
            } else {
                label
            }
        });
        CleanRow {
            customer_id: self.customer_id.clone(),
            avg_credit_history: self.avg_credit_history,
            avg_delay: self.avg_delay,
            avg_num_inquires: self.avg_num_inquires,
            avg_outstanding_debt: self.avg_outstanding_debt,
            avg_credit_mix,
            avg_credit_score,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    rows: usize,
    delays: Vec<f64>,
    delayed_payments: Vec<f64>,
    months_on_file: Vec<f64>,
    history_age: Vec<f64>,
    utilization: Vec<f64>,
    inquiries: Vec<f64>,
    outstanding_debt: Vec<f64>,
    loan_count: Vec<f64>,
    labels: Vec<f64>,
    credit_mix: Option<String>,
    loan_types: Option<String>,
}

impl Accumulator {
    fn push(&mut self, record: RawRecord) {
        self.rows += 1;
        self.delays.extend(record.delay);
        self.delayed_payments.extend(record.delayed_payments);
        self.months_on_file.extend(record.months_on_file);
        self.history_age.extend(record.history_age);
        self.utilization.extend(record.utilization);
        self.inquiries.extend(record.inquiries);
        self.outstanding_debt.extend(record.outstanding_debt);
        self.loan_count.extend(record.loan_count);
        self.labels.extend(record.recorded_label);
        if self.credit_mix.is_none() {
            // Placeholders such as "_" do not count as a first value.
            self.credit_mix = record
                .credit_mix
                .filter(|mix| CreditMix::parse(mix) != CreditMix::Unknown);
        }
        if self.loan_types.is_none() {
            self.loan_types = record.loan_types;
        }
    }

    fn finish(self, customer_id: String) -> CustomerSummary {
        let avg_credit_history = mean_round(&self.history_age).unwrap_or(0);
        // No explicit column: the file is as old as the oldest account.
        let months_on_file = mean_round(&self.months_on_file).unwrap_or(avg_credit_history);
        let credit_mix = self
            .credit_mix
            .as_deref()
            .map(CreditMix::parse)
            .unwrap_or_default();
        let loans = LoanPortfolio::from_type_list(
            mean_round(&self.loan_count).unwrap_or(0) as f64,
            self.loan_types.as_deref().unwrap_or(""),
        );

        CustomerSummary {
            customer_id,
            rows: self.rows,
            avg_delay: mean_round(&self.delays).unwrap_or(0),
            delays: self.delays,
            delayed_payments: mean_round(&self.delayed_payments).unwrap_or(0),
            months_on_file,
            avg_credit_history,
            utilization: mean(&self.utilization).unwrap_or(0.0),
            avg_num_inquires: mean_round(&self.inquiries).unwrap_or(0),
            avg_outstanding_debt: mean_round(&self.outstanding_debt).unwrap_or(0),
            credit_mix,
            loans,
            credit_label: mean_round(&self.labels),
        }
    }
}

/// Group rows by customer id. Customers come back sorted by id; missing
/// cells are left out of each mean and an all-missing column becomes 0.
pub fn aggregate(records: impl IntoIterator<Item = RawRecord>) -> Vec<CustomerSummary> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.customer_id.clone())
            .or_default()
            .push(record);
    }

    let summaries: Vec<CustomerSummary> = groups
        .into_iter()
        .map(|(customer_id, acc)| acc.finish(customer_id))
        .collect();
    tracing::debug!(customers = summaries.len(), "aggregated customers");
    summaries
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean rounded half-to-even.
fn mean_round(values: &[f64]) -> Option<i64> {
    mean(values).map(|m| m.round_ties_even() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_records;

    const MONTHLY: &str = "\
customer_id,delay_from_due_date,num_of_delayed_payment,credit_utilization_ratio,credit_history_age,credit_mix,num_of_loan,type_of_loan,num_credit_inquiries,outstanding_debt,credit_score
CUS_B,10,1,0.30,100,_,2,\"Credit Card, Mortgage Loan\",3,1000,1
CUS_A,5,0,0.20,60,Good,1,Auto Loan,1,200.5,2
CUS_B,20,2,0.40,101,Standard,2,,4,1001,2
CUS_A,6,0,0.10,61,Good,1,Auto Loan,2,200.5,2
";

    fn summaries() -> Vec<CustomerSummary> {
        aggregate(parse_records(MONTHLY.as_bytes()).unwrap())
    }

    #[test]
    fn test_customers_sorted_by_id() {
        let ids: Vec<String> = summaries().into_iter().map(|s| s.customer_id).collect();
        assert_eq!(ids, vec!["CUS_A", "CUS_B"]);
    }

    #[test]
    fn test_means_round_half_to_even() {
        let all = summaries();
        let a = &all[0];
        // (5 + 6) / 2 = 5.5 -> 6; (60 + 61) / 2 = 60.5 -> 60; (1 + 2) / 2 = 1.5 -> 2
        assert_eq!(a.avg_delay, 6);
        assert_eq!(a.avg_credit_history, 60);
        assert_eq!(a.avg_num_inquires, 2);
        assert_eq!(a.avg_outstanding_debt, 200);
        assert_eq!(a.rows, 2);
    }

    #[test]
    fn test_utilization_not_rounded() {
        let all = summaries();
        assert!((all[0].utilization - 0.15).abs() < 1e-12);
        assert!((all[1].utilization - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_first_non_empty_mix_and_loans() {
        let all = summaries();
        let b = &all[1];
        assert_eq!(b.credit_mix, CreditMix::Rating("Standard".to_string()));
        assert_eq!(b.loans.count, 2.0);
        assert_eq!(b.loans.types, vec!["Credit Card", "Mortgage Loan"]);
    }

    #[test]
    fn test_label_mean_round() {
        let all = summaries();
        // CUS_B: (1 + 2) / 2 = 1.5 -> 2
        assert_eq!(all[1].credit_label, Some(2));
        assert_eq!(all[1].clean_row(false).avg_credit_score, Some(2));
        assert_eq!(all[1].clean_row(true).avg_credit_score, Some(1));
    }

    #[test]
    fn test_months_on_file_falls_back_to_history() {
        let all = summaries();
        assert_eq!(all[0].months_on_file, 60);
    }

    #[test]
    fn test_to_profile_delay_modes() {
        let all = summaries();
        let b = &all[1];
        let average = b.to_profile(&IngestOptions::default());
        assert_eq!(average.delays, DelayHistory::Single(15.0));
        let series = b.to_profile(&IngestOptions {
            delays: DelayMode::Series,
            ..IngestOptions::default()
        });
        assert_eq!(series.delays, DelayHistory::Series(vec![10.0, 20.0]));
    }

    #[test]
    fn test_to_profile_mix_sources() {
        let all = summaries();
        let b = &all[1];
        let rating = b.to_profile(&IngestOptions::default());
        assert_eq!(rating.credit_mix, CreditMix::Rating("Standard".to_string()));
        let loans = b.to_profile(&IngestOptions {
            mix_source: MixSource::Loans,
            ..IngestOptions::default()
        });
        assert!(matches!(loans.credit_mix, CreditMix::Loans(_)));
        assert_eq!(loans.recorded_band, Some(ScoreBand::Good));
    }

    #[test]
    fn test_clean_row_encodes_mix() {
        let all = summaries();
        let row = all[0].clean_row(false);
        assert_eq!(row.avg_credit_mix, "2");
        assert_eq!(row.avg_delay, 6);
    }

    #[test]
    fn test_all_missing_column_defaults_to_zero() {
        let csv = "customer_id,avg_delay\nX,_\nX,\n";
        let all = aggregate(parse_records(csv.as_bytes()).unwrap());
        assert_eq!(all[0].avg_delay, 0);
        assert!(all[0].delays.is_empty());
        assert_eq!(all[0].credit_label, None);
        assert_eq!(all[0].credit_mix, CreditMix::Unknown);
    }

    #[test]
    fn test_ingest_options_parse() {
        let yaml = "delays: series\nmix_source: loans\namounts_owed: outstanding_debt\nbinary_labels: true\n";
        let options: IngestOptions = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(options.delays, DelayMode::Series);
        assert_eq!(options.mix_source, MixSource::Loans);
        assert_eq!(options.amounts_owed, Some(AmountsOwed::OutstandingDebt));
        assert!(options.binary_labels);
    }

    #[test]
    fn test_to_profile_amounts_owed_sources() {
        let all = summaries();
        let b = &all[1];
        let ratio = b.to_profile(&IngestOptions::default());
        assert!((ratio.utilization_ratio - 0.35).abs() < 1e-12);
        let debt = b.to_profile(&IngestOptions {
            amounts_owed: Some(AmountsOwed::OutstandingDebt),
            ..IngestOptions::default()
        });
        // (1000 + 1001) / 2 = 1000.5 -> 1000
        assert_eq!(debt.utilization_ratio, 1000.0);
    }

    #[test]
    fn test_resolve_follows_preset() {
        let mut traditional = IngestOptions::default();
        traditional.resolve(Preset::Traditional);
        assert_eq!(traditional.amounts_owed, Some(AmountsOwed::OutstandingDebt));

        let mut standard = IngestOptions::default();
        standard.resolve(Preset::Standard);
        assert_eq!(standard.amounts_owed, Some(AmountsOwed::Ratio));

        let mut explicit = IngestOptions {
            amounts_owed: Some(AmountsOwed::Ratio),
            ..IngestOptions::default()
        };
        explicit.resolve(Preset::Traditional);
        assert_eq!(explicit.amounts_owed, Some(AmountsOwed::Ratio));
    }
}
