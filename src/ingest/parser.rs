use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::scoring::ScoreBand;

/// One monthly row of the raw customer table.
///
/// Headers are matched by name with the aliases used across the known
/// exports; unknown columns are ignored. Numeric cells that fail to parse
/// are treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "Customer_ID", alias = "Customer ID")]
    pub customer_id: String,

    #[serde(
        rename = "delay_from_due_date",
        alias = "avg_delay",
        default,
        deserialize_with = "lenient_number"
    )]
    pub delay: Option<f64>,

    #[serde(
        rename = "num_of_delayed_payment",
        default,
        deserialize_with = "lenient_number"
    )]
    pub delayed_payments: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub months_on_file: Option<f64>,

    #[serde(
        rename = "credit_utilization_ratio",
        default,
        deserialize_with = "lenient_number"
    )]
    pub utilization: Option<f64>,

    #[serde(
        rename = "credit_history_age",
        alias = "avg_credit_history",
        alias = "credit_history_age_months",
        default,
        deserialize_with = "lenient_months"
    )]
    pub history_age: Option<f64>,

    #[serde(
        alias = "avg_credit_mix",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub credit_mix: Option<String>,

    #[serde(
        rename = "num_of_loan",
        alias = "avg_num_loans",
        default,
        deserialize_with = "lenient_number"
    )]
    pub loan_count: Option<f64>,

    #[serde(
        rename = "type_of_loan",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub loan_types: Option<String>,

    #[serde(
        rename = "num_credit_inquiries",
        alias = "avg_num_inquires",
        alias = "inquiries_last_12_months",
        default,
        deserialize_with = "lenient_number"
    )]
    pub inquiries: Option<f64>,

    #[serde(
        alias = "avg_outstanding_debt",
        default,
        deserialize_with = "lenient_number"
    )]
    pub outstanding_debt: Option<f64>,

    /// Recorded rating on the 0/1/2 encoding
    #[serde(
        rename = "credit_score",
        alias = "avg_credit_score",
        default,
        deserialize_with = "lenient_label"
    )]
    pub recorded_label: Option<f64>,
}

pub fn parse_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<RawRecord>().enumerate() {
        // +2: header line plus 1-based numbering
        let row = record.with_context(|| format!("Failed to parse CSV row {}", index + 2))?;
        if row.customer_id.trim().is_empty() {
            tracing::warn!(row = index + 2, "skipping row without a customer id");
            continue;
        }
        records.push(row);
    }

    tracing::debug!(rows = records.len(), "parsed customer rows");
    Ok(records)
}

/// Parse a numeric cell, tolerating stray underscores (`"23_"`) and
/// placeholders. Anything non-finite is missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parse a history age given either as a month count or as
/// `"22 Years and 1 Months"`.
pub fn parse_months(raw: &str) -> Option<f64> {
    if let Some(months) = parse_number(raw) {
        return Some(months);
    }
    let lower = raw.trim().to_lowercase();
    let (years, rest) = lower.split_once("year")?;
    let years = parse_number(years)?;
    let months = rest
        .trim_start_matches('s')
        .trim()
        .trim_start_matches("and")
        .split_whitespace()
        .next()
        .and_then(parse_number)
        .unwrap_or(0.0);
    Some(years * 12.0 + months)
}

fn parse_label(raw: &str) -> Option<f64> {
    parse_number(raw).or_else(|| ScoreBand::from_label(raw).map(|band| band.ordinal() as f64))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_string_as_none(deserializer)?.and_then(|raw| parse_number(&raw)))
}

fn lenient_months<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_string_as_none(deserializer)?.and_then(|raw| parse_months(&raw)))
}

fn lenient_label<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(empty_string_as_none(deserializer)?.and_then(|raw| parse_label(&raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_table() {
        let csv = "\
customer_id,delay_from_due_date,credit_utilization_ratio,credit_history_age,credit_mix,num_credit_inquiries,outstanding_debt,credit_score
CUS_1,3,0.26,265,Good,4,809.98,Good
CUS_1,_,0.31,266,_,4,809.98,2
";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer_id, "CUS_1");
        assert_eq!(records[0].delay, Some(3.0));
        assert_eq!(records[0].utilization, Some(0.26));
        assert_eq!(records[0].credit_mix.as_deref(), Some("Good"));
        assert_eq!(records[0].recorded_label, Some(2.0));
        assert_eq!(records[1].delay, None);
        assert_eq!(records[1].recorded_label, Some(2.0));
    }

    #[test]
    fn test_parse_cleaned_table_aliases() {
        let csv = "\
customer_id,avg_credit_history,avg_delay,avg_num_inquires,avg_outstanding_debt,avg_credit_mix,avg_credit_score
CUS_9,120,12,2,500,1,1
";
        let records = parse_records(csv.as_bytes()).unwrap();
        let row = &records[0];
        assert_eq!(row.history_age, Some(120.0));
        assert_eq!(row.delay, Some(12.0));
        assert_eq!(row.inquiries, Some(2.0));
        assert_eq!(row.outstanding_debt, Some(500.0));
        assert_eq!(row.credit_mix.as_deref(), Some("1"));
        assert_eq!(row.recorded_label, Some(1.0));
    }

    #[test]
    fn test_parse_customer_id_header_variants() {
        let csv = "Customer ID,num_of_loan,type_of_loan\nA,2,\"Auto Loan, and Mortgage Loan\"\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].customer_id, "A");
        assert_eq!(records[0].loan_count, Some(2.0));
        assert_eq!(
            records[0].loan_types.as_deref(),
            Some("Auto Loan, and Mortgage Loan")
        );
    }

    #[test]
    fn test_rows_without_customer_are_skipped() {
        let csv = "customer_id,avg_delay\n,5\nB,6\n";
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].customer_id, "B");
    }

    #[test]
    fn test_missing_customer_column_is_an_error() {
        let csv = "avg_delay\n5\n";
        assert!(parse_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number("23_"), Some(23.0));
        assert_eq!(parse_number(" 4.5 "), Some(4.5));
        assert_eq!(parse_number("_"), None);
        assert_eq!(parse_number("NA"), None);
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_months_variants() {
        assert_eq!(parse_months("265"), Some(265.0));
        assert_eq!(parse_months("22 Years and 1 Months"), Some(265.0));
        assert_eq!(parse_months("1 Year and 0 Months"), Some(12.0));
        assert_eq!(parse_months("NA"), None);
    }
}
