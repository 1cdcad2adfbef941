use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::ingest::CustomerSummary;
use crate::scoring::ScoreResult;

const SCORE_HEADERS: [&str; 9] = [
    "Customer ID",
    "Payment History Score",
    "Amounts Owed Score",
    "Length of History Score",
    "Credit Mix Score",
    "Inquiries Score",
    "Calculated FICO Score",
    "Band",
    "Original Credit Score",
];

const CLEAN_HEADERS: [&str; 7] = [
    "customer_id",
    "avg_credit_history",
    "avg_delay",
    "avg_num_inquires",
    "avg_outstanding_debt",
    "avg_credit_mix",
    "avg_credit_score",
];

/// Scored row; field order follows `SCORE_HEADERS`.
#[derive(Debug, Serialize)]
struct ScoreRow<'a> {
    #[serde(rename = "Customer ID")]
    customer_id: &'a str,
    #[serde(rename = "Payment History Score")]
    payment_history: f64,
    #[serde(rename = "Amounts Owed Score")]
    utilization: f64,
    #[serde(rename = "Length of History Score")]
    history_length: f64,
    #[serde(rename = "Credit Mix Score")]
    credit_mix: f64,
    #[serde(rename = "Inquiries Score")]
    inquiries: f64,
    #[serde(rename = "Calculated FICO Score")]
    score: u16,
    #[serde(rename = "Band")]
    band: &'static str,
    #[serde(rename = "Original Credit Score")]
    recorded: Option<&'static str>,
}

impl<'a> From<&'a ScoreResult> for ScoreRow<'a> {
    fn from(result: &'a ScoreResult) -> Self {
        Self {
            customer_id: &result.customer_id,
            payment_history: result.components.payment_history,
            utilization: result.components.utilization,
            history_length: result.components.history_length,
            credit_mix: result.components.credit_mix,
            inquiries: result.components.inquiries,
            score: result.score,
            band: result.band.as_str(),
            recorded: result.recorded_band.map(|band| band.as_str()),
        }
    }
}

/// Headers are written up front so an empty batch still yields a header line.
fn headed_writer<W: Write>(writer: W, headers: &[&str]) -> Result<csv::Writer<W>> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer
        .write_record(headers)
        .context("Failed to write CSV header")?;
    Ok(csv_writer)
}

pub fn write_scores_csv<W: Write>(writer: W, results: &[ScoreResult]) -> Result<()> {
    let mut csv_writer = headed_writer(writer, &SCORE_HEADERS)?;
    for result in results {
        csv_writer
            .serialize(ScoreRow::from(result))
            .with_context(|| format!("Failed to write row for {}", result.customer_id))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write the cleaned per-customer training table.
pub fn write_clean_csv<W: Write>(
    writer: W,
    summaries: &[CustomerSummary],
    binary_labels: bool,
) -> Result<()> {
    let mut csv_writer = headed_writer(writer, &CLEAN_HEADERS)?;
    for summary in summaries {
        csv_writer
            .serialize(summary.clean_row(binary_labels))
            .with_context(|| format!("Failed to write row for {}", summary.customer_id))?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value).context("Failed to serialize JSON")?;
    writeln!(writer).context("Failed to write JSON output")?;
    Ok(())
}
