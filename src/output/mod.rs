pub mod export;
pub mod formatter;

pub use export::{write_clean_csv, write_json, write_scores_csv};
pub use formatter::{
    format_breakdown, format_evaluation, format_recommendations, format_risk_report,
    format_score_table, format_sub_score, format_tsv, should_use_colors,
};

use anyhow::Result;
use clap::ValueEnum;

use crate::scoring::ScoreResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table, colored on a terminal
    #[default]
    Table,
    /// score, customer, band; no header
    Tsv,
    Csv,
    Json,
}

/// Render scored customers in the chosen format.
pub fn render_scores(
    results: &[ScoreResult],
    format: OutputFormat,
    use_colors: bool,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_score_table(results, use_colors)),
        OutputFormat::Tsv => Ok(format_tsv(results)),
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_scores_csv(&mut buffer, results)?;
            Ok(String::from_utf8(buffer)?)
        }
        OutputFormat::Json => {
            let mut buffer = Vec::new();
            write_json(&mut buffer, results)?;
            Ok(String::from_utf8(buffer)?)
        }
    }
}
