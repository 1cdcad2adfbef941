use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::evaluation::Evaluation;
use crate::risk::{Decision, RiskError, RiskReport};
use crate::scoring::{ScoreBand, ScoreResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-100 sub-score, dropping a trailing ".0" (100, 88.5)
pub fn format_sub_score(value: f64) -> String {
    let formatted = format!("{:.1}", value);
    formatted
        .strip_suffix(".0")
        .map(str::to_string)
        .unwrap_or(formatted)
}

fn paint_band(band: ScoreBand, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match band {
        ScoreBand::Good => text.green().to_string(),
        ScoreBand::Standard => text.yellow().to_string(),
        ScoreBand::Bad => text.red().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate an id to fit available width, accounting for Unicode
fn truncate_id(id: &str, max_width: usize) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= max_width {
        id.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

const COMPONENT_HEADERS: [&str; 5] = ["PAY", "OWED", "HIST", "MIX", "INQ"];

/// Format scores as a table: index, score, band, the five sub-scores, customer.
/// Customer ids are truncated to the terminal width; pipes get them whole.
pub fn format_score_table(results: &[ScoreResult], use_colors: bool) -> String {
    if results.is_empty() {
        return "No customers found.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = 4; // fits "999."
    let score_width = 5;
    let band_width = 8; // "Standard"
    let component_width = 5;
    let separator = "  ";
    let fixed_width = index_width
        + 1
        + score_width
        + separator.len() * 2
        + band_width
        + (component_width + 1) * COMPONENT_HEADERS.len();

    let components_header = COMPONENT_HEADERS
        .iter()
        .map(|h| format!("{:>width$}", h, width = component_width))
        .collect::<Vec<_>>()
        .join(" ");
    let header = format!(
        "{:>iw$} {:>sw$}{}{:<bw$} {}{}{}",
        "#",
        "SCORE",
        separator,
        "BAND",
        components_header,
        separator,
        "CUSTOMER",
        iw = index_width,
        sw = score_width,
        bw = band_width
    );

    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(if use_colors {
        header.dimmed().to_string()
    } else {
        header
    });

    for (idx, result) in results.iter().enumerate() {
        let index_str = format!("{:>width$}", format!("{}.", idx + 1), width = index_width);
        let score_str = format!("{:>width$}", result.score, width = score_width);
        let band_str = format!("{:<width$}", result.band.as_str(), width = band_width);
        let components = result
            .components
            .as_array()
            .iter()
            .map(|v| format!("{:>width$}", format_sub_score(*v), width = component_width))
            .collect::<Vec<_>>()
            .join(" ");

        let customer = match term_width {
            Some(width) if width > fixed_width + 10 => {
                truncate_id(&result.customer_id, width - fixed_width)
            }
            // Very narrow terminal, show truncated
            Some(_) => truncate_id(&result.customer_id, 12),
            None => result.customer_id.clone(),
        };

        if use_colors {
            lines.push(format!(
                "{} {}{}{} {}{}{}",
                index_str.dimmed(),
                score_str.bold(),
                separator,
                paint_band(result.band, &band_str, true),
                components,
                separator,
                customer
            ));
        } else {
            lines.push(format!(
                "{} {}{}{} {}{}{}",
                index_str, score_str, separator, band_str, components, separator, customer
            ));
        }
    }

    lines.join("\n")
}

/// Format scores as tab-separated values for scripting
/// Columns: score, customer, band (no headers, no colors)
pub fn format_tsv(results: &[ScoreResult]) -> String {
    results
        .iter()
        .map(|r| format!("{}\t{}\t{}", r.score, r.customer_id, r.band))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line audit trail for one result
pub fn format_breakdown(result: &ScoreResult, use_colors: bool) -> String {
    let title = format!(
        "{}  {} ({})",
        result.customer_id,
        result.score,
        result.band.as_str()
    );
    let mut lines = vec![if use_colors {
        paint_band(result.band, &title, true).bold().to_string()
    } else {
        title
    }];

    let label_width = result
        .breakdown
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);

    for factor in &result.breakdown {
        let arithmetic = format!(
            "{:>5} x {:.2} = {:>6.2}",
            format_sub_score(factor.sub_score),
            factor.weight,
            factor.contribution
        );
        let description = if use_colors {
            factor.description.dimmed().to_string()
        } else {
            factor.description.clone()
        };
        lines.push(format!(
            "  {:<width$}  {}  {}",
            factor.label,
            arithmetic,
            description,
            width = label_width
        ));
    }

    lines.push(format!(
        "  {:<width$}  {:>21.2}",
        "Composite",
        result.composite,
        width = label_width
    ));
    if let Some(recorded) = result.recorded_band {
        lines.push(format!(
            "  {:<width$}  {}",
            "Recorded",
            recorded,
            width = label_width
        ));
    }

    lines.join("\n")
}

pub fn format_recommendations(advice: &[&str], use_colors: bool) -> String {
    if advice.is_empty() {
        return "No recommendations: every factor is in good shape.".to_string();
    }
    advice
        .iter()
        .map(|line| {
            if use_colors {
                format!("  {} {}", "-".cyan(), line)
            } else {
                format!("  - {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_risk_report(report: &RiskReport, use_colors: bool) -> String {
    let mut title = report.ticker.clone().unwrap_or_else(|| "(unnamed)".to_string());
    if let Some(as_of) = report.as_of {
        title = format!("{} as of {}", title, as_of);
    }
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    let unavailable = |reason: &RiskError| {
        let text = format!("unavailable ({})", reason);
        if use_colors {
            text.dimmed().to_string()
        } else {
            text
        }
    };

    match &report.merton {
        Ok(m) => {
            lines.push(format!("  Distance to default:     {:.4}", m.distance_to_default));
            lines.push(format!(
                "  Probability of default:  {:.4}%",
                m.default_probability * 100.0
            ));
        }
        Err(e) => {
            lines.push(format!("  Distance to default:     {}", unavailable(e)));
            lines.push(format!("  Probability of default:  {}", unavailable(e)));
        }
    }

    match &report.altman {
        Ok(a) => lines.push(format!(
            "  Altman Z-score:          {:.4}  (X1 {:.3}, X2 {:.3}, X3 {:.3}, X4 {:.3})",
            a.z_score, a.x1, a.x2, a.x3, a.x4
        )),
        Err(e) => lines.push(format!("  Altman Z-score:          {}", unavailable(e))),
    }

    match &report.decision {
        Ok(decision) => {
            let text = decision.to_string();
            let painted = if use_colors {
                match decision {
                    Decision::Approve => text.green().bold().to_string(),
                    Decision::NeedsReview => text.yellow().bold().to_string(),
                    Decision::Deny => text.red().bold().to_string(),
                }
            } else {
                text
            };
            lines.push(format!("  Decision:                {}", painted));
        }
        Err(e) => lines.push(format!("  Decision:                {}", unavailable(e))),
    }

    lines.join("\n")
}

pub fn format_evaluation(evaluation: &Evaluation) -> String {
    let mut lines = vec![
        format!("Samples:   {}", evaluation.samples),
        format!("Accuracy:  {:.4}", evaluation.accuracy),
        format!("Precision: {:.4} (macro)", evaluation.macro_precision),
        format!("Recall:    {:.4} (macro)", evaluation.macro_recall),
        format!("F1-score:  {:.4} (macro)", evaluation.macro_f1),
    ];
    if evaluation.skipped > 0 {
        lines.push(format!("Skipped:   {} without a recorded rating", evaluation.skipped));
    }

    lines.push(String::new());
    lines.push(format!(
        "{:<10} {:>9} {:>9} {:>9} {:>9}",
        "class", "precision", "recall", "f1", "support"
    ));
    for class in &evaluation.per_class {
        lines.push(format!(
            "{:<10} {:>9.4} {:>9.4} {:>9.4} {:>9}",
            class.label, class.precision, class.recall, class.f1, class.support
        ));
    }

    lines.push(String::new());
    lines.push("Confusion matrix (rows recorded, columns predicted):".to_string());
    lines.push(format!(
        "{:<10} {}",
        "",
        evaluation
            .class_names
            .iter()
            .map(|n| format!("{:>9}", n))
            .collect::<Vec<_>>()
            .join(" ")
    ));
    for (name, row) in evaluation.class_names.iter().zip(&evaluation.confusion) {
        lines.push(format!(
            "{:<10} {}",
            name,
            row.iter()
                .map(|c| format!("{:>9}", c))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate;
    use crate::profile::{CreditMix, CreditProfile};
    use crate::risk::{assess, FinancialStatement, MarketInputs};
    use crate::scoring::{Scorer, ScoringConfig};

    fn sample_results() -> Vec<ScoreResult> {
        let scorer = Scorer::new(&ScoringConfig::default()).unwrap();
        scorer.score_batch(&[
            CreditProfile::new("CUS_0x1000")
                .with_delay(0.0)
                .with_utilization(0.05)
                .with_history(120.0)
                .with_credit_mix(CreditMix::Rating("Good".to_string())),
            CreditProfile::new("CUS_0x2000")
                .with_delay(45.0)
                .with_utilization(0.95)
                .with_credit_mix(CreditMix::Ordinal(0))
                .with_inquiries(5.0),
        ])
    }

    #[test]
    fn test_format_sub_score() {
        assert_eq!(format_sub_score(100.0), "100");
        assert_eq!(format_sub_score(88.5), "88.5");
        assert_eq!(format_sub_score(0.0), "0");
    }

    #[test]
    fn test_truncate_id() {
        assert_eq!(truncate_id("CUS_0x1000", 20), "CUS_0x1000");
        assert_eq!(truncate_id("CUS_0x1000", 7), "CUS_...");
        assert_eq!(truncate_id("CUS_0x1000", 3), "CUS");
    }

    #[test]
    fn test_format_score_table_empty() {
        assert_eq!(format_score_table(&[], false), "No customers found.");
    }

    #[test]
    fn test_format_score_table_rows() {
        let table = format_score_table(&sample_results(), false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("SCORE"));
        assert!(lines[1].contains("  1."));
        assert!(lines[1].contains("841"));
        assert!(lines[1].contains("Good"));
        assert!(lines[1].contains("CUS_0x1000"));
        assert!(lines[2].contains("451"));
        assert!(lines[2].contains("Bad"));
    }

    #[test]
    fn test_format_tsv() {
        let tsv = format_tsv(&sample_results());
        assert_eq!(tsv, "841\tCUS_0x1000\tGood\n451\tCUS_0x2000\tBad");
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_breakdown() {
        let results = sample_results();
        let text = format_breakdown(&results[1], false);
        assert!(text.starts_with("CUS_0x2000  451 (Bad)"));
        assert!(text.contains("Payment History"));
        assert!(text.contains("40 x 0.35 =  14.00"));
        assert!(text.contains("Composite"));
        assert!(text.contains("27.50"));
    }

    #[test]
    fn test_format_recommendations() {
        assert!(format_recommendations(&[], false).starts_with("No recommendations"));
        assert_eq!(
            format_recommendations(&["Pay on time."], false),
            "  - Pay on time."
        );
    }

    #[test]
    fn test_format_risk_report_unavailable() {
        let report = assess(
            &FinancialStatement {
                ticker: Some("ACME".to_string()),
                ..FinancialStatement::default()
            },
            &MarketInputs {
                price: 10.0,
                sigma: 0.3,
                rate: 0.05,
                horizon: 1.0,
            },
        );
        let text = format_risk_report(&report, false);
        assert!(text.starts_with("ACME"));
        assert!(text.contains("Probability of default:  unavailable (missing shares_outstanding)"));
        assert!(text.contains("Altman Z-score:          unavailable (missing total_assets)"));
        assert!(text.contains("Decision:                unavailable"));
    }

    #[test]
    fn test_format_evaluation() {
        let evaluation = evaluate(&[(0, 0), (1, 1)], &["Bad", "Good"]);
        let text = format_evaluation(&evaluation);
        assert!(text.contains("Accuracy:  1.0000"));
        assert!(text.contains("Confusion matrix"));
        assert!(!text.contains("Skipped"));
    }
}
