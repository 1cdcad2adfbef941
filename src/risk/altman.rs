use serde::Serialize;

use super::statement::{require, require_positive, FinancialStatement};
use super::RiskError;

/// Altman Z'' components and score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AltmanResult {
    /// Working capital / total assets
    pub x1: f64,
    /// Retained earnings / total assets
    pub x2: f64,
    /// EBIT / total assets
    pub x3: f64,
    /// Market equity / total liabilities
    pub x4: f64,
    pub z_score: f64,
}

pub fn altman_z_score(
    statement: &FinancialStatement,
    price: f64,
) -> Result<AltmanResult, RiskError> {
    let total_assets = require_positive("total_assets", statement.total_assets)?;
    let total_liabilities = require_positive("total_liabilities", statement.total_liabilities)?;
    let working_capital = require("working_capital", statement.working_capital)?;
    let retained_earnings = require("retained_earnings", statement.retained_earnings)?;
    let ebit = require("ebit", statement.ebit)?;
    let equity = statement.market_equity(price)?;

    let x1 = working_capital / total_assets;
    let x2 = retained_earnings / total_assets;
    let x3 = ebit / total_assets;
    let x4 = equity / total_liabilities;
    let z_score = 6.56 * x1 + 3.26 * x2 + 6.72 * x3 + 1.05 * x4;

    if !z_score.is_finite() {
        return Err(RiskError::NonFinite("z_score"));
    }

    Ok(AltmanResult {
        x1,
        x2,
        x3,
        x4,
        z_score,
    })
}
