use serde::Serialize;

use super::statement::{require_positive, FinancialStatement};
use super::{MarketInputs, RiskError};

/// Merton structural model output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MertonResult {
    pub equity: f64,
    pub debt: f64,
    pub assets: f64,
    pub distance_to_default: f64,
    pub default_probability: f64,
}

/// Probability of default from the Merton model.
///
/// Equity is valued at market (shares times price), debt is total
/// liabilities and assets are their sum:
/// `DD = (ln(V/D) + (r - sigma^2/2) T) / (sigma sqrt(T))`, `PD = N(-DD)`.
pub fn merton_default_probability(
    statement: &FinancialStatement,
    market: &MarketInputs,
) -> Result<MertonResult, RiskError> {
    if !(market.sigma.is_finite() && market.sigma > 0.0) {
        return Err(RiskError::InvalidParameter {
            name: "sigma",
            value: market.sigma,
        });
    }
    if !(market.horizon.is_finite() && market.horizon > 0.0) {
        return Err(RiskError::InvalidParameter {
            name: "horizon",
            value: market.horizon,
        });
    }
    if !market.rate.is_finite() {
        return Err(RiskError::InvalidParameter {
            name: "rate",
            value: market.rate,
        });
    }

    let equity = statement.market_equity(market.price)?;
    let debt = require_positive("total_liabilities", statement.total_liabilities)?;
    let assets = equity + debt;

    let drift = (market.rate - 0.5 * market.sigma.powi(2)) * market.horizon;
    let distance_to_default =
        ((assets / debt).ln() + drift) / (market.sigma * market.horizon.sqrt());
    let default_probability = norm_cdf(-distance_to_default);

    if !distance_to_default.is_finite() || !default_probability.is_finite() {
        return Err(RiskError::NonFinite("default_probability"));
    }

    Ok(MertonResult {
        equity,
        debt,
        assets,
        distance_to_default,
        default_probability,
    })
}

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

// Abramowitz and Stegun 7.1.26, max error 1.5e-7
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
