//! Company credit risk from financial statements: Merton default
//! probability, Altman Z'' score and the combined lending decision.

pub mod altman;
pub mod decision;
pub mod merton;
pub mod statement;

pub use altman::{altman_z_score, AltmanResult};
pub use decision::{credit_decision, Decision};
pub use merton::{merton_default_probability, norm_cdf, MertonResult};
pub use statement::{load_statement, FinancialStatement};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

/// Why a risk metric could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    #[error("{0} unavailable")]
    Dependency(&'static str),
}

/// Market-side inputs to the Merton model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketInputs {
    /// Share price
    pub price: f64,
    /// Annualised asset volatility
    pub sigma: f64,
    /// Risk-free rate
    pub rate: f64,
    /// Horizon in years
    pub horizon: f64,
}

/// Every metric for one company. A metric that cannot be computed carries
/// the reason instead of a value.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskReport {
    pub ticker: Option<String>,
    pub as_of: Option<NaiveDate>,
    pub merton: Result<MertonResult, RiskError>,
    pub altman: Result<AltmanResult, RiskError>,
    pub decision: Result<Decision, RiskError>,
}

pub fn assess(statement: &FinancialStatement, market: &MarketInputs) -> RiskReport {
    let merton = merton_default_probability(statement, market);
    let altman = altman_z_score(statement, market.price);

    if let Err(ref e) = merton {
        warn!(error = %e, "merton model unavailable");
    }
    if let Err(ref e) = altman {
        warn!(error = %e, "altman z-score unavailable");
    }

    let decision = match (&altman, &merton) {
        (Ok(a), Ok(m)) => Ok(credit_decision(a.z_score, m.default_probability)),
        (Err(_), _) => Err(RiskError::Dependency("z-score")),
        (_, Err(_)) => Err(RiskError::Dependency("default probability")),
    };

    RiskReport {
        ticker: statement.ticker.clone(),
        as_of: statement.as_of,
        merton,
        altman,
        decision,
    }
}
