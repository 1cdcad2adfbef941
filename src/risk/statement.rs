use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::RiskError;

/// Balance sheet and income statement figures for one company.
///
/// Every figure is optional; a model that needs a missing figure reports
/// itself unavailable instead of failing the whole assessment.
///
/// Example YAML:
/// ```yaml
/// ticker: ACME
/// as_of: "2024-12-31"
/// shares_outstanding: 1000000
/// total_liabilities: 5.2e6
/// total_assets: 9.8e6
/// working_capital: 1.1e6
/// retained_earnings: 2.4e6
/// ebit: 8.0e5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FinancialStatement {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub total_liabilities: Option<f64>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub working_capital: Option<f64>,
    #[serde(default)]
    pub retained_earnings: Option<f64>,
    #[serde(default)]
    pub ebit: Option<f64>,
}

impl FinancialStatement {
    /// Market value of equity at `price` per share.
    pub fn market_equity(&self, price: f64) -> Result<f64, RiskError> {
        let shares = require("shares_outstanding", self.shares_outstanding)?;
        if !price.is_finite() || price < 0.0 {
            return Err(RiskError::InvalidParameter {
                name: "price",
                value: price,
            });
        }
        Ok(shares * price)
    }
}

/// A figure that must be present and finite.
pub(crate) fn require(field: &'static str, value: Option<f64>) -> Result<f64, RiskError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(RiskError::NonFinite(field)),
        None => Err(RiskError::MissingField(field)),
    }
}

/// A figure used as a divisor: present, finite and strictly positive.
pub(crate) fn require_positive(field: &'static str, value: Option<f64>) -> Result<f64, RiskError> {
    let v = require(field, value)?;
    if v <= 0.0 {
        return Err(RiskError::NonPositive { field, value: v });
    }
    Ok(v)
}

pub fn load_statement(path: &Path) -> Result<FinancialStatement> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read statement file: {}", path.display()))?;
    let statement: FinancialStatement = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse statement file: {}", path.display()))?;
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement() {
        let yaml = r#"
ticker: ACME
as_of: "2024-12-31"
shares_outstanding: 100
total_liabilities: 500
total_assets: 1000
"#;
        let statement: FinancialStatement = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(statement.ticker.as_deref(), Some("ACME"));
        assert_eq!(statement.as_of, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(statement.total_assets, Some(1000.0));
        assert!(statement.ebit.is_none());
    }

    #[test]
    fn test_unknown_statement_field_rejected() {
        let yaml = "ticker: ACME\nrevenue: 10\n";
        assert!(serde_saphyr::from_str::<FinancialStatement>(yaml).is_err());
    }

    #[test]
    fn test_market_equity() {
        let statement = FinancialStatement {
            shares_outstanding: Some(100.0),
            ..FinancialStatement::default()
        };
        assert_eq!(statement.market_equity(10.0).unwrap(), 1000.0);
        assert!(matches!(
            statement.market_equity(-1.0),
            Err(RiskError::InvalidParameter { name: "price", .. })
        ));
        assert!(matches!(
            FinancialStatement::default().market_equity(10.0),
            Err(RiskError::MissingField("shares_outstanding"))
        ));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("total_assets", Some(1.0)).is_ok());
        assert!(matches!(
            require_positive("total_assets", Some(0.0)),
            Err(RiskError::NonPositive { .. })
        ));
        assert!(matches!(
            require_positive("total_assets", Some(f64::NAN)),
            Err(RiskError::NonFinite("total_assets"))
        ));
    }

    #[test]
    fn test_load_statement_file() {
        let path = std::env::temp_dir().join("credit-scorer-statement-test.yaml");
        fs::write(&path, "ticker: XYZ\nebit: 42\n").unwrap();
        let statement = load_statement(&path).unwrap();
        assert_eq!(statement.ebit, Some(42.0));
        fs::remove_file(&path).ok();
    }
}
