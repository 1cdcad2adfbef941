//! CSV ingestion: the raw monthly customer table in, one profile per
//! customer out.

pub mod aggregate;
pub mod parser;

pub use aggregate::{
    aggregate, AmountsOwed, CleanRow, CustomerSummary, DelayMode, IngestOptions, MixSource,
};
pub use parser::{parse_records, RawRecord};

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

use crate::profile::CreditProfile;

/// Read and aggregate a customer CSV file.
pub fn read_summaries(path: &Path) -> Result<Vec<CustomerSummary>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    let records = parse_records(file)
        .with_context(|| format!("Failed to read customer table: {}", path.display()))?;
    Ok(aggregate(records))
}

/// Read a customer CSV file straight into scorable profiles.
pub fn load_profiles(path: &Path, options: &IngestOptions) -> Result<Vec<CreditProfile>> {
    Ok(read_summaries(path)?
        .iter()
        .map(|summary| summary.to_profile(options))
        .collect())
}
