pub mod config;
pub mod evaluation;
pub mod ingest;
pub mod output;
pub mod profile;
pub mod risk;
pub mod scoring;
pub mod telemetry;
