pub mod types;

pub use types::{CreditMix, CreditProfile, DelayHistory, LoanPortfolio};
