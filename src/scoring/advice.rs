use super::engine::ComponentScores;

const PAYMENT_HISTORY: &str =
    "Focus on making all payments on time. This is the most important factor.";
const REDUCE_BALANCES: &str =
    "Work on reducing credit card balances to below 10% of your credit limits.";
const PAY_DOWN_DEBT: &str = "Pay down existing debt, particularly revolving credit balances.";
const LIMIT_INQUIRIES: &str = "Limit applications for new credit in the next 6-12 months.";
const DIVERSIFY_MIX: &str =
    "Consider diversifying your credit portfolio with different types of credit.";
const KEEP_OLD_ACCOUNTS: &str = "Keep older accounts open to maintain a longer credit history.";

/// Improvement suggestions for the weakest components, most important first.
pub fn recommendations(components: &ComponentScores) -> Vec<&'static str> {
    let mut advice = Vec::new();

    if components.payment_history < 90.0 {
        advice.push(PAYMENT_HISTORY);
    }
    if components.utilization < 90.0 {
        advice.push(REDUCE_BALANCES);
        advice.push(PAY_DOWN_DEBT);
    }
    if components.inquiries < 90.0 {
        advice.push(LIMIT_INQUIRIES);
    }
    if components.credit_mix < 80.0 {
        advice.push(DIVERSIFY_MIX);
    }
    if components.history_length < 80.0 {
        advice.push(KEEP_OLD_ACCOUNTS);
    }

    advice
}
