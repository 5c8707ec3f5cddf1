//! Result budgeter — keeps tool output inside the model's context budget.
//!
//! Oversized payloads are never truncated mid-row: they are replaced by a
//! JSON warning that tells the model how to shrink its next query.

use serde::Serialize;
use tracing::warn;

/// Default estimated-token ceiling for a single tool result.
pub const DEFAULT_TOKEN_LIMIT: usize = 5000;

/// Characters per estimated token.
const CHARS_PER_TOKEN: usize = 3;

/// The suggested row limit targets this share of the budget.
const SAFETY_MARGIN: f64 = 0.8;

/// Error tag carried by every over-budget warning.
pub const BUDGET_ERROR_TAG: &str = "Result exceeds token budget";

/// Outcome of measuring one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetDecision {
    pub within_budget: bool,
    pub estimated_tokens: usize,
    pub limit: usize,
    /// Rows in the payload when it is a non-empty JSON array.
    pub row_count: Option<usize>,
    /// Row limit likely to fit; only set when over budget.
    pub suggested_row_limit: Option<usize>,
}

#[derive(Serialize)]
struct BudgetWarning<'a> {
    error: &'static str,
    context: &'a str,
    estimated_tokens: usize,
    token_limit: usize,
    rows_returned: Option<usize>,
    suggested_limit: Option<usize>,
    suggestion: String,
}

/// Token budget for tool results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenBudget {
    limit: usize,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LIMIT)
    }
}

impl TokenBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// `ceil(chars / 3)`.
    pub fn estimate_tokens(text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }

    /// Measure `payload` against the budget.
    pub fn decide(&self, payload: &str) -> BudgetDecision {
        let estimated_tokens = Self::estimate_tokens(payload);
        if estimated_tokens <= self.limit {
            return BudgetDecision {
                within_budget: true,
                estimated_tokens,
                limit: self.limit,
                row_count: None,
                suggested_row_limit: None,
            };
        }

        let row_count = row_count(payload);
        let suggested_row_limit = row_count.map(|rows| {
            let ratio = self.limit as f64 / estimated_tokens as f64;
            ((rows as f64 * ratio * SAFETY_MARGIN).floor() as usize).max(1)
        });

        BudgetDecision {
            within_budget: false,
            estimated_tokens,
            limit: self.limit,
            row_count,
            suggested_row_limit,
        }
    }

    /// Return `payload` unchanged when it fits, otherwise a JSON warning with
    /// remediation hints. `context` names the calling tool.
    pub fn enforce(&self, payload: &str, context: &str) -> String {
        let decision = self.decide(payload);
        if decision.within_budget {
            return payload.to_string();
        }

        warn!(
            context,
            estimated_tokens = decision.estimated_tokens,
            limit = decision.limit,
            rows = ?decision.row_count,
            "tool result over token budget"
        );

        let warning = BudgetWarning {
            error: BUDGET_ERROR_TAG,
            context,
            estimated_tokens: decision.estimated_tokens,
            token_limit: decision.limit,
            rows_returned: decision.row_count,
            suggested_limit: decision.suggested_row_limit,
            suggestion: suggestion_text(decision.suggested_row_limit),
        };
        serde_json::to_string_pretty(&warning).unwrap_or_else(|_| BUDGET_ERROR_TAG.to_string())
    }
}

/// Element count of a JSON array payload; `None` for anything else or an
/// empty array.
fn row_count(payload: &str) -> Option<usize> {
    if !payload.trim_start().starts_with('[') {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Array(items)) if !items.is_empty() => Some(items.len()),
        _ => None,
    }
}

fn suggestion_text(suggested: Option<usize>) -> String {
    let lower_limit = match suggested {
        Some(n) => format!("  • Reduce the LIMIT value (try LIMIT {n})"),
        None => "  • Reduce the LIMIT value".to_string(),
    };
    [
        "The query result is too large. Please adjust your query:".to_string(),
        lower_limit,
        "  • Filter rows with WHERE clauses to reduce result size".to_string(),
        "  • Select only necessary columns instead of SELECT *".to_string(),
        "  • Use aggregation (COUNT, SUM, AVG) instead of retrieving raw rows".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows_payload(rows: usize, width: usize) -> String {
        let data: Vec<Value> = (0..rows)
            .map(|i| json!({"id": i, "message": "x".repeat(width)}))
            .collect();
        serde_json::to_string_pretty(&data).unwrap()
    }

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(TokenBudget::estimate_tokens(""), 0);
        assert_eq!(TokenBudget::estimate_tokens("ab"), 1);
        assert_eq!(TokenBudget::estimate_tokens("abc"), 1);
        assert_eq!(TokenBudget::estimate_tokens("abcd"), 2);
        // Counted in characters, not bytes
        assert_eq!(TokenBudget::estimate_tokens("ééé"), 1);
    }

    #[test]
    fn test_within_budget_unchanged_and_idempotent() {
        let budget = TokenBudget::default();
        let payload = rows_payload(3, 10);
        let once = budget.enforce(&payload, "query_parquet_files");
        assert_eq!(once, payload);
        assert_eq!(budget.enforce(&once, "query_parquet_files"), once);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let budget = TokenBudget::new(2);
        assert!(budget.decide("abcdef").within_budget);
        assert!(!budget.decide("abcdefg").within_budget);
    }

    #[test]
    fn test_over_budget_replaced_with_warning() {
        let budget = TokenBudget::default();
        let payload = rows_payload(200, 200);
        let out = budget.enforce(&payload, "query_parquet_files");

        assert_ne!(out, payload);
        let warning: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(warning["error"], BUDGET_ERROR_TAG);
        assert_eq!(warning["context"], "query_parquet_files");
        assert_eq!(warning["token_limit"], 5000);
        assert_eq!(warning["rows_returned"], 200);

        let estimate = TokenBudget::estimate_tokens(&payload);
        assert_eq!(warning["estimated_tokens"], estimate);
        let expected = ((200.0 * (5000.0 / estimate as f64) * 0.8).floor() as u64).max(1);
        assert_eq!(warning["suggested_limit"], expected);
        assert!(expected <= 200);

        let suggestion = warning["suggestion"].as_str().unwrap();
        assert!(suggestion.contains(&format!("try LIMIT {expected}")));
        assert!(suggestion.contains("WHERE"));
        assert!(suggestion.contains("aggregation"));
    }

    #[test]
    fn test_warning_field_order() {
        let out = TokenBudget::new(1).enforce(&rows_payload(2, 10), "ctx");
        let keys: Vec<String> = serde_json::from_str::<serde_json::Map<String, Value>>(&out)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(
            keys,
            vec![
                "error",
                "context",
                "estimated_tokens",
                "token_limit",
                "rows_returned",
                "suggested_limit",
                "suggestion"
            ]
        );
    }

    #[test]
    fn test_suggested_limit_never_below_one() {
        let budget = TokenBudget::new(1);
        let decision = budget.decide(&rows_payload(1, 5000));
        assert_eq!(decision.row_count, Some(1));
        assert_eq!(decision.suggested_row_limit, Some(1));
    }

    #[test]
    fn test_non_array_payload_has_no_suggestion() {
        let budget = TokenBudget::new(1);
        let out = budget.enforce("Schema for logs.parquet: many columns", "get_schema");
        let warning: Value = serde_json::from_str(&out).unwrap();
        assert!(warning["rows_returned"].is_null());
        assert!(warning["suggested_limit"].is_null());
        assert!(!warning["suggestion"].as_str().unwrap().contains("try LIMIT"));
    }

    #[test]
    fn test_empty_array_has_no_row_count() {
        let decision = TokenBudget::new(0).decide("[]");
        assert!(!decision.within_budget);
        assert_eq!(decision.row_count, None);
    }
}
