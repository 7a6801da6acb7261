use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use receiptlens_core::{ReceiptFields, ReceiptItem};

use crate::error::StageError;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Greedy: first `{` through last `}`, across lines.
re!(re_json_object, r"(?s)\{.*\}");

// ── Public parsing API ────────────────────────────────────────────────────────

/// Decode a model response into receipt fields.
///
/// Models wrap their JSON in prose or code fences often enough that the object
/// is located by scanning rather than decoding the whole response. The decoded
/// object is then checked against the receipt shape before it is accepted.
pub fn parse_model_output(text: &str) -> Result<ReceiptFields, StageError> {
    let candidate = re_json_object()
        .find(text)
        .ok_or_else(|| StageError::malformed("no JSON object in model response"))?;

    let value: Value = serde_json::from_str(candidate.as_str())
        .map_err(|e| StageError::malformed(format!("invalid JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| StageError::malformed("top-level value is not an object"))?;

    Ok(ReceiptFields {
        merchant_name: text_field(obj, "merchantName"),
        merchant_address: text_field(obj, "merchantAddress"),
        receipt_date: text_field(obj, "receiptDate"),
        total_amount: amount_field(obj, "totalAmount").unwrap_or(0.0),
        subtotal: amount_field(obj, "subtotal").unwrap_or(0.0),
        tax: amount_field(obj, "tax").unwrap_or(0.0),
        items: items_field(obj)?,
    })
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

fn amount_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(parse_amount)
}

/// Numbers, or strings that become numbers once currency symbols, thousands
/// separators and whitespace are stripped. Negative and non-finite values are
/// treated as unknown.
fn parse_amount(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && !matches!(c, '$' | '€' | '£' | '¥' | ','))
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }?;
    (n.is_finite() && n >= 0.0).then_some(n)
}

/// Items that are not objects or have no description are dropped; the rest of
/// the receipt is kept.
fn items_field(obj: &Map<String, Value>) -> Result<Vec<ReceiptItem>, StageError> {
    match obj.get("items") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().enumerate().filter_map(|(i, v)| parse_item(i, v)).collect()),
        Some(_) => Err(StageError::malformed("`items` is not an array")),
    }
}

fn parse_item(index: usize, value: &Value) -> Option<ReceiptItem> {
    let Some(obj) = value.as_object() else {
        debug!(index, "skipping item that is not an object");
        return None;
    };
    let Some(description) = text_field(obj, "description") else {
        debug!(index, "skipping item without description");
        return None;
    };

    Some(ReceiptItem {
        description,
        quantity: amount_field(obj, "quantity"),
        unit_price: amount_field(obj, "unitPrice"),
        total_price: amount_field(obj, "totalPrice"),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
