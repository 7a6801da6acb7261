use serde::Serialize;

use crate::money::format_percent;
use crate::receipt::{ReceiptItem, ReceiptResult};

const LABEL_MAX_CHARS: usize = 20;

// ── Confidence badge ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBadge {
    High,
    Medium,
    Low,
}

impl ConfidenceBadge {
    pub fn for_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            ConfidenceBadge::High
        } else if confidence > 0.6 {
            ConfidenceBadge::Medium
        } else {
            ConfidenceBadge::Low
        }
    }

    /// Results below 0.6 came from the placeholder path and are flagged as such.
    pub fn is_basic_processing(confidence: f64) -> bool {
        confidence < 0.6
    }

    pub fn label(confidence: f64) -> String {
        format!("{}% confidence", (confidence * 100.0).round() as i64)
    }
}

// ── Chart series ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSlice {
    pub name: String,
    pub full_name: String,
    pub value: f64,
    pub quantity: f64,
    pub unit_price: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSlice {
    pub name: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRange {
    pub range: &'static str,
    pub count: usize,
    pub total: f64,
}

/// Derived figures shown alongside a receipt. Pure function of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptAnalytics {
    pub total_items: usize,
    pub average_item_price: f64,
    pub tax_rate_percent: f64,
    pub most_expensive_item: Option<ReceiptItem>,
    pub item_distribution: Vec<ItemSlice>,
    pub cost_breakdown: Vec<CostSlice>,
    pub price_ranges: Vec<PriceRange>,
}

impl ReceiptAnalytics {
    pub fn compute(receipt: &ReceiptResult) -> Self {
        let items = receipt.items();
        let total_items = items.len();

        // Subtotal is always numeric, so a zero subtotal gives a zero average.
        let average_item_price = if total_items > 0 {
            receipt.subtotal() / total_items as f64
        } else {
            0.0
        };

        let tax_rate_percent = if receipt.subtotal() > 0.0 {
            receipt.tax() / receipt.subtotal() * 100.0
        } else {
            0.0
        };

        // First item wins on ties.
        let most_expensive_item = items
            .iter()
            .fold(None::<&ReceiptItem>, |max, item| match max {
                Some(m) if price_of(item) <= price_of(m) => Some(m),
                _ => Some(item),
            })
            .cloned();

        Self {
            total_items,
            average_item_price,
            tax_rate_percent,
            most_expensive_item,
            item_distribution: item_distribution(items),
            cost_breakdown: cost_breakdown(receipt),
            price_ranges: price_ranges(items),
        }
    }

    pub fn tax_rate_label(&self) -> String {
        format_percent(self.tax_rate_percent)
    }
}

fn price_of(item: &ReceiptItem) -> f64 {
    item.total_price.unwrap_or(0.0)
}

fn item_distribution(items: &[ReceiptItem]) -> Vec<ItemSlice> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemSlice {
            name: truncate_label(&item.description),
            full_name: item.description.clone(),
            value: price_of(item),
            quantity: item.quantity.unwrap_or(1.0),
            unit_price: item.unit_price.unwrap_or(0.0),
            color: format!("hsl({}, 70%, 50%)", (i as f64 * 137.5) % 360.0),
        })
        .collect()
}

fn truncate_label(description: &str) -> String {
    if description.chars().count() > LABEL_MAX_CHARS {
        let head: String = description.chars().take(LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

fn cost_breakdown(receipt: &ReceiptResult) -> Vec<CostSlice> {
    [
        CostSlice { name: "Subtotal", value: receipt.subtotal(), color: "#3b82f6" },
        CostSlice { name: "Tax", value: receipt.tax(), color: "#ef4444" },
    ]
    .into_iter()
    .filter(|s| s.value > 0.0)
    .collect()
}

fn price_ranges(items: &[ReceiptItem]) -> Vec<PriceRange> {
    let mut ranges = vec![
        PriceRange { range: "$0-5", count: 0, total: 0.0 },
        PriceRange { range: "$5-10", count: 0, total: 0.0 },
        PriceRange { range: "$10-20", count: 0, total: 0.0 },
        PriceRange { range: "$20+", count: 0, total: 0.0 },
    ];
    for item in items {
        let price = price_of(item);
        let bucket = if price <= 5.0 {
            0
        } else if price <= 10.0 {
            1
        } else if price <= 20.0 {
            2
        } else {
            3
        };
        ranges[bucket].count += 1;
        ranges[bucket].total += price;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{ExtractionPath, ReceiptFields};

    fn receipt(subtotal: f64, tax: f64, total: f64, items: Vec<ReceiptItem>) -> ReceiptResult {
        ReceiptResult::from_fields(
            ReceiptFields { total_amount: total, subtotal, tax, items, ..Default::default() },
            ExtractionPath::OcrStructured,
            "",
        )
    }

    fn two_item_receipt() -> ReceiptResult {
        receipt(
            23.99,
            2.0,
            25.99,
            vec![
                ReceiptItem::new("Sample Item 1").with_total(12.99),
                ReceiptItem::new("Sample Item 2").with_total(10.99),
            ],
        )
    }

    #[test]
    fn tax_rate_and_average_price() {
        let a = ReceiptAnalytics::compute(&two_item_receipt());
        assert_eq!(a.total_items, 2);
        assert_eq!(a.tax_rate_label(), "8.3%");
        assert!((a.average_item_price - 23.99 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_subtotal_gives_zero_average_even_with_total() {
        let r = receipt(0.0, 0.0, 30.0, vec![ReceiptItem::new("A"), ReceiptItem::new("B"), ReceiptItem::new("C")]);
        let a = ReceiptAnalytics::compute(&r);
        assert_eq!(a.average_item_price, 0.0);
        assert_eq!(a.tax_rate_percent, 0.0);
    }

    #[test]
    fn empty_receipt_has_zeroed_figures() {
        let a = ReceiptAnalytics::compute(&receipt(0.0, 0.0, 0.0, vec![]));
        assert_eq!(a.total_items, 0);
        assert_eq!(a.average_item_price, 0.0);
        assert!(a.most_expensive_item.is_none());
        assert!(a.cost_breakdown.is_empty());
        assert!(a.item_distribution.is_empty());
        assert!(a.price_ranges.iter().all(|r| r.count == 0));
    }

    #[test]
    fn most_expensive_prefers_first_on_tie() {
        let r = receipt(
            0.0,
            0.0,
            0.0,
            vec![
                ReceiptItem::new("cheap").with_total(1.0),
                ReceiptItem::new("first").with_total(9.0),
                ReceiptItem::new("second").with_total(9.0),
            ],
        );
        let a = ReceiptAnalytics::compute(&r);
        assert_eq!(a.most_expensive_item.unwrap().description, "first");
    }

    #[test]
    fn price_ranges_bucket_boundaries() {
        let r = receipt(
            0.0,
            0.0,
            0.0,
            vec![
                ReceiptItem::new("a").with_total(5.0),
                ReceiptItem::new("b").with_total(5.01),
                ReceiptItem::new("c").with_total(20.0),
                ReceiptItem::new("d").with_total(20.5),
                ReceiptItem::new("no price"),
            ],
        );
        let a = ReceiptAnalytics::compute(&r);
        let counts: Vec<usize> = a.price_ranges.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
        assert_eq!(a.price_ranges[3].total, 20.5);
    }

    #[test]
    fn cost_breakdown_drops_zero_tax() {
        let r = receipt(10.0, 0.0, 10.0, vec![]);
        let a = ReceiptAnalytics::compute(&r);
        assert_eq!(a.cost_breakdown.len(), 1);
        assert_eq!(a.cost_breakdown[0].name, "Subtotal");
    }

    #[test]
    fn distribution_labels_and_colors() {
        let r = receipt(
            0.0,
            0.0,
            0.0,
            vec![
                ReceiptItem::new("Organic Free Range Chicken Thighs"),
                ReceiptItem::new("Milk"),
            ],
        );
        let a = ReceiptAnalytics::compute(&r);
        assert_eq!(a.item_distribution[0].name, "Organic Free Range C...");
        assert_eq!(a.item_distribution[0].full_name, "Organic Free Range Chicken Thighs");
        assert_eq!(a.item_distribution[0].quantity, 1.0);
        assert_eq!(a.item_distribution[0].color, "hsl(0, 70%, 50%)");
        assert_eq!(a.item_distribution[1].color, "hsl(137.5, 70%, 50%)");
    }

    #[test]
    fn confidence_badges() {
        assert_eq!(ConfidenceBadge::for_confidence(0.9), ConfidenceBadge::High);
        assert_eq!(ConfidenceBadge::for_confidence(0.85), ConfidenceBadge::High);
        assert_eq!(ConfidenceBadge::for_confidence(0.7), ConfidenceBadge::Medium);
        assert_eq!(ConfidenceBadge::for_confidence(0.3), ConfidenceBadge::Low);
        assert!(ConfidenceBadge::is_basic_processing(0.3));
        assert!(!ConfidenceBadge::is_basic_processing(0.85));
        assert_eq!(ConfidenceBadge::label(0.85), "85% confidence");
    }
}
