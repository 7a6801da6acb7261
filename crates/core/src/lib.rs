pub mod analytics;
pub mod money;
pub mod receipt;

pub use analytics::{ConfidenceBadge, CostSlice, ItemSlice, PriceRange, ReceiptAnalytics};
pub use money::{format_percent, format_usd};
pub use receipt::{ExtractionPath, ReceiptFields, ReceiptItem, ReceiptResult};
