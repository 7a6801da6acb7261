use serde::{Deserialize, Serialize};
use std::fmt;

/// The stage of the extraction chain that produced a [`ReceiptResult`].
///
/// Confidence on a result is derived from this and nothing else; it names the
/// path, it does not measure field accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPath {
    /// OCR text detection followed by language-model structuring.
    OcrStructured,
    /// The language model read the uploaded document directly.
    DirectMultimodal,
    /// Static demonstration data; no upstream service succeeded.
    Placeholder,
}

impl ExtractionPath {
    pub const ALL: [ExtractionPath; 3] = [
        ExtractionPath::OcrStructured,
        ExtractionPath::DirectMultimodal,
        ExtractionPath::Placeholder,
    ];

    pub fn confidence(self) -> f64 {
        match self {
            ExtractionPath::OcrStructured => 0.85,
            ExtractionPath::DirectMultimodal => 0.9,
            ExtractionPath::Placeholder => 0.3,
        }
    }

    /// Inverse of [`ExtractionPath::confidence`]. Exact match only.
    pub fn from_confidence(confidence: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.confidence() == confidence)
    }
}

impl fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionPath::OcrStructured => write!(f, "ocr_structured"),
            ExtractionPath::DirectMultimodal => write!(f, "direct_multimodal"),
            ExtractionPath::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// One line item, identified only by its position in the owning result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

impl ReceiptItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), quantity: None, unit_price: None, total_price: None }
    }

    pub fn with_total(mut self, total_price: f64) -> Self {
        self.total_price = Some(total_price);
        self
    }
}

/// Structured fields decoded from a model response, before a path is attached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptFields {
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub receipt_date: Option<String>,
    pub total_amount: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub items: Vec<ReceiptItem>,
}

/// The orchestrator's output for one upload.
///
/// Fields are private: a result is built once through [`ReceiptResult::from_fields`]
/// and read through accessors afterwards. Serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResult {
    merchant_name: Option<String>,
    merchant_address: Option<String>,
    receipt_date: Option<String>,
    total_amount: f64,
    subtotal: f64,
    tax: f64,
    items: Vec<ReceiptItem>,
    confidence: f64,
    raw_text: String,
}

impl ReceiptResult {
    pub fn from_fields(fields: ReceiptFields, path: ExtractionPath, raw_text: impl Into<String>) -> Self {
        Self {
            merchant_name: fields.merchant_name,
            merchant_address: fields.merchant_address,
            receipt_date: fields.receipt_date,
            total_amount: fields.total_amount,
            subtotal: fields.subtotal,
            tax: fields.tax,
            items: fields.items,
            confidence: path.confidence(),
            raw_text: raw_text.into(),
        }
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.merchant_name.as_deref()
    }

    pub fn merchant_address(&self) -> Option<&str> {
        self.merchant_address.as_deref()
    }

    pub fn receipt_date(&self) -> Option<&str> {
        self.receipt_date.as_deref()
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn tax(&self) -> f64 {
        self.tax
    }

    pub fn items(&self) -> &[ReceiptItem] {
        &self.items
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Diagnostic text only (OCR output or a placeholder note).
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The path that produced this result, if the confidence is one of the known values.
    pub fn path(&self) -> Option<ExtractionPath> {
        ExtractionPath::from_confidence(self.confidence)
    }
}
