use chrono::NaiveDate;

use receiptlens_core::{ExtractionPath, ReceiptFields, ReceiptItem, ReceiptResult};

/// The last stage of the chain: fixed demonstration data.
///
/// Makes no network call and cannot fail. Output depends only on the file
/// name and the date passed in.
pub fn placeholder(file_name: &str, date: NaiveDate) -> ReceiptResult {
    let fields = ReceiptFields {
        merchant_name: Some("Demo Store (Basic Processing)".to_string()),
        merchant_address: Some("123 Main St, City, State".to_string()),
        receipt_date: Some(date.format("%-m/%-d/%Y").to_string()),
        total_amount: 25.99,
        subtotal: 23.99,
        tax: 2.0,
        items: vec![
            ReceiptItem::new("Sample Item 1").with_total(12.99),
            ReceiptItem::new("Sample Item 2").with_total(10.99),
        ],
    };

    let raw_text = format!(
        "Demo data for file: {file_name}\n\n\
This is a demonstration of the basic processing fallback.\n\
To get actual receipt extraction, please enable the Vision API in your Google Cloud project.\n\n\
Neither OCR text extraction nor direct document reading produced a result.\n\
Still needed: Vision API for text extraction from images"
    );

    ReceiptResult::from_fields(fields, ExtractionPath::Placeholder, raw_text)
}
