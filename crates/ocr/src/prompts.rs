//! Instruction prompts for receipt structuring.
//!
//! Both prompts ask for the same JSON shape so that one parser handles the
//! response of either model call.

const RESPONSE_SHAPE: &str = r#"Please extract and return ONLY a valid JSON object with the following structure:
{
  "merchantName": "string or null",
  "merchantAddress": "string or null",
  "receiptDate": "string or null",
  "totalAmount": number or 0,
  "subtotal": number or 0,
  "tax": number or 0,
  "items": [
    {
      "description": "string",
      "quantity": number or null,
      "unitPrice": number or null,
      "totalPrice": number or null
    }
  ]
}"#;

fn rules(source: &str) -> String {
    format!(
        "Rules:\n\
- Extract actual values from the {source}, don't make up data\n\
- For amounts, extract only the numeric value (no currency symbols)\n\
- If information is not found, use null for strings and 0 for numbers\n\
- Items array should contain actual line items from the receipt\n\
- Return only the JSON object, no additional text or formatting"
    )
}

/// Prompt for structuring OCR-extracted receipt text.
pub fn text_structuring_prompt(ocr_text: &str) -> String {
    format!(
        "You are a receipt data extraction expert. Analyze the following receipt text and extract structured information in JSON format.\n\n\
Receipt Text:\n{ocr_text}\n\n{RESPONSE_SHAPE}\n\n{}",
        rules("text")
    )
}

/// Prompt sent alongside the raw document for direct multimodal reading.
pub fn direct_document_prompt() -> String {
    format!(
        "Analyze this receipt image and extract structured information in JSON format.\n\n{RESPONSE_SHAPE}\n\n{}",
        rules("receipt")
    )
}
