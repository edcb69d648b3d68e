//! Prompts and response schema for the packaging-analysis service.

use chrono::NaiveDate;

/// Keys every answer must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "name",
    "dosage",
    "manufacturer",
    "expiryDate",
    "isSealed",
    "isUnexpired",
    "isDateEstimated",
];

/// JSON response schema handed to the service alongside the prompt.
pub const RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "name": { "type": "string", "description": "Name of the medicine" },
    "dosage": { "type": "string", "description": "Strength/Dosage (e.g. 500mg)" },
    "manufacturer": { "type": "string", "description": "Pharma company name" },
    "expiryDate": { "type": ["string", "null"], "description": "Expiry date in YYYY-MM-DD format" },
    "manufactureDate": { "type": ["string", "null"], "description": "Manufacturing date in YYYY-MM-DD format, if printed" },
    "isSealed": { "type": "boolean", "description": "Is the medicine packaging sealed?" },
    "isUnexpired": { "type": "boolean", "description": "Is the expiry date in the future?" },
    "isDateEstimated": { "type": "boolean", "description": "True if the date had to be estimated because it wasn't clearly printed" },
    "confidence": { "type": "number", "description": "Confidence score from 0-1" }
  },
  "required": ["name", "dosage", "manufacturer", "expiryDate", "isSealed", "isUnexpired", "isDateEstimated"]
}"#;

/// Build the analysis instruction for a package photo taken on `today`.
pub fn make_analysis_prompt(today: NaiveDate) -> String {
    format!(
        r#"Extract medicine details from this image.
FALLBACK LOGIC FOR EXPIRY DATE:
1. If an expiry date is clearly visible, use it.
2. If only a Manufacturing Date (Mfg) is visible, add 3 years to determine the expiry date.
3. If NO date is visible, estimate a date exactly 6 months from today's date for safety.
4. If the determined date is in the past, set isUnexpired to false.

Current date: {}
Only provide details if it's a medicine. Determine if it is sealed.
Respond with a single JSON object with the keys: {}."#,
        today.format("%Y-%m-%d"),
        REQUIRED_FIELDS.join(", ")
    )
}
