//! Medicine analysis extraction from AI service output.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expiry::{is_unexpired, resolve_expiry};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Response failed schema validation: {0}")]
    Schema(String),

    #[error("Analysis service error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw analysis as returned by the service, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    pub name: String,
    pub dosage: String,
    pub manufacturer: String,
    /// `YYYY-MM-DD`; null when nothing usable was printed. The key itself is required.
    #[serde(deserialize_with = "Option::deserialize")]
    pub expiry_date: Option<String>,
    /// `YYYY-MM-DD`; only consulted when no expiry date is present
    #[serde(default)]
    pub manufacture_date: Option<String>,
    pub is_sealed: bool,
    pub is_unexpired: bool,
    pub is_date_estimated: bool,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A validated analysis of one medicine package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineAnalysis {
    pub name: String,
    pub dosage: String,
    pub manufacturer: String,
    pub expiry_date: NaiveDate,
    pub is_sealed: bool,
    pub is_unexpired: bool,
    pub is_date_estimated: bool,
    /// Confidence score in `0.0..=1.0`
    pub confidence: f64,
}

/// Parse and validate the service's answer.
///
/// `today` anchors the expiry fallback and the unexpired check; the flag the
/// service reports is recomputed rather than trusted.
pub fn parse_analysis(text: &str, today: NaiveDate) -> ExtractionResult<MedicineAnalysis> {
    // Models sometimes wrap the object in prose or code fences
    let json_start = text.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = text.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let raw: RawAnalysis = serde_json::from_str(&text[json_start..=json_end])?;
    validate(raw, today)
}

/// Validate a raw analysis against the schema rules.
pub fn validate(raw: RawAnalysis, today: NaiveDate) -> ExtractionResult<MedicineAnalysis> {
    let name = raw.name.trim().to_string();
    if name.is_empty() {
        return Err(ExtractionError::Schema("name must not be empty".into()));
    }

    let confidence = raw.confidence.unwrap_or(0.0);
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ExtractionError::Schema(format!(
            "confidence {} outside 0..=1",
            confidence
        )));
    }

    let printed = parse_optional_date("expiryDate", raw.expiry_date.as_deref())?;
    let manufactured = parse_optional_date("manufactureDate", raw.manufacture_date.as_deref())?;
    let resolved = resolve_expiry(printed, manufactured, today);

    let unexpired = is_unexpired(resolved.date, today);
    if unexpired != raw.is_unexpired {
        warn!(
            "Service reported isUnexpired={} for {} expiring {}; using {}",
            raw.is_unexpired, name, resolved.date, unexpired
        );
    }

    debug!("Validated analysis for {} (confidence {:.2})", name, confidence);

    Ok(MedicineAnalysis {
        name,
        dosage: raw.dosage.trim().to_string(),
        manufacturer: raw.manufacturer.trim().to_string(),
        expiry_date: resolved.date,
        is_sealed: raw.is_sealed,
        is_unexpired: unexpired,
        is_date_estimated: raw.is_date_estimated || resolved.is_estimated(),
        confidence,
    })
}

fn parse_optional_date(field: &str, value: Option<&str>) -> ExtractionResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ExtractionError::Schema(format!("{} is not a YYYY-MM-DD date: {}", field, s))),
    }
}

/// Anything that can turn a package photo into a validated analysis.
pub trait MedicineAnalyzer {
    fn analyze(&self, image: &[u8]) -> ExtractionResult<MedicineAnalysis>;
}

/// Mock analyzer for testing without calling the real service.
pub struct MockAnalyzer {
    response: Result<String, String>,
    today: NaiveDate,
}

impl MockAnalyzer {
    /// Answer every request with the given raw response text.
    pub fn responding(response: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            response: Ok(response.into()),
            today,
        }
    }

    /// Fail every request as if the service were unreachable.
    pub fn failing(message: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            response: Err(message.into()),
            today,
        }
    }
}

impl MedicineAnalyzer for MockAnalyzer {
    fn analyze(&self, image: &[u8]) -> ExtractionResult<MedicineAnalysis> {
        if image.is_empty() {
            return Err(ExtractionError::InvalidFormat("Empty image".into()));
        }
        match &self.response {
            Ok(text) => parse_analysis(text, self.today),
            Err(message) => Err(ExtractionError::Inference(message.clone())),
        }
    }
}
