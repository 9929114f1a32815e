//! Document extraction — turns the text of an uploaded PDF into a validated
//! document record via the LLM.
//!
//! Rules applied to the LLM output:
//! - confidence below `MIN_CONFIDENCE` rejects the document;
//! - blank name, date, summary or doctor rejects the document;
//! - an unknown appointment type becomes `Other` only when confidence is
//!   strictly above `MIN_CONFIDENCE`, otherwise the type is a conflict;
//! - a malformed date falls back to today.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::documents::prompts::{DOCUMENT_PARSE_PROMPT, DOCUMENT_PARSE_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::appointment::AppointmentType;

pub const MIN_CONFIDENCE: i32 = 51;
pub const MAX_PROMPT_CHARS: usize = 4000;

/// LLM output as returned; every field may be missing or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExtraction {
    pub name: Option<String>,
    pub date: Option<String>,
    pub appointment_type: Option<String>,
    pub summary: Option<String>,
    pub doctor: Option<String>,
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExtraction {
    pub name: String,
    pub date: NaiveDate,
    pub appointment_type: AppointmentType,
    pub summary: String,
    pub doctor: String,
    pub confidence_score: i32,
}

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionRejection {
    #[error("Low confidence score ({0}). Unable to reliably extract appointment information.")]
    LowConfidence(f64),

    #[error("Missing required fields: {}. Confidence score: {confidence}", .fields.join(", "))]
    MissingFields {
        fields: Vec<&'static str>,
        confidence: i32,
    },

    #[error("Cannot determine appointment type and confidence score ({0}) is not high enough to use 'Other'")]
    AmbiguousType(i32),
}

impl From<ExtractionRejection> for AppError {
    fn from(rejection: ExtractionRejection) -> Self {
        match rejection {
            ExtractionRejection::AmbiguousType(_) => AppError::Conflict(rejection.to_string()),
            _ => AppError::Validation(rejection.to_string()),
        }
    }
}

/// First `MAX_PROMPT_CHARS` characters of the document text.
pub fn truncate_for_prompt(text: &str) -> String {
    text.chars().take(MAX_PROMPT_CHARS).collect()
}

pub async fn extract_document(text: &str, llm: &LlmClient) -> Result<RawExtraction, AppError> {
    let prompt = DOCUMENT_PARSE_PROMPT.replace("{document_text}", &truncate_for_prompt(text));
    llm.call_json::<RawExtraction>(&prompt, DOCUMENT_PARSE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Document extraction failed: {e}")))
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

fn parse_extracted_date(raw: &str, today: NaiveDate) -> NaiveDate {
    if raw.split('-').count() != 3 {
        return today;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or(today)
}

pub fn validate_extraction(
    raw: &RawExtraction,
    today: NaiveDate,
) -> Result<ValidatedExtraction, ExtractionRejection> {
    // Thresholds apply to the score as returned; only the stored value is rounded.
    let score = raw
        .confidence_score
        .filter(|c| c.is_finite())
        .unwrap_or(0.0);
    let threshold = f64::from(MIN_CONFIDENCE);
    if score < threshold {
        return Err(ExtractionRejection::LowConfidence(score));
    }
    let confidence = score.round() as i32;

    let name = trimmed(&raw.name);
    let date = trimmed(&raw.date);
    let summary = trimmed(&raw.summary);
    let doctor = trimmed(&raw.doctor);

    let missing: Vec<&'static str> = [
        ("name", &name),
        ("date", &date),
        ("summary", &summary),
        ("doctor", &doctor),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();
    if !missing.is_empty() {
        return Err(ExtractionRejection::MissingFields {
            fields: missing,
            confidence,
        });
    }

    // "Other" from the model is not trusted as a classification.
    let appointment_type = match AppointmentType::from_label(&trimmed(&raw.appointment_type)) {
        Some(t) if t != AppointmentType::Other => t,
        _ if score > threshold => AppointmentType::Other,
        _ => return Err(ExtractionRejection::AmbiguousType(confidence)),
    };

    Ok(ValidatedExtraction {
        name,
        date: parse_extracted_date(&date, today),
        appointment_type,
        summary,
        doctor,
        confidence_score: confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 10).unwrap()
    }

    fn make_raw(confidence: f64) -> RawExtraction {
        RawExtraction {
            name: Some("Blood Test Results".to_string()),
            date: Some("2025-09-20".to_string()),
            appointment_type: Some("Lab Work".to_string()),
            summary: Some("Cholesterol slightly elevated.".to_string()),
            doctor: Some("Dr. Anna Nowak".to_string()),
            confidence_score: Some(confidence),
        }
    }

    #[test]
    fn test_valid_extraction() {
        let validated = validate_extraction(&make_raw(90.0), today()).unwrap();
        assert_eq!(validated.appointment_type, AppointmentType::LabWork);
        assert_eq!(validated.date, NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());
        assert_eq!(validated.confidence_score, 90);
    }

    #[test]
    fn test_low_confidence_rejected() {
        assert_eq!(
            validate_extraction(&make_raw(50.0), today()),
            Err(ExtractionRejection::LowConfidence(50.0))
        );
        assert!(validate_extraction(&make_raw(51.0), today()).is_ok());
    }

    #[test]
    fn test_fractional_confidence_below_threshold_rejected() {
        assert_eq!(
            validate_extraction(&make_raw(50.5), today()),
            Err(ExtractionRejection::LowConfidence(50.5))
        );
        assert!(validate_extraction(&make_raw(50.99), today()).is_err());
    }

    #[test]
    fn test_fractional_confidence_above_threshold_allows_other() {
        let mut raw = make_raw(51.4);
        raw.appointment_type = Some("Cardiology".to_string());
        let validated = validate_extraction(&raw, today()).unwrap();
        assert_eq!(validated.appointment_type, AppointmentType::Other);
        assert_eq!(validated.confidence_score, 51);
    }

    #[test]
    fn test_missing_confidence_counts_as_zero() {
        let mut raw = make_raw(0.0);
        raw.confidence_score = None;
        assert_eq!(
            validate_extraction(&raw, today()),
            Err(ExtractionRejection::LowConfidence(0.0))
        );
    }

    #[test]
    fn test_missing_fields_listed() {
        let mut raw = make_raw(80.0);
        raw.summary = Some("  ".to_string());
        raw.doctor = None;
        let err = validate_extraction(&raw, today()).unwrap_err();
        assert_eq!(
            err,
            ExtractionRejection::MissingFields {
                fields: vec!["summary", "doctor"],
                confidence: 80,
            }
        );
        assert_eq!(
            err.to_string(),
            "Missing required fields: summary, doctor. Confidence score: 80"
        );
    }

    #[test]
    fn test_unknown_type_falls_back_to_other() {
        let mut raw = make_raw(75.0);
        raw.appointment_type = Some("Cardiology".to_string());
        let validated = validate_extraction(&raw, today()).unwrap();
        assert_eq!(validated.appointment_type, AppointmentType::Other);
    }

    #[test]
    fn test_unknown_type_at_threshold_is_conflict() {
        let mut raw = make_raw(51.0);
        raw.appointment_type = Some("Other".to_string());
        let err = validate_extraction(&raw, today()).unwrap_err();
        assert_eq!(err, ExtractionRejection::AmbiguousType(51));
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[test]
    fn test_malformed_date_defaults_to_today() {
        let mut raw = make_raw(80.0);
        raw.date = Some("September 2025".to_string());
        assert_eq!(validate_extraction(&raw, today()).unwrap().date, today());

        raw.date = Some("2025-13-45".to_string());
        assert_eq!(validate_extraction(&raw, today()).unwrap().date, today());
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "ż".repeat(MAX_PROMPT_CHARS + 10);
        assert_eq!(truncate_for_prompt(&text).chars().count(), MAX_PROMPT_CHARS);
        assert_eq!(truncate_for_prompt("short"), "short");
    }

    #[test]
    fn test_raw_extraction_tolerates_nulls() {
        let raw: RawExtraction =
            serde_json::from_str(r#"{"name": null, "confidence_score": 72}"#).unwrap();
        assert!(raw.name.is_none());
        assert_eq!(raw.confidence_score, Some(72.0));
    }
}
