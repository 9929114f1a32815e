//! Free-text search over a user's parsed documents.

use crate::models::document::MedicalDocumentRow;

/// Case-insensitive substring match on name, doctor, summary or appointment type.
pub fn matches_query(row: &MedicalDocumentRow, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    [
        Some(row.name.as_str()),
        row.doctor.as_deref(),
        row.summary.as_deref(),
        Some(row.appointment_type.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Matching rows in their original order.
pub fn search_documents(rows: Vec<MedicalDocumentRow>, query: &str) -> Vec<MedicalDocumentRow> {
    rows.into_iter()
        .filter(|row| matches_query(row, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    fn make_row(name: &str, doctor: Option<&str>, summary: Option<&str>, kind: &str) -> MedicalDocumentRow {
        MedicalDocumentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            original_filename: "scan.pdf".to_string(),
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
            appointment_type: kind.to_string(),
            summary: summary.map(str::to_string),
            doctor: doctor.map(str::to_string),
            file_size: 2048,
            s3_key: "documents/a/b.pdf".to_string(),
            processing_status: "completed".to_string(),
            confidence_score: 80,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_each_field_case_insensitively() {
        let row = make_row(
            "Blood Test Results",
            Some("Dr. Anna Nowak"),
            Some("Cholesterol slightly elevated"),
            "Lab Work",
        );
        assert!(matches_query(&row, "blood"));
        assert!(matches_query(&row, "NOWAK"));
        assert!(matches_query(&row, "cholesterol"));
        assert!(matches_query(&row, "lab work"));
        assert!(!matches_query(&row, "dental"));
    }

    #[test]
    fn test_missing_optional_fields_do_not_match() {
        let row = make_row("Checkup", None, None, "General Checkup");
        assert!(!matches_query(&row, "nowak"));
        assert!(matches_query(&row, " checkup "));
    }

    #[test]
    fn test_search_keeps_order_and_drops_non_matches() {
        let rows = vec![
            make_row("X-ray chest", Some("Dr. Lis"), None, "Specialist"),
            make_row("Dental cleaning", Some("Dr. Zab"), None, "Dental"),
            make_row("Knee X-ray", None, Some("No fracture"), "Specialist"),
        ];
        let found = search_documents(rows, "x-ray");
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["X-ray chest", "Knee X-ray"]);
    }

    #[test]
    fn test_search_on_empty_list() {
        assert!(search_documents(Vec::new(), "anything").is_empty());
    }
}
