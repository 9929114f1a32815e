use crate::models::document::{Document, DocumentType, MedicalDocumentRow};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in base 1024 with at most two decimals, e.g. "1.5 KB".
pub fn format_file_size(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{formatted} {}", SIZE_UNITS[unit])
}

pub fn map_document_type(appointment_type: &str) -> DocumentType {
    match appointment_type {
        "Lab Work" => DocumentType::LabResult,
        "Vaccination" => DocumentType::Vaccination,
        "Other" => DocumentType::Other,
        _ => DocumentType::MedicalRecord,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

pub fn to_document(row: &MedicalDocumentRow) -> Document {
    Document {
        id: row.id.to_string(),
        title: row.name.clone(),
        document_type: map_document_type(&row.appointment_type),
        date: row.date,
        description: non_empty(&row.summary),
        file_size_label: Some(format_file_size(row.file_size)),
        uploaded_by: non_empty(&row.doctor),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2_621_440), "2.5 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_map_document_type() {
        assert_eq!(map_document_type("Lab Work"), DocumentType::LabResult);
        assert_eq!(map_document_type("Vaccination"), DocumentType::Vaccination);
        assert_eq!(map_document_type("Other"), DocumentType::Other);
        assert_eq!(map_document_type("Dental"), DocumentType::MedicalRecord);
    }

    #[test]
    fn test_row_to_document_drops_blank_fields() {
        let row = MedicalDocumentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            original_filename: "blood.pdf".to_string(),
            name: "Blood Test Results".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 20).unwrap(),
            appointment_type: "Lab Work".to_string(),
            summary: Some("".to_string()),
            doctor: Some("Dr. Nowak".to_string()),
            file_size: 1536,
            s3_key: "documents/x/y.pdf".to_string(),
            processing_status: "completed".to_string(),
            confidence_score: 88,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let doc = to_document(&row);
        assert_eq!(doc.title, "Blood Test Results");
        assert_eq!(doc.document_type, DocumentType::LabResult);
        assert_eq!(doc.description, None);
        assert_eq!(doc.uploaded_by.as_deref(), Some("Dr. Nowak"));
        assert_eq!(doc.file_size_label.as_deref(), Some("1.5 KB"));
    }
}
