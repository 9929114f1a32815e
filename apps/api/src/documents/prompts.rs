// Document extraction LLM prompt templates.

pub const DOCUMENT_PARSE_SYSTEM: &str = "\
You are a medical document parser. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Never guess a doctor or date that does not appear in the document; leave the field empty instead.";

pub const DOCUMENT_PARSE_PROMPT: &str = r#"Extract appointment information from the following medical document text.

DOCUMENT TEXT:
{document_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "Title of the appointment or report, e.g. \"Dermatology Consultation\", \"Blood Test Results\"",
  "date": "YYYY-MM-DD",
  "appointment_type": "General Checkup" | "Dental" | "Vision" | "Specialist" | "Vaccination" | "Follow-up" | "Emergency" | "Lab Work" | "Physical Therapy" | "Mental Health" | "Veterinary",
  "summary": "Brief summary of findings, diagnosis, or recommendations",
  "doctor": "Doctor name, or the facility name if no doctor is named",
  "confidence_score": 0-100
}

confidence_score states how certain you are about the extracted information."#;
