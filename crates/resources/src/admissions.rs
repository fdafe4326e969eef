//! Admission requests submitted by patients and reviewed by the hospital.

use crate::Timestamps;
use hops_core::{status_kind, ActionMethod, ActionSpec, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    pub enum AdmissionStatus {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
        Cancelled = "cancelled",
    }
    terminal = [Rejected, Cancelled];
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRef {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub request_number: String,
    #[serde(default)]
    pub patient: PatientRef,
    #[serde(default)]
    pub admission_type: String,
    pub department: String,
    pub primary_diagnosis: String,
    pub urgency: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub expected_stay: Option<u32>,
    pub status: AdmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_room: Option<String>,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionRequestDraft {
    pub patient: PatientRef,
    pub admission_type: String,
    pub department: String,
    pub primary_diagnosis: String,
    pub urgency: String,
    pub symptoms: Vec<String>,
}

impl Draft for AdmissionRequestDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("department", self.department.as_str()),
            ("primaryDiagnosis", self.primary_diagnosis.as_str()),
            ("urgency", self.urgency.as_str()),
        ])
    }
}

impl Resource for AdmissionRequest {
    type Status = AdmissionStatus;
    type Draft = AdmissionRequestDraft;

    const LABEL: &'static str = "admission request";
    const COLLECTION_PATH: &'static str = "hospital/admission-requests";
    const LIST_KEY: &'static str = "requests";
    const ITEM_KEY: &'static str = "request";
    const SELECTORS: &'static [&'static str] = &["status", "urgency", "department"];
    const ACTIONS: &'static [ActionSpec<AdmissionStatus>] = &[ActionSpec {
        name: "review",
        method: ActionMethod::Put,
        from: &[AdmissionStatus::Pending],
        to: &[AdmissionStatus::Approved, AdmissionStatus::Rejected],
        required: &["reviewNotes"],
    }];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AdmissionStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.request_number,
            &self.patient.first_name,
            &self.patient.last_name,
            &self.primary_diagnosis,
        ]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "urgency" => Some(&self.urgency),
            "department" => Some(&self.department),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hops_core::{FilterSet, StatusKind};
    use serde_json::json;

    #[test]
    fn decodes_backend_shape_with_nested_patient() {
        let record: AdmissionRequest = serde_json::from_value(json!({
            "_id": "665f",
            "requestNumber": "AR-2024-001",
            "patient": {"firstName": "John", "lastName": "Carter", "email": "j@c.org", "phone": "1"},
            "department": "cardiology",
            "primaryDiagnosis": "angina",
            "urgency": "high",
            "status": "pending",
            "statusHistory": [],
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .expect("decode");

        assert_eq!(record.id(), "665f");
        assert_eq!(record.patient.last_name, "Carter");
        assert!(record.stamps.created_at.is_some());
    }

    #[test]
    fn term_matches_patient_surname() {
        let record: AdmissionRequest = serde_json::from_value(json!({
            "id": "1",
            "patient": {"firstName": "John", "lastName": "Carter"},
            "department": "er",
            "primaryDiagnosis": "fracture",
            "urgency": "low",
            "status": "approved"
        }))
        .expect("decode");

        let mut filters = FilterSet::new();
        filters.set_term("CARTER");
        assert!(filters.matches(&record));
    }

    #[test]
    fn review_needs_notes_and_chooses_outcome() {
        let review = AdmissionRequest::action("review").expect("review");
        assert_eq!(review.missing_fields(&json!({"status": "approved"})), vec!["reviewNotes"]);
        assert_eq!(
            review.target(&json!({"status": "rejected"})).expect("target"),
            AdmissionStatus::Rejected
        );
        assert!(AdmissionStatus::Cancelled.is_terminal());
    }
}
