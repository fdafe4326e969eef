//! Patient records and live patient tracking.

use crate::Timestamps;
use hops_core::{status_kind, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    /// Patient records have no workflow; they are grouped by what kind of entry they are.
    pub enum RecordType {
        Consultation = "consultation",
        LabResult = "lab_result",
        Imaging = "imaging",
        Medication = "medication",
        VitalSigns = "vital_signs",
        Procedure = "procedure",
    }
    terminal = [];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub record_type: RecordType,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub record_date: String,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRecordDraft {
    pub patient_id: String,
    pub patient_name: String,
    pub record_type: String,
    pub department: String,
    pub doctor: String,
    pub diagnosis: String,
    pub notes: String,
    pub record_date: String,
}

impl Draft for PatientRecordDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("patientId", self.patient_id.as_str()),
            ("patientName", self.patient_name.as_str()),
            ("recordType", self.record_type.as_str()),
        ])
    }
}

impl Resource for PatientRecord {
    type Status = RecordType;
    type Draft = PatientRecordDraft;

    const LABEL: &'static str = "patient record";
    const COLLECTION_PATH: &'static str = "hospital/patient-records";
    const LIST_KEY: &'static str = "records";
    const ITEM_KEY: &'static str = "record";
    const SELECTORS: &'static [&'static str] = &["recordType", "department"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> RecordType {
        self.record_type
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.patient_name, &self.patient_id, &self.diagnosis, &self.doctor]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "recordType" => Some(hops_core::StatusKind::as_str(self.record_type)),
            "department" => Some(&self.department),
            _ => None,
        }
    }
}

status_kind! {
    pub enum TrackingStatus {
        Active = "active",
        Critical = "critical",
        Stable = "stable",
        Transferred = "transferred",
        Discharged = "discharged",
    }
    terminal = [Transferred, Discharged];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientTracking {
    #[serde(alias = "_id")]
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub location: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub attending_physician: String,
    #[serde(default)]
    pub condition: String,
    pub status: TrackingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientTrackingDraft {
    pub patient_id: String,
    pub patient_name: String,
    pub location: String,
    pub room: String,
    pub attending_physician: String,
    pub condition: String,
}

impl Draft for PatientTrackingDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("patientId", self.patient_id.as_str()),
            ("patientName", self.patient_name.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

impl Resource for PatientTracking {
    type Status = TrackingStatus;
    type Draft = PatientTrackingDraft;

    const LABEL: &'static str = "tracked patient";
    const COLLECTION_PATH: &'static str = "hospital/patient-tracking";
    const LIST_KEY: &'static str = "patients";
    const ITEM_KEY: &'static str = "patient";
    const SELECTORS: &'static [&'static str] = &["status", "location"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> TrackingStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.patient_name, &self.patient_id, &self.room]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "location").then_some(self.location.as_str())
    }
}
