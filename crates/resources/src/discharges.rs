//! Discharge plans: created by the ward, approved, then completed when the patient leaves.

use crate::Timestamps;
use hops_core::{status_kind, ActionMethod, ActionSpec, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    pub enum DischargeStatus {
        Pending = "pending",
        Approved = "approved",
        Discharged = "discharged",
        Completed = "completed",
        Cancelled = "cancelled",
    }
    terminal = [Completed, Cancelled];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discharge {
    #[serde(alias = "_id")]
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub department: String,
    pub primary_diagnosis: String,
    #[serde(default)]
    pub admission_date: String,
    #[serde(default)]
    pub discharge_date: String,
    #[serde(default)]
    pub discharge_type: String,
    #[serde(default)]
    pub discharge_destination: String,
    #[serde(default)]
    pub discharge_instructions: String,
    #[serde(default)]
    pub follow_up_physician: String,
    #[serde(default)]
    pub notes: String,
    pub status: DischargeStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DischargeDraft {
    pub patient_id: String,
    pub patient_name: String,
    pub admission_date: String,
    pub discharge_date: String,
    pub department: String,
    pub primary_diagnosis: String,
    pub discharge_type: String,
    pub discharge_destination: String,
    pub discharge_instructions: String,
    pub follow_up_physician: String,
    pub notes: String,
}

impl Draft for DischargeDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("patientId", self.patient_id.as_str()),
            ("patientName", self.patient_name.as_str()),
            ("department", self.department.as_str()),
            ("primaryDiagnosis", self.primary_diagnosis.as_str()),
        ])
    }
}

impl Resource for Discharge {
    type Status = DischargeStatus;
    type Draft = DischargeDraft;

    const LABEL: &'static str = "discharge";
    const COLLECTION_PATH: &'static str = "hospital/discharges";
    const LIST_KEY: &'static str = "discharges";
    const ITEM_KEY: &'static str = "discharge";
    const SELECTORS: &'static [&'static str] = &["status", "department"];
    const ACTIONS: &'static [ActionSpec<DischargeStatus>] = &[
        ActionSpec {
            name: "approve",
            method: ActionMethod::Post,
            from: &[DischargeStatus::Pending],
            to: &[DischargeStatus::Approved],
            required: &[],
        },
        ActionSpec {
            name: "complete",
            method: ActionMethod::Post,
            from: &[DischargeStatus::Approved, DischargeStatus::Discharged],
            to: &[DischargeStatus::Completed],
            required: &[],
        },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> DischargeStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.patient_name, &self.patient_id, &self.primary_diagnosis]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "department").then_some(self.department.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_reports_every_blank_required_field() {
        let draft = DischargeDraft {
            patient_name: "Mary Shelley".into(),
            department: " ".into(),
            ..DischargeDraft::default()
        };
        assert_eq!(
            draft.missing_fields(),
            vec!["patientId", "department", "primaryDiagnosis"]
        );
    }

    #[test]
    fn approve_then_complete_is_the_only_path_to_completed() {
        let approve = Discharge::action("approve").expect("approve");
        let complete = Discharge::action("complete").expect("complete");

        assert!(approve.permits(DischargeStatus::Pending));
        assert!(!complete.permits(DischargeStatus::Pending));
        assert!(complete.permits(DischargeStatus::Approved));
        assert_eq!(complete.target(&json!({})).expect("target"), DischargeStatus::Completed);
    }

    #[test]
    fn draft_payload_uses_wire_names() {
        let draft = DischargeDraft {
            patient_id: "P-1".into(),
            ..DischargeDraft::default()
        };
        let payload = draft.payload().expect("payload");
        assert_eq!(payload["patientId"], "P-1");
        assert!(payload.get("patient_id").is_none());
    }
}
