//! Catalogue of every resource page, for code that picks a resource at runtime.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    AdmissionRequests,
    Discharges,
    Doctors,
    Nurses,
    EmergencyCalls,
    DispatchCalls,
    DispatchOperators,
    Equipment,
    Facilities,
    PatientRecords,
    PatientTracking,
    Routes,
    SecurityIncidents,
    SecurityAccess,
    Trainings,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::AdmissionRequests,
        ResourceKind::Discharges,
        ResourceKind::Doctors,
        ResourceKind::Nurses,
        ResourceKind::EmergencyCalls,
        ResourceKind::DispatchCalls,
        ResourceKind::DispatchOperators,
        ResourceKind::Equipment,
        ResourceKind::Facilities,
        ResourceKind::PatientRecords,
        ResourceKind::PatientTracking,
        ResourceKind::Routes,
        ResourceKind::SecurityIncidents,
        ResourceKind::SecurityAccess,
        ResourceKind::Trainings,
    ];

    /// Command-line spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::AdmissionRequests => "admission-requests",
            ResourceKind::Discharges => "discharges",
            ResourceKind::Doctors => "doctors",
            ResourceKind::Nurses => "nurses",
            ResourceKind::EmergencyCalls => "emergency-calls",
            ResourceKind::DispatchCalls => "dispatch-calls",
            ResourceKind::DispatchOperators => "dispatch-operators",
            ResourceKind::Equipment => "equipment",
            ResourceKind::Facilities => "facilities",
            ResourceKind::PatientRecords => "patient-records",
            ResourceKind::PatientTracking => "patient-tracking",
            ResourceKind::Routes => "routes",
            ResourceKind::SecurityIncidents => "security-incidents",
            ResourceKind::SecurityAccess => "security-access",
            ResourceKind::Trainings => "trainings",
        }
    }

    /// Pages that refresh themselves on a timer.
    pub fn is_polled(self) -> bool {
        matches!(
            self,
            ResourceKind::DispatchCalls
                | ResourceKind::DispatchOperators
                | ResourceKind::EmergencyCalls
                | ResourceKind::PatientTracking
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown resource {s:?} (expected one of: {})", known.join(", "))
            })
    }
}

/// Evaluate `$body` with `$R` bound to the record type behind `$kind`.
///
/// ```ignore
/// let path = with_resource_kind!(kind, R => <R as Resource>::COLLECTION_PATH);
/// ```
#[macro_export]
macro_rules! with_resource_kind {
    ($kind:expr, $R:ident => $body:expr) => {
        match $kind {
            $crate::ResourceKind::AdmissionRequests => {
                type $R = $crate::AdmissionRequest;
                $body
            }
            $crate::ResourceKind::Discharges => {
                type $R = $crate::Discharge;
                $body
            }
            $crate::ResourceKind::Doctors => {
                type $R = $crate::Doctor;
                $body
            }
            $crate::ResourceKind::Nurses => {
                type $R = $crate::Nurse;
                $body
            }
            $crate::ResourceKind::EmergencyCalls => {
                type $R = $crate::EmergencyCall;
                $body
            }
            $crate::ResourceKind::DispatchCalls => {
                type $R = $crate::DispatchCall;
                $body
            }
            $crate::ResourceKind::DispatchOperators => {
                type $R = $crate::DispatchOperator;
                $body
            }
            $crate::ResourceKind::Equipment => {
                type $R = $crate::Equipment;
                $body
            }
            $crate::ResourceKind::Facilities => {
                type $R = $crate::Facility;
                $body
            }
            $crate::ResourceKind::PatientRecords => {
                type $R = $crate::PatientRecord;
                $body
            }
            $crate::ResourceKind::PatientTracking => {
                type $R = $crate::PatientTracking;
                $body
            }
            $crate::ResourceKind::Routes => {
                type $R = $crate::AmbulanceRoute;
                $body
            }
            $crate::ResourceKind::SecurityIncidents => {
                type $R = $crate::SecurityIncident;
                $body
            }
            $crate::ResourceKind::SecurityAccess => {
                type $R = $crate::SecurityAccess;
                $body
            }
            $crate::ResourceKind::Trainings => {
                type $R = $crate::Training;
                $body
            }
        }
    };
}
