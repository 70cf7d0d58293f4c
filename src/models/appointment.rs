use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub service_id: String,
    pub service_name: String,
    pub date: String, // YYYY-MM-DD
    pub time_slot: String,
    pub status: AppointmentStatus,
}
