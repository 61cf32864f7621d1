use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecordId;

/// Appointment as returned by the search endpoint
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub time: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub client_id: Option<RecordId>,
}

/// Payload posted by the create form
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub title: String,
    #[serde(rename = "type")]
    pub appointment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Combined date and time, ISO-8601 in UTC with millisecond precision
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub dni: String,
    pub address: String,
    pub zone: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentType {
    Spa,
    VeterinaryCheckup,
    Other,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 3] = [
        AppointmentType::Spa,
        AppointmentType::VeterinaryCheckup,
        AppointmentType::Other,
    ];

    /// Value sent to and understood by the server
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Spa => "Spa",
            AppointmentType::VeterinaryCheckup => "Control Veterinario",
            AppointmentType::Other => "Otro",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    PacochaNorte,
    PacochaSur,
    MiramarGeronimo,
    Puerto,
    AltoIlo,
    PampaOeste,
    PampaEste,
    PampaNorte,
    PampaSur,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Zone::PacochaNorte,
        Zone::PacochaSur,
        Zone::MiramarGeronimo,
        Zone::Puerto,
        Zone::AltoIlo,
        Zone::PampaOeste,
        Zone::PampaEste,
        Zone::PampaNorte,
        Zone::PampaSur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::PacochaNorte => "Zona Pacocha Norte",
            Zone::PacochaSur => "Zona Pacocha Sur",
            Zone::MiramarGeronimo => "Zona Miramar-Gerónimo",
            Zone::Puerto => "Zona Puerto",
            Zone::AltoIlo => "Zona Alto Ilo",
            Zone::PampaOeste => "Zona Pampa Oeste",
            Zone::PampaEste => "Zona Pampa Este",
            Zone::PampaNorte => "Zona Pampa Norte",
            Zone::PampaSur => "Zona Pampa Sur",
        }
    }
}
