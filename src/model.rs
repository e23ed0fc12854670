use serde::{Deserialize, Deserializer, Serialize};

/// Account role. Serialized with the labels the dashboard stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Gestão", alias = "Management")]
    Management,
    #[serde(rename = "Professor", alias = "Teacher")]
    Teacher,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Management => "Gestão",
            Role::Teacher => "Professor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub pin: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
}

/// What leaves the daemon when accounts are listed or a session is reported.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            role: u.role,
            classes: u.classes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub is_teacher: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccurrenceType {
    #[serde(rename = "Pedagógica", alias = "Pedagogical")]
    Pedagogical,
    #[serde(rename = "Comportamental", alias = "Behavioral")]
    Behavioral,
    #[serde(rename = "Grave", alias = "Serious")]
    Serious,
}

impl OccurrenceType {
    pub const ALL: [OccurrenceType; 3] = [
        OccurrenceType::Pedagogical,
        OccurrenceType::Behavioral,
        OccurrenceType::Serious,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OccurrenceType::Pedagogical => "Pedagógica",
            OccurrenceType::Behavioral => "Comportamental",
            OccurrenceType::Serious => "Grave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccurrenceNature {
    #[serde(rename = "Registro de Ocorrência", alias = "Record")]
    Record,
    #[serde(rename = "Advertência Disciplinar", alias = "Warning")]
    Warning,
}

impl OccurrenceNature {
    pub const ALL: [OccurrenceNature; 2] = [OccurrenceNature::Record, OccurrenceNature::Warning];

    /// Short chart label.
    pub fn label(self) -> &'static str {
        match self {
            OccurrenceNature::Record => "Registro",
            OccurrenceNature::Warning => "Advertência",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    #[serde(rename = "Manhã", alias = "Morning")]
    Morning,
    #[serde(rename = "Tarde", alias = "Afternoon")]
    Afternoon,
    #[serde(rename = "Integrada", alias = "FullDay")]
    FullDay,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::FullDay];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: String,
    pub student: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub date: String,
    pub shift: Shift,
    #[serde(default)]
    pub reporter: String,
    pub nature: OccurrenceNature,
    #[serde(rename = "type")]
    pub kind: OccurrenceType,
    pub reason: String,
    #[serde(default)]
    pub immediate_action: String,
    #[serde(default)]
    pub management_decision: String,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceKind {
    #[serde(rename = "Falta", alias = "Absence")]
    Absence,
    #[serde(rename = "Atestado", alias = "MedicalNote")]
    MedicalNote,
    #[serde(rename = "Atraso", alias = "Tardy")]
    Tardy,
    #[serde(rename = "Banco de Horas", alias = "HourBank")]
    HourBank,
    #[serde(rename = "TRE", alias = "ElectoralDuty")]
    ElectoralDuty,
    #[serde(rename = "Doação de Sangue", alias = "BloodDonation")]
    BloodDonation,
    #[serde(rename = "Declaração", alias = "Statement")]
    Statement,
}

impl AttendanceKind {
    pub const ALL: [AttendanceKind; 7] = [
        AttendanceKind::Absence,
        AttendanceKind::MedicalNote,
        AttendanceKind::Tardy,
        AttendanceKind::HourBank,
        AttendanceKind::ElectoralDuty,
        AttendanceKind::BloodDonation,
        AttendanceKind::Statement,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub person_name: String,
    #[serde(default)]
    pub role_or_subject: String,
    #[serde(rename = "type")]
    pub kind: AttendanceKind,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_teacher: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "Feriado", alias = "Holiday")]
    Holiday,
    #[serde(rename = "Reunião", alias = "Meeting")]
    Meeting,
    #[serde(rename = "Evento Letivo", alias = "SchoolDay")]
    SchoolDay,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Holiday, EventKind::Meeting, EventKind::SchoolDay];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinanceKind {
    Inflow,
    Outflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinanceCategory {
    #[serde(rename = "Geral", alias = "General")]
    General,
    #[serde(rename = "Obras", alias = "CapitalWorks")]
    CapitalWorks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FinanceKind,
    pub category: FinanceCategory,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
}

/// Hand-edited stores sometimes carry amounts as strings (or garbage).
/// Anything that is not a finite number reads as zero.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    let v = match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if v.is_finite() { v } else { 0.0 })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentCategory {
    #[serde(rename = "Lei", alias = "Law")]
    Law,
    #[serde(rename = "Decreto", alias = "Decree")]
    Decree,
    #[serde(rename = "Portaria", alias = "Ordinance")]
    Ordinance,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::Law,
        DocumentCategory::Decree,
        DocumentCategory::Ordinance,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Link,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub category: DocumentCategory,
    pub link_or_base64: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentMeeting {
    pub id: String,
    pub student: String,
    #[serde(default)]
    pub guardian: String,
    #[serde(default)]
    pub scheduled_by: String,
    #[serde(default)]
    pub attended_by: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub reason: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: i64,
}
