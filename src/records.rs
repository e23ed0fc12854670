//! Create / toggle / remove over the in-memory collections.
//!
//! Every collection keeps its most recent record first. Drafts arrive with
//! optional fields straight from request params and only become records
//! through `Draft::validate`, so half-filled records never enter a
//! collection.

use crate::calc::parse_iso_date;
use crate::catalog;
use crate::model::{
    AttendanceKind, AttendanceRecord, Demand, Document, DocumentCategory, DocumentKind, EventKind,
    FinanceCategory, FinanceKind, FinanceRecord, Goal, Occurrence, OccurrenceNature,
    OccurrenceType, ParentMeeting, Role, SchoolEvent, Shift, StaffMember, User,
};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} {value:?} is not one of the listed options")]
    NotListed { field: &'static str, value: String },
    #[error("{0} must be a non-negative amount")]
    InvalidAmount(&'static str),
    #[error("{0} must be a date in YYYY-MM-DD form")]
    InvalidDate(&'static str),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(f)
            | ValidationError::InvalidAmount(f)
            | ValidationError::InvalidDate(f) => f,
            ValidationError::NotListed { field, .. } => field,
        }
    }
}

/// Wall-clock reading shared by one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub now_ms: i64,
    pub today: NaiveDate,
}

impl Clock {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            now_ms: now.timestamp_millis(),
            today: now.date_naive(),
        }
    }

    pub fn today_iso(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }
}

/// Identity assigned to a record at creation.
#[derive(Debug, Clone)]
pub struct Stamp {
    pub id: String,
    pub created_at: i64,
    pub today: String,
}

pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;

    fn created_at(&self) -> Option<i64> {
        None
    }
}

pub trait Completable: Record {
    fn flip(&mut self);
}

pub trait Draft {
    type Output: Record;

    fn validate(self, stamp: Stamp) -> Result<Self::Output, ValidationError>;
}

/// Strictly after the current head, so prepend order and `createdAt` order
/// never disagree even when the clock stalls or steps back.
fn next_created_at<T: Record>(records: &[T], now_ms: i64) -> i64 {
    match records.first().and_then(|r| r.created_at()) {
        Some(head) if head >= now_ms => head + 1,
        _ => now_ms,
    }
}

pub fn create<D: Draft>(
    records: &mut Vec<D::Output>,
    draft: D,
    clock: &Clock,
) -> Result<D::Output, ValidationError> {
    let stamp = Stamp {
        id: Uuid::new_v4().to_string(),
        created_at: next_created_at(records, clock.now_ms),
        today: clock.today_iso(),
    };
    let record = draft.validate(stamp)?;
    records.insert(0, record.clone());
    Ok(record)
}

/// Returns the updated record, or `None` when the id is unknown.
pub fn toggle<T: Completable>(records: &mut [T], id: &str) -> Option<T> {
    let rec = records.iter_mut().find(|r| r.id() == id)?;
    rec.flip();
    Some(rec.clone())
}

pub fn remove<T: Record>(records: &mut Vec<T>, id: &str) -> Option<T> {
    let idx = records.iter().position(|r| r.id() == id)?;
    Some(records.remove(idx))
}

/// Splits pasted roster text into trimmed, non-empty lines.
pub fn parse_bulk(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Appends `name` unless already present. Insertion order is kept.
pub fn add_name(names: &mut Vec<String>, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || names.iter().any(|n| n == name) {
        return false;
    }
    names.push(name.to_string());
    true
}

pub fn bulk_add_names(names: &mut Vec<String>, text: &str) -> usize {
    parse_bulk(text)
        .iter()
        .filter(|n| add_name(names, n))
        .count()
}

pub fn remove_name(names: &mut Vec<String>, name: &str) -> bool {
    let before = names.len();
    names.retain(|n| n != name);
    names.len() != before
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::Missing(field)),
    }
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Missing or blank dates default to today; anything else must parse.
fn date_or_today(
    value: Option<String>,
    today: &str,
    field: &'static str,
) -> Result<String, ValidationError> {
    let v = text(value);
    if v.is_empty() {
        return Ok(today.to_string());
    }
    parse_iso_date(&v).ok_or(ValidationError::InvalidDate(field))?;
    Ok(v)
}

macro_rules! keyed {
    ($ty:ty) => {
        impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
    ($ty:ty, created) => {
        impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> Option<i64> {
                Some(self.created_at)
            }
        }
    };
}

keyed!(User);
keyed!(StaffMember);
keyed!(AttendanceRecord);
keyed!(FinanceRecord);
keyed!(Document);
keyed!(SchoolEvent);
keyed!(Occurrence, created);
keyed!(Demand, created);
keyed!(Goal, created);
keyed!(ParentMeeting, created);

impl Completable for Demand {
    fn flip(&mut self) {
        self.completed = !self.completed;
    }
}

impl Completable for Goal {
    fn flip(&mut self) {
        self.completed = !self.completed;
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OccurrenceDraft {
    pub student: Option<String>,
    pub class_name: Option<String>,
    pub date: Option<String>,
    pub shift: Option<Shift>,
    pub reporter: Option<String>,
    pub nature: Option<OccurrenceNature>,
    #[serde(rename = "type")]
    pub kind: Option<OccurrenceType>,
    pub reason: Option<String>,
    pub immediate_action: Option<String>,
    pub management_decision: Option<String>,
}

impl Draft for OccurrenceDraft {
    type Output = Occurrence;

    fn validate(self, stamp: Stamp) -> Result<Occurrence, ValidationError> {
        let student = required(self.student, "student")?;
        let reason = required(self.reason, "reason")?;
        let kind = self.kind.unwrap_or(OccurrenceType::Pedagogical);
        if !catalog::reason_allowed(kind, &reason) {
            return Err(ValidationError::NotListed {
                field: "reason",
                value: reason,
            });
        }
        Ok(Occurrence {
            id: stamp.id,
            student,
            class_name: text(self.class_name),
            date: date_or_today(self.date, &stamp.today, "date")?,
            shift: self.shift.unwrap_or(Shift::Morning),
            reporter: text(self.reporter),
            nature: self.nature.unwrap_or(OccurrenceNature::Record),
            kind,
            reason,
            immediate_action: text(self.immediate_action),
            management_decision: text(self.management_decision),
            created_at: stamp.created_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttendanceDraft {
    pub person_name: Option<String>,
    pub role_or_subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AttendanceKind>,
    pub date: Option<String>,
    pub minutes: Option<u32>,
    pub description: Option<String>,
    pub is_teacher: Option<bool>,
}

impl Draft for AttendanceDraft {
    type Output = AttendanceRecord;

    fn validate(self, stamp: Stamp) -> Result<AttendanceRecord, ValidationError> {
        Ok(AttendanceRecord {
            id: stamp.id,
            person_name: required(self.person_name, "personName")?,
            role_or_subject: text(self.role_or_subject),
            kind: self.kind.unwrap_or(AttendanceKind::Absence),
            date: date_or_today(self.date, &stamp.today, "date")?,
            minutes: self.minutes,
            description: text(self.description),
            is_teacher: self.is_teacher.unwrap_or(false),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemandDraft {
    pub title: Option<String>,
    pub date: Option<String>,
}

impl Draft for DemandDraft {
    type Output = Demand;

    fn validate(self, stamp: Stamp) -> Result<Demand, ValidationError> {
        Ok(Demand {
            id: stamp.id,
            title: required(self.title, "title")?,
            date: date_or_today(self.date, &stamp.today, "date")?,
            completed: false,
            created_at: stamp.created_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalDraft {
    pub text: Option<String>,
}

impl Draft for GoalDraft {
    type Output = Goal;

    fn validate(self, stamp: Stamp) -> Result<Goal, ValidationError> {
        Ok(Goal {
            id: stamp.id,
            text: required(self.text, "text")?,
            completed: false,
            created_at: stamp.created_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinanceDraft {
    #[serde(rename = "type")]
    pub kind: Option<FinanceKind>,
    pub category: Option<FinanceCategory>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl Draft for FinanceDraft {
    type Output = FinanceRecord;

    fn validate(self, stamp: Stamp) -> Result<FinanceRecord, ValidationError> {
        let amount = self.amount.ok_or(ValidationError::Missing("amount"))?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount("amount"));
        }
        Ok(FinanceRecord {
            id: stamp.id,
            kind: self.kind.ok_or(ValidationError::Missing("type"))?,
            category: self.category.unwrap_or(FinanceCategory::General),
            amount,
            description: required(self.description, "description")?,
            date: date_or_today(self.date, &stamp.today, "date")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentDraft {
    pub name: Option<String>,
    pub category: Option<DocumentCategory>,
    pub link_or_base64: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<DocumentKind>,
}

impl Draft for DocumentDraft {
    type Output = Document;

    fn validate(self, stamp: Stamp) -> Result<Document, ValidationError> {
        Ok(Document {
            id: stamp.id,
            name: required(self.name, "name")?,
            category: self.category.unwrap_or(DocumentCategory::Law),
            link_or_base64: required(self.link_or_base64, "linkOrBase64")?,
            kind: self.kind.unwrap_or(DocumentKind::Link),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeetingDraft {
    pub student: Option<String>,
    pub guardian: Option<String>,
    pub scheduled_by: Option<String>,
    pub attended_by: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl Draft for MeetingDraft {
    type Output = ParentMeeting;

    fn validate(self, stamp: Stamp) -> Result<ParentMeeting, ValidationError> {
        Ok(ParentMeeting {
            id: stamp.id,
            student: required(self.student, "student")?,
            guardian: text(self.guardian),
            scheduled_by: text(self.scheduled_by),
            attended_by: text(self.attended_by),
            date: date_or_today(self.date, &stamp.today, "date")?,
            time: text(self.time),
            reason: required(self.reason, "reason")?,
            notes: self.notes.unwrap_or_default(),
            created_at: stamp.created_at,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventDraft {
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<EventKind>,
}

impl Draft for EventDraft {
    type Output = SchoolEvent;

    fn validate(self, stamp: Stamp) -> Result<SchoolEvent, ValidationError> {
        let title = required(self.title, "title")?;
        let date = required(self.date, "date")?;
        parse_iso_date(&date).ok_or(ValidationError::InvalidDate("date"))?;
        Ok(SchoolEvent {
            id: stamp.id,
            title,
            date,
            kind: self.kind.unwrap_or(EventKind::SchoolDay),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaffDraft {
    pub name: Option<String>,
    pub role: Option<String>,
}

impl Draft for StaffDraft {
    type Output = StaffMember;

    fn validate(self, stamp: Stamp) -> Result<StaffMember, ValidationError> {
        let name = required(self.name, "name")?;
        let role = match text(self.role) {
            r if r.is_empty() => catalog::DEFAULT_STAFF_ROLE.to_string(),
            r if catalog::staff_role_allowed(&r) => r,
            r => {
                return Err(ValidationError::NotListed {
                    field: "role",
                    value: r,
                })
            }
        };
        Ok(StaffMember {
            id: stamp.id,
            name,
            role,
            is_teacher: false,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDraft {
    pub name: Option<String>,
    pub pin: Option<String>,
    pub role: Option<Role>,
    pub classes: Option<Vec<String>>,
}

impl Draft for UserDraft {
    type Output = User;

    fn validate(self, stamp: Stamp) -> Result<User, ValidationError> {
        Ok(User {
            id: stamp.id,
            name: required(self.name, "name")?,
            pin: required(self.pin, "pin")?,
            role: self.role.unwrap_or(Role::Teacher),
            classes: self.classes,
        })
    }
}
