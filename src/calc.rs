use crate::model::{
    AttendanceRecord, Demand, FinanceKind, FinanceRecord, Occurrence, OccurrenceNature,
    OccurrenceType, ParentMeeting,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[serde(alias = "today")]
    Day,
    Week,
    Month,
}

pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub trait Dated {
    fn date(&self) -> &str;
}

impl Dated for AttendanceRecord {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for Demand {
    fn date(&self) -> &str {
        &self.date
    }
}

/// Trailing-window membership.
///
/// - day: the stored string equals today's ISO date
/// - week: today minus the date is 0..=6 whole days (future dates never match)
/// - month: same calendar month and year as today
///
/// Unparseable dates never match week or month.
pub fn in_period(date: &str, period: Period, today: NaiveDate) -> bool {
    match period {
        Period::Day => date == today.format("%Y-%m-%d").to_string(),
        Period::Week => parse_iso_date(date)
            .map(|d| (0..7).contains(&(today - d).num_days()))
            .unwrap_or(false),
        Period::Month => parse_iso_date(date)
            .map(|d| d.year() == today.year() && d.month() == today.month())
            .unwrap_or(false),
    }
}

pub fn range_filter<T: Dated>(records: &[T], period: Period, today: NaiveDate) -> Vec<&T> {
    records
        .iter()
        .filter(|r| in_period(r.date(), period, today))
        .collect()
}

/// Rounded share of `part` in `whole`, clamped to 100. Zero when `whole` is zero.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let p = (part as f64 / whole as f64) * 100.0;
    p.min(100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub count: usize,
    pub percentage: u32,
}

pub fn attendance_stats(
    attendance: &[AttendanceRecord],
    is_teacher: bool,
    period: Period,
    total_possible: usize,
    today: NaiveDate,
) -> AttendanceStats {
    let count = attendance
        .iter()
        .filter(|a| a.is_teacher == is_teacher && in_period(&a.date, period, today))
        .count();
    AttendanceStats {
        count,
        percentage: percent(count, total_possible),
    }
}

/// Records behind an attendance card.
pub fn absentees(
    attendance: &[AttendanceRecord],
    is_teacher: bool,
    period: Period,
    today: NaiveDate,
) -> Vec<&AttendanceRecord> {
    attendance
        .iter()
        .filter(|a| a.is_teacher == is_teacher && in_period(&a.date, period, today))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandStats {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

pub fn demand_stats(demands: &[Demand], period: Period, today: NaiveDate) -> DemandStats {
    let window = range_filter(demands, period, today);
    let completed = window.iter().filter(|d| d.completed).count();
    DemandStats {
        total: window.len(),
        completed,
        percentage: percent(completed, window.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: OccurrenceType,
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NatureCount {
    pub nature: OccurrenceNature,
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceBreakdown {
    pub by_type: Vec<TypeCount>,
    pub by_nature: Vec<NatureCount>,
}

/// Output order follows enum declaration order, with zero buckets kept.
pub fn occurrence_breakdown(occurrences: &[Occurrence]) -> OccurrenceBreakdown {
    let by_type = OccurrenceType::ALL
        .iter()
        .map(|k| TypeCount {
            kind: *k,
            name: k.label(),
            value: occurrences.iter().filter(|o| o.kind == *k).count(),
        })
        .collect();
    let by_nature = OccurrenceNature::ALL
        .iter()
        .map(|n| NatureCount {
            nature: *n,
            name: n.label(),
            value: occurrences.iter().filter(|o| o.nature == *n).count(),
        })
        .collect();
    OccurrenceBreakdown { by_type, by_nature }
}

pub fn finance_balance(records: &[FinanceRecord]) -> f64 {
    records
        .iter()
        .filter(|r| r.amount.is_finite())
        .map(|r| match r.kind {
            FinanceKind::Inflow => r.amount,
            FinanceKind::Outflow => -r.amount,
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceWindows {
    pub day: AttendanceStats,
    pub week: AttendanceStats,
    pub month: AttendanceStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemandWindows {
    pub today: DemandStats,
    pub week: DemandStats,
    pub month: DemandStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today: String,
    pub occurrences_by_type: Vec<TypeCount>,
    pub occurrences_by_nature: Vec<NatureCount>,
    pub staff: AttendanceWindows,
    pub teachers: AttendanceWindows,
    pub demands: DemandWindows,
    pub finance_balance: f64,
}

pub struct DashboardInputs<'a> {
    pub occurrences: &'a [Occurrence],
    pub attendance: &'a [AttendanceRecord],
    pub demands: &'a [Demand],
    pub finances: &'a [FinanceRecord],
    pub staff_count: usize,
    pub teacher_count: usize,
}

fn attendance_windows(
    attendance: &[AttendanceRecord],
    is_teacher: bool,
    total_possible: usize,
    today: NaiveDate,
) -> AttendanceWindows {
    let stats = |p| attendance_stats(attendance, is_teacher, p, total_possible, today);
    AttendanceWindows {
        day: stats(Period::Day),
        week: stats(Period::Week),
        month: stats(Period::Month),
    }
}

pub fn dashboard(inputs: &DashboardInputs<'_>, today: NaiveDate) -> Dashboard {
    let breakdown = occurrence_breakdown(inputs.occurrences);
    Dashboard {
        today: today.format("%Y-%m-%d").to_string(),
        occurrences_by_type: breakdown.by_type,
        occurrences_by_nature: breakdown.by_nature,
        staff: attendance_windows(inputs.attendance, false, inputs.staff_count, today),
        teachers: attendance_windows(inputs.attendance, true, inputs.teacher_count, today),
        demands: DemandWindows {
            today: demand_stats(inputs.demands, Period::Day, today),
            week: demand_stats(inputs.demands, Period::Week, today),
            month: demand_stats(inputs.demands, Period::Month, today),
        },
        finance_balance: finance_balance(inputs.finances),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Occurrence,
    Meeting,
    Demand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub kind: FeedKind,
    pub id: String,
    pub created_at: i64,
    pub subject: String,
    pub detail: String,
}

pub const DEFAULT_FEED_LIMIT: usize = 5;

/// Newest activity across occurrences, parent meetings and demands.
pub fn recent_feed(
    occurrences: &[Occurrence],
    meetings: &[ParentMeeting],
    demands: &[Demand],
    limit: usize,
) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = occurrences
        .iter()
        .map(|o| FeedItem {
            kind: FeedKind::Occurrence,
            id: o.id.clone(),
            created_at: o.created_at,
            subject: o.student.clone(),
            detail: o.reason.clone(),
        })
        .chain(meetings.iter().map(|m| FeedItem {
            kind: FeedKind::Meeting,
            id: m.id.clone(),
            created_at: m.created_at,
            subject: m.student.clone(),
            detail: m.reason.clone(),
        }))
        .chain(demands.iter().map(|d| FeedItem {
            kind: FeedKind::Demand,
            id: d.id.clone(),
            created_at: d.created_at,
            subject: d.title.clone(),
            detail: if d.completed { "Concluída" } else { "Pendente" }.to_string(),
        }))
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items.truncate(limit);
    items
}

pub fn student_history<'a>(occurrences: &'a [Occurrence], student: &str) -> Vec<&'a Occurrence> {
    occurrences.iter().filter(|o| o.student == student).collect()
}
