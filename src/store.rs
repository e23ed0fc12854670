use crate::db::{self, KvStore, SqliteKv};
use crate::model::{
    AttendanceRecord, Demand, Document, FinanceRecord, Goal, Occurrence, ParentMeeting, Role,
    SchoolEvent, StaffMember, User,
};
use crate::records::Record;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const SESSION_KEY: &str = "emdra_user";
pub const STUDENTS_KEY: &str = "emdra_students";
pub const TEACHERS_KEY: &str = "emdra_teachers";

#[derive(Debug, Default, Clone)]
pub struct Collections {
    pub users: Vec<User>,
    pub occurrences: Vec<Occurrence>,
    pub attendance: Vec<AttendanceRecord>,
    pub demands: Vec<Demand>,
    pub goals: Vec<Goal>,
    pub events: Vec<SchoolEvent>,
    pub finances: Vec<FinanceRecord>,
    pub documents: Vec<Document>,
    pub meetings: Vec<ParentMeeting>,
    pub staff: Vec<StaffMember>,
    pub students: Vec<String>,
    pub teachers: Vec<String>,
}

/// A record type with its own collection and storage key.
pub trait Slot: Record {
    const KEY: &'static str;
    /// Field name used in list responses.
    const PLURAL: &'static str;

    fn slot(c: &Collections) -> &Vec<Self>;
    fn slot_mut(c: &mut Collections) -> &mut Vec<Self>;
}

macro_rules! slot {
    ($ty:ty, $field:ident, $key:literal, $plural:literal) => {
        impl Slot for $ty {
            const KEY: &'static str = $key;
            const PLURAL: &'static str = $plural;

            fn slot(c: &Collections) -> &Vec<Self> {
                &c.$field
            }

            fn slot_mut(c: &mut Collections) -> &mut Vec<Self> {
                &mut c.$field
            }
        }
    };
}

slot!(User, users, "emdra_app_users", "users");
slot!(Occurrence, occurrences, "emdra_occurrences", "occurrences");
slot!(AttendanceRecord, attendance, "emdra_attendance", "attendance");
slot!(Demand, demands, "emdra_demands", "demands");
slot!(Goal, goals, "emdra_goals", "goals");
slot!(SchoolEvent, events, "emdra_events", "events");
slot!(FinanceRecord, finances, "emdra_finances", "finances");
slot!(Document, documents, "emdra_documents", "documents");
slot!(ParentMeeting, meetings, "emdra_meetings", "meetings");
slot!(StaffMember, staff, "emdra_staff_members", "staff");

/// Every key that holds a collection or roster. The session key is not one
/// of them.
pub const COLLECTION_KEYS: [&str; 12] = [
    User::KEY,
    Occurrence::KEY,
    AttendanceRecord::KEY,
    Demand::KEY,
    Goal::KEY,
    SchoolEvent::KEY,
    FinanceRecord::KEY,
    Document::KEY,
    ParentMeeting::KEY,
    StaffMember::KEY,
    STUDENTS_KEY,
    TEACHERS_KEY,
];

/// Name-list rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roster {
    Students,
    Teachers,
}

impl Roster {
    pub fn key(self) -> &'static str {
        match self {
            Roster::Students => STUDENTS_KEY,
            Roster::Teachers => TEACHERS_KEY,
        }
    }

    pub fn names(self, c: &Collections) -> &Vec<String> {
        match self {
            Roster::Students => &c.students,
            Roster::Teachers => &c.teachers,
        }
    }

    pub fn names_mut(self, c: &mut Collections) -> &mut Vec<String> {
        match self {
            Roster::Students => &mut c.students,
            Roster::Teachers => &mut c.teachers,
        }
    }
}

/// Account seeded into a store that has never held a user list.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub admin_name: String,
    pub admin_pin: String,
}

/// Decodes one stored collection. A value that is not a JSON array reads as
/// empty; elements that do not decode are dropped one by one.
pub fn decode_list<T: DeserializeOwned>(key: &str, raw: &str) -> Vec<T> {
    let items: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "stored collection is unreadable, starting empty");
            return Vec::new();
        }
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() != total {
        warn!(
            key,
            skipped = total - decoded.len(),
            "dropped malformed records from stored collection"
        );
    }
    decoded
}

fn load_list<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Vec<T> {
    match kv.get(key) {
        Ok(Some(raw)) => decode_list(key, &raw),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to read stored collection, starting empty");
            Vec::new()
        }
    }
}

impl Collections {
    pub fn load(kv: &dyn KvStore) -> Self {
        Self {
            users: load_list(kv, User::KEY),
            occurrences: load_list(kv, Occurrence::KEY),
            attendance: load_list(kv, AttendanceRecord::KEY),
            demands: load_list(kv, Demand::KEY),
            goals: load_list(kv, Goal::KEY),
            events: load_list(kv, SchoolEvent::KEY),
            finances: load_list(kv, FinanceRecord::KEY),
            documents: load_list(kv, Document::KEY),
            meetings: load_list(kv, ParentMeeting::KEY),
            staff: load_list(kv, StaffMember::KEY),
            students: load_list(kv, STUDENTS_KEY),
            teachers: load_list(kv, TEACHERS_KEY),
        }
    }
}

pub struct Workspace {
    path: PathBuf,
    kv: Box<dyn KvStore>,
    pub data: Collections,
}

impl Workspace {
    pub fn open(path: &Path, bootstrap: &Bootstrap) -> anyhow::Result<Self> {
        let conn = db::open_db(path)
            .with_context(|| format!("failed to open store in {}", path.to_string_lossy()))?;
        Self::with_store(path, Box::new(SqliteKv::new(conn)), bootstrap)
    }

    pub fn with_store(
        path: &Path,
        kv: Box<dyn KvStore>,
        bootstrap: &Bootstrap,
    ) -> anyhow::Result<Self> {
        let seed_admin = kv.get(User::KEY)?.is_none();
        let data = Collections::load(kv.as_ref());
        let mut ws = Self {
            path: path.to_path_buf(),
            kv,
            data,
        };
        if seed_admin {
            ws.data.users.push(User {
                id: "admin-bootstrap".to_string(),
                name: bootstrap.admin_name.clone(),
                pin: bootstrap.admin_pin.clone(),
                role: Role::Admin,
                classes: None,
            });
            ws.flush::<User>()?;
            info!(name = %bootstrap.admin_name, "seeded bootstrap admin account");
        }
        Ok(ws)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.kv.as_ref()
    }

    /// Rereads every collection from the store.
    pub fn reload(&mut self) {
        self.data = Collections::load(self.kv.as_ref());
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("failed to encode {}", key))?;
        self.kv
            .set(key, &raw)
            .with_context(|| format!("failed to write {}", key))
    }

    /// Full overwrite of one collection.
    pub fn flush<T: Slot>(&self) -> anyhow::Result<()> {
        self.write(T::KEY, T::slot(&self.data))
    }

    pub fn flush_roster(&self, roster: Roster) -> anyhow::Result<()> {
        self.write(roster.key(), roster.names(&self.data))
    }

    /// The persisted session, if it still names an existing account with
    /// the same PIN. A stale session is cleared.
    pub fn restore_session(&self) -> Option<User> {
        let raw = match self.kv.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read stored session");
                return None;
            }
        };
        let stored: Option<User> = serde_json::from_str(&raw).ok();
        let current = stored.and_then(|s| {
            self.data
                .users
                .iter()
                .find(|u| u.id == s.id && u.pin == s.pin)
                .cloned()
        });
        if current.is_none() {
            if let Err(e) = self.kv.remove(SESSION_KEY) {
                warn!(error = %e, "failed to clear stale session");
            }
        }
        current
    }

    pub fn save_session(&self, user: &User) -> anyhow::Result<()> {
        self.write(SESSION_KEY, user)
    }

    pub fn clear_session(&self) -> anyhow::Result<()> {
        self.kv
            .remove(SESSION_KEY)
            .context("failed to clear session")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryKv;

    fn bootstrap() -> Bootstrap {
        Bootstrap {
            admin_name: "Direção".into(),
            admin_pin: "1500".into(),
        }
    }

    #[test]
    fn corrupt_values_read_as_empty_collections() {
        let kv = MemoryKv::default();
        kv.set(Occurrence::KEY, "{not json").expect("set");
        kv.set(STUDENTS_KEY, "[\"Ana\", 3, \"Bia\"]").expect("set");
        kv.set(
            Demand::KEY,
            r#"[{"id":"d1","title":"ok","date":"2026-01-01","completed":false,"createdAt":1},{"id":7}]"#,
        )
        .expect("set");

        let c = Collections::load(&kv);
        assert!(c.occurrences.is_empty());
        assert_eq!(c.students, vec!["Ana", "Bia"]);
        assert_eq!(c.demands.len(), 1);
        assert_eq!(c.demands[0].id, "d1");
    }

    #[test]
    fn first_open_seeds_admin_once() {
        let ws = Workspace::with_store(
            Path::new("/tmp/unused"),
            Box::new(MemoryKv::default()),
            &bootstrap(),
        )
        .expect("open");
        assert_eq!(ws.data.users.len(), 1);
        assert_eq!(ws.data.users[0].role, Role::Admin);

        let kv = MemoryKv::default();
        kv.set(User::KEY, "[]").expect("set");
        let ws = Workspace::with_store(Path::new("/tmp/unused"), Box::new(kv), &bootstrap())
            .expect("open");
        assert!(ws.data.users.is_empty());
    }

    #[test]
    fn stale_session_is_dropped() {
        let ws = Workspace::with_store(
            Path::new("/tmp/unused"),
            Box::new(MemoryKv::default()),
            &bootstrap(),
        )
        .expect("open");
        let mut admin = ws.data.users[0].clone();
        ws.save_session(&admin).expect("save");
        assert_eq!(ws.restore_session().map(|u| u.id), Some(admin.id.clone()));

        admin.pin = "9999".into();
        ws.save_session(&admin).expect("save");
        assert!(ws.restore_session().is_none());
        assert!(ws.restore_session().is_none());
    }
}
