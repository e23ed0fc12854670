use crate::insight::InsightAdvisor;
use crate::model::User;
use crate::store::{Bootstrap, Workspace};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<Workspace>,
    pub session: Option<User>,
    pub insight: InsightAdvisor,
    pub bootstrap: Bootstrap,
}

impl AppState {
    pub fn new(insight: InsightAdvisor, bootstrap: Bootstrap) -> Self {
        Self {
            workspace: None,
            session: None,
            insight,
            bootstrap,
        }
    }

    /// Opens (or reopens) a workspace and restores its persisted session.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        self.workspace = None;
        self.session = None;
        let ws = Workspace::open(path, &self.bootstrap)?;
        self.session = ws.restore_session();
        info!(
            workspace = %path.to_string_lossy(),
            restored_session = self.session.is_some(),
            "workspace opened"
        );
        self.workspace = Some(ws);
        Ok(())
    }
}
