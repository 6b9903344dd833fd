use crate::schedule::types::{ScheduleStore, ScheduleTask};
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable task persistence, synchronous from the scheduler's point of view.
pub trait TaskStore: Send + Sync {
    fn get_all(&self) -> Result<Vec<ScheduleTask>>;
    fn replace_all(&self, tasks: &[ScheduleTask]) -> Result<()>;
}

/// File-backed store: a pretty-printed `{version, tasks}` envelope.
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TaskStore for JsonTaskStore {
    fn get_all(&self) -> Result<Vec<ScheduleTask>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let store: ScheduleStore = serde_json::from_str(&raw).unwrap_or_default();
        Ok(store.tasks)
    }

    fn replace_all(&self, tasks: &[ScheduleTask]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = ScheduleStore {
            version: 1,
            tasks: tasks.to_vec(),
        };
        let text = serde_json::to_string_pretty(&store)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<ScheduleTask>>,
}

impl TaskStore for MemoryTaskStore {
    fn get_all(&self) -> Result<Vec<ScheduleTask>> {
        let tasks = self.tasks.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(tasks.clone())
    }

    fn replace_all(&self, tasks: &[ScheduleTask]) -> Result<()> {
        let mut slot = self.tasks.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        *slot = tasks.to_vec();
        Ok(())
    }
}
