use crate::schedule::rule::RepeatRule;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_EXECUTION_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Local>,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTask {
    pub id: String,
    pub room_names: Vec<String>,
    pub message: String,
    /// Compact 5-field rule string; parsed at arm time.
    pub repeat_rule: String,
    pub enabled: bool,
    pub is_one_time: bool,
    pub created_at: DateTime<Local>,
    pub status: TaskStatus,
    pub archived: bool,
    #[serde(default)]
    pub last_run: Option<DateTime<Local>>,
    #[serde(default)]
    pub last_status: Option<RunStatus>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_history: Vec<ExecutionRecord>,
}

impl ScheduleTask {
    pub fn new(room_names: Vec<String>, message: impl Into<String>, rule: &RepeatRule) -> Self {
        Self {
            id: short_id(),
            room_names,
            message: message.into(),
            repeat_rule: rule.to_string(),
            enabled: true,
            is_one_time: rule.is_one_time(),
            created_at: Local::now(),
            status: TaskStatus::Pending,
            archived: false,
            last_run: None,
            last_status: None,
            error: None,
            execution_history: Vec::new(),
        }
    }

    pub fn record_run(&mut self, record: ExecutionRecord) {
        self.execution_history.push(record);
        if self.execution_history.len() > MAX_EXECUTION_HISTORY {
            let excess = self.execution_history.len() - MAX_EXECUTION_HISTORY;
            self.execution_history.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStore {
    pub version: u32,
    pub tasks: Vec<ScheduleTask>,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self {
            version: 1,
            tasks: Vec::new(),
        }
    }
}

pub fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
