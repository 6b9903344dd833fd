use crate::schedule::types::ScheduleTask;
use crate::session::{ChatSession, RoomHandle};
use anyhow::{Result, anyhow, bail};
use futures_util::future::BoxFuture;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Inter-room pause, drawn uniformly before every send but the first.
const SHORT_PAUSE_MS: (u64, u64) = (2_000, 5_000);
/// Longer pause inserted after every `LONG_PAUSE_EVERY`th successful send.
const LONG_PAUSE_MS: (u64, u64) = (30_000, 60_000);
const LONG_PAUSE_EVERY: usize = 10;

pub type DelayFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomFailure {
    pub room: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub sent: usize,
    pub failures: Vec<RoomFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable aggregate, rendered only at the record/UI boundary.
    pub fn render_error(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let rendered = self
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.room, failure.reason))
            .collect::<Vec<_>>()
            .join("; ");
        Some(rendered)
    }
}

/// Performs one firing of a task against the live chat session: bulk room
/// resolution, ordered sends with humanized pacing, per-room outcome capture.
pub struct TaskExecutor {
    session: Arc<dyn ChatSession>,
    delay: DelayFn,
}

impl TaskExecutor {
    pub fn new(session: Arc<dyn ChatSession>) -> Self {
        Self::with_delay_fn(session, Arc::new(|d| Box::pin(tokio::time::sleep(d))))
    }

    pub fn with_delay_fn(session: Arc<dyn ChatSession>, delay: DelayFn) -> Self {
        Self { session, delay }
    }

    /// A missing session fails the whole batch before any lookup; a missing
    /// room or failed send is recorded and the batch continues.
    pub async fn execute(&self, task: &ScheduleTask) -> Result<BatchReport> {
        if !self.session.is_logged_in() {
            bail!("chat session is not logged in");
        }
        let mut report = BatchReport::default();
        if task.room_names.is_empty() {
            return Ok(report);
        }

        let rooms = self.session.find_all_rooms().await?;
        let by_topic: HashMap<&str, &Arc<dyn RoomHandle>> =
            rooms.iter().map(|room| (room.topic(), room)).collect();

        for (index, name) in task.room_names.iter().enumerate() {
            if index > 0 {
                self.pause(SHORT_PAUSE_MS).await;
            }
            let Some(room) = by_topic.get(name.as_str()) else {
                tracing::warn!(task_id = %task.id, room = %name, "room not found");
                report.failures.push(RoomFailure {
                    room: name.clone(),
                    reason: "room not found".to_string(),
                });
                continue;
            };
            match room.say(&task.message).await {
                Ok(()) => {
                    report.sent += 1;
                    tracing::debug!(task_id = %task.id, room = %name, "message sent");
                    if report.sent % LONG_PAUSE_EVERY == 0 {
                        self.pause(LONG_PAUSE_MS).await;
                    }
                }
                Err(err) => {
                    tracing::warn!(task_id = %task.id, room = %name, error = %err, "send failed");
                    report.failures.push(RoomFailure {
                        room: name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Immediate single-room delivery, bypassing scheduling and pacing.
    pub async fn send_direct(&self, room_name: &str, message: &str) -> Result<()> {
        if !self.session.is_logged_in() {
            bail!("chat session is not logged in");
        }
        let room = self
            .session
            .find_room(room_name)
            .await?
            .ok_or_else(|| anyhow!("room not found: {room_name}"))?;
        room.say(message).await
    }

    async fn pause(&self, (min_ms, max_ms): (u64, u64)) {
        let ms = rand::rng().random_range(min_ms..max_ms);
        (self.delay)(Duration::from_millis(ms)).await;
    }
}
