use crate::events::{StatusKind, StatusSender, StatusUpdate};
use crate::schedule::executor::{BatchReport, TaskExecutor};
use crate::schedule::rule::RepeatRule;
use crate::schedule::store::TaskStore;
use crate::schedule::types::{ExecutionRecord, RunStatus, ScheduleTask, TaskStatus};
use crate::session::ChatSession;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Response shape of the direct-send diagnostic command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Facade over the task store, the timer registry, and the executor.
///
/// Every arming path cancels any existing timer for the task id before
/// creating a new one, so a task never holds two timers. Mutations persist
/// before arming; a persistence failure leaves the task unarmed.
#[derive(Clone)]
pub struct ScheduleManager {
    store: Arc<dyn TaskStore>,
    executor: Arc<TaskExecutor>,
    events: StatusSender,
    tasks: Arc<Mutex<Vec<ScheduleTask>>>,
    timers: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl ScheduleManager {
    pub fn new(
        store: Arc<dyn TaskStore>,
        session: Arc<dyn ChatSession>,
        events: StatusSender,
    ) -> Self {
        Self::with_executor(store, Arc::new(TaskExecutor::new(session)), events)
    }

    pub fn with_executor(
        store: Arc<dyn TaskStore>,
        executor: Arc<TaskExecutor>,
        events: StatusSender,
    ) -> Self {
        Self {
            store,
            executor,
            events,
            tasks: Arc::new(Mutex::new(Vec::new())),
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load persisted tasks without arming timers. Used by one-shot CLI
    /// commands that mutate the store and exit.
    pub async fn load_from_store(&self) -> Result<()> {
        let loaded = self.store.get_all()?;
        *self.tasks.lock().await = loaded;
        Ok(())
    }

    /// Load persisted tasks and arm a timer for every enabled, pending,
    /// non-archived task. Called once at startup; occurrences missed while
    /// the process was down are not replayed.
    pub async fn init_from_store(&self) -> Result<()> {
        self.load_from_store().await?;
        let to_arm: Vec<ScheduleTask> = {
            let tasks = self.tasks.lock().await;
            tasks
                .iter()
                .filter(|t| t.enabled && !t.archived && t.status == TaskStatus::Pending)
                .cloned()
                .collect()
        };
        let total = to_arm.len();
        for task in to_arm {
            if let Err(err) = self.arm_timer(&task).await {
                tracing::warn!(task_id = %task.id, error = %err, "failed to arm task at startup");
            }
        }
        tracing::info!(armed = total, "schedule manager initialized");
        Ok(())
    }

    /// Append a task and arm it if enabled. A malformed repeat rule is
    /// persisted as a failed task and returned as an error to the caller.
    pub async fn add_task(&self, mut task: ScheduleTask) -> Result<()> {
        let rule = task.repeat_rule.parse::<RepeatRule>();
        task.is_one_time = rule.as_ref().map(RepeatRule::is_one_time).unwrap_or(false);
        if let Err(err) = &rule {
            task.status = TaskStatus::Failed;
            task.error = Some(format!("invalid repeat rule: {err}"));
        }
        {
            let mut tasks = self.tasks.lock().await;
            tasks.push(task.clone());
            self.persist(tasks.as_slice())?;
        }
        match rule {
            Err(err) => {
                self.events.publish(
                    StatusUpdate::new(&task.id, StatusKind::Failed)
                        .with_message(format!("invalid repeat rule: {err}")),
                );
                Err(err.context(format!("task {} has an invalid repeat rule", task.id)))
            }
            Ok(_) if task.enabled => self.arm_timer(&task).await,
            Ok(_) => Ok(()),
        }
    }

    /// Enable or disable a task. Unknown ids are a no-op. Enabling resets
    /// the task to pending, so re-enabling is the retry path for failed tasks.
    pub async fn toggle_task(&self, id: &str, enabled: bool) -> Result<()> {
        let snapshot = {
            let mut tasks = self.tasks.lock().await;
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return Ok(());
            };
            task.enabled = enabled;
            if enabled && !task.archived {
                task.status = TaskStatus::Pending;
            }
            let snapshot = task.clone();
            self.persist(tasks.as_slice())?;
            snapshot
        };
        if snapshot.enabled && !snapshot.archived {
            self.arm_timer(&snapshot).await
        } else {
            self.cancel_timer(id).await;
            Ok(())
        }
    }

    /// Cancel any pending timer and remove the task from the store.
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.cancel_timer(id).await;
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() < before {
            self.persist(tasks.as_slice())?;
        }
        Ok(())
    }

    /// Replace the stored task matching `task.id`, cancel its old timer, and
    /// arm the new rule if still enabled. Unknown ids are a no-op.
    pub async fn update_task(&self, mut task: ScheduleTask) -> Result<()> {
        let rule = task.repeat_rule.parse::<RepeatRule>();
        task.is_one_time = rule.as_ref().map(RepeatRule::is_one_time).unwrap_or(false);
        match &rule {
            Ok(_) => {
                if task.enabled && !task.archived {
                    task.status = TaskStatus::Pending;
                }
            }
            Err(err) => {
                task.status = TaskStatus::Failed;
                task.error = Some(format!("invalid repeat rule: {err}"));
            }
        }
        {
            let mut tasks = self.tasks.lock().await;
            let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) else {
                return Ok(());
            };
            *slot = task.clone();
            self.persist(tasks.as_slice())?;
        }
        self.cancel_timer(&task.id).await;
        match rule {
            Err(err) => {
                self.events.publish(
                    StatusUpdate::new(&task.id, StatusKind::Failed)
                        .with_message(format!("invalid repeat rule: {err}")),
                );
                Err(err.context(format!("task {} has an invalid repeat rule", task.id)))
            }
            Ok(_) if task.enabled && !task.archived => self.arm_timer(&task).await,
            Ok(_) => Ok(()),
        }
    }

    /// Snapshot of tasks for the UI layer; archived tasks are excluded from
    /// the active view unless requested.
    pub async fn get_tasks(&self, include_archived: bool) -> Vec<ScheduleTask> {
        let tasks = self.tasks.lock().await;
        let mut out: Vec<ScheduleTask> = tasks
            .iter()
            .filter(|t| include_archived || !t.archived)
            .cloned()
            .collect();
        out.sort_by_key(|t| t.created_at);
        out
    }

    /// Fire a task immediately, bypassing its schedule. The outcome is
    /// recorded exactly like a timed firing; recurring tasks are rearmed.
    pub async fn run_task_now(&self, id: &str) -> Result<bool> {
        let task = {
            let tasks = self.tasks.lock().await;
            tasks.iter().find(|t| t.id == id).cloned()
        };
        let Some(task) = task else {
            return Ok(false);
        };
        self.cancel_timer(id).await;
        self.events
            .publish(StatusUpdate::new(id, StatusKind::Running));
        let outcome = self.executor.execute(&task).await;
        self.record_outcome(id, outcome).await?;
        Ok(true)
    }

    /// Immediate single-room send for diagnostics; never throws.
    pub async fn test_direct_send(&self, room_name: &str, message: &str) -> SendOutcome {
        match self.executor.send_direct(room_name, message).await {
            Ok(()) => SendOutcome {
                success: true,
                error: None,
            },
            Err(err) => SendOutcome {
                success: false,
                error: Some(err.to_string()),
            },
        }
    }

    pub async fn is_armed(&self, id: &str) -> bool {
        self.timers.lock().await.contains_key(id)
    }

    pub async fn armed_count(&self) -> usize {
        self.timers.lock().await.len()
    }

    pub async fn status_summary(&self) -> serde_json::Value {
        let tasks = self.tasks.lock().await;
        let armed = self.timers.lock().await.len();
        serde_json::json!({
            "tasks": tasks.len(),
            "armed": armed,
            "archived": tasks.iter().filter(|t| t.archived).count(),
        })
    }

    /// Abort every pending timer. In-flight executions are not interrupted.
    pub async fn shutdown(&self) {
        let mut timers = self.timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }

    fn persist(&self, tasks: &[ScheduleTask]) -> Result<()> {
        self.store
            .replace_all(tasks)
            .context("failed to persist schedule tasks")
    }

    async fn cancel_timer(&self, id: &str) {
        if let Some(handle) = self.timers.lock().await.remove(id) {
            handle.abort();
        }
    }

    async fn arm_timer(&self, task: &ScheduleTask) -> Result<()> {
        let rule = match task.repeat_rule.parse::<RepeatRule>() {
            Ok(rule) => rule,
            Err(err) => {
                let reason = format!("invalid repeat rule: {err}");
                self.mark_schedule_failure(&task.id, &reason).await?;
                return Err(anyhow!("{reason}"));
            }
        };
        let now = Local::now();
        let Some(next) = rule.next_occurrence(now) else {
            let reason = format!("rule {:?} has no next occurrence", task.repeat_rule);
            self.mark_schedule_failure(&task.id, &reason).await?;
            return Err(anyhow!("{reason}"));
        };
        // elapsed one-time rules land here with a negative offset: fire now
        let delay = (next - now).to_std().unwrap_or(Duration::ZERO);

        self.cancel_timer(&task.id).await;
        let manager = self.clone();
        let task_id = task.id.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            manager.fire(&task_id).await;
        });
        self.timers.lock().await.insert(task.id.clone(), handle);
        tracing::info!(task_id = %task.id, next = %next, "timer armed");
        Ok(())
    }

    /// Timer callback. Captures every failure into the task record; nothing
    /// escapes, since a throw here would be unobservable.
    fn fire<'a>(
        &'a self,
        id: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            // the timer has elapsed; its registry entry is dead
            self.timers.lock().await.remove(id);
            let task = {
                let tasks = self.tasks.lock().await;
                tasks.iter().find(|t| t.id == id).cloned()
            };
            let Some(task) = task else {
                return;
            };
            if !task.enabled {
                return;
            }
            tracing::info!(task_id = %task.id, rooms = task.room_names.len(), "task firing");
            self.events
                .publish(StatusUpdate::new(id, StatusKind::Running));
            let outcome = self.executor.execute(&task).await;
            if let Err(err) = self.record_outcome(id, outcome).await {
                tracing::error!(task_id = %id, error = %err, "failed to record task outcome");
            }
        })
    }

    async fn record_outcome(&self, id: &str, outcome: Result<BatchReport>) -> Result<()> {
        let now = Local::now();
        let (run_status, error, message) = match &outcome {
            Ok(report) if report.succeeded() => (
                RunStatus::Success,
                None,
                format!("delivered to {} room(s)", report.sent),
            ),
            Ok(report) => {
                let rendered = report.render_error().unwrap_or_default();
                (RunStatus::Failed, Some(rendered.clone()), rendered)
            }
            Err(err) => (RunStatus::Failed, Some(err.to_string()), err.to_string()),
        };

        let snapshot = {
            let mut tasks = self.tasks.lock().await;
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                // deleted while the batch was in flight
                return Ok(());
            };
            task.last_run = Some(now);
            task.last_status = Some(run_status);
            task.error = error.clone();
            task.record_run(ExecutionRecord {
                timestamp: now,
                status: run_status,
                error,
            });
            if task.is_one_time {
                match run_status {
                    RunStatus::Success => {
                        task.status = TaskStatus::Completed;
                        task.archived = true;
                    }
                    RunStatus::Failed => task.status = TaskStatus::Failed,
                }
            }
            let snapshot = task.clone();
            self.persist(tasks.as_slice())?;
            snapshot
        };

        let kind = match run_status {
            RunStatus::Success => StatusKind::Success,
            RunStatus::Failed => StatusKind::Failed,
        };
        self.events
            .publish(StatusUpdate::new(id, kind).with_message(message));

        // recurring rules are rearmed for their next occurrence after every
        // firing; one-time tasks never are
        if !snapshot.is_one_time
            && snapshot.enabled
            && snapshot.status == TaskStatus::Pending
        {
            if let Err(err) = self.arm_timer(&snapshot).await {
                tracing::warn!(task_id = %id, error = %err, "failed to rearm recurring task");
            }
        }
        Ok(())
    }

    async fn mark_schedule_failure(&self, id: &str, reason: &str) -> Result<()> {
        {
            let mut tasks = self.tasks.lock().await;
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return Ok(());
            };
            task.status = TaskStatus::Failed;
            task.error = Some(reason.to_string());
            self.persist(tasks.as_slice())?;
        }
        self.events
            .publish(StatusUpdate::new(id, StatusKind::Failed).with_message(reason.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StatusBus;
    use crate::schedule::store::MemoryTaskStore;
    use crate::session::RoomHandle;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::Datelike;
    use std::sync::Mutex as StdMutex;

    struct MockRoom {
        topic: String,
        sent: Arc<StdMutex<Vec<String>>>,
    }

    #[async_trait]
    impl RoomHandle for MockRoom {
        fn topic(&self) -> &str {
            &self.topic
        }

        async fn say(&self, text: &str) -> Result<()> {
            self.sent.lock().expect("sent lock").push(text.to_string());
            Ok(())
        }
    }

    struct MockSession {
        logged_in: bool,
        rooms: Vec<Arc<dyn RoomHandle>>,
    }

    #[async_trait]
    impl ChatSession for MockSession {
        fn is_logged_in(&self) -> bool {
            self.logged_in
        }

        async fn find_all_rooms(&self) -> Result<Vec<Arc<dyn RoomHandle>>> {
            Ok(self.rooms.clone())
        }
    }

    struct Fixture {
        manager: ScheduleManager,
        store: Arc<MemoryTaskStore>,
        bus: StatusBus,
        sent: Arc<StdMutex<Vec<String>>>,
    }

    fn fixture(topics: &[&str], logged_in: bool) -> Fixture {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let rooms = topics
            .iter()
            .map(|topic| {
                Arc::new(MockRoom {
                    topic: topic.to_string(),
                    sent: sent.clone(),
                }) as Arc<dyn RoomHandle>
            })
            .collect();
        let session = Arc::new(MockSession { logged_in, rooms });
        let store = Arc::new(MemoryTaskStore::default());
        let bus = StatusBus::new(64);
        let manager = ScheduleManager::new(store.clone(), session, bus.sender());
        Fixture {
            manager,
            store,
            bus,
            sent,
        }
    }

    fn daily_task(rooms: &[&str]) -> ScheduleTask {
        ScheduleTask::new(
            rooms.iter().map(ToString::to_string).collect(),
            "announcement",
            &RepeatRule::daily(23, 59),
        )
    }

    /// One-time rule whose literal time has already passed today, so the
    /// timer arms with zero delay and fires immediately.
    fn elapsed_once_task(rooms: &[&str]) -> ScheduleTask {
        let now = Local::now();
        ScheduleTask::new(
            rooms.iter().map(ToString::to_string).collect(),
            "announcement",
            &RepeatRule::once(now.month(), now.day(), 0, 0),
        )
    }

    async fn wait_for<F>(fixture: &Fixture, id: &str, predicate: F) -> ScheduleTask
    where
        F: Fn(&ScheduleTask) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let tasks = fixture.manager.get_tasks(true).await;
                if let Some(task) = tasks.iter().find(|t| t.id == id) {
                    if predicate(task) {
                        return task.clone();
                    }
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("timed out waiting for task state")
    }

    #[tokio::test]
    async fn add_arms_exactly_one_timer() -> Result<()> {
        let f = fixture(&["Team"], true);
        let task = daily_task(&["Team"]);
        let id = task.id.clone();
        f.manager.add_task(task).await?;
        assert!(f.manager.is_armed(&id).await);
        assert_eq!(f.manager.armed_count().await, 1);
        assert_eq!(f.store.get_all()?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn lifecycle_keeps_at_most_one_timer() -> Result<()> {
        let f = fixture(&["Team"], true);
        let task = daily_task(&["Team"]);
        let id = task.id.clone();
        f.manager.add_task(task.clone()).await?;

        let mut updated = task.clone();
        updated.repeat_rule = "0 6 * * *".to_string();
        f.manager.update_task(updated).await?;
        assert_eq!(f.manager.armed_count().await, 1);

        f.manager.toggle_task(&id, false).await?;
        assert_eq!(f.manager.armed_count().await, 0);

        f.manager.toggle_task(&id, true).await?;
        assert_eq!(f.manager.armed_count().await, 1);

        f.manager.delete_task(&id).await?;
        assert_eq!(f.manager.armed_count().await, 0);
        assert!(f.store.get_all()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_a_noop() -> Result<()> {
        let f = fixture(&[], true);
        f.manager.toggle_task("missing", true).await?;
        assert_eq!(f.manager.armed_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn init_arms_only_enabled_pending_tasks() -> Result<()> {
        let f = fixture(&["Team"], true);
        let armed = daily_task(&["Team"]);
        let mut disabled = daily_task(&["Team"]);
        disabled.enabled = false;
        let mut archived = daily_task(&["Team"]);
        archived.status = TaskStatus::Completed;
        archived.archived = true;
        let mut failed = daily_task(&["Team"]);
        failed.status = TaskStatus::Failed;
        f.store.replace_all(&[
            armed.clone(),
            disabled.clone(),
            archived.clone(),
            failed.clone(),
        ])?;

        f.manager.init_from_store().await?;
        assert_eq!(f.manager.armed_count().await, 1);
        assert!(f.manager.is_armed(&armed.id).await);

        // startup arming is idempotent
        f.manager.init_from_store().await?;
        assert_eq!(f.manager.armed_count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_rule_is_rejected_and_recorded() -> Result<()> {
        let f = fixture(&["Team"], true);
        let mut task = daily_task(&["Team"]);
        task.repeat_rule = "every tuesday".to_string();
        let id = task.id.clone();

        assert!(f.manager.add_task(task).await.is_err());
        assert_eq!(f.manager.armed_count().await, 0);

        let stored = f.store.get_all()?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, TaskStatus::Failed);
        assert!(
            stored[0]
                .error
                .as_deref()
                .unwrap_or_default()
                .contains("invalid repeat rule")
        );
        Ok(())
    }

    #[tokio::test]
    async fn elapsed_one_time_task_fires_and_archives() -> Result<()> {
        let f = fixture(&["Team"], true);
        let task = elapsed_once_task(&["Team"]);
        let id = task.id.clone();
        f.manager.add_task(task).await?;

        let done = wait_for(&f, &id, |t| t.archived).await;
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.last_status, Some(RunStatus::Success));
        assert_eq!(done.execution_history.len(), 1);
        assert_eq!(f.sent.lock().expect("sent lock").len(), 1);

        // excluded from the active view, retained in the full one
        let active = f.manager.get_tasks(false).await;
        assert!(active.iter().all(|t| t.id != id));
        let all = f.manager.get_tasks(true).await;
        assert!(all.iter().any(|t| t.id == id));

        // archived and completed: no timer left behind
        assert!(!f.manager.is_armed(&id).await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_one_time_task_stays_visible() -> Result<()> {
        // session resolves no rooms, so the batch fails
        let f = fixture(&[], true);
        let task = elapsed_once_task(&["Ghost"]);
        let id = task.id.clone();
        f.manager.add_task(task).await?;

        let done = wait_for(&f, &id, |t| t.status == TaskStatus::Failed).await;
        assert!(!done.archived);
        assert_eq!(done.last_status, Some(RunStatus::Failed));
        assert!(
            done.error
                .as_deref()
                .unwrap_or_default()
                .contains("Ghost: room not found")
        );
        let active = f.manager.get_tasks(false).await;
        assert!(active.iter().any(|t| t.id == id));
        Ok(())
    }

    #[tokio::test]
    async fn missing_session_fails_the_firing() -> Result<()> {
        let f = fixture(&["Team"], false);
        let task = elapsed_once_task(&["Team"]);
        let id = task.id.clone();
        f.manager.add_task(task).await?;

        let done = wait_for(&f, &id, |t| t.status == TaskStatus::Failed).await;
        assert!(
            done.error
                .as_deref()
                .unwrap_or_default()
                .contains("not logged in")
        );
        assert!(f.sent.lock().expect("sent lock").is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn manual_run_rearms_recurring_tasks() -> Result<()> {
        let f = fixture(&["Team"], true);
        let task = daily_task(&["Team"]);
        let id = task.id.clone();
        f.manager.add_task(task).await?;

        assert!(f.manager.run_task_now(&id).await?);
        let done = wait_for(&f, &id, |t| t.last_status.is_some()).await;
        assert_eq!(done.last_status, Some(RunStatus::Success));
        assert_eq!(done.status, TaskStatus::Pending);
        assert!(!done.archived);
        assert!(f.manager.is_armed(&id).await);

        assert!(!f.manager.run_task_now("missing").await?);
        Ok(())
    }

    #[tokio::test]
    async fn status_events_trace_a_firing() -> Result<()> {
        let f = fixture(&["Team"], true);
        let task = elapsed_once_task(&["Team"]);
        let id = task.id.clone();
        f.manager.add_task(task).await?;
        wait_for(&f, &id, |t| t.archived).await;

        let first = f.bus.consume().await.expect("running update");
        assert_eq!(first.task_id, id);
        assert_eq!(first.status, StatusKind::Running);
        let second = f.bus.consume().await.expect("success update");
        assert_eq!(second.status, StatusKind::Success);
        assert_eq!(second.message.as_deref(), Some("delivered to 1 room(s)"));
        Ok(())
    }

    #[tokio::test]
    async fn persistence_failure_skips_arming() -> Result<()> {
        struct FailingStore;
        impl TaskStore for FailingStore {
            fn get_all(&self) -> Result<Vec<ScheduleTask>> {
                Ok(Vec::new())
            }
            fn replace_all(&self, _tasks: &[ScheduleTask]) -> Result<()> {
                bail!("disk full");
            }
        }

        let session = Arc::new(MockSession {
            logged_in: true,
            rooms: Vec::new(),
        });
        let bus = StatusBus::new(8);
        let manager = ScheduleManager::new(Arc::new(FailingStore), session, bus.sender());

        let err = manager
            .add_task(daily_task(&["Team"]))
            .await
            .expect_err("persistence should fail");
        assert!(err.to_string().contains("persist"));
        assert_eq!(manager.armed_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn direct_send_reports_outcome() {
        let f = fixture(&["Team"], true);
        let ok = f.manager.test_direct_send("Team", "ping").await;
        assert!(ok.success);
        let missing = f.manager.test_direct_send("Ghost", "ping").await;
        assert!(!missing.success);
        assert!(
            missing
                .error
                .unwrap_or_default()
                .contains("room not found")
        );
    }
}
