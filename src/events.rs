use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Running,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub task_id: String,
    pub status: StatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusUpdate {
    pub fn new(task_id: impl Into<String>, status: StatusKind) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// One-way sink for task status updates. Publishing never fails: when the
/// consumer is gone or the buffer is full, the update is dropped.
pub struct StatusBus {
    tx: mpsc::Sender<StatusUpdate>,
    rx: Mutex<mpsc::Receiver<StatusUpdate>>,
}

impl StatusBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn sender(&self) -> StatusSender {
        StatusSender {
            tx: self.tx.clone(),
        }
    }

    pub async fn consume(&self) -> Option<StatusUpdate> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

#[derive(Clone)]
pub struct StatusSender {
    tx: mpsc::Sender<StatusUpdate>,
}

impl StatusSender {
    pub fn publish(&self, update: StatusUpdate) {
        let _ = self.tx.try_send(update);
    }
}
