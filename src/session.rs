use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A resolved chat room the session can deliver text into.
#[async_trait]
pub trait RoomHandle: Send + Sync {
    fn topic(&self) -> &str;
    async fn say(&self, text: &str) -> Result<()>;
}

/// Narrow seam over the chat-automation transport. The engine never manages
/// login state; it only checks availability before executing a batch.
#[async_trait]
pub trait ChatSession: Send + Sync {
    fn is_logged_in(&self) -> bool;

    async fn find_all_rooms(&self) -> Result<Vec<Arc<dyn RoomHandle>>>;

    async fn find_room(&self, topic: &str) -> Result<Option<Arc<dyn RoomHandle>>> {
        let rooms = self.find_all_rooms().await?;
        Ok(rooms.into_iter().find(|room| room.topic() == topic))
    }
}

/// Stdout-backed stand-in transport for the CLI daemon and diagnostics.
/// A real deployment injects its own `ChatSession` implementation instead.
pub struct ConsoleSession {
    rooms: Vec<Arc<dyn RoomHandle>>,
}

impl ConsoleSession {
    pub fn new(topics: Vec<String>) -> Self {
        let rooms = topics
            .into_iter()
            .map(|topic| Arc::new(ConsoleRoom { topic }) as Arc<dyn RoomHandle>)
            .collect();
        Self { rooms }
    }
}

#[async_trait]
impl ChatSession for ConsoleSession {
    fn is_logged_in(&self) -> bool {
        true
    }

    async fn find_all_rooms(&self) -> Result<Vec<Arc<dyn RoomHandle>>> {
        Ok(self.rooms.clone())
    }
}

struct ConsoleRoom {
    topic: String,
}

#[async_trait]
impl RoomHandle for ConsoleRoom {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn say(&self, text: &str) -> Result<()> {
        println!("[{}] {text}", self.topic);
        Ok(())
    }
}
