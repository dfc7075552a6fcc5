use super::actor::{ReminderActor, ReminderCommand};
use super::models::{ReminderId, ScheduledReminder};
use super::ReminderScheduler;
use crate::components::messaging::MessagingService;
use crate::error::{scheduler_error, BotResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle for interacting with the reminder actor
#[derive(Clone)]
pub struct ReminderSchedulerHandle {
    command_tx: mpsc::Sender<ReminderCommand>,
    _actor_task: Arc<JoinHandle<()>>,
}

impl ReminderSchedulerHandle {
    /// Create a new handle and spawn the actor
    pub fn new(messaging: Arc<dyn MessagingService>) -> Self {
        let (mut actor, command_tx) = ReminderActor::new(messaging);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            command_tx,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Reminders that have not fired yet, soonest first
    pub async fn pending(&self) -> BotResult<Vec<ScheduledReminder>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(ReminderCommand::Pending(response_tx))
            .await
            .map_err(|e| scheduler_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| scheduler_error("Response channel closed"))
    }

    /// Shutdown the actor, dropping every pending reminder
    pub async fn shutdown(&self) -> BotResult<()> {
        let _ = self.command_tx.send(ReminderCommand::Shutdown).await;
        Ok(())
    }
}

#[async_trait]
impl ReminderScheduler for ReminderSchedulerHandle {
    async fn schedule_once(&self, to: &str, body: &str, fire_at: DateTime<Utc>) -> BotResult<ReminderId> {
        let reminder = ScheduledReminder::new(to, body, fire_at);
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(ReminderCommand::Schedule(reminder, response_tx))
            .await
            .map_err(|e| scheduler_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| scheduler_error("Response channel closed"))?
    }
}
