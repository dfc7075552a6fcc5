use super::models::{ReminderId, ScheduledReminder};
use crate::components::messaging::MessagingService;
use crate::error::BotResult;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Commands that can be sent to the reminder actor
pub enum ReminderCommand {
    Schedule(ScheduledReminder, mpsc::Sender<BotResult<ReminderId>>),
    Pending(mpsc::Sender<Vec<ScheduledReminder>>),
    Shutdown,
}

/// Owns the registry of pending timers
pub struct ReminderActor {
    messaging: Arc<dyn MessagingService>,
    command_rx: mpsc::Receiver<ReminderCommand>,
    fired_tx: mpsc::UnboundedSender<ReminderId>,
    fired_rx: mpsc::UnboundedReceiver<ReminderId>,
    timers: HashMap<ReminderId, (ScheduledReminder, JoinHandle<()>)>,
}

impl ReminderActor {
    /// Create a new actor and the sender for its mailbox
    pub fn new(messaging: Arc<dyn MessagingService>) -> (Self, mpsc::Sender<ReminderCommand>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();

        let actor = Self {
            messaging,
            command_rx,
            fired_tx,
            fired_rx,
            timers: HashMap::new(),
        };

        (actor, command_tx)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Reminder scheduler started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(ReminderCommand::Schedule(reminder, response_tx)) => {
                        let id = self.schedule(reminder);
                        let _ = response_tx.send(Ok(id)).await;
                    }
                    Some(ReminderCommand::Pending(response_tx)) => {
                        let mut pending: Vec<ScheduledReminder> =
                            self.timers.values().map(|(reminder, _)| reminder.clone()).collect();
                        pending.sort_by_key(|reminder| reminder.fire_at);
                        let _ = response_tx.send(pending).await;
                    }
                    Some(ReminderCommand::Shutdown) | None => break,
                },
                Some(id) = self.fired_rx.recv() => {
                    self.timers.remove(&id);
                }
            }
        }

        self.abort_pending();
        info!("Reminder scheduler shut down");
    }

    /// Spawn the timer task for one reminder and register it
    fn schedule(&mut self, reminder: ScheduledReminder) -> ReminderId {
        let id = reminder.id;
        // Already due reminders fire immediately
        let delay = (reminder.fire_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);

        let messaging = Arc::clone(&self.messaging);
        let fired_tx = self.fired_tx.clone();
        let to = reminder.to.clone();
        let body = reminder.body.clone();

        let task = tokio::spawn(async move {
            sleep(delay).await;

            match messaging.send_message(&to, &body).await {
                Ok(_) => info!("Reminder sent to {}: {}", to, body),
                Err(e) => error!("Error sending reminder {}: {}", id, e),
            }

            let _ = fired_tx.send(id);
        });

        info!(
            "Scheduled reminder {} for {} in {}s",
            id,
            reminder.fire_at,
            delay.as_secs()
        );
        self.timers.insert(id, (reminder, task));
        id
    }

    fn abort_pending(&mut self) {
        if self.timers.is_empty() {
            return;
        }

        warn!(
            "Dropping {} pending reminder(s); reminders are not persisted",
            self.timers.len()
        );
        for (_, (reminder, task)) in self.timers.drain() {
            warn!("Dropped reminder {} due at {}", reminder.id, reminder.fire_at);
            task.abort();
        }
    }
}
