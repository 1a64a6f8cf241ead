//! Identity-feed side tasks: the ambient chat stream and the feed poller.
//!
//! Neither touches the engine; both stop when the runtime shuts down.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::events::{ChatKind, ChatMessage, Event, EventBus};
use crate::providers::IdentityFeed;

/// Streams one feed chat line to the chat topic every `period`.
pub struct AmbientChatWorker {
    feed: Arc<dyn IdentityFeed>,
    event_bus: EventBus,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl AmbientChatWorker {
    pub fn new(
        feed: Arc<dyn IdentityFeed>,
        event_bus: EventBus,
        period: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            feed,
            event_bus,
            period,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let Some(line) = self.feed.next_chat_line() else {
                        trace!(target: "runtime::ambient", "no ambient chat queued");
                        continue;
                    };
                    self.event_bus.publish(Event::Chat(ChatMessage::now(
                        line.sender,
                        line.content,
                        ChatKind::Ambient,
                    )));
                }
            }
        }
        debug!(target: "runtime::ambient", "AmbientChatWorker stopped");
    }
}

/// Refreshes the identity feed every `period`.
pub struct FeedPoller {
    feed: Arc<dyn IdentityFeed>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl FeedPoller {
    pub fn new(feed: Arc<dyn IdentityFeed>, period: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            feed,
            period,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => match self.feed.poll().await {
                    Ok(queued) => debug!(target: "runtime::ambient", queued, "identity feed polled"),
                    Err(error) => warn!(target: "runtime::ambient", %error, "identity feed poll failed"),
                },
            }
        }
        debug!(target: "runtime::ambient", "FeedPoller stopped");
    }
}
