// SPDX-License-Identifier: MIT

//! Page-wide event bus
//!
//! Stands in for window events. Publishing never blocks and an event with
//! no listeners is simply lost, like a DOM event nobody listens to.
//! Every waiter owns an unbounded channel, so a registered waiter sees each
//! event published after it subscribed, however many arrive before it is
//! polled. The subscription ends on the first matching delivery.

use crate::kit::error::StrategyError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

/// Name of the event that releases `event` requirements without an argument
pub const LOAD_EVENT: &str = "defer:load";

/// An event dispatched on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEvent {
    pub name: String,
    /// Component id carried by load events
    pub id: Option<String>,
}

impl PageEvent {
    /// A plain named event
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// The load event addressed to one component
    pub fn load(id: impl Into<String>) -> Self {
        Self {
            name: LOAD_EVENT.to_string(),
            id: Some(id.into()),
        }
    }

    pub fn is_load_for(&self, id: &str) -> bool {
        self.name == LOAD_EVENT && self.id.as_deref() == Some(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<PageEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an event; returns how many waiters saw it
    pub fn publish(&self, event: PageEvent) -> usize {
        log::debug!("Publishing event '{}' (id: {:?})", event.name, event.id);
        let mut subscribers = self.subscribers();
        // send fails once the waiter is gone
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        subscribers.len()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers();
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }

    /// Wait for the first event accepted by `predicate`
    pub async fn wait_for<F>(&self, description: &str, predicate: F) -> Result<PageEvent, StrategyError>
    where
        F: Fn(&PageEvent) -> bool + Send,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers().push(sender);
        let mut stream = UnboundedReceiverStream::new(receiver);

        while let Some(event) = stream.next().await {
            if predicate(&event) {
                return Ok(event);
            }
        }

        Err(StrategyError::ChannelClosed(description.to_string()))
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<PageEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_load_event_matching() {
        let event = PageEvent::load("hero");
        assert!(event.is_load_for("hero"));
        assert!(!event.is_load_for("footer"));
        assert!(!PageEvent::named(LOAD_EVENT).is_load_for("hero"));
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(PageEvent::named("ready")), 0);
    }

    #[tokio::test]
    async fn test_wait_for_matching_event() {
        let bus = EventBus::default();
        let waiter = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.wait_for("ready", |e| e.name == "ready").await })
        };

        while bus.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }

        bus.publish(PageEvent::named("other"));
        bus.publish(PageEvent::named("ready"));

        let event = waiter.await.unwrap().unwrap();
        assert_eq!(event.name, "ready");
    }

    #[tokio::test]
    async fn test_subscription_ends_with_wait() {
        let bus = EventBus::default();
        let waiter = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.wait_for("load", |e| e.is_load_for("a")).await })
        };

        while bus.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(PageEvent::load("a"));
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_waiter_keeps_events_published_before_it_is_polled() {
        let bus = EventBus::default();
        let waiter = bus.wait_for("load", |e| e.is_load_for("a"));
        tokio::pin!(waiter);

        // Register the subscription without letting the waiter consume anything
        assert!(futures::poll!(waiter.as_mut()).is_pending());
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(PageEvent::load("a"));
        for i in 0..200 {
            bus.publish(PageEvent::named(format!("noise-{}", i)));
        }

        let event = tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(event.is_load_for("a"));
    }

    #[tokio::test]
    async fn test_dropped_waiter_is_unsubscribed() {
        let bus = EventBus::default();
        {
            let waiter = bus.wait_for("ready", |e| e.name == "ready");
            tokio::pin!(waiter);
            assert!(futures::poll!(waiter.as_mut()).is_pending());
            assert_eq!(bus.subscriber_count(), 1);
        }

        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(PageEvent::named("ready")), 0);
    }
}
