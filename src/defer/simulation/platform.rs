// SPDX-License-Identifier: MIT

use crate::kit::host::ElementRef;
use crate::kit::platform::Platform;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::watch;

/// Page environment driven by explicit calls.
///
/// Visibility, matching media queries and idle periods change only when
/// `set_visible`, `set_media` and `trigger_idle` are called.
pub struct ScriptedPlatform {
    idle_callback: bool,
    visible: watch::Sender<HashSet<ElementRef>>,
    media: watch::Sender<HashSet<String>>,
    idle: watch::Sender<u64>,
}

impl ScriptedPlatform {
    /// `idle_callback` decides whether the idle strategy gets native idle
    /// periods or falls back to its timer
    pub fn new(idle_callback: bool) -> Self {
        Self {
            idle_callback,
            visible: watch::Sender::new(HashSet::new()),
            media: watch::Sender::new(HashSet::new()),
            idle: watch::Sender::new(0),
        }
    }

    pub fn set_visible(&self, el: ElementRef, visible: bool) {
        self.visible.send_modify(|elements| {
            if visible {
                elements.insert(el);
            } else {
                elements.remove(&el);
            }
        });
    }

    /// `query` is compared verbatim, parentheses included
    pub fn set_media(&self, query: &str, matches: bool) {
        self.media.send_modify(|queries| {
            if matches {
                queries.insert(query.to_string());
            } else {
                queries.remove(query);
            }
        });
    }

    /// Start an idle period, releasing everyone waiting for one
    pub fn trigger_idle(&self) {
        self.idle.send_modify(|ticks| *ticks += 1);
    }
}

impl Default for ScriptedPlatform {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Platform for ScriptedPlatform {
    fn supports_idle_callback(&self) -> bool {
        self.idle_callback
    }

    async fn idle(&self) {
        let mut ticks = self.idle.subscribe();
        let _ = ticks.changed().await;
    }

    fn media_matches(&self, query: &str) -> bool {
        self.media.borrow().contains(query)
    }

    async fn media_change(&self, query: &str) {
        let mut queries = self.media.subscribe();
        loop {
            if queries.borrow_and_update().contains(query) {
                return;
            }
            if queries.changed().await.is_err() {
                return;
            }
        }
    }

    async fn intersection(&self, el: ElementRef, root_margin: &str) {
        log::debug!("Observing {} with root margin '{}'", el, root_margin);
        let mut visible = self.visible.subscribe();
        loop {
            if visible.borrow_and_update().contains(&el) {
                return;
            }
            if visible.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_intersection_waits_for_visibility() {
        let platform = Arc::new(ScriptedPlatform::default());
        let el = ElementRef(7);

        let waiter = {
            let platform = platform.clone();
            tokio::spawn(async move { platform.intersection(el, "0px").await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        platform.set_visible(ElementRef(8), true);
        platform.set_visible(el, true);

        timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_already_visible_resolves() {
        let platform = ScriptedPlatform::default();
        platform.set_visible(ElementRef(1), true);

        timeout(Duration::from_secs(1), platform.intersection(ElementRef(1), "0px"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_media_queries() {
        let platform = Arc::new(ScriptedPlatform::default());
        assert!(!platform.media_matches("(min-width: 600px)"));

        let waiter = {
            let platform = platform.clone();
            tokio::spawn(async move { platform.media_change("(min-width: 600px)").await })
        };
        tokio::task::yield_now().await;

        platform.set_media("(min-width: 600px)", true);
        timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(platform.media_matches("(min-width: 600px)"));

        platform.set_media("(min-width: 600px)", false);
        assert!(!platform.media_matches("(min-width: 600px)"));
    }

    #[tokio::test]
    async fn test_idle_waits_for_next_period() {
        let platform = Arc::new(ScriptedPlatform::new(true));
        platform.trigger_idle();

        let waiter = {
            let platform = platform.clone();
            tokio::spawn(async move { platform.idle().await })
        };
        while platform.idle.receiver_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!waiter.is_finished());

        platform.trigger_idle();
        timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }
}
