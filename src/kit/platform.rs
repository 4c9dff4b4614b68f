// SPDX-License-Identifier: MIT

//! Page environment used by the built-in strategies
//!
//! Stands in for the browser window: idle callbacks, media queries and
//! viewport intersection.

use crate::kit::host::ElementRef;
use async_trait::async_trait;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Whether a native idle callback is available
    fn supports_idle_callback(&self) -> bool;

    /// Resolves at the next idle period; only called when supported
    async fn idle(&self);

    /// Whether the media query currently matches
    fn media_matches(&self, query: &str) -> bool;

    /// Resolves on the next change notification for the media query
    async fn media_change(&self, query: &str);

    /// Resolves the first time the element intersects the viewport,
    /// grown or shrunk by `root_margin` (CSS margin syntax)
    async fn intersection(&self, el: ElementRef, root_margin: &str);
}
