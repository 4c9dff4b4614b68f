// SPDX-License-Identifier: MIT

//! Host component framework interface
//!
//! The host owns the element tree and performs hydration. The activation
//! controller only ever talks to it through [`HostRuntime`].

use crate::kit::module::ComponentData;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef(pub u64);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations the host framework exposes to the activation controller.
///
/// All calls are synchronous; the host is expected to apply them immediately
/// so that an inert marker set during discovery is visible before the host's
/// own default hydration runs.
pub trait HostRuntime: Send + Sync {
    /// The author-assigned `id` of the element, if any
    fn element_id(&self, el: ElementRef) -> Option<String>;

    /// Read an attribute by its full (prefixed) name
    fn attribute(&self, el: ElementRef, name: &str) -> Option<String>;

    /// True while the host is cloning a tree; side effects must be skipped
    fn is_cloning(&self) -> bool {
        false
    }

    /// Set the inert marker so the host does not hydrate the element
    fn mark_inert(&self, el: ElementRef);

    /// Remove the inert marker
    fn clear_inert(&self, el: ElementRef);

    /// Whether the element itself carries the inert marker
    fn is_inert(&self, el: ElementRef) -> bool;

    /// Whether any ancestor of the element still carries the inert marker
    fn has_inert_ancestor(&self, el: ElementRef) -> bool;

    /// Tear down whatever the host may have attached to the subtree
    fn destroy_tree(&self, el: ElementRef);

    /// Initialize (hydrate) the subtree rooted at the element
    fn init_tree(&self, el: ElementRef);

    /// Make a downloaded component implementation available under `name`
    fn bind_data(&self, name: &str, data: ComponentData);
}
