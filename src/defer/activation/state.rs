// SPDX-License-Identifier: MIT

use crate::kit::host::ElementRef;
use crate::kit::strategy::ComponentHandle;
use serde::Serialize;
use std::fmt;

/// Lifecycle of a deferred component. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// Seen by the host and marked inert
    Discovered,
    /// Requirements and module download in flight
    AwaitingRequirements,
    /// Handed back to the host for hydration
    Activated,
}

impl fmt::Display for ActivationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivationState::Discovered => "discovered",
            ActivationState::AwaitingRequirements => "awaiting_requirements",
            ActivationState::Activated => "activated",
        };
        f.write_str(label)
    }
}

/// Per-element record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub element: ElementRef,
    pub state: ActivationState,
    /// Set once activation starts
    pub id: Option<String>,
    pub name: Option<String>,
    pub requirement: Option<String>,
}

impl Component {
    pub fn discovered(element: ElementRef) -> Self {
        Self {
            element,
            state: ActivationState::Discovered,
            id: None,
            name: None,
            requirement: None,
        }
    }

    /// Handle passed to strategies, once the id is known
    pub fn handle(&self) -> Option<ComponentHandle> {
        self.id
            .as_ref()
            .map(|id| ComponentHandle::new(self.element, id.clone()))
    }
}

/// What a call to `activate` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// The host initialized the element
    Activated,
    /// Marker cleared but an inert ancestor will initialize the element later
    Nested,
    /// The element was unknown or already past discovery
    Skipped,
}

/// Name of the component declared by a data expression: the text before the
/// first `(` or `{`, trimmed
pub fn component_name(expression: &str) -> &str {
    let end = expression.find(['(', '{']).unwrap_or(expression.len());
    expression[..end].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("dropdown"), "dropdown");
        assert_eq!(component_name("dropdown({ open: true })"), "dropdown");
        assert_eq!(component_name(" tabs ({})"), "tabs");
        assert_eq!(component_name("{ count: 0 }"), "");
        assert_eq!(component_name(""), "");
    }

    #[test]
    fn test_states_are_ordered() {
        assert!(ActivationState::Discovered < ActivationState::AwaitingRequirements);
        assert!(ActivationState::AwaitingRequirements < ActivationState::Activated);
        assert_eq!(
            ActivationState::AwaitingRequirements.to_string(),
            "awaiting_requirements"
        );
    }

    #[test]
    fn test_handle_requires_id() {
        let mut component = Component::discovered(ElementRef(4));
        assert!(component.handle().is_none());

        component.id = Some("hero".to_string());
        assert_eq!(
            component.handle(),
            Some(ComponentHandle::new(ElementRef(4), "hero"))
        );
    }
}
