// SPDX-License-Identifier: MIT

use crate::kit::host::{ElementRef, HostRuntime};
use crate::kit::module::ComponentData;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Tree operation performed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostOp {
    Destroyed(ElementRef),
    Initialized(ElementRef),
}

#[derive(Debug, Default)]
struct Element {
    parent: Option<ElementRef>,
    attributes: HashMap<String, String>,
    inert: bool,
    initialized: bool,
}

#[derive(Debug, Default)]
struct Document {
    elements: BTreeMap<ElementRef, Element>,
    next: u64,
    journal: Vec<HostOp>,
    bindings: Vec<(String, ComponentData)>,
}

/// Element tree kept in memory.
///
/// Initializing a subtree skips every branch rooted at an inert element,
/// the way a framework skips ignored markup.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    document: Mutex<Document>,
    cloning: AtomicBool,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element; the `id` attribute becomes its element id
    pub fn add_element(&self, parent: Option<ElementRef>, attributes: &[(&str, &str)]) -> ElementRef {
        let mut document = self.document();
        let el = ElementRef(document.next);
        document.next += 1;
        document.elements.insert(
            el,
            Element {
                parent,
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ..Default::default()
            },
        );
        el
    }

    pub fn set_cloning(&self, cloning: bool) {
        self.cloning.store(cloning, Ordering::SeqCst);
    }

    /// Elements without a parent, in insertion order
    pub fn roots(&self) -> Vec<ElementRef> {
        self.document()
            .elements
            .iter()
            .filter(|(_, e)| e.parent.is_none())
            .map(|(el, _)| *el)
            .collect()
    }

    pub fn is_initialized(&self, el: ElementRef) -> bool {
        self.document()
            .elements
            .get(&el)
            .map(|e| e.initialized)
            .unwrap_or(false)
    }

    pub fn journal(&self) -> Vec<HostOp> {
        self.document().journal.clone()
    }

    /// Every `bind_data` call, in order
    pub fn bindings(&self) -> Vec<(String, ComponentData)> {
        self.document().bindings.clone()
    }

    /// Latest data bound under `name`
    pub fn binding(&self, name: &str) -> Option<ComponentData> {
        self.document()
            .bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, data)| data.clone())
    }

    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document {
    fn children(&self, el: ElementRef) -> Vec<ElementRef> {
        self.elements
            .iter()
            .filter(|(_, e)| e.parent == Some(el))
            .map(|(child, _)| *child)
            .collect()
    }

    /// Walk the subtree rooted at `el`, not descending below elements for
    /// which `prune` is true
    fn walk<F>(&self, el: ElementRef, prune: &F) -> Vec<ElementRef>
    where
        F: Fn(&Element) -> bool,
    {
        let mut visited = Vec::new();
        let mut stack = vec![el];
        while let Some(current) = stack.pop() {
            let Some(element) = self.elements.get(&current) else {
                continue;
            };
            if prune(element) {
                continue;
            }
            visited.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        visited
    }
}

impl HostRuntime for InMemoryHost {
    fn element_id(&self, el: ElementRef) -> Option<String> {
        self.attribute(el, "id").filter(|id| !id.is_empty())
    }

    fn attribute(&self, el: ElementRef, name: &str) -> Option<String> {
        self.document()
            .elements
            .get(&el)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    fn is_cloning(&self) -> bool {
        self.cloning.load(Ordering::SeqCst)
    }

    fn mark_inert(&self, el: ElementRef) {
        if let Some(element) = self.document().elements.get_mut(&el) {
            element.inert = true;
        }
    }

    fn clear_inert(&self, el: ElementRef) {
        if let Some(element) = self.document().elements.get_mut(&el) {
            element.inert = false;
        }
    }

    fn is_inert(&self, el: ElementRef) -> bool {
        self.document()
            .elements
            .get(&el)
            .map(|e| e.inert)
            .unwrap_or(false)
    }

    fn has_inert_ancestor(&self, el: ElementRef) -> bool {
        let document = self.document();
        let mut parent = document.elements.get(&el).and_then(|e| e.parent);
        while let Some(current) = parent {
            match document.elements.get(&current) {
                Some(element) if element.inert => return true,
                Some(element) => parent = element.parent,
                None => break,
            }
        }
        false
    }

    fn destroy_tree(&self, el: ElementRef) {
        let mut document = self.document();
        for visited in document.walk(el, &|_| false) {
            if let Some(element) = document.elements.get_mut(&visited) {
                element.initialized = false;
            }
        }
        document.journal.push(HostOp::Destroyed(el));
    }

    fn init_tree(&self, el: ElementRef) {
        let mut document = self.document();
        if document.elements.get(&el).map(|e| e.inert).unwrap_or(false) {
            return;
        }
        for visited in document.walk(el, &|e: &Element| e.inert) {
            if let Some(element) = document.elements.get_mut(&visited) {
                element.initialized = true;
            }
        }
        document.journal.push(HostOp::Initialized(el));
    }

    fn bind_data(&self, name: &str, data: ComponentData) {
        log::debug!("Binding data for '{}'", name);
        self.document().bindings.push((name.to_string(), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_id_from_attribute() {
        let host = InMemoryHost::new();
        let with_id = host.add_element(None, &[("id", "hero")]);
        let blank = host.add_element(None, &[("id", "")]);

        assert_eq!(host.element_id(with_id).as_deref(), Some("hero"));
        assert_eq!(host.element_id(blank), None);
        assert_eq!(host.attribute(with_id, "x-load"), None);
    }

    #[test]
    fn test_init_tree_skips_inert_branches() {
        let host = InMemoryHost::new();
        let root = host.add_element(None, &[("x-data", "page")]);
        let deferred = host.add_element(Some(root), &[("x-load", "")]);
        let inside = host.add_element(Some(deferred), &[]);
        let sibling = host.add_element(Some(root), &[]);

        host.mark_inert(deferred);
        host.init_tree(root);

        assert!(host.is_initialized(root));
        assert!(host.is_initialized(sibling));
        assert!(!host.is_initialized(deferred));
        assert!(!host.is_initialized(inside));
        assert!(host.has_inert_ancestor(inside));
        assert!(!host.has_inert_ancestor(deferred));
    }

    #[test]
    fn test_destroy_tree_resets_subtree() {
        let host = InMemoryHost::new();
        let root = host.add_element(None, &[]);
        let child = host.add_element(Some(root), &[]);

        host.init_tree(root);
        host.destroy_tree(root);

        assert!(!host.is_initialized(child));
        assert_eq!(
            host.journal(),
            vec![HostOp::Initialized(root), HostOp::Destroyed(root)]
        );
    }

    #[test]
    fn test_latest_binding_wins() {
        let host = InMemoryHost::new();
        host.bind_data("menu", json!(1));
        host.bind_data("menu", json!(2));

        assert_eq!(host.binding("menu"), Some(json!(2)));
        assert_eq!(host.bindings().len(), 2);
        assert_eq!(host.roots(), vec![]);
    }
}
