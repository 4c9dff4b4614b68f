// SPDX-License-Identifier: MIT

//! Activation controller
//!
//! Drives each deferred element through `Discovered -> AwaitingRequirements
//! -> Activated`. Discovery is synchronous so the inert marker is in place
//! before the host's own hydration pass; everything after it is async.

use super::state::{component_name, ActivationOutcome, ActivationState, Component};
use crate::defer::config::{Options, PartialOptions};
use crate::defer::modules::{ModuleRegistry, ANONYMOUS_PREFIX};
use crate::defer::registry::StrategyRegistry;
use crate::defer::requirement::await_requirements;
use crate::kit::error::DeferError;
use crate::kit::host::{ElementRef, HostRuntime};
use crate::kit::strategy::ComponentHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

pub struct ActivationController {
    host: Arc<dyn HostRuntime>,
    strategies: StrategyRegistry,
    modules: ModuleRegistry,
    options: RwLock<Options>,
    /// Shared by generated ids and anonymous names
    counter: AtomicUsize,
    components: Mutex<HashMap<ElementRef, Component>>,
}

impl ActivationController {
    pub fn new(
        host: Arc<dyn HostRuntime>,
        strategies: StrategyRegistry,
        modules: ModuleRegistry,
        options: Options,
    ) -> Self {
        Self {
            host,
            strategies,
            modules,
            options: RwLock::new(options),
            counter: AtomicUsize::new(0),
            components: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of the current options
    pub fn options(&self) -> Options {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn merge_options(&self, partial: PartialOptions) -> Result<(), DeferError> {
        self.options
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(partial)
    }

    /// Record the element and mark it inert.
    ///
    /// Returns false when nothing was done: the host is cloning or the
    /// element is already known.
    pub fn discover(&self, el: ElementRef) -> bool {
        if self.host.is_cloning() {
            return false;
        }

        {
            let mut components = self.table();
            if components.contains_key(&el) {
                return false;
            }
            components.insert(el, Component::discovered(el));
        }

        self.host.mark_inert(el);
        log::debug!("Discovered deferred element {}", el);
        true
    }

    /// Wait for the element's requirement and module, then hand it back to
    /// the host.
    ///
    /// Only an element in `Discovered` is processed; any other call returns
    /// `Skipped`, as is any call made while the host is cloning. On error the
    /// element stays inert in `AwaitingRequirements`.
    pub async fn activate(&self, el: ElementRef) -> Result<ActivationOutcome, DeferError> {
        if self.host.is_cloning() || !self.claim(el) {
            return Ok(ActivationOutcome::Skipped);
        }

        let options = self.options();
        let name = self.component_name(el, &options);
        let requirement = self
            .host
            .attribute(el, &options.attribute("load"))
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| options.default_strategy.clone());

        if let Some(src) = self.host.attribute(el, &options.attribute("load-src")) {
            self.modules.register_url(&name, &src, &options).await?;
        }

        let id = self
            .host
            .element_id(el)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.next_index().to_string());

        if let Some(component) = self.table().get_mut(&el) {
            component.id = Some(id.clone());
            component.name = Some(name.clone());
            component.requirement = Some(requirement.clone());
        }

        log::info!(
            "Component '{}' ({}) awaiting '{}'",
            name,
            id,
            requirement
        );

        let handle = ComponentHandle::new(el, id.clone());
        let result = futures::try_join!(
            await_requirements(&requirement, &handle, &self.strategies),
            self.modules.download(&name, &options, self.host.as_ref()),
        );
        if let Err(e) = result {
            log::error!("Component '{}' ({}) was not activated: {}", name, id, e);
            return Err(e);
        }

        self.host.destroy_tree(el);
        self.host.clear_inert(el);
        self.set_state(el, ActivationState::Activated);

        if self.host.has_inert_ancestor(el) {
            log::info!(
                "Component '{}' ({}) ready, waiting on an inert ancestor",
                name,
                id
            );
            return Ok(ActivationOutcome::Nested);
        }

        self.host.init_tree(el);
        log::info!("Component '{}' ({}) activated", name, id);
        Ok(ActivationOutcome::Activated)
    }

    /// Discover then activate, as the directive does
    pub async fn handle(&self, el: ElementRef) -> Result<ActivationOutcome, DeferError> {
        self.discover(el);
        self.activate(el).await
    }

    pub fn state(&self, el: ElementRef) -> Option<ActivationState> {
        self.table().get(&el).map(|c| c.state)
    }

    pub fn component(&self, el: ElementRef) -> Option<Component> {
        self.table().get(&el).cloned()
    }

    /// Every known component, in element order
    pub fn components(&self) -> Vec<Component> {
        let mut components: Vec<Component> = self.table().values().cloned().collect();
        components.sort_by_key(|c| c.element);
        components
    }

    fn table(&self) -> MutexGuard<'_, HashMap<ElementRef, Component>> {
        self.components.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move a discovered element to `AwaitingRequirements`
    fn claim(&self, el: ElementRef) -> bool {
        match self.table().get_mut(&el) {
            Some(component) if component.state == ActivationState::Discovered => {
                component.state = ActivationState::AwaitingRequirements;
                true
            }
            Some(component) => {
                log::debug!("Element {} already {}", el, component.state);
                false
            }
            None => {
                log::debug!("Element {} was never discovered", el);
                false
            }
        }
    }

    fn set_state(&self, el: ElementRef, state: ActivationState) {
        if let Some(component) = self.table().get_mut(&el) {
            component.state = state;
        }
    }

    fn component_name(&self, el: ElementRef, options: &Options) -> String {
        let expression = self
            .host
            .attribute(el, &options.attribute("data"))
            .unwrap_or_default();
        match component_name(&expression) {
            "" => format!("{}{}", ANONYMOUS_PREFIX, self.next_index()),
            name => name.to_string(),
        }
    }

    fn next_index(&self) -> usize {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }
}
