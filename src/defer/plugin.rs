// SPDX-License-Identifier: MIT

//! Plugin root
//!
//! The one object created at install time. It owns the strategy registry,
//! the page event bus, the module table and the activation controller, and
//! exposes the page-facing API on top of them.

use crate::defer::activation::{ActivationController, ActivationOutcome, ActivationState, Component};
use crate::defer::config::{Options, PartialOptions};
use crate::defer::events::{EventBus, PageEvent};
use crate::defer::modules::{Alias, ModuleRegistry};
use crate::defer::registry::StrategyRegistry;
use crate::defer::strategies::create_strategies;
use crate::kit::error::DeferError;
use crate::kit::host::{ElementRef, HostRuntime};
use crate::kit::module::{ModuleFetcher, ModuleSource};
use crate::kit::platform::Platform;
use crate::kit::strategy::Strategy;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Builder for [`Plugin`]
pub struct PluginBuilder {
    host: Arc<dyn HostRuntime>,
    platform: Arc<dyn Platform>,
    options: Options,
    fetcher: Option<Arc<dyn ModuleFetcher>>,
    strategies: Vec<Arc<dyn Strategy>>,
    bus: EventBus,
}

impl PluginBuilder {
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ModuleFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Add a strategy; it replaces a built-in of the same name
    pub fn strategy(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Use an existing event bus instead of a fresh one
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub async fn build(self) -> Plugin {
        let registry = StrategyRegistry::new();
        for strategy in create_strategies(&self.bus, self.platform.clone()) {
            registry.register(strategy).await;
        }
        for strategy in self.strategies {
            log::info!("Registered strategy: {}", strategy.name());
            registry.register(strategy).await;
        }

        let modules = match self.fetcher {
            Some(fetcher) => ModuleRegistry::new().with_fetcher(fetcher),
            None => ModuleRegistry::new(),
        };

        let controller = ActivationController::new(
            self.host,
            registry.clone(),
            modules.clone(),
            self.options,
        );

        Plugin {
            registry,
            modules,
            bus: self.bus,
            controller: Arc::new(controller),
        }
    }
}

pub struct Plugin {
    registry: StrategyRegistry,
    modules: ModuleRegistry,
    bus: EventBus,
    controller: Arc<ActivationController>,
}

impl Plugin {
    pub fn builder(host: Arc<dyn HostRuntime>, platform: Arc<dyn Platform>) -> PluginBuilder {
        PluginBuilder {
            host,
            platform,
            options: Options::default(),
            fetcher: None,
            strategies: Vec::new(),
            bus: EventBus::default(),
        }
    }

    /// Merge option overrides
    pub fn options(&self, partial: PartialOptions) -> Result<(), DeferError> {
        self.controller.merge_options(partial)
    }

    pub fn current_options(&self) -> Options {
        self.controller.options()
    }

    /// Register a module source for a component name
    pub async fn data(&self, name: &str, source: Arc<dyn ModuleSource>) {
        self.modules.register(name, source).await;
    }

    /// Register a module URL for a component name
    pub async fn url(&self, name: &str, url: &str) -> Result<bool, DeferError> {
        let options = self.controller.options();
        self.modules.register_url(name, url, &options).await
    }

    pub async fn alias(&self, alias: Alias) {
        self.modules.set_alias(alias).await;
    }

    pub fn discover(&self, el: ElementRef) -> bool {
        self.controller.discover(el)
    }

    pub async fn activate(&self, el: ElementRef) -> Result<ActivationOutcome, DeferError> {
        self.controller.activate(el).await
    }

    /// Discover and activate `el`
    pub async fn handle(&self, el: ElementRef) -> Result<ActivationOutcome, DeferError> {
        self.controller.handle(el).await
    }

    /// Run [`Plugin::handle`] on its own task
    pub fn spawn(&self, el: ElementRef) -> JoinHandle<Result<ActivationOutcome, DeferError>> {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.handle(el).await })
    }

    /// Release components waiting on the load event for `id`
    pub fn load(&self, id: &str) -> usize {
        self.bus.publish(PageEvent::load(id))
    }

    /// Dispatch a named page event
    pub fn dispatch(&self, name: &str) -> usize {
        self.bus.publish(PageEvent::named(name))
    }

    pub fn state(&self, el: ElementRef) -> Option<ActivationState> {
        self.controller.state(el)
    }

    pub fn component(&self, el: ElementRef) -> Option<Component> {
        self.controller.component(el)
    }

    pub fn components(&self) -> Vec<Component> {
        self.controller.components()
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defer::simulation::{InMemoryHost, ScriptedPlatform};
    use crate::kit::error::StrategyError;
    use crate::kit::strategy::StrategyContext;
    use async_trait::async_trait;

    struct NeverStrategy;

    #[async_trait]
    impl Strategy for NeverStrategy {
        fn name(&self) -> &str {
            "idle"
        }

        async fn wait(&self, _ctx: &StrategyContext<'_>) -> Result<(), StrategyError> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_builtin_strategies_installed() {
        let plugin = Plugin::builder(
            Arc::new(InMemoryHost::new()),
            Arc::new(ScriptedPlatform::default()),
        )
        .build()
        .await;

        assert_eq!(
            plugin.strategies().names().await,
            vec!["eager", "event", "idle", "media", "visible"]
        );
    }

    #[tokio::test]
    async fn test_custom_strategy_replaces_builtin() {
        let host = Arc::new(InMemoryHost::new());
        let el = host.add_element(None, &[("x-load", "idle || eager")]);
        let plugin = Plugin::builder(host.clone(), Arc::new(ScriptedPlatform::default()))
            .strategy(Arc::new(NeverStrategy))
            .build()
            .await;

        assert_eq!(plugin.strategies().names().await.len(), 5);
        assert_eq!(plugin.handle(el).await.unwrap(), ActivationOutcome::Activated);
    }

    #[tokio::test]
    async fn test_options_merge_and_url() {
        let plugin = Plugin::builder(
            Arc::new(InMemoryHost::new()),
            Arc::new(ScriptedPlatform::default()),
        )
        .build()
        .await;

        plugin
            .options(PartialOptions {
                base_url: Some("https://example.com/js/".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(plugin.url("hero", "hero.js").await.unwrap());

        assert_eq!(
            plugin.modules().url("hero").await.as_deref(),
            Some("https://example.com/js/hero.js")
        );
        assert_eq!(plugin.current_options().default_strategy, "eager");
    }

    #[tokio::test]
    async fn test_load_event_releases_component() {
        let host = Arc::new(InMemoryHost::new());
        let el = host.add_element(None, &[("id", "hero"), ("x-load", "event")]);
        let plugin = Plugin::builder(host.clone(), Arc::new(ScriptedPlatform::default()))
            .build()
            .await;

        let task = plugin.spawn(el);
        while plugin.events().subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(plugin.state(el), Some(ActivationState::AwaitingRequirements));

        assert_eq!(plugin.load("hero"), 1);
        assert_eq!(task.await.unwrap().unwrap(), ActivationOutcome::Activated);
        assert!(host.is_initialized(el));
    }
}
