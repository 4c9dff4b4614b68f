// SPDX-License-Identifier: MIT

//! YAML scenarios
//!
//! A scenario describes a page (elements, registered modules, served URLs,
//! initial platform state) and a timeline of platform changes and events.
//! Running it installs a [`Plugin`] on an [`InMemoryHost`], lets every
//! deferred element go through activation and reports where each one ended
//! up.

use super::host::{HostOp, InMemoryHost};
use super::platform::ScriptedPlatform;
use crate::defer::activation::{ActivationOutcome, ActivationState};
use crate::defer::config::Options;
use crate::defer::modules::Alias;
use crate::defer::plugin::Plugin;
use crate::kit::error::{DeferError, ModuleError};
use crate::kit::host::{ElementRef, HostRuntime};
use crate::kit::module::{ComponentData, Module, ModuleFetcher, StaticModule};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Pause before each timeline step so spawned activations reach their
/// await points
const STEP_GAP: Duration = Duration::from_millis(5);

fn default_true() -> bool {
    true
}

fn default_settle_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub platform: PlatformSetup,
    /// Modules registered directly, by component name
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleDef>,
    /// Module URLs registered up front, by component name
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
    /// What the fetcher answers, by URL
    #[serde(default)]
    pub served: BTreeMap<String, ModuleDef>,
    /// URL pattern for unregistered names
    pub alias: Option<String>,
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub timeline: Vec<Step>,
    /// How long to wait after the last step before reporting
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformSetup {
    #[serde(default = "default_true")]
    pub idle_callback: bool,
    /// Media queries matching from the start
    #[serde(default)]
    pub media: Vec<String>,
    /// Element keys visible from the start
    #[serde(default)]
    pub visible: Vec<String>,
}

impl Default for PlatformSetup {
    fn default() -> Self {
        Self {
            idle_callback: true,
            media: Vec::new(),
            visible: Vec::new(),
        }
    }
}

/// One element of the page. An element is deferred when `load` is present,
/// even as an empty string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElementDef {
    pub key: String,
    pub parent: Option<String>,
    pub id: Option<String>,
    /// Data expression, e.g. `dropdown({ open: false })`
    pub data: Option<String>,
    /// Requirement expression
    pub load: Option<String>,
    /// Module URL
    pub src: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamedExport {
    pub name: String,
    pub data: ComponentData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ModuleDef {
    Exports { exports: Vec<NamedExport> },
    Component(ComponentData),
}

impl ModuleDef {
    pub fn to_module(&self) -> Module {
        match self {
            ModuleDef::Exports { exports } => Module::Exports(
                exports
                    .iter()
                    .map(|export| (export.name.clone(), export.data.clone()))
                    .collect(),
            ),
            ModuleDef::Component(data) => Module::Component(data.clone()),
        }
    }
}

/// A timeline step; the key present selects the kind
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Step {
    Wait {
        wait_ms: u64,
    },
    Visible {
        visible: String,
    },
    Hidden {
        hidden: String,
    },
    Media {
        media: String,
        #[serde(default = "default_true")]
        matches: bool,
    },
    Idle {
        idle: bool,
    },
    Event {
        event: String,
    },
    Load {
        load: String,
    },
}

/// Final state of one deferred element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    pub element: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<ActivationState>,
    /// None while still pending or after an error
    pub outcome: Option<ActivationOutcome>,
    pub error: Option<String>,
    pub inert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub components: Vec<ComponentReport>,
    /// Keys of every initialized element, in document order
    pub initialized: Vec<String>,
    /// Host tree operations, e.g. `init hero`
    pub journal: Vec<String>,
    pub bindings: BTreeMap<String, ComponentData>,
    pub fetched: Vec<String>,
}

impl ScenarioReport {
    pub fn component(&self, key: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.element == key)
    }
}

/// Serves modules from the scenario's `served` table
pub struct ScenarioFetcher {
    served: HashMap<String, Module>,
    fetched: Mutex<Vec<String>>,
}

impl ScenarioFetcher {
    pub fn new(served: HashMap<String, Module>) -> Self {
        Self {
            served,
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ModuleFetcher for ScenarioFetcher {
    async fn fetch(&self, url: &str) -> Result<Module, ModuleError> {
        self.fetched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        self.served
            .get(url)
            .cloned()
            .ok_or_else(|| ModuleError::fetch("", url, "not served"))
    }
}

/// Element keys and refs of a built page
struct Page {
    refs: HashMap<String, ElementRef>,
    keys: HashMap<ElementRef, String>,
    /// Deferred elements, in document order
    deferred: Vec<(String, ElementRef)>,
}

impl Page {
    fn element(&self, key: &str) -> Result<ElementRef, DeferError> {
        self.refs
            .get(key)
            .copied()
            .ok_or_else(|| DeferError::config(format!("unknown element '{}'", key)))
    }

    fn key(&self, el: ElementRef) -> String {
        self.keys.get(&el).cloned().unwrap_or_else(|| el.to_string())
    }
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DeferError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    pub fn parse_yaml(content: &str) -> Result<Self, DeferError> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        if scenario.elements.is_empty() {
            return Err(DeferError::config("scenario has no elements"));
        }
        Ok(scenario)
    }

    /// Run the scenario to completion
    pub async fn run(&self) -> Result<ScenarioReport, DeferError> {
        log::info!("Running scenario '{}'", self.name);

        let host = Arc::new(InMemoryHost::new());
        let page = self.build_page(&host)?;

        let platform = Arc::new(ScriptedPlatform::new(self.platform.idle_callback));
        for query in &self.platform.media {
            platform.set_media(query, true);
        }
        for key in &self.platform.visible {
            platform.set_visible(page.element(key)?, true);
        }

        let served = self
            .served
            .iter()
            .map(|(url, def)| (url.clone(), def.to_module()))
            .collect();
        let fetcher = Arc::new(ScenarioFetcher::new(served));

        let plugin = Plugin::builder(host.clone(), platform.clone())
            .options(self.options.clone())
            .fetcher(fetcher.clone())
            .build()
            .await;

        for (name, def) in &self.modules {
            plugin.data(name, Arc::new(StaticModule(def.to_module()))).await;
        }
        for (name, url) in &self.urls {
            plugin.url(name, url).await?;
        }
        if let Some(pattern) = &self.alias {
            plugin.alias(Alias::Pattern(pattern.clone())).await;
        }

        // Mark deferred elements before the host hydrates the page
        for (_, el) in &page.deferred {
            plugin.discover(*el);
        }
        for root in host.roots() {
            host.init_tree(root);
        }

        let tasks: Vec<_> = page
            .deferred
            .iter()
            .map(|(key, el)| (key.clone(), *el, plugin.spawn(*el)))
            .collect();

        for step in &self.timeline {
            tokio::time::sleep(STEP_GAP).await;
            self.apply(step, &page, &plugin, &platform).await?;
        }
        tokio::time::sleep(Duration::from_millis(self.settle_ms)).await;

        let mut components = Vec::with_capacity(tasks.len());
        for (key, el, task) in tasks {
            let (outcome, error) = if task.is_finished() {
                match task.await {
                    Ok(Ok(outcome)) => (Some(outcome), None),
                    Ok(Err(e)) => (None, Some(e.to_string())),
                    Err(e) => (None, Some(e.to_string())),
                }
            } else {
                task.abort();
                (None, None)
            };

            let component = plugin.component(el);
            components.push(ComponentReport {
                element: key,
                id: component.as_ref().and_then(|c| c.id.clone()),
                name: component.as_ref().and_then(|c| c.name.clone()),
                state: component.map(|c| c.state),
                outcome,
                error,
                inert: host.is_inert(el),
            });
        }

        let mut initialized: Vec<ElementRef> = page
            .refs
            .values()
            .copied()
            .filter(|el| host.is_initialized(*el))
            .collect();
        initialized.sort();

        let journal = host
            .journal()
            .into_iter()
            .map(|op| match op {
                HostOp::Destroyed(el) => format!("destroy {}", page.key(el)),
                HostOp::Initialized(el) => format!("init {}", page.key(el)),
            })
            .collect();

        Ok(ScenarioReport {
            name: self.name.clone(),
            components,
            initialized: initialized.into_iter().map(|el| page.key(el)).collect(),
            journal,
            bindings: host.bindings().into_iter().collect(),
            fetched: fetcher.fetched(),
        })
    }

    fn build_page(&self, host: &InMemoryHost) -> Result<Page, DeferError> {
        let mut page = Page {
            refs: HashMap::new(),
            keys: HashMap::new(),
            deferred: Vec::new(),
        };

        for def in &self.elements {
            if page.refs.contains_key(&def.key) {
                return Err(DeferError::config(format!(
                    "duplicate element key '{}'",
                    def.key
                )));
            }
            let parent = match &def.parent {
                Some(parent) => Some(page.refs.get(parent).copied().ok_or_else(|| {
                    DeferError::config(format!(
                        "element '{}' refers to unknown parent '{}'",
                        def.key, parent
                    ))
                })?),
                None => None,
            };

            let attributes: Vec<(String, String)> = [
                ("id".to_string(), def.id.clone()),
                (self.options.attribute("data"), def.data.clone()),
                (self.options.attribute("load"), def.load.clone()),
                (self.options.attribute("load-src"), def.src.clone()),
            ]
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| (name, value)))
            .collect();
            let attributes: Vec<(&str, &str)> = attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();

            let el = host.add_element(parent, &attributes);
            page.refs.insert(def.key.clone(), el);
            page.keys.insert(el, def.key.clone());
            if def.load.is_some() {
                page.deferred.push((def.key.clone(), el));
            }
        }

        Ok(page)
    }

    async fn apply(
        &self,
        step: &Step,
        page: &Page,
        plugin: &Plugin,
        platform: &ScriptedPlatform,
    ) -> Result<(), DeferError> {
        log::debug!("Timeline step: {:?}", step);
        match step {
            Step::Wait { wait_ms } => tokio::time::sleep(Duration::from_millis(*wait_ms)).await,
            Step::Visible { visible } => platform.set_visible(page.element(visible)?, true),
            Step::Hidden { hidden } => platform.set_visible(page.element(hidden)?, false),
            Step::Media { media, matches } => platform.set_media(media, *matches),
            Step::Idle { idle } => {
                if *idle {
                    platform.trigger_idle();
                }
            }
            Step::Event { event } => {
                plugin.dispatch(event);
            }
            Step::Load { load } => {
                plugin.load(load);
            }
        }
        Ok(())
    }
}
