// SPDX-License-Identifier: MIT

//! Component implementation modules and the traits that produce them

use crate::kit::error::ModuleError;
use async_trait::async_trait;
use serde_json::Value;

/// The implementation handed to the host for data binding.
pub type ComponentData = Value;

/// A downloaded module
#[derive(Debug, Clone, PartialEq)]
pub enum Module {
    /// The module is the implementation itself
    Component(ComponentData),
    /// Named exports in declaration order
    Exports(Vec<(String, ComponentData)>),
}

impl Module {
    /// Pick the implementation to bind for component `name`.
    ///
    /// A bare component is used as is. Otherwise the export named after the
    /// component wins, then `default`, then the first export.
    pub fn select(self, name: &str) -> Option<ComponentData> {
        match self {
            Module::Component(data) => Some(data),
            Module::Exports(exports) => {
                let position = exports
                    .iter()
                    .position(|(key, _)| key == name)
                    .or_else(|| exports.iter().position(|(key, _)| key == "default"))
                    .or_else(|| (!exports.is_empty()).then_some(0))?;
                exports.into_iter().nth(position).map(|(_, data)| data)
            }
        }
    }
}

/// A directly registered module producer
#[async_trait]
pub trait ModuleSource: Send + Sync {
    /// Produce the module for component `name`
    async fn load(&self, name: &str) -> Result<Module, ModuleError>;
}

/// Fetches modules by URL (the dynamic import of the page)
#[async_trait]
pub trait ModuleFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Module, ModuleError>;
}

/// A module that is already in memory
#[derive(Debug, Clone)]
pub struct StaticModule(pub Module);

#[async_trait]
impl ModuleSource for StaticModule {
    async fn load(&self, _name: &str) -> Result<Module, ModuleError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exports(pairs: &[(&str, Value)]) -> Module {
        Module::Exports(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_select_component() {
        let module = Module::Component(json!({"open": false}));
        assert_eq!(module.select("dropdown"), Some(json!({"open": false})));
    }

    #[test]
    fn test_select_prefers_named_export() {
        let module = exports(&[
            ("default", json!("default")),
            ("dropdown", json!("named")),
        ]);
        assert_eq!(module.select("dropdown"), Some(json!("named")));
    }

    #[test]
    fn test_select_falls_back_to_default_then_first() {
        let module = exports(&[("other", json!(1)), ("default", json!(2))]);
        assert_eq!(module.select("dropdown"), Some(json!(2)));

        let module = exports(&[("other", json!(1)), ("more", json!(2))]);
        assert_eq!(module.select("dropdown"), Some(json!(1)));

        assert_eq!(exports(&[]).select("dropdown"), None);
    }

    #[tokio::test]
    async fn test_static_module_source() {
        let source = StaticModule(Module::Component(json!({"count": 0})));
        let module = source.load("counter").await.unwrap();
        assert_eq!(module, Module::Component(json!({"count": 0})));
    }
}
