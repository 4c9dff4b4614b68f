// SPDX-License-Identifier: MIT

use crate::kit::strategy::Strategy;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Name-keyed table of strategies, shared by every component of a plugin
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Arc<RwLock<HashMap<String, Arc<dyn Strategy>>>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, strategy: Arc<dyn Strategy>) {
        let mut strategies = self.strategies.write().await;
        strategies.insert(strategy.name().to_string(), strategy);
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Strategy>> {
        let strategies = self.strategies.read().await;
        strategies.get(name).cloned()
    }

    /// Registered names, sorted
    pub async fn names(&self) -> Vec<String> {
        let strategies = self.strategies.read().await;
        let mut names: Vec<String> = strategies.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
