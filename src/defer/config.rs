// SPDX-License-Identifier: MIT

//! Plugin options and YAML loading
//!
//! Options can be given in snake_case or in the camelCase spelling used by
//! page scripts (`defaultStrategy`, `keepRelativeURLs`, `baseURL`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::kit::error::DeferError;

/// Options recognized by the plugin
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    /// Requirement used when an element declares none
    #[serde(alias = "defaultStrategy")]
    pub default_strategy: String,
    /// Keep module URLs as written instead of resolving them against `base_url`
    #[serde(alias = "keepRelativeURLs")]
    pub keep_relative_urls: bool,
    /// Page base URL for resolving relative module URLs
    #[serde(alias = "baseURL")]
    pub base_url: Option<String>,
    /// Attribute prefix of the host framework
    pub prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_strategy: "eager".to_string(),
            keep_relative_urls: false,
            base_url: None,
            prefix: "x-".to_string(),
        }
    }
}

impl Options {
    /// Full attribute name for `name`, e.g. `x-load`
    pub fn attribute(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Overlay the fields set in `partial`; nothing changes when it is invalid
    pub fn merge(&mut self, partial: PartialOptions) -> Result<(), DeferError> {
        if let Some(default_strategy) = &partial.default_strategy {
            check_default_strategy(default_strategy)?;
        }

        if let Some(default_strategy) = partial.default_strategy {
            self.default_strategy = default_strategy;
        }
        if let Some(keep_relative_urls) = partial.keep_relative_urls {
            self.keep_relative_urls = keep_relative_urls;
        }
        if let Some(base_url) = partial.base_url {
            self.base_url = Some(base_url);
        }
        if let Some(prefix) = partial.prefix {
            self.prefix = prefix;
        }
        Ok(())
    }
}

fn check_default_strategy(default_strategy: &str) -> Result<(), DeferError> {
    if default_strategy.trim().is_empty() {
        return Err(DeferError::config("default_strategy must not be empty"));
    }
    Ok(())
}

/// A partial options update
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PartialOptions {
    #[serde(default, alias = "defaultStrategy")]
    pub default_strategy: Option<String>,
    #[serde(default, alias = "keepRelativeURLs")]
    pub keep_relative_urls: Option<bool>,
    #[serde(default, alias = "baseURL")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Loads options from YAML files
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load options from a YAML file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Options, DeferError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse options from a YAML string; missing fields keep their defaults
    pub fn parse_yaml(content: &str) -> Result<Options, DeferError> {
        let options: Options = serde_yaml::from_str(content)?;
        check_default_strategy(&options.default_strategy)?;
        Ok(options)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
