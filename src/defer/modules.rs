// SPDX-License-Identifier: MIT

//! Component module table
//!
//! Maps component names to the module that implements them. A module is
//! either registered directly or by URL, in which case it is fetched through
//! the configured [`ModuleFetcher`]. Names nobody registered can be served
//! by an alias: a URL pattern with a `[name]` placeholder or a shared source.

use crate::defer::config::Options;
use crate::kit::error::{DeferError, ModuleError};
use crate::kit::host::HostRuntime;
use crate::kit::module::{Module, ModuleFetcher, ModuleSource};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

/// Prefix of the names given to components without a data expression
pub const ANONYMOUS_PREFIX: &str = "_deferred_";

/// Placeholder replaced by the component name in alias URL patterns
pub const NAME_PLACEHOLDER: &str = "[name]";

static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:[a-z+]+:)?//").expect("absolute url pattern is valid"));

/// Whether `name` was generated for an anonymous component
pub fn is_anonymous(name: &str) -> bool {
    name.starts_with(ANONYMOUS_PREFIX)
}

/// Fallback used for names that have no entry
#[derive(Clone)]
pub enum Alias {
    /// URL pattern, `[name]` is substituted
    Pattern(String),
    /// One source serving every unregistered name
    Source(Arc<dyn ModuleSource>),
}

#[derive(Clone)]
enum EntrySource {
    Direct(Arc<dyn ModuleSource>),
    Url(String),
}

struct ModuleEntry {
    loaded: bool,
    source: EntrySource,
}

#[derive(Clone)]
pub struct ModuleRegistry {
    entries: Arc<RwLock<HashMap<String, ModuleEntry>>>,
    alias: Arc<RwLock<Option<Alias>>>,
    fetcher: Option<Arc<dyn ModuleFetcher>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            alias: Arc::new(RwLock::new(None)),
            fetcher: None,
        }
    }

    /// Use `fetcher` for URL entries
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ModuleFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Register a module source for `name`, replacing any previous entry
    pub async fn register(&self, name: &str, source: Arc<dyn ModuleSource>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            name.to_string(),
            ModuleEntry {
                loaded: false,
                source: EntrySource::Direct(source),
            },
        );
    }

    /// Register a module URL for `name`.
    ///
    /// Returns `Ok(false)` without touching the table when either argument
    /// is empty or the name already has an entry.
    pub async fn register_url(&self, name: &str, url: &str, options: &Options) -> Result<bool, DeferError> {
        if name.is_empty() || url.is_empty() {
            return Ok(false);
        }

        let mut entries = self.entries.write().await;
        if entries.contains_key(name) {
            log::debug!("Module '{}' already registered, ignoring url {}", name, url);
            return Ok(false);
        }

        let url = if options.keep_relative_urls {
            url.to_string()
        } else {
            resolve_url(url, options.base_url.as_deref())?
        };

        log::debug!("Registered module '{}' at {}", name, url);
        entries.insert(
            name.to_string(),
            ModuleEntry {
                loaded: false,
                source: EntrySource::Url(url),
            },
        );
        Ok(true)
    }

    /// Install the alias used for names without an entry
    pub async fn set_alias(&self, alias: Alias) {
        *self.alias.write().await = Some(alias);
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.entries.read().await.contains_key(name)
    }

    pub async fn is_loaded(&self, name: &str) -> bool {
        self.entries
            .read()
            .await
            .get(name)
            .map(|entry| entry.loaded)
            .unwrap_or(false)
    }

    /// The URL an entry will be fetched from, if it is a URL entry
    pub async fn url(&self, name: &str) -> Option<String> {
        match self.entries.read().await.get(name) {
            Some(ModuleEntry {
                source: EntrySource::Url(url),
                ..
            }) => Some(url.clone()),
            _ => None,
        }
    }

    /// Download the module for `name` and bind it on the host.
    ///
    /// Returns `Ok(true)` when a module was downloaded by this call and
    /// `Ok(false)` when there was nothing to do (anonymous component, no
    /// entry, or already loaded).
    pub async fn download(&self, name: &str, options: &Options, host: &dyn HostRuntime) -> Result<bool, DeferError> {
        if is_anonymous(name) {
            return Ok(false);
        }

        self.apply_alias(name, options).await?;

        let source = {
            let entries = self.entries.read().await;
            match entries.get(name) {
                Some(entry) if !entry.loaded => entry.source.clone(),
                Some(_) => return Ok(false),
                None => {
                    log::debug!("No module registered for '{}'", name);
                    return Ok(false);
                }
            }
        };

        let module = match source {
            EntrySource::Direct(source) => source.load(name).await?,
            EntrySource::Url(url) => {
                let fetcher = self.fetcher.as_ref().ok_or_else(|| {
                    ModuleError::fetch(name, url.as_str(), "no module fetcher configured")
                })?;
                // Fetchers only know the URL; attach the component name
                fetcher.fetch(&url).await.map_err(|e| match e {
                    ModuleError::Fetch { url, message, .. } => ModuleError::fetch(name, url, message),
                    other => other,
                })?
            }
        };

        self.bind(name, module, host);

        if let Some(entry) = self.entries.write().await.get_mut(name) {
            entry.loaded = true;
        }
        log::info!("Module '{}' loaded", name);
        Ok(true)
    }

    async fn apply_alias(&self, name: &str, options: &Options) -> Result<(), DeferError> {
        let Some(alias) = self.alias.read().await.clone() else {
            return Ok(());
        };
        if self.is_registered(name).await {
            return Ok(());
        }

        match alias {
            Alias::Source(source) => self.register(name, source).await,
            Alias::Pattern(pattern) => {
                let url = pattern.replace(NAME_PLACEHOLDER, name);
                self.register_url(name, &url, options).await?;
            }
        }
        Ok(())
    }

    fn bind(&self, name: &str, module: Module, host: &dyn HostRuntime) {
        match module.select(name) {
            Some(data) => host.bind_data(name, data),
            None => log::warn!("{}", ModuleError::NoExport(name.to_string())),
        }
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `url` against `base_url` unless it is already absolute
pub fn resolve_url(url: &str, base_url: Option<&str>) -> Result<String, ModuleError> {
    if ABSOLUTE_URL.is_match(url) {
        return Ok(url.to_string());
    }

    let Some(base_url) = base_url else {
        log::debug!("No base url configured, keeping '{}' as is", url);
        return Ok(url.to_string());
    };

    let invalid = |source| ModuleError::InvalidUrl {
        url: url.to_string(),
        source,
    };
    let base = Url::parse(base_url).map_err(invalid)?;
    let resolved = base.join(url).map_err(invalid)?;
    Ok(resolved.to_string())
}
