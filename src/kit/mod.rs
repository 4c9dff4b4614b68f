// SPDX-License-Identifier: MIT

//! Interfaces between the activation engine and its collaborators
//!
//! - `Strategy` - named asynchronous conditions
//! - `HostRuntime` - the component framework that owns the element tree
//! - `Platform` - the page environment used by built-in strategies
//! - `ModuleSource` / `ModuleFetcher` - component implementation loading

pub mod error;
pub mod host;
pub mod module;
pub mod platform;
pub mod strategy;

pub use error::{DeferError, ModuleError, ParseError, RequirementError, StrategyError};
pub use host::{ElementRef, HostRuntime};
pub use module::{ComponentData, Module, ModuleFetcher, ModuleSource, StaticModule};
pub use platform::Platform;
pub use strategy::{ComponentHandle, Strategy, StrategyContext};
