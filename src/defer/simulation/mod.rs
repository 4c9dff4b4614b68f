// SPDX-License-Identifier: MIT

//! In-memory host and platform plus the YAML scenario runner built on them

mod host;
mod platform;
mod scenario;

pub use host::{HostOp, InMemoryHost};
pub use platform::ScriptedPlatform;
pub use scenario::{
    ComponentReport, ElementDef, ModuleDef, NamedExport, PlatformSetup, Scenario,
    ScenarioFetcher, ScenarioReport, Step,
};
