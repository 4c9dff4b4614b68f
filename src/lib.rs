// SPDX-License-Identifier: MIT

//! Deferred component activation
//!
//! Elements declare a requirement expression such as `visible && idle`; the
//! plugin keeps them inert until the requirement holds and their module has
//! been downloaded, then hands them back to the host framework.

pub mod defer;
pub mod kit;

pub use defer::plugin::{Plugin, PluginBuilder};
pub use kit::error::DeferError;
