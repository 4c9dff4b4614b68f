// SPDX-License-Identifier: MIT

pub mod activation;
pub mod config;
pub mod events;
pub mod modules;
pub mod plugin;
pub mod registry;
pub mod requirement;
pub mod simulation;
pub mod strategies;
