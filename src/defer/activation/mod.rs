// SPDX-License-Identifier: MIT

//! Component activation state machine

mod controller;
mod state;

pub use controller::ActivationController;
pub use state::{component_name, ActivationOutcome, ActivationState, Component};
