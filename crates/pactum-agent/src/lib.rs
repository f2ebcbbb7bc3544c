//! Pactum agent — the controller loop, the specialist loops and their tools.
//!
//! - [`controller::ControllerLoop`] — management conversation and handoff FSM
//! - [`specialist::SpecialistLoop`] — bounded sub-loop per specialist scope
//! - [`client::ModelClient`] — model requests with timeout and retry
//! - [`tools`] — tool trait, closed scopes, registry and handlers

pub mod client;
pub mod context;
pub mod controller;
pub mod specialist;
pub mod tools;

pub use client::{ModelClient, RunError};
pub use controller::{ControllerLoop, ControllerState, HandoffRecord, RunOutcome, RunReport};
pub use specialist::{
    AbnormalReason, Specialist, SpecialistLoop, SpecialistOutcome, SpecialistReport,
    SpecialistState,
};
