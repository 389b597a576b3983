//! Intake pipeline stages and their supporting services.
//!
//! `extractor`, `validator` and `pricing` are pure functions over a rate card
//! snapshot; `pipeline` composes them. `workflow` publishes results downstream.

pub mod extractor;
pub mod pipeline;
pub mod pricing;
pub mod rate_card;
pub mod rules;
pub mod validator;
pub mod workflow;

pub use pipeline::process_intake;
pub use rate_card::{RateCard, RateCardStore};
pub use workflow::{WorkflowEvent, WorkflowPublisher};
