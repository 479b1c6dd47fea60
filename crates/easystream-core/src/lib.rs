//! Core types and workflows for the EasyStream subscription panel.
//!
//! This crate has no HTTP or database dependencies.
//! Storage backends implement [`store::RecordStore`]; everything else is
//! built on top of that trait.

pub mod catalog;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod memory;
pub mod panel;
pub mod purchase;
pub mod record;
pub mod repo;
pub mod report;
pub mod service;
pub mod setting;
pub mod snapshot;
pub mod status;
pub mod store;

pub use error::{Error, Result};
pub use panel::Panel;
