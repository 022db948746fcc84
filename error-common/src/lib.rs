//! Common error handling utilities shared by the platform libraries
//!
//! This module provides an error wrapper that carries structured side-channel
//! data ("custom data") next to the error itself. The logger turns that data
//! into top-level record fields and the error monitor sends it as extras, so
//! call sites can attach identifiers once, where they are known, instead of
//! logging them at every layer.
//!
//! # Example
//!
//! ```rust
//! use error_common::{custom_data_fields, error_chain, Annotated, CustomData, CustomDataError};
//!
//! fn load_person(id: &str) -> Result<(), CustomDataError> {
//!     let cause = Annotated::msg("unexpected response status code 422");
//!     Err(CustomDataError::annotate(cause, "getting person failed", CustomData::new().person_id(id)))
//! }
//!
//! let err = load_person("fbceab5f").unwrap_err();
//! assert_eq!(error_chain(&err), "getting person failed: unexpected response status code 422");
//! assert_eq!(custom_data_fields(&err, Default::default())["person-id"], "fbceab5f");
//! ```

pub mod context;
pub mod fields;
pub mod types;

pub use context::*;
pub use types::*;
