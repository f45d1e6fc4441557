//! Core SEPA entity model, validation, and check-digit arithmetic.
//!
//! This module provides the document → group header → payment batch →
//! transaction aggregate, the mod-97 checksum engine, and the field-level
//! validation rules the renderer applies before emitting XML.

mod builder;
mod countries;
mod error;
pub mod iban;
mod types;
mod validation;

pub use builder::*;
pub use countries::is_known_country_code;
pub use error::*;
pub use iban::{checksum_creditor_id, checksum_iban, validate_creditor_id, validate_iban};
pub use types::*;
pub use validation::*;
