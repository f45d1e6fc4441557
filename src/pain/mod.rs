//! ISO 20022 pain.001 / pain.008 XML generation.
//!
//! Renders a [`Document`](crate::core::Document) into the exact node set of
//! its pain format: normalization first, then per-entity validation
//! (unless disabled in the document config), then the conditional tree.
//!
//! # Example
//!
//! ```no_run
//! use zahlung::core::Document;
//! use zahlung::pain;
//!
//! let mut document: Document = todo!(); // build via DocumentBuilder
//! let xml = pain::to_xml(&mut document).unwrap();
//! ```

mod render;
pub(crate) mod xml_utils;

pub use render::to_xml;
pub use xml_utils::format_amount;

/// XML Schema instance namespace carried on the `Document` root.
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Placeholder agent identifier rendered when a counterparty has no BIC.
/// The agent node itself is never skipped, only its content varies.
pub const AGENT_NOT_PROVIDED: &str = "NOTPROVIDED";
