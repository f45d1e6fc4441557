//! # zahlung
//!
//! SEPA payment initiation library — pain.001 credit transfers and
//! pain.008 direct debits as exact, bank-accepted ISO 20022 XML.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating
//! point. Documents are validated field by field (lengths, charsets,
//! mod-97 check digits, cross-field counterparty consistency) right before
//! rendering, and derived aggregates (`NbOfTxs`, `CtrlSum`) are always
//! recomputed from the transaction tree.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use zahlung::core::*;
//! use zahlung::pain;
//!
//! let created = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap().and_hms_opt(10, 30, 0).unwrap();
//! let mut document = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG-2024-001", created)
//!     .initiator("ACME GmbH")
//!     .build();
//!
//! let batch = document
//!     .add_payment_info(
//!         PaymentInfoBuilder::new(
//!             PainFormat::Pain008_001_02,
//!             AccountBuilder::new("ACME GmbH", "DE89370400440532013000")
//!                 .bic("COBADEFFXXX")
//!                 .build(),
//!         )
//!         .collection_date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
//!         .creditor_id("DE98ZZZ09999999999")
//!         .build(),
//!     )
//!     .unwrap();
//!
//! batch
//!     .add_transaction(
//!         TransactionBuilder::new(
//!             PaymentMethod::DirectDebit,
//!             AccountBuilder::new("Max Mustermann", "DE87123456781234567890").build(),
//!             dec!(42.00),
//!         )
//!         .end_to_end_id("INV-4711")
//!         .mandate("MANDATE-1", NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
//!         .remittance_info("Invoice 4711")
//!         .build(),
//!     )
//!     .unwrap();
//!
//! let xml = pain::to_xml(&mut document).unwrap();
//! assert!(xml.contains("<CstmrDrctDbtInitn>"));
//! assert!(xml.contains("<CtrlSum>42.00</CtrlSum>"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Entity model, validation, mod-97 check digits |
//! | `pain` (default) | pain.001 / pain.008 XML generation |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "pain")]
pub mod pain;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
