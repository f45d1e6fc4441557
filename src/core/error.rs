use thiserror::Error;

/// Errors that can occur while assembling or rendering a SEPA document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SepaError {
    /// A child entity was attached to an incompatible container, e.g. a
    /// credit-transfer transaction added to a direct-debit batch.
    #[error("structure error: {0}")]
    Structure(String),

    /// A single field violates a SEPA constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A counterparty block failed one or more of its cross-field checks.
    #[error(transparent)]
    Counterparty(#[from] CounterpartyError),

    /// XML generation error from the underlying writer.
    #[error("XML error: {0}")]
    Xml(String),
}

/// A single validation error carrying the offending field name and the
/// value that was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message} (got '{value}')")]
pub struct ValidationError {
    /// Name of the invalid field (e.g. "amount", "mandate_id").
    pub field: String,
    /// The received value, stringified.
    pub value: String,
    /// Human-readable error description.
    pub message: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Aggregated failure for a counterparty identity block.
///
/// All invalid fields are accumulated; `message` describes the first
/// violation encountered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("counterparty '{name}': {message} (invalid fields: {})", .invalid_fields.join(", "))]
pub struct CounterpartyError {
    /// Name of the counterparty the block belongs to.
    pub name: String,
    /// Every field that failed a check, in check order.
    pub invalid_fields: Vec<String>,
    /// Description of the first violation.
    pub message: String,
}
