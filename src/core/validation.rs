//! Field-level SEPA assertions and the per-entity validators composed from
//! them.
//!
//! Every assertion fails with a [`ValidationError`] naming the offending
//! field and the received value. The entity validators run a fixed checklist
//! appropriate to the payment method; the renderer calls them immediately
//! before writing the entity's subtree, never eagerly at field-set time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::countries::is_known_country_code;
use super::error::{CounterpartyError, SepaError, ValidationError};
use super::iban;
use super::types::*;

/// Upper bound for a single instructed amount.
const AMOUNT_CEILING: Decimal = dec!(999999999.99);

fn fail(
    field: &str,
    value: impl std::fmt::Display,
    message: impl Into<String>,
) -> Result<(), SepaError> {
    Err(SepaError::Validation(ValidationError::new(
        field,
        value.to_string(),
        message,
    )))
}

/// Value must be one of an enumerated set.
pub fn assert_fixed<T: PartialEq + std::fmt::Display + Copy>(
    value: T,
    choices: &[T],
    field: &str,
) -> Result<(), SepaError> {
    if choices.contains(&value) {
        return Ok(());
    }
    let rendered: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    fail(
        field,
        value,
        format!("must be one of {}", rendered.join(", ")),
    )
}

/// String length (in characters) within the given bounds, either optional.
pub fn assert_length(
    value: &str,
    min: Option<usize>,
    max: Option<usize>,
    field: &str,
) -> Result<(), SepaError> {
    let len = value.chars().count();
    if min.is_some_and(|m| len < m) || max.is_some_and(|m| len > m) {
        let bounds = match (min, max) {
            (Some(lo), Some(hi)) => format!("length must be between {lo} and {hi}"),
            (Some(lo), None) => format!("length must be at least {lo}"),
            (None, Some(hi)) => format!("length must be at most {hi}"),
            (None, None) => return Ok(()),
        };
        return fail(field, value, bounds);
    }
    Ok(())
}

/// Numeric value within [min, max], inclusive.
pub fn assert_range(
    value: Decimal,
    min: Decimal,
    max: Decimal,
    field: &str,
) -> Result<(), SepaError> {
    if value < min || value > max {
        return fail(field, value, format!("must be between {min} and {max}"));
    }
    Ok(())
}

/// Name must be non-empty after trimming whitespace.
pub fn assert_name(value: &str, field: &str) -> Result<(), SepaError> {
    if value.trim().is_empty() {
        return fail(field, value, "must not be empty");
    }
    Ok(())
}

/// A date must actually be present.
pub fn assert_date(value: Option<NaiveDate>, field: &str) -> Result<(), SepaError> {
    match value {
        Some(_) => Ok(()),
        None => fail(field, "none", "a valid date is required"),
    }
}

/// IBAN mod-97 checksum must hold.
pub fn assert_iban(value: &str, field: &str) -> Result<(), SepaError> {
    if iban::validate_iban(value) {
        Ok(())
    } else {
        fail(field, value, "IBAN checksum is invalid")
    }
}

/// Creditor identifier mod-97 checksum must hold.
pub fn assert_creditor_id(value: &str, field: &str) -> Result<(), SepaError> {
    if iban::validate_creditor_id(value) {
        Ok(())
    } else {
        fail(field, value, "creditor identifier checksum is invalid")
    }
}

fn is_sepa_id_char(c: char, allow_space: bool) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '+' | '?' | '/' | '-' | ':' | '(' | ')' | '.' | ',' | '\'')
        || (allow_space && c == ' ')
}

/// Broader SEPA identifier class: end-to-end ids and similar references,
/// 1–35 characters, space allowed.
pub fn assert_sepa_ident(value: &str, field: &str) -> Result<(), SepaError> {
    let len = value.chars().count();
    if len == 0 || len > 35 || !value.chars().all(|c| is_sepa_id_char(c, true)) {
        return fail(
            field,
            value,
            "must be 1-35 characters from the SEPA identifier set",
        );
    }
    Ok(())
}

/// Restricted SEPA identifier class: mandate ids, 1–35 characters, no space.
pub fn assert_sepa_ident_restricted(value: &str, field: &str) -> Result<(), SepaError> {
    let len = value.chars().count();
    if len == 0 || len > 35 || !value.chars().all(|c| is_sepa_id_char(c, false)) {
        return fail(
            field,
            value,
            "must be 1-35 characters from the restricted SEPA identifier set",
        );
    }
    Ok(())
}

/// Cross-field counterparty check.
///
/// All violations are accumulated into the error's field list; the first
/// violation provides the message.
pub fn validate_account(account: &Account) -> Result<(), CounterpartyError> {
    let mut invalid_fields: Vec<String> = Vec::new();
    let mut first_message: Option<String> = None;
    let mut record = |field: &str, message: String| {
        invalid_fields.push(field.to_owned());
        first_message.get_or_insert(message);
    };

    if account.name.trim().is_empty() || account.name.chars().count() > 70 {
        record("name", "name must be 1-70 characters".into());
    }
    if let Some(street) = &account.street {
        if street.chars().count() > 70 {
            record("street", "street must be at most 70 characters".into());
        }
    }
    if let Some(city) = &account.city {
        if city.chars().count() > 70 {
            record("city", "city must be at most 70 characters".into());
        }
    }
    if let Some(country) = &account.country {
        if country.chars().count() > 2 || !is_known_country_code(country) {
            record(
                "country",
                format!("'{country}' is not an ISO 3166-1 alpha-2 country code"),
            );
        }
    }
    if !iban::validate_iban(&account.iban) {
        record(
            "IBAN",
            format!("IBAN '{}' has an invalid checksum", account.iban),
        );
    }
    if let Some(bic) = &account.bic {
        let len = bic.chars().count();
        if !matches!(len, 0 | 8 | 11) {
            record("BIC", format!("BIC '{bic}' must be 8 or 11 characters"));
        } else if len > 0 {
            // BIC characters 5-6 carry the country of the bank.
            let bic_country: String = bic.chars().skip(4).take(2).collect();
            let iban_country: String = account.iban.chars().take(2).collect();
            if bic_country != iban_country {
                record(
                    "IBAN/BIC",
                    format!(
                        "BIC country '{bic_country}' does not match IBAN country '{iban_country}'"
                    ),
                );
            }
        }
    }

    if invalid_fields.is_empty() {
        Ok(())
    } else {
        Err(CounterpartyError {
            name: account.name.clone(),
            invalid_fields,
            message: first_message.unwrap_or_default(),
        })
    }
}

/// Validate a payment batch. Called by the renderer immediately before the
/// batch's own `PmtInf` subtree is written.
pub fn validate_payment_info(payment_info: &PaymentInfo) -> Result<(), SepaError> {
    match payment_info.method() {
        PaymentMethod::DirectDebit => {
            assert_date(payment_info.collection_date, "collection_date")?;
            assert_creditor_id(
                payment_info.creditor_id.as_deref().unwrap_or(""),
                "creditor_id",
            )?;
        }
        PaymentMethod::Transfer => {
            assert_date(
                payment_info.requested_execution_date,
                "requested_execution_date",
            )?;
        }
    }
    if let Some(code) = &payment_info.category_purpose {
        assert_length(code, Some(1), Some(4), "category_purpose")?;
    }
    validate_account(&payment_info.owner)?;
    if payment_info.transaction_count() == 0 {
        return fail(
            "transactions",
            payment_info.transaction_count(),
            "at least one transaction is required",
        );
    }
    Ok(())
}

/// Validate a single transaction. Called by the renderer immediately before
/// the transaction's own subtree is written.
pub fn validate_transaction(transaction: &Transaction) -> Result<(), SepaError> {
    assert_sepa_ident(&transaction.end_to_end_id, "end_to_end_id")?;
    assert_range(transaction.amount, dec!(0.01), AMOUNT_CEILING, "amount")?;
    if transaction.amount != transaction.amount.round_dp(2) {
        return fail(
            "amount",
            transaction.amount,
            "no more than two fractional digits",
        );
    }
    if let Some(code) = &transaction.purpose_code {
        assert_length(code, Some(1), Some(4), "purpose_code")?;
    }
    if transaction.method() == PaymentMethod::DirectDebit {
        assert_sepa_ident_restricted(
            transaction.mandate_id.as_deref().unwrap_or(""),
            "mandate_id",
        )?;
        assert_date(transaction.mandate_signature_date, "mandate_signature_date")?;
    }
    assert_length(
        &transaction.remittance_info,
        None,
        Some(140),
        "remittance_info",
    )?;
    validate_account(&transaction.counterparty)?;
    Ok(())
}
