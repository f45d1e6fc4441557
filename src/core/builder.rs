use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use super::types::*;

/// Builder for counterparty identity blocks.
///
/// ```
/// use zahlung::core::*;
///
/// let account = AccountBuilder::new("Max Mustermann", "DE89370400440532013000")
///     .address("Friedrichstraße 123", "Berlin", "DE")
///     .bic("COBADEFFXXX")
///     .build();
/// assert_eq!(account.country.as_deref(), Some("DE"));
/// ```
pub struct AccountBuilder {
    account: Account,
}

impl AccountBuilder {
    pub fn new(name: impl Into<String>, iban: impl Into<String>) -> Self {
        Self {
            account: Account::new(name, iban),
        }
    }

    /// Set the postal address. The renderer only emits an address when all
    /// three parts are present, which this enforces.
    pub fn address(
        mut self,
        street: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        self.account.street = Some(street.into());
        self.account.city = Some(city.into());
        self.account.country = Some(country.into());
        self
    }

    pub fn bic(mut self, bic: impl Into<String>) -> Self {
        self.account.bic = Some(bic.into());
        self
    }

    pub fn member_id(mut self, member_id: impl Into<String>) -> Self {
        self.account.member_id = Some(member_id.into());
        self
    }

    pub fn build(self) -> Account {
        self.account
    }
}

/// Builder for documents.
pub struct DocumentBuilder {
    format: PainFormat,
    message_id: String,
    created: NaiveDateTime,
    initiator_name: String,
    initiator_id: Option<String>,
    initiator_cuc: Option<String>,
    batch_booking: bool,
    grouping: Grouping,
    config: SepaConfig,
}

impl DocumentBuilder {
    pub fn new(
        format: PainFormat,
        message_id: impl Into<String>,
        created: NaiveDateTime,
    ) -> Self {
        Self {
            format,
            message_id: message_id.into(),
            created,
            initiator_name: String::new(),
            initiator_id: None,
            initiator_cuc: None,
            batch_booking: false,
            grouping: Grouping::default(),
            config: SepaConfig::default(),
        }
    }

    pub fn initiator(mut self, name: impl Into<String>) -> Self {
        self.initiator_name = name.into();
        self
    }

    pub fn initiator_id(mut self, id: impl Into<String>) -> Self {
        self.initiator_id = Some(id.into());
        self
    }

    pub fn initiator_cuc(mut self, cuc: impl Into<String>) -> Self {
        self.initiator_cuc = Some(cuc.into());
        self
    }

    pub fn batch_booking(mut self, enabled: bool) -> Self {
        self.batch_booking = enabled;
        self
    }

    pub fn grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn id_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.id_separator = separator.into();
        self
    }

    /// Disable or re-enable render-time validation.
    pub fn validation(mut self, enabled: bool) -> Self {
        self.config.validation = enabled;
        self
    }

    pub fn build(self) -> Document {
        let mut document = Document::with_config(self.format, self.config);
        document.group_header = GroupHeader {
            message_id: self.message_id,
            created: self.created,
            initiator_name: self.initiator_name,
            initiator_id: self.initiator_id,
            initiator_cuc: self.initiator_cuc,
            batch_booking: self.batch_booking,
            grouping: self.grouping,
            ..GroupHeader::default()
        };
        document
    }
}

/// Builder for payment batches.
pub struct PaymentInfoBuilder {
    payment_info: PaymentInfo,
}

impl PaymentInfoBuilder {
    pub fn new(format: PainFormat, owner: Account) -> Self {
        let mut payment_info = PaymentInfo::new(format);
        payment_info.owner = owner;
        Self { payment_info }
    }

    /// Caller-supplied short id, prefixed with the parent id at attach time.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.payment_info.id = id.into();
        self
    }

    /// Verbatim id, bypassing prefixing entirely.
    pub fn override_reference(mut self, reference: impl Into<String>) -> Self {
        self.payment_info.override_reference = Some(reference.into());
        self
    }

    pub fn batch_booking(mut self, enabled: bool) -> Self {
        self.payment_info.batch_booking = enabled;
        self
    }

    pub fn local_instrument(mut self, instrument: LocalInstrument) -> Self {
        self.payment_info.local_instrument = instrument;
        self
    }

    pub fn sequence_type(mut self, sequence_type: SequenceType) -> Self {
        self.payment_info.sequence_type = sequence_type;
        self
    }

    pub fn collection_date(mut self, date: NaiveDate) -> Self {
        self.payment_info.collection_date = Some(date);
        self
    }

    pub fn requested_execution_date(mut self, date: NaiveDate) -> Self {
        self.payment_info.requested_execution_date = Some(date);
        self
    }

    pub fn instruction_priority(mut self, priority: InstructionPriority) -> Self {
        self.payment_info.instruction_priority = Some(priority);
        self
    }

    pub fn category_purpose(mut self, code: impl Into<String>) -> Self {
        self.payment_info.category_purpose = Some(code.into());
        self
    }

    pub fn creditor_id(mut self, creditor_id: impl Into<String>) -> Self {
        self.payment_info.creditor_id = Some(creditor_id.into());
        self
    }

    pub fn build(self) -> PaymentInfo {
        self.payment_info
    }
}

/// Builder for transactions.
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl TransactionBuilder {
    pub fn new(method: PaymentMethod, counterparty: Account, amount: Decimal) -> Self {
        let mut transaction = Transaction::new(method);
        transaction.counterparty = counterparty;
        transaction.amount = amount;
        Self { transaction }
    }

    /// Caller-supplied short id, prefixed with the parent id at attach time.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.transaction.id = id.into();
        self
    }

    /// Verbatim id, bypassing prefixing entirely.
    pub fn override_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction.override_reference = Some(reference.into());
        self
    }

    pub fn end_to_end_id(mut self, id: impl Into<String>) -> Self {
        self.transaction.end_to_end_id = id.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.transaction.currency = currency.into();
        self
    }

    pub fn purpose_code(mut self, code: impl Into<String>) -> Self {
        self.transaction.purpose_code = Some(code.into());
        self
    }

    /// Mandate reference and signature date, required for direct debits.
    pub fn mandate(mut self, id: impl Into<String>, signed: NaiveDate) -> Self {
        self.transaction.mandate_id = Some(id.into());
        self.transaction.mandate_signature_date = Some(signed);
        self
    }

    pub fn remittance_info(mut self, text: impl Into<String>) -> Self {
        self.transaction.remittance_info = text.into();
        self
    }

    pub fn amendment(mut self, note: impl Into<String>) -> Self {
        self.transaction.amendment = Some(note.into());
        self
    }

    pub fn build(self) -> Transaction {
        self.transaction
    }
}
