use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::SepaError;

/// ISO 20022 payment initiation formats supported by this crate.
///
/// The format fixes the message family (credit transfer vs direct debit),
/// the root business element and the schema version, and therefore which
/// conditional nodes the renderer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum PainFormat {
    /// pain.001.001.02 — credit transfer, schema version 2.
    Pain001_001_02,
    /// pain.001.003.02 — credit transfer (German DK variant), version 2.
    Pain001_003_02,
    /// pain.001.001.03 — credit transfer, schema version 3.
    Pain001_001_03,
    /// pain.001.003.03 — credit transfer (German DK variant), version 3.
    Pain001_003_03,
    /// pain.008.001.01 — direct debit, schema version 2.
    Pain008_001_01,
    /// pain.008.003.01 — direct debit (German DK variant), version 2.
    Pain008_003_01,
    /// pain.008.001.02 — direct debit, schema version 3.
    Pain008_001_02,
    /// pain.008.003.02 — direct debit (German DK variant), version 3.
    Pain008_003_02,
}

impl PainFormat {
    /// The format name as it appears in the namespace URN and schema file.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pain001_001_02 => "pain.001.001.02",
            Self::Pain001_003_02 => "pain.001.003.02",
            Self::Pain001_001_03 => "pain.001.001.03",
            Self::Pain001_003_03 => "pain.001.003.03",
            Self::Pain008_001_01 => "pain.008.001.01",
            Self::Pain008_003_01 => "pain.008.003.01",
            Self::Pain008_001_02 => "pain.008.001.02",
            Self::Pain008_003_02 => "pain.008.003.02",
        }
    }

    /// Parse a format name; `None` for anything outside the fixed table.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pain.001.001.02" => Some(Self::Pain001_001_02),
            "pain.001.003.02" => Some(Self::Pain001_003_02),
            "pain.001.001.03" => Some(Self::Pain001_001_03),
            "pain.001.003.03" => Some(Self::Pain001_003_03),
            "pain.008.001.01" => Some(Self::Pain008_001_01),
            "pain.008.003.01" => Some(Self::Pain008_003_01),
            "pain.008.001.02" => Some(Self::Pain008_001_02),
            "pain.008.003.02" => Some(Self::Pain008_003_02),
            _ => None,
        }
    }

    /// Local name of the root business element under `Document`.
    pub fn root_element(&self) -> &'static str {
        match self {
            Self::Pain001_001_02 => "pain.001.001.02",
            Self::Pain001_003_02 => "pain.001.003.02",
            Self::Pain001_001_03 | Self::Pain001_003_03 => "CstmrCdtTrfInitn",
            Self::Pain008_001_01 => "pain.008.001.01",
            Self::Pain008_003_01 => "pain.008.003.01",
            Self::Pain008_001_02 | Self::Pain008_003_02 => "CstmrDrctDbtInitn",
        }
    }

    /// Payment method fixed by the message family.
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Pain001_001_02
            | Self::Pain001_003_02
            | Self::Pain001_001_03
            | Self::Pain001_003_03 => PaymentMethod::Transfer,
            Self::Pain008_001_01
            | Self::Pain008_003_01
            | Self::Pain008_001_02
            | Self::Pain008_003_02 => PaymentMethod::DirectDebit,
        }
    }

    /// Schema version governing conditional node placement.
    ///
    /// The trailing version digit of the format name, plus one for the
    /// direct-debit family whose numbering lags one behind.
    pub fn schema_version(&self) -> u8 {
        match self {
            Self::Pain001_001_02
            | Self::Pain001_003_02
            | Self::Pain008_001_01
            | Self::Pain008_003_01 => 2,
            Self::Pain001_001_03
            | Self::Pain001_003_03
            | Self::Pain008_001_02
            | Self::Pain008_003_02 => 3,
        }
    }

    /// Document namespace: `urn:iso:std:iso:20022:tech:xsd:<format>`.
    pub fn namespace(&self) -> String {
        format!("urn:iso:std:iso:20022:tech:xsd:{}", self.name())
    }
}

impl Default for PainFormat {
    fn default() -> Self {
        Self::Pain008_001_02
    }
}

/// ISO 20022 payment method (`PmtMtd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// TRF — credit transfer, the batch owner pays.
    Transfer,
    /// DD — direct debit, the batch owner collects.
    DirectDebit,
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transfer => "TRF",
            Self::DirectDebit => "DD",
        }
    }
}

/// Message grouping mode (`Grpg`, version-2 schemas only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grouping {
    /// MIXD — mixed grouping.
    #[default]
    Mixed,
    /// SNGL — one transaction per batch.
    Single,
    /// GRPD — grouped.
    Grouped,
}

impl Grouping {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Mixed => "MIXD",
            Self::Single => "SNGL",
            Self::Grouped => "GRPD",
        }
    }
}

/// Direct-debit local instrument (`LclInstrm/Cd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocalInstrument {
    /// CORE — core scheme.
    #[default]
    Core,
    /// COR1 — core scheme with shortened presentation period.
    Cor1,
    /// B2B — business-to-business scheme.
    B2b,
}

impl LocalInstrument {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Cor1 => "COR1",
            Self::B2b => "B2B",
        }
    }
}

/// Direct-debit sequence type (`SeqTp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SequenceType {
    /// FRST — first collection of a recurring mandate.
    #[default]
    First,
    /// RCUR — recurring collection.
    Recurring,
    /// OOFF — one-off collection.
    OneOff,
    /// FNAL — final collection of a recurring mandate.
    Final,
}

impl SequenceType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::First => "FRST",
            Self::Recurring => "RCUR",
            Self::OneOff => "OOFF",
            Self::Final => "FNAL",
        }
    }
}

/// Instruction priority (`InstrPrty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionPriority {
    /// NORM — normal priority.
    Normal,
    /// HIGH — high priority.
    High,
}

impl InstructionPriority {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Normal => "NORM",
            Self::High => "HIGH",
        }
    }
}

/// Per-document configuration, read at attach and render time.
///
/// This is deliberately not process-global: each document carries its own
/// copy, so concurrent documents and tests never observe each other's
/// settings. Set it before attaching children — the separator is applied
/// when ids are assigned, and the validation switch is read on render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SepaConfig {
    /// Separator between a parent id and a child id or index.
    pub id_separator: String,
    /// Run entity validation during render. Disable only for trusted input.
    pub validation: bool,
}

impl Default for SepaConfig {
    fn default() -> Self {
        Self {
            id_separator: ".".into(),
            validation: true,
        }
    }
}

/// Counterparty identity block, used for the batch owner and for each
/// transaction's opposite side. The creditor/debtor role is derived from
/// the payment method at render time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// Holder name, at most 70 characters.
    pub name: String,
    /// Street line of the postal address.
    pub street: Option<String>,
    /// City line of the postal address.
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    /// Checksummed account identifier.
    pub iban: String,
    /// Bank identifier, 8 or 11 characters. When absent the renderer emits
    /// the NOTPROVIDED placeholder instead of omitting the agent node.
    pub bic: Option<String>,
    /// Clearing system member id, rendered alongside the BIC.
    pub member_id: Option<String>,
}

impl Account {
    pub fn new(name: impl Into<String>, iban: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iban: iban.into(),
            ..Self::default()
        }
    }
}

/// Message-level header (`GrpHdr`), one per document.
///
/// `transaction_count` and `control_sum` are derived: normalization
/// recomputes them from the payment blocks immediately before every render,
/// externally set values are overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupHeader {
    /// Message id (`MsgId`), also the prefix for assigned batch ids.
    pub message_id: String,
    /// Creation timestamp (`CreDtTm`), rendered with seconds precision.
    pub created: NaiveDateTime,
    /// Initiating party name (`InitgPty/Nm`).
    pub initiator_name: String,
    /// Organisation code of the initiating party
    /// (`InitgPty/Id/OrgId/Othr/Id`), required by some national rulebooks,
    /// e.g. the Belgian enterprise number.
    pub initiator_id: Option<String>,
    /// CBI company code used by Italian banks, rendered as a second
    /// `Othr` entry with issuer `CBI`. Independent of `initiator_id`.
    pub initiator_cuc: Option<String>,
    /// Batch booking flag (`BtchBookg`, version-2 schemas).
    pub batch_booking: bool,
    /// Grouping mode (`Grpg`, version-2 schemas).
    pub grouping: Grouping,
    /// Derived: total transaction count across all batches.
    pub transaction_count: usize,
    /// Derived: total amount across all batches.
    pub control_sum: Decimal,
}

impl Default for GroupHeader {
    fn default() -> Self {
        Self {
            message_id: String::new(),
            created: NaiveDateTime::default(),
            initiator_name: String::new(),
            initiator_id: None,
            initiator_cuc: None,
            batch_booking: false,
            grouping: Grouping::Mixed,
            transaction_count: 0,
            control_sum: Decimal::ZERO,
        }
    }
}

/// A batch of transactions sharing settlement attributes (`PmtInf`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Assigned id (`PmtInfId`). Set once when the batch is attached to a
    /// document; see [`Document::add_payment_info`].
    pub id: String,
    /// When set, used verbatim as the id instead of prefixing.
    pub override_reference: Option<String>,
    method: PaymentMethod,
    config: SepaConfig,
    /// Batch booking flag (`BtchBookg`, version-3 schemas).
    pub batch_booking: bool,
    /// Direct-debit local instrument.
    pub local_instrument: LocalInstrument,
    /// Direct-debit sequence type.
    pub sequence_type: SequenceType,
    /// Collection date (`ReqdColltnDt`), direct debit only.
    pub collection_date: Option<NaiveDate>,
    /// Requested execution date (`ReqdExctnDt`), credit transfer only.
    pub requested_execution_date: Option<NaiveDate>,
    /// Instruction priority (`InstrPrty`).
    pub instruction_priority: Option<InstructionPriority>,
    /// Category purpose code (`CtgyPurp/Cd`).
    pub category_purpose: Option<String>,
    /// SEPA creditor identifier (`CdtrSchmeId`), direct debit only.
    pub creditor_id: Option<String>,
    /// Settlement-side party of the batch: the creditor collecting funds
    /// for direct debits, the debtor paying for credit transfers.
    pub owner: Account,
    /// Derived: sum of the transaction amounts in this batch.
    pub control_sum: Decimal,
    transactions: Vec<Transaction>,
}

impl PaymentInfo {
    /// Create an empty batch for the given format.
    pub fn new(format: PainFormat) -> Self {
        Self::with_config(format, SepaConfig::default())
    }

    pub(crate) fn with_config(format: PainFormat, config: SepaConfig) -> Self {
        Self {
            id: String::new(),
            override_reference: None,
            method: format.method(),
            config,
            batch_booking: true,
            local_instrument: LocalInstrument::default(),
            sequence_type: SequenceType::default(),
            collection_date: None,
            requested_execution_date: None,
            instruction_priority: None,
            category_purpose: None,
            creditor_id: None,
            owner: Account::default(),
            control_sum: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Create a transaction matching this batch's payment method.
    pub fn create_transaction(&self) -> Transaction {
        Transaction::new(self.method)
    }

    /// Attach a transaction, assigning its id, and return a mutable
    /// reference to it.
    ///
    /// Id assignment happens here and only here: an override reference is
    /// used verbatim; a caller-set short id is prefixed with this batch's
    /// id; otherwise the positional index is prefixed. Attach the batch to
    /// its document first so transaction ids chain off the assigned batch
    /// id.
    pub fn add_transaction(
        &mut self,
        mut transaction: Transaction,
    ) -> Result<&mut Transaction, SepaError> {
        if transaction.method != self.method {
            return Err(SepaError::Structure(format!(
                "cannot attach a {} transaction to a {} batch",
                transaction.method.code(),
                self.method.code()
            )));
        }
        transaction.id = match &transaction.override_reference {
            Some(reference) => reference.clone(),
            None if !transaction.id.is_empty() => {
                format!("{}{}{}", self.id, self.config.id_separator, transaction.id)
            }
            None => format!(
                "{}{}{}",
                self.id,
                self.config.id_separator,
                self.transactions.len()
            ),
        };
        let index = self.transactions.len();
        self.transactions.push(transaction);
        Ok(&mut self.transactions[index])
    }

    /// Recompute this batch's control sum from its transactions.
    pub fn normalize(&mut self) {
        self.control_sum = self.transactions.iter().map(|t| t.amount).sum();
    }

    pub(crate) fn set_config(&mut self, config: SepaConfig) {
        self.config = config;
    }
}

/// A single money movement (`DrctDbtTxInf` / `CdtTrfTxInf`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned id, rendered as `InstrId`. Set once when the transaction is
    /// attached to a batch; see [`PaymentInfo::add_transaction`].
    pub id: String,
    /// When set, used verbatim as the id instead of prefixing.
    pub override_reference: Option<String>,
    method: PaymentMethod,
    /// End-to-end reference (`EndToEndId`), at most 35 characters from the
    /// broader SEPA identifier charset.
    pub end_to_end_id: String,
    /// ISO 4217 currency code, rendered as the `Ccy` attribute.
    pub currency: String,
    /// Instructed amount: strictly positive, at most two fractional digits.
    pub amount: Decimal,
    /// Purpose code (`Purp/Cd`), 1–4 characters.
    pub purpose_code: Option<String>,
    /// Mandate reference (`MndtId`), direct debit only; restricted charset.
    pub mandate_id: Option<String>,
    /// Mandate signature date (`DtOfSgntr`), direct debit only.
    pub mandate_signature_date: Option<NaiveDate>,
    /// The opposite side of the movement: the debtor being charged for
    /// direct debits, the creditor receiving funds for transfers.
    pub counterparty: Account,
    /// Unstructured remittance text (`RmtInf/Ustrd`), at most 140 characters.
    pub remittance_info: String,
    /// Mandate amendment note; when set, `AmdmntInd` renders true with the
    /// note as `AmdmntInfDtls`.
    pub amendment: Option<String>,
}

impl Transaction {
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            id: String::new(),
            override_reference: None,
            method,
            end_to_end_id: String::new(),
            currency: "EUR".into(),
            amount: Decimal::ZERO,
            purpose_code: None,
            mandate_id: None,
            mandate_signature_date: None,
            counterparty: Account::default(),
            remittance_info: String::new(),
            amendment: None,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }
}

/// Root aggregate: one group header plus the ordered payment batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    format: PainFormat,
    /// Version string of the XML declaration.
    pub xml_version: String,
    /// Encoding string of the XML declaration.
    pub xml_encoding: String,
    /// Message-level header.
    pub group_header: GroupHeader,
    /// Per-document configuration.
    pub config: SepaConfig,
    payment_infos: Vec<PaymentInfo>,
}

impl Document {
    pub fn new(format: PainFormat) -> Self {
        Self::with_config(format, SepaConfig::default())
    }

    pub fn with_config(format: PainFormat, config: SepaConfig) -> Self {
        Self {
            format,
            xml_version: "1.0".into(),
            xml_encoding: "UTF-8".into(),
            group_header: GroupHeader::default(),
            config,
            payment_infos: Vec::new(),
        }
    }

    /// Construct from a format name, substituting the default format
    /// (pain.008.001.02) when the name is not in the fixed table.
    pub fn from_format_name(name: &str) -> Self {
        Self::new(PainFormat::from_name(name).unwrap_or_default())
    }

    pub fn format(&self) -> PainFormat {
        self.format
    }

    pub fn payment_infos(&self) -> &[PaymentInfo] {
        &self.payment_infos
    }

    /// Create a payment batch for this document's format, carrying this
    /// document's configuration.
    pub fn create_payment_info(&self) -> PaymentInfo {
        PaymentInfo::with_config(self.format, self.config.clone())
    }

    /// Attach a payment batch, assigning its id, and return a mutable
    /// reference to it so transactions can be added afterwards.
    ///
    /// The id is derived exactly as in [`PaymentInfo::add_transaction`],
    /// prefixed with the group header's message id. The document's
    /// configuration is stamped onto the batch so transactions attached
    /// afterwards use the same separator.
    pub fn add_payment_info(
        &mut self,
        mut payment_info: PaymentInfo,
    ) -> Result<&mut PaymentInfo, SepaError> {
        if payment_info.method != self.format.method() {
            return Err(SepaError::Structure(format!(
                "cannot attach a {} batch to a {} document",
                payment_info.method.code(),
                self.format.name()
            )));
        }
        payment_info.id = match &payment_info.override_reference {
            Some(reference) => reference.clone(),
            None if !payment_info.id.is_empty() => format!(
                "{}{}{}",
                self.group_header.message_id, self.config.id_separator, payment_info.id
            ),
            None => format!(
                "{}{}{}",
                self.group_header.message_id,
                self.config.id_separator,
                self.payment_infos.len()
            ),
        };
        payment_info.set_config(self.config.clone());
        let index = self.payment_infos.len();
        self.payment_infos.push(payment_info);
        Ok(&mut self.payment_infos[index])
    }

    /// Recompute all derived aggregates bottom-up: each batch's control sum
    /// from its transactions, then the group header's totals from the
    /// batches. Runs at the start of every render; idempotent.
    pub fn normalize(&mut self) {
        let mut control_sum = Decimal::ZERO;
        let mut transaction_count = 0;
        for payment_info in &mut self.payment_infos {
            payment_info.normalize();
            control_sum += payment_info.control_sum;
            transaction_count += payment_info.transaction_count();
        }
        self.group_header.control_sum = control_sum;
        self.group_header.transaction_count = transaction_count;
    }
}
