#![cfg(feature = "pain")]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use zahlung::core::*;
use zahlung::pain;

fn created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .expect("valid timestamp")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn creditor() -> Account {
    AccountBuilder::new("ACME GmbH", "DE89370400440532013000")
        .bic("COBADEFFXXX")
        .build()
}

fn debtor() -> Account {
    AccountBuilder::new("Max Mustermann", "DE87123456781234567890")
        .address("Hauptstr. 1", "Berlin", "DE")
        .build()
}

fn debit_transaction(amount: rust_decimal::Decimal) -> Transaction {
    TransactionBuilder::new(PaymentMethod::DirectDebit, debtor(), amount)
        .end_to_end_id("INV-4711")
        .mandate("MANDATE-1", date(2024, 1, 10))
        .remittance_info("Invoice 4711")
        .build()
}

/// Build a complete one-batch direct-debit document for the given format.
fn debit_document(format: PainFormat) -> Document {
    let mut doc = DocumentBuilder::new(format, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(format, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(debit_transaction(dec!(10.50)))
        .expect("attach tx");
    batch
        .add_transaction(debit_transaction(dec!(2.25)))
        .expect("attach tx");
    doc
}

/// Build a complete one-batch credit-transfer document for the given format.
fn transfer_document(format: PainFormat) -> Document {
    let mut doc = DocumentBuilder::new(format, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(format, creditor())
                .requested_execution_date(date(2024, 7, 1))
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(
            TransactionBuilder::new(PaymentMethod::Transfer, debtor(), dec!(1500.00))
                .end_to_end_id("SALARY-07")
                .remittance_info("Salary July")
                .build(),
        )
        .expect("attach tx");
    doc
}

/// The content between `<tag>` and `</tag>`, for placement assertions.
fn section<'a>(xml: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open).unwrap_or_else(|| panic!("missing {open}"));
    let end = xml.find(&close).unwrap_or_else(|| panic!("missing {close}"));
    &xml[start..end]
}

// --- Envelope ---

#[test]
fn declaration_and_namespaces() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("xmlns=\"urn:iso:std:iso:20022:tech:xsd:pain.008.001.02\""));
    assert!(xml.contains(
        "xsi:schemaLocation=\"urn:iso:std:iso:20022:tech:xsd:pain.008.001.02 pain.008.001.02.xsd\""
    ));
    assert!(xml.contains("<CstmrDrctDbtInitn>"));
}

#[test]
fn custom_encoding_in_declaration() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    doc.xml_encoding = "ISO-8859-1".into();
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));
}

#[test]
fn version_2_formats_keep_their_root_name() {
    let mut doc = debit_document(PainFormat::Pain008_001_01);
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.contains("<pain.008.001.01>"));
    assert!(xml.contains("xmlns=\"urn:iso:std:iso:20022:tech:xsd:pain.008.001.01\""));
}

// --- Version gating ---

#[test]
fn version_2_aggregates_live_in_group_header() {
    let mut doc = debit_document(PainFormat::Pain008_001_01);
    let xml = pain::to_xml(&mut doc).expect("render");
    let header = section(&xml, "GrpHdr");
    let batch = section(&xml, "PmtInf");
    for node in ["<BtchBookg>", "<Grpg>", "<NbOfTxs>", "<CtrlSum>"] {
        assert!(header.contains(node), "{node} missing in GrpHdr");
        assert!(!batch.contains(node), "{node} must not be in PmtInf");
    }
    assert!(header.contains("<Grpg>MIXD</Grpg>"));
}

#[test]
fn version_3_aggregates_live_in_payment_info() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    let header = section(&xml, "GrpHdr");
    let batch = section(&xml, "PmtInf");
    for node in ["<BtchBookg>", "<Grpg>", "<NbOfTxs>", "<CtrlSum>"] {
        assert!(!header.contains(node), "{node} must not be in GrpHdr");
        assert!(batch.contains(node), "{node} missing in PmtInf");
    }
}

#[test]
fn transfer_version_gating_matches_debit() {
    let mut v2 = transfer_document(PainFormat::Pain001_001_02);
    let xml = pain::to_xml(&mut v2).expect("render");
    assert!(section(&xml, "GrpHdr").contains("<Grpg>"));

    let mut v3 = transfer_document(PainFormat::Pain001_001_03);
    let xml = pain::to_xml(&mut v3).expect("render");
    assert!(!section(&xml, "GrpHdr").contains("<Grpg>"));
    assert!(section(&xml, "PmtInf").contains("<Grpg>"));
}

// --- Aggregates ---

#[test]
fn control_sum_and_count_are_recomputed() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    doc.group_header.control_sum = dec!(0.01); // overwritten by normalization
    let xml = pain::to_xml(&mut doc).expect("render");
    let batch = section(&xml, "PmtInf");
    assert!(batch.contains("<NbOfTxs>2</NbOfTxs>"));
    assert!(batch.contains("<CtrlSum>12.75</CtrlSum>"));
}

// --- Group header ---

#[test]
fn group_header_basics() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    let header = section(&xml, "GrpHdr");
    assert!(header.contains("<MsgId>MSG1</MsgId>"));
    assert!(header.contains("<CreDtTm>2024-06-15T10:30:00</CreDtTm>"));
    assert!(header.contains("<Nm>ACME GmbH</Nm>"));
    assert!(!header.contains("<OrgId>"));
}

#[test]
fn national_initiator_codes() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .initiator_id("0468651441")
        .initiator_cuc("ABCDE")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(debit_transaction(dec!(1.00)))
        .expect("attach tx");

    let xml = pain::to_xml(&mut doc).expect("render");
    let header = section(&xml, "GrpHdr");
    assert!(header.contains("<OrgId>"));
    assert!(header.contains("<Id>0468651441</Id>"));
    assert!(header.contains("<Id>ABCDE</Id>"));
    assert!(header.contains("<Issr>CBI</Issr>"));
}

// --- Roles ---

#[test]
fn direct_debit_batch_is_creditor_transactions_are_debtor() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");

    let batch = section(&xml, "PmtInf");
    assert!(batch.contains("<Cdtr>"));
    assert!(batch.contains("<CdtrAcct>"));
    assert!(batch.contains("<CdtrSchmeId>"));
    assert!(batch.contains("<PmtMtd>DD</PmtMtd>"));
    assert!(batch.contains("<ReqdColltnDt>2024-07-01</ReqdColltnDt>"));

    let tx = section(&xml, "DrctDbtTxInf");
    assert!(tx.contains("<Dbtr>"));
    assert!(tx.contains("<DbtrAcct>"));
    assert!(tx.contains("<DbtrAgt>"));
    assert!(tx.contains("<IBAN>DE87123456781234567890</IBAN>"));
}

#[test]
fn transfer_batch_is_debtor_transactions_are_creditor() {
    let mut doc = transfer_document(PainFormat::Pain001_001_03);
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.contains("<CstmrCdtTrfInitn>"));

    let batch = section(&xml, "PmtInf");
    assert!(batch.contains("<Dbtr>"));
    assert!(batch.contains("<DbtrAcct>"));
    assert!(batch.contains("<PmtMtd>TRF</PmtMtd>"));
    assert!(batch.contains("<ReqdExctnDt>2024-07-01</ReqdExctnDt>"));
    assert!(!batch.contains("<CdtrSchmeId>"));
    assert!(!batch.contains("<SeqTp>"));

    let tx = section(&xml, "CdtTrfTxInf");
    assert!(tx.contains("<Cdtr>"));
    assert!(tx.contains("<CdtrAcct>"));
    // transfer amounts nest under Amt
    assert!(tx.contains("<Amt>"));
    assert!(tx.contains("<InstdAmt Ccy=\"EUR\">1500.00</InstdAmt>"));
    assert!(tx.contains("<EndToEndId>SALARY-07</EndToEndId>"));
}

// --- Transactions ---

#[test]
fn direct_debit_transaction_nodes() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    let tx = section(&xml, "DrctDbtTxInf");
    assert!(tx.contains("<InstrId>MSG1.0.0</InstrId>"));
    assert!(tx.contains("<EndToEndId>INV-4711</EndToEndId>"));
    assert!(tx.contains("<InstdAmt Ccy=\"EUR\">10.50</InstdAmt>"));
    assert!(tx.contains("<MndtId>MANDATE-1</MndtId>"));
    assert!(tx.contains("<DtOfSgntr>2024-01-10</DtOfSgntr>"));
    assert!(tx.contains("<AmdmntInd>false</AmdmntInd>"));
    assert!(tx.contains("<Ustrd>Invoice 4711</Ustrd>"));
}

#[test]
fn amendment_note_flips_indicator() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(
            TransactionBuilder::new(PaymentMethod::DirectDebit, debtor(), dec!(3.00))
                .end_to_end_id("INV-1")
                .mandate("MANDATE-1", date(2024, 1, 10))
                .amendment("debtor account changed")
                .build(),
        )
        .expect("attach tx");

    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.contains("<AmdmntInd>true</AmdmntInd>"));
    assert!(xml.contains("<AmdmntInfDtls>debtor account changed</AmdmntInfDtls>"));
}

#[test]
fn purpose_code_is_optional() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(!xml.contains("<Purp>"));

    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(
            TransactionBuilder::new(PaymentMethod::DirectDebit, debtor(), dec!(3.00))
                .end_to_end_id("INV-1")
                .mandate("MANDATE-1", date(2024, 1, 10))
                .purpose_code("OTHR")
                .build(),
        )
        .expect("attach tx");
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.contains("<Purp>"));
    assert!(xml.contains("<Cd>OTHR</Cd>"));
}

// --- Agent and address rendering ---

#[test]
fn missing_bic_renders_notprovided_placeholder() {
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    // debtor has no BIC: agent node present, placeholder inside
    let tx = section(&xml, "DrctDbtTxInf");
    assert!(tx.contains("<DbtrAgt>"));
    assert!(tx.contains("<Id>NOTPROVIDED</Id>"));
    // creditor has a BIC
    let batch = section(&xml, "PmtInf");
    assert!(batch.contains("<BIC>COBADEFFXXX</BIC>"));
}

#[test]
fn clearing_member_id_renders_next_to_bic() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let owner = AccountBuilder::new("ACME GmbH", "DE89370400440532013000")
        .bic("COBADEFFXXX")
        .member_id("37040044")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, owner)
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(debit_transaction(dec!(1.00)))
        .expect("attach tx");
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(xml.contains("<ClrSysMmbId>"));
    assert!(xml.contains("<MmbId>37040044</MmbId>"));
}

#[test]
fn postal_address_is_all_or_nothing() {
    // full address renders under the transaction party
    let mut doc = debit_document(PainFormat::Pain008_001_02);
    let xml = pain::to_xml(&mut doc).expect("render");
    let tx = section(&xml, "DrctDbtTxInf");
    assert!(tx.contains("<PstlAdr>"));
    assert!(tx.contains("<Ctry>DE</Ctry>"));
    assert!(tx.contains("<AdrLine>Hauptstr. 1</AdrLine>"));
    assert!(tx.contains("<AdrLine>Berlin</AdrLine>"));

    // a partial address renders nothing
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    let mut partial = debtor();
    partial.city = None;
    batch
        .add_transaction(
            TransactionBuilder::new(PaymentMethod::DirectDebit, partial, dec!(1.00))
                .end_to_end_id("INV-1")
                .mandate("MANDATE-1", date(2024, 1, 10))
                .build(),
        )
        .expect("attach tx");
    let xml = pain::to_xml(&mut doc).expect("render");
    assert!(!xml.contains("<PstlAdr>"));
}

// --- Validation at render time ---

#[test]
fn zero_amount_aborts_render() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    batch
        .add_transaction(debit_transaction(dec!(0.00)))
        .expect("attach tx");
    let err = pain::to_xml(&mut doc).unwrap_err();
    assert!(matches!(err, SepaError::Validation(ref v) if v.field == "amount"));
}

#[test]
fn empty_batch_aborts_render() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    doc.add_payment_info(
        PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
            .collection_date(date(2024, 7, 1))
            .creditor_id("DE98ZZZ09999999999")
            .build(),
    )
    .expect("attach batch");
    let err = pain::to_xml(&mut doc).unwrap_err();
    assert!(matches!(err, SepaError::Validation(ref v) if v.field == "transactions"));
}

#[test]
fn bic_country_mismatch_aborts_render_with_field_list() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    // Dutch BIC against a German IBAN
    let mismatched = AccountBuilder::new("Max Mustermann", "DE87123456781234567890")
        .bic("ABNANL2AXXX")
        .build();
    batch
        .add_transaction(
            TransactionBuilder::new(PaymentMethod::DirectDebit, mismatched, dec!(1.00))
                .end_to_end_id("INV-1")
                .mandate("MANDATE-1", date(2024, 1, 10))
                .build(),
        )
        .expect("attach tx");
    let err = pain::to_xml(&mut doc).unwrap_err();
    match err {
        SepaError::Counterparty(cp) => {
            assert_eq!(cp.name, "Max Mustermann");
            assert!(cp.invalid_fields.contains(&"IBAN/BIC".to_string()));
        }
        other => panic!("expected counterparty error, got {other:?}"),
    }
}

#[test]
fn disabled_validation_renders_malformed_content_verbatim() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .validation(false)
        .build();

    // an empty batch plus a zero-amount transaction on a mismatched BIC
    doc.add_payment_info(
        PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
            .collection_date(date(2024, 7, 1))
            .creditor_id("DE98ZZZ09999999999")
            .build(),
    )
    .expect("attach batch");
    let batch = doc
        .add_payment_info(
            PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                .collection_date(date(2024, 7, 1))
                .creditor_id("DE98ZZZ09999999999")
                .build(),
        )
        .expect("attach batch");
    let mismatched = AccountBuilder::new("Max Mustermann", "DE87123456781234567890")
        .bic("ABNANL2AXXX")
        .build();
    batch
        .add_transaction(
            TransactionBuilder::new(PaymentMethod::DirectDebit, mismatched, dec!(0.00))
                .end_to_end_id("INV-1")
                .mandate("MANDATE-1", date(2024, 1, 10))
                .build(),
        )
        .expect("attach tx");

    let xml = pain::to_xml(&mut doc).expect("render must not validate");
    assert!(xml.contains("<NbOfTxs>0</NbOfTxs>"));
    assert!(xml.contains("<InstdAmt Ccy=\"EUR\">0.00</InstdAmt>"));
    assert!(xml.contains("<BIC>ABNANL2AXXX</BIC>"));
}

// --- Multiple batches ---

#[test]
fn one_pmtinf_per_batch_in_document_order() {
    let mut doc = DocumentBuilder::new(PainFormat::Pain008_001_02, "MSG1", created())
        .initiator("ACME GmbH")
        .build();
    for _ in 0..3 {
        let batch = doc
            .add_payment_info(
                PaymentInfoBuilder::new(PainFormat::Pain008_001_02, creditor())
                    .collection_date(date(2024, 7, 1))
                    .creditor_id("DE98ZZZ09999999999")
                    .build(),
            )
            .expect("attach batch");
        batch
            .add_transaction(debit_transaction(dec!(1.00)))
            .expect("attach tx");
    }
    let xml = pain::to_xml(&mut doc).expect("render");
    assert_eq!(xml.matches("<PmtInf>").count(), 3);
    let first = xml.find("<PmtInfId>MSG1.0</PmtInfId>").expect("first batch");
    let second = xml.find("<PmtInfId>MSG1.1</PmtInfId>").expect("second batch");
    let third = xml.find("<PmtInfId>MSG1.2</PmtInfId>").expect("third batch");
    assert!(first < second && second < third);
}
