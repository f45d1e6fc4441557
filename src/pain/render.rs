use crate::core::*;

use super::xml_utils::{XmlWriter, format_amount};
use super::{AGENT_NOT_PROVIDED, XSI_NAMESPACE};

/// Document-wide state threaded through the per-entity render functions.
struct RenderCtx {
    version: u8,
    grouping: Grouping,
    validate: bool,
}

/// Render the document to a pain XML string.
///
/// Runs normalization first (derived aggregates are recomputed, never
/// trusted), then renders entity by entity, validating each one right
/// before its subtree is written unless the document config disables
/// validation. The first failing entity aborts the whole render; no
/// partial output is returned.
///
/// The `&mut` receiver makes a render exclusive: the document's
/// configuration cannot change while a render is in progress, and config
/// changes take effect on the next call.
pub fn to_xml(document: &mut Document) -> Result<String, SepaError> {
    document.normalize();

    let format = document.format();
    let ctx = RenderCtx {
        version: format.schema_version(),
        grouping: document.group_header.grouping,
        validate: document.config.validation,
    };
    let namespace = format.namespace();
    let schema_location = format!("{namespace} {}.xsd", format.name());

    let mut w = XmlWriter::new(&document.xml_version, &document.xml_encoding)?;
    w.start_element_with_attrs(
        "Document",
        &[
            ("xmlns", namespace.as_str()),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:schemaLocation", schema_location.as_str()),
        ],
    )?;
    w.start_element(format.root_element())?;

    write_group_header(&mut w, &document.group_header, &ctx)?;
    for payment_info in document.payment_infos() {
        write_payment_info(&mut w, payment_info, &ctx)?;
    }

    w.end_element(format.root_element())?;
    w.end_element("Document")?;
    w.into_string()
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn write_group_header(
    w: &mut XmlWriter,
    header: &GroupHeader,
    ctx: &RenderCtx,
) -> Result<(), SepaError> {
    w.start_element("GrpHdr")?;
    w.text_element("MsgId", &header.message_id)?;
    w.text_element(
        "CreDtTm",
        &header.created.format("%Y-%m-%dT%H:%M:%S").to_string(),
    )?;

    // Version-2 schemas carry the batch aggregates at message level;
    // version-3 schemas move them into each PmtInf.
    if ctx.version == 2 {
        w.text_element("BtchBookg", bool_text(header.batch_booking))?;
        w.text_element("NbOfTxs", &header.transaction_count.to_string())?;
        w.text_element("CtrlSum", &format_amount(header.control_sum))?;
        w.text_element("Grpg", ctx.grouping.code())?;
    }

    w.start_element("InitgPty")?;
    w.text_element("Nm", &header.initiator_name)?;
    if header.initiator_id.is_some() || header.initiator_cuc.is_some() {
        w.start_element("Id")?;
        w.start_element("OrgId")?;
        if let Some(id) = &header.initiator_id {
            w.nested_text_element(&["Othr", "Id"], id)?;
        }
        if let Some(cuc) = &header.initiator_cuc {
            w.start_element("Othr")?;
            w.text_element("Id", cuc)?;
            w.text_element("Issr", "CBI")?;
            w.end_element("Othr")?;
        }
        w.end_element("OrgId")?;
        w.end_element("Id")?;
    }
    w.end_element("InitgPty")?;

    w.end_element("GrpHdr")?;
    Ok(())
}

fn write_payment_info(
    w: &mut XmlWriter,
    payment_info: &PaymentInfo,
    ctx: &RenderCtx,
) -> Result<(), SepaError> {
    if ctx.validate {
        validate_payment_info(payment_info)?;
    }

    w.start_element("PmtInf")?;
    w.text_element("PmtInfId", &payment_info.id)?;
    w.text_element("PmtMtd", payment_info.method().code())?;

    if ctx.version == 3 {
        w.text_element("BtchBookg", bool_text(payment_info.batch_booking))?;
        w.text_element("NbOfTxs", &payment_info.transaction_count().to_string())?;
        w.text_element("CtrlSum", &format_amount(payment_info.control_sum))?;
        w.text_element("Grpg", ctx.grouping.code())?;
    }

    w.start_element("PmtTpInf")?;
    w.opt_text_element(
        "InstrPrty",
        payment_info.instruction_priority.map(|p| p.code()),
    )?;
    w.nested_text_element(&["SvcLvl", "Cd"], "SEPA")?;
    if let Some(code) = &payment_info.category_purpose {
        w.nested_text_element(&["CtgyPurp", "Cd"], code)?;
    }
    if payment_info.method() == PaymentMethod::DirectDebit {
        w.nested_text_element(&["LclInstrm", "Cd"], payment_info.local_instrument.code())?;
        w.text_element("SeqTp", payment_info.sequence_type.code())?;
    }
    w.end_element("PmtTpInf")?;

    match payment_info.method() {
        PaymentMethod::DirectDebit => {
            w.opt_text_element(
                "ReqdColltnDt",
                payment_info
                    .collection_date
                    .map(|d| d.to_string())
                    .as_deref(),
            )?;
            write_party(w, "Cdtr", &payment_info.owner)?;
            w.nested_text_element(&["CdtrAcct", "Id", "IBAN"], &payment_info.owner.iban)?;
            write_agent(w, "CdtrAgt", &payment_info.owner)?;
            w.text_element("ChrgBr", "SLEV")?;
            if let Some(creditor_id) = &payment_info.creditor_id {
                w.start_element("CdtrSchmeId")?;
                w.start_element("Id")?;
                w.start_element("PrvtId")?;
                w.start_element("Othr")?;
                w.text_element("Id", creditor_id)?;
                w.nested_text_element(&["SchmeNm", "Prtry"], "SEPA")?;
                w.end_element("Othr")?;
                w.end_element("PrvtId")?;
                w.end_element("Id")?;
                w.end_element("CdtrSchmeId")?;
            }
        }
        PaymentMethod::Transfer => {
            w.opt_text_element(
                "ReqdExctnDt",
                payment_info
                    .requested_execution_date
                    .map(|d| d.to_string())
                    .as_deref(),
            )?;
            write_party(w, "Dbtr", &payment_info.owner)?;
            w.nested_text_element(&["DbtrAcct", "Id", "IBAN"], &payment_info.owner.iban)?;
            write_agent(w, "DbtrAgt", &payment_info.owner)?;
            w.text_element("ChrgBr", "SLEV")?;
        }
    }

    for transaction in payment_info.transactions() {
        write_transaction(w, transaction, ctx)?;
    }

    w.end_element("PmtInf")?;
    Ok(())
}

fn write_transaction(
    w: &mut XmlWriter,
    transaction: &Transaction,
    ctx: &RenderCtx,
) -> Result<(), SepaError> {
    if ctx.validate {
        validate_transaction(transaction)?;
    }

    match transaction.method() {
        PaymentMethod::DirectDebit => {
            w.start_element("DrctDbtTxInf")?;

            w.start_element("PmtId")?;
            w.text_element("InstrId", &transaction.id)?;
            w.text_element("EndToEndId", &transaction.end_to_end_id)?;
            w.end_element("PmtId")?;

            w.amount_element("InstdAmt", transaction.amount, &transaction.currency)?;

            w.start_element("DrctDbtTx")?;
            w.start_element("MndtRltdInf")?;
            w.opt_text_element("MndtId", transaction.mandate_id.as_deref())?;
            w.opt_text_element(
                "DtOfSgntr",
                transaction
                    .mandate_signature_date
                    .map(|d| d.to_string())
                    .as_deref(),
            )?;
            match &transaction.amendment {
                Some(note) => {
                    w.text_element("AmdmntInd", "true")?;
                    w.text_element("AmdmntInfDtls", note)?;
                }
                None => {
                    w.text_element("AmdmntInd", "false")?;
                }
            }
            w.end_element("MndtRltdInf")?;
            w.end_element("DrctDbtTx")?;

            write_agent(w, "DbtrAgt", &transaction.counterparty)?;
            write_party(w, "Dbtr", &transaction.counterparty)?;
            w.nested_text_element(&["DbtrAcct", "Id", "IBAN"], &transaction.counterparty.iban)?;

            if let Some(code) = &transaction.purpose_code {
                w.nested_text_element(&["Purp", "Cd"], code)?;
            }
            w.nested_text_element(&["RmtInf", "Ustrd"], &transaction.remittance_info)?;

            w.end_element("DrctDbtTxInf")?;
        }
        PaymentMethod::Transfer => {
            w.start_element("CdtTrfTxInf")?;

            w.start_element("PmtId")?;
            w.text_element("InstrId", &transaction.id)?;
            w.text_element("EndToEndId", &transaction.end_to_end_id)?;
            w.end_element("PmtId")?;

            w.start_element("Amt")?;
            w.amount_element("InstdAmt", transaction.amount, &transaction.currency)?;
            w.end_element("Amt")?;

            write_agent(w, "CdtrAgt", &transaction.counterparty)?;
            write_party(w, "Cdtr", &transaction.counterparty)?;
            w.nested_text_element(&["CdtrAcct", "Id", "IBAN"], &transaction.counterparty.iban)?;

            if let Some(code) = &transaction.purpose_code {
                w.nested_text_element(&["Purp", "Cd"], code)?;
            }
            w.nested_text_element(&["RmtInf", "Ustrd"], &transaction.remittance_info)?;

            w.end_element("CdtTrfTxInf")?;
        }
    }
    Ok(())
}

/// Party node: name plus the postal address, which renders only when
/// street, city and country are all present — never partially.
fn write_party(w: &mut XmlWriter, tag: &str, account: &Account) -> Result<(), SepaError> {
    w.start_element(tag)?;
    w.text_element("Nm", &account.name)?;
    if let (Some(street), Some(city), Some(country)) =
        (&account.street, &account.city, &account.country)
    {
        w.start_element("PstlAdr")?;
        w.text_element("Ctry", country)?;
        w.text_element("AdrLine", street)?;
        w.text_element("AdrLine", city)?;
        w.end_element("PstlAdr")?;
    }
    w.end_element(tag)?;
    Ok(())
}

/// Agent node: BIC (plus clearing member id) when known, otherwise the
/// NOTPROVIDED placeholder under `Othr/Id`.
fn write_agent(w: &mut XmlWriter, tag: &str, account: &Account) -> Result<(), SepaError> {
    w.start_element(tag)?;
    w.start_element("FinInstnId")?;
    match account.bic.as_deref() {
        Some(bic) if !bic.is_empty() => {
            w.text_element("BIC", bic)?;
            if let Some(member_id) = &account.member_id {
                w.nested_text_element(&["ClrSysMmbId", "MmbId"], member_id)?;
            }
        }
        _ => {
            w.nested_text_element(&["Othr", "Id"], AGENT_NOT_PROVIDED)?;
        }
    }
    w.end_element("FinInstnId")?;
    w.end_element(tag)?;
    Ok(())
}
