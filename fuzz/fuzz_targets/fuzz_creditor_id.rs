#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic — failed validation is fine, panics are bugs.
        let _ = zahlung::core::iban::validate_creditor_id(s);
        let fixed = zahlung::core::iban::checksum_creditor_id(s);
        let _ = zahlung::core::iban::validate_creditor_id(&fixed);
    }
});
