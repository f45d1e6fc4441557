#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic — failed validation is fine, panics are bugs.
        let _ = zahlung::core::iban::validate_iban(s);
        let fixed = zahlung::core::iban::checksum_iban(s);
        let _ = zahlung::core::iban::validate_iban(&fixed);
    }
});
