//! Fuzz test for REST response decoding
//!
//! Feeds arbitrary bodies and status codes to `decode_body`, which must
//! return rows or a `QueryError` without panicking.
//!
//! Run with: cargo +nightly fuzz run response_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use questboard_client::api_client::decode_body;
use reqwest::StatusCode;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let code = 100 + (u16::from_le_bytes([data[0], data[1]]) % 500);
    let Ok(status) = StatusCode::from_u16(code) else {
        return;
    };
    if let Ok(body) = std::str::from_utf8(&data[2..]) {
        match decode_body("user_activity", status, body) {
            Ok(_) => assert!(status.is_success(), "rows decoded from a {} response", status),
            Err(err) => {
                // A present message is never blank
                if let Some(message) = err.message() {
                    assert!(!message.trim().is_empty());
                }
            }
        }
    }
});
