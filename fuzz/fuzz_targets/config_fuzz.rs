//! Fuzz test for client configuration parsing
//!
//! Arbitrary TOML must either parse into a config whose validation returns
//! normally, or fail with a `ConfigError`.
//!
//! Run with: cargo +nightly fuzz run config_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use questboard_client::config::ClientConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(config) = ClientConfig::from_toml(input) {
            if config.validate().is_ok() {
                assert!(config.request_timeout_ms > 0);
                assert!(!config.auth.api_key.trim().is_empty());
            }
        }
    }
});
