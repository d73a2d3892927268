//! Fuzz testing for payload extraction.
//!
//! Feeds arbitrary bytes to the body-hash extractor and arbitrary header
//! values to the header schemes. Extraction must never panic; it either
//! yields a payload or a `PayloadError`.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_payload -- -max_total_time=60
//! ```

#![no_main]

use axum::http::{HeaderMap, HeaderValue};
use libfuzzer_sys::fuzz_target;
use tnppt_gate::auth::payload::{RawRequest, Scheme, extract};

fuzz_target!(|data: &[u8]| {
    let empty = HeaderMap::new();
    let _ = extract(Scheme::BodyHash, RawRequest::new(&empty, data));

    if let Ok(value) = HeaderValue::from_bytes(data) {
        let mut headers = HeaderMap::new();
        headers.insert("hmac_login", value.clone());
        headers.insert("hmac_hash", value.clone());
        headers.insert("hmac_time", value.clone());
        headers.insert("api_key", value);

        let _ = extract(Scheme::HmacHeader, RawRequest::headers_only(&headers));
        let _ = extract(Scheme::ApiKeyHeader, RawRequest::headers_only(&headers));
    }
});
