//! Fuzz testing for the credential-bearing parsers.
//!
//! Everything here sits on the unauthenticated request path, so it must
//! never panic, whatever bytes arrive:
//!
//! - Cookie header parsing (splitting, trimming, percent-decoding)
//! - Session token validation (delimiter, timestamp, signature)
//! - Action token verification (token/timestamp pair)
//! - Login field validation
//!
//! # Running the Fuzz Tests
//!
//! ```bash
//! # Install cargo-fuzz (requires nightly)
//! cargo +nightly install cargo-fuzz
//!
//! # Run the parsing fuzz target
//! cargo +nightly fuzz run fuzz_parsing
//!
//! # Run with a time limit (e.g., 60 seconds)
//! cargo +nightly fuzz run fuzz_parsing -- -max_total_time=60
//! ```

#![no_main]

use std::sync::Arc;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use prosepolish::cookies::parse_cookie_header;
use prosepolish::secret::SigningSecret;
use prosepolish::tokens::{RequestTokenCodec, SessionTokenCodec};
use prosepolish::validation::{validate_login_fields, validate_rewrite_text};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Cookie header parsing (shouldn't panic)
        let _ = parse_cookie_header(s);

        // Token validation fails closed, never panics
        let secret = Arc::new(SigningSecret::from_bytes(b"fuzz-secret".to_vec()));
        let sessions = SessionTokenCodec::new(secret.clone(), Duration::from_secs(3600));
        let _ = sessions.is_valid(s);

        let actions = RequestTokenCodec::new(secret, Duration::from_secs(300));
        let _ = actions.verify(s, 0);
        let _ = actions.verify(s, i64::MAX);
        let _ = actions.verify(s, i64::MIN);

        // Input validation returns Ok or Err, never panics
        let _ = validate_login_fields(s, s);
        let _ = validate_rewrite_text(s, 1000);
    }
});
