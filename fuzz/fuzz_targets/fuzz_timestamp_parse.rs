#![no_main]
use libfuzzer_sys::fuzz_target;
use pbac::{Timestamp, TimestampField};

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // Anything that parses must print back to the same text
    if let Ok(ts) = Timestamp::parse(s, TimestampField::CurrentTime) {
        assert_eq!(ts.to_string(), s);
    }
});
