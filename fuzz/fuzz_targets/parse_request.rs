#![no_main]
use libfuzzer_sys::fuzz_target;
use tsrv::{parse, ParseOutcome};

fuzz_target!(|data: &[u8]| {
    if let ParseOutcome::Complete { request, leftover } = parse(data) {
        assert!(leftover <= data.len());
        assert!(!request.protocol.is_empty());
        request.headers().count();
    }
});
