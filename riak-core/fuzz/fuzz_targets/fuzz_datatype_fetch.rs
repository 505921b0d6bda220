#![no_main]

use libfuzzer_sys::fuzz_target;
use riak_core::core_crdt::{DtFetchConverter, DtUpdateConverter};
use riak_core::ResponseConverter;

fuzz_target!(|data: &[u8]| {
    // Arbitrary payloads must decode or fail cleanly, never panic
    if let Ok(fetched) = DtFetchConverter::with_max_depth(8).convert(81, data) {
        let _ = fetched.into_any(8);
    }
    let _ = DtUpdateConverter::new().with_max_depth(8).convert(83, data);
});
