#![no_main]

use libfuzzer_sys::fuzz_target;
use riak_core::ProtocolMessage;

fuzz_target!(|data: &[u8]| {
    // Small cap so oversized declared lengths are exercised too
    if let Ok(messages) = ProtocolMessage::decode_frames(data, 4096) {
        for message in messages {
            // Re-encoding a decoded frame must give the same bytes back
            let frame = message.encode_frame().unwrap();
            let (again, rest) = ProtocolMessage::decode_frame(&frame, 4096).unwrap();
            assert!(rest.is_empty());
            assert_eq!(again, message);
        }
    }
});
