//! Decode metrics.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! application installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram};

pub const DECODE_TOTAL: &str = "riak_decode_total";
pub const DATATYPE_CONVERT_TOTAL: &str = "riak_datatype_convert_total";
pub const DECODE_PAYLOAD_BYTES: &str = "riak_decode_payload_bytes";

/// Register metric descriptions (call once at startup)
pub fn describe_metrics() {
    describe_counter!(
        DECODE_TOTAL,
        "Responses decoded, labeled by converter and outcome (ok or error kind)"
    );
    describe_counter!(
        DATATYPE_CONVERT_TOTAL,
        "CRDT elements converted to datatypes, labeled by kind and outcome"
    );
    describe_histogram!(DECODE_PAYLOAD_BYTES, "Payload size of decoded responses in bytes");
}

pub fn record_decode(converter: &'static str, outcome: &'static str, payload_len: usize) {
    counter!(DECODE_TOTAL, "converter" => converter, "outcome" => outcome).increment(1);
    histogram!(DECODE_PAYLOAD_BYTES, "converter" => converter).record(payload_len as f64);
}

pub fn record_datatype(kind: &'static str, outcome: &'static str) {
    counter!(DATATYPE_CONVERT_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_decode("fetch_object", "ok", 128);
        record_datatype("counter", "type_mismatch");
    }
}
