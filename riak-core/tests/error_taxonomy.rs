//! Every failure mode surfaces as the right DecodeError variant, both
//! synchronously and through the deferred path.

mod common;

use common::*;
use prost::Message;
use riak_core::config::Config;
use riak_core::core_crdt::{DtFetchConverter, DtUpdateConverter, MapConverter, MAX_SUPPORTED_MAP_DEPTH};
use riak_core::core_proto::{
    pb, DeleteConverter, FetchObjectConverter, PingConverter, ServerInfoConverter, StoreObjectConverter,
    DEFAULT_MAX_FRAME_SIZE,
};
use riak_core::*;
use std::fmt::Debug;

/// Every code but `expected` and the error frame is UnknownCode
fn assert_rejects_other_codes<C>(converter: &C, expected: MessageCode)
where
    C: ResponseConverter,
    C::Output: Debug,
{
    for code in 0..=u8::MAX {
        if code == expected.as_u8() || code == MessageCode::ErrorResp.as_u8() {
            continue;
        }
        assert_eq!(
            converter.convert(code, &[]).unwrap_err(),
            DecodeError::UnknownCode { code, expected },
            "code {} accepted by the {} converter",
            code,
            expected
        );
    }
}

#[test]
fn unknown_code_for_converter() {
    let message = ProtocolMessage::new(MessageCode::GetResp.as_u8(), Vec::new());
    let err = message.convert_response(&DtFetchConverter::new()).unwrap_err();
    assert_eq!(err, DecodeError::UnknownCode { code: 10, expected: MessageCode::DtFetchResp });

    let err = PingConverter.convert(200, &[]).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownCode { code: 200, .. }));
}

#[test]
fn every_foreign_code_is_unknown() {
    assert_rejects_other_codes(&PingConverter, MessageCode::PingResp);
    assert_rejects_other_codes(&ServerInfoConverter, MessageCode::GetServerInfoResp);
    assert_rejects_other_codes(&FetchObjectConverter, MessageCode::GetResp);
    assert_rejects_other_codes(&StoreObjectConverter, MessageCode::PutResp);
    assert_rejects_other_codes(&DeleteConverter, MessageCode::DelResp);
    assert_rejects_other_codes(&DtFetchConverter::new(), MessageCode::DtFetchResp);
    assert_rejects_other_codes(&DtUpdateConverter::new(), MessageCode::DtUpdateResp);
}

#[test]
fn protobuf_length_prefix_overrun_is_malformed() {
    // field 3 (value), declared length 50, 2 bytes present
    let payload = [0x10, 0x01, 0x1a, 0x32, 0x08, 0x02];
    let err = DtFetchConverter::new().convert(81, &payload).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { code: 81, .. }));
}

#[test]
fn frame_length_prefix_overrun_is_malformed() {
    let frame = counter_message(1).encode_frame().unwrap();
    let truncated = &frame[..frame.len() - 2];
    let err = ProtocolMessage::decode_frame(truncated, DEFAULT_MAX_FRAME_SIZE).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { code: 81, .. }));
}

#[test]
fn truncated_header_is_malformed_frame() {
    let err = ProtocolMessage::decode_frame(&[0, 0], DEFAULT_MAX_FRAME_SIZE).unwrap_err();
    assert_eq!(err.kind(), "malformed_frame");
}

#[test]
fn invalid_enum_is_malformed() {
    let payload = pb::DtFetchResp { context: None, data_type: 9, value: None }.encode_to_vec();
    let err = DtFetchConverter::new().convert(81, &payload).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { .. }));

    let mut bad_entry = counter_entry("x", 1);
    bad_entry.field.as_mut().unwrap().field_type = 0;
    let err = map_message(vec![bad_entry]).convert_response(&DtFetchConverter::new()).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { .. }));
}

#[test]
fn value_disagreeing_with_declared_type_is_malformed() {
    let value = pb::DtValue { set_value: vec![b"a".to_vec()], ..Default::default() };
    let payload = fetch_payload(pb::dt_fetch_resp::DataType::Counter, Some(value));
    let err = DtFetchConverter::new().convert(81, &payload).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedPayload { code: 81, .. }));
}

#[test]
fn wrong_family_is_type_mismatch() {
    let fetched = counter_message(5).convert_response(&DtFetchConverter::new()).unwrap();
    let err = fetched.into_datatype(&as_set()).unwrap_err();
    assert_eq!(err, DecodeError::TypeMismatch { expected: CrdtType::Set, found: CrdtType::Counter });

    let err = as_map().convert(CrdtElement::flag(true)).unwrap_err();
    assert_eq!(err, DecodeError::TypeMismatch { expected: CrdtType::Map, found: CrdtType::Flag });
}

#[test]
fn deep_nesting_is_rejected() {
    let message = map_message(nested_entries(10));
    let err = message.convert_response(&DtFetchConverter::with_max_depth(9)).unwrap_err();
    assert_eq!(err, DecodeError::NestingTooDeep { limit: 9 });

    let fetched = message.convert_response(&DtFetchConverter::with_max_depth(10)).unwrap();
    let err = fetched.into_datatype(&MapConverter::with_max_depth(4)).unwrap_err();
    assert_eq!(err, DecodeError::NestingTooDeep { limit: 4 });
}

#[test]
fn deepest_supported_map_decodes() {
    let message = map_message(nested_entries(MAX_SUPPORTED_MAP_DEPTH));
    let converter = DtFetchConverter::with_max_depth(MAX_SUPPORTED_MAP_DEPTH);

    let map = message
        .convert_response(&converter)
        .unwrap()
        .into_datatype(&MapConverter::with_max_depth(MAX_SUPPORTED_MAP_DEPTH))
        .unwrap();
    assert!(map.is_some());
}

#[test]
fn nesting_past_protobuf_limit_is_too_deep() {
    // deeper than prost will decode at all
    let message = map_message(nested_entries(120));

    let err = message.convert_response(&DtFetchConverter::with_max_depth(200)).unwrap_err();
    assert_eq!(err, DecodeError::NestingTooDeep { limit: MAX_SUPPORTED_MAP_DEPTH });

    let err = message.convert_response(&Config::default().decode.fetch_converter()).unwrap_err();
    assert_eq!(err, DecodeError::NestingTooDeep { limit: 32 });

    let update = pb::DtUpdateResp { map_value: nested_entries(120), ..Default::default() }.encode_to_vec();
    let err = DtUpdateConverter::new().with_max_depth(500).convert(83, &update).unwrap_err();
    assert_eq!(err, DecodeError::NestingTooDeep { limit: MAX_SUPPORTED_MAP_DEPTH });
}

#[test]
fn server_error_frames() {
    let payload = pb::RpbErrorResp { errmsg: b"bucket type not active".to_vec(), errcode: 0 }.encode_to_vec();
    let message = ProtocolMessage::new(MessageCode::ErrorResp.as_u8(), payload);

    for err in [
        message.convert_response(&DtFetchConverter::new()).unwrap_err(),
        message.convert_response(&DtUpdateConverter::new()).unwrap_err(),
        message.convert_response(&FetchObjectConverter).unwrap_err(),
    ] {
        assert_eq!(
            err,
            DecodeError::Server { errcode: 0, message: "bucket type not active".to_string() }
        );
    }
}

#[test]
fn nothing_is_retryable() {
    let errors = [
        DecodeError::UnknownCode { code: 1, expected: MessageCode::PingResp },
        DecodeError::malformed(81, "truncated"),
        DecodeError::mismatch(CrdtType::Counter, CrdtType::Map),
        DecodeError::NestingTooDeep { limit: 1 },
    ];
    assert!(errors.iter().all(|e| !e.is_retryable()));
}

#[tokio::test]
async fn deferred_path_shares_taxonomy() {
    let message = ProtocolMessage::new(MessageCode::PutResp.as_u8(), Vec::new());
    let err = convert_deferred(message, DtFetchConverter::new()).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Decode(DecodeError::UnknownCode { code: 12, .. })));

    let err = convert_deferred(ProtocolMessage::new(81, vec![0x1a, 0x7f]), DtFetchConverter::new())
        .await
        .unwrap_err();
    assert_eq!(err.as_decode().map(DecodeError::kind), Some("malformed_payload"));
}

#[tokio::test]
async fn transport_failures_are_not_decode_errors() {
    use riak_core::core_client::ReplayTransport;

    let transport = ReplayTransport::new();
    transport.push_failure(TransportError::Timeout).await;
    let request = ProtocolMessage::new(MessageCode::DtFetchReq.as_u8(), Vec::new());

    let err = fetch_set(&transport, request).await.unwrap_err();
    assert!(err.as_decode().is_none());
    assert!(matches!(err, ExecutionError::Transport(TransportError::Timeout)));
}
