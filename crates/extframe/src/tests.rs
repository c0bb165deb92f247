use serde_json::json;
use serde_json::Value;

use crate::Envelope;
use crate::RemoteError;
use crate::names;

type R<T> = crate::Result<T>;

#[test]
fn test_request_roundtrip() -> R<()> {
    let frame = Envelope::request(
        7,
        "command-registry-ext",
        "execute-command",
        vec![json!("demo.hello"), json!({ "count": 3 })],
    );

    let bytes = frame.encode()?;
    let decoded = Envelope::decode(&bytes)?;

    assert_eq!(decoded, frame);
    assert_eq!(decoded.call_id(), 7);
    Ok(())
}

#[test]
fn test_reply_ok_roundtrip() -> R<()> {
    let frame = Envelope::reply_ok(42, json!([1, 2, 3]));
    let decoded = Envelope::decode(&frame.encode()?)?;

    match decoded {
        Envelope::Reply { call_id, result, error } => {
            assert_eq!(call_id, 42);
            assert_eq!(result, Some(json!([1, 2, 3])));
            assert!(error.is_none());
        }
        _ => panic!("Expected Reply frame"),
    }
    Ok(())
}

#[test]
fn test_reply_err_roundtrip() -> R<()> {
    let err = RemoteError::with_name(names::COMMAND_NOT_FOUND, "Command demo.hello doesn't exist");
    let frame = Envelope::reply_err(42, err.clone());
    let decoded = Envelope::decode(&frame.encode()?)?;

    match decoded {
        Envelope::Reply { error: Some(remote), result, .. } => {
            assert!(result.is_none());
            assert_eq!(remote, err);
            assert!(remote.is_named(names::COMMAND_NOT_FOUND));
        }
        _ => panic!("Expected error Reply frame"),
    }
    Ok(())
}

#[test]
fn test_wire_shape_is_camel_case_tagged() -> R<()> {
    let frame = Envelope::request(1, "svc", "ping", vec![]);
    let value: Value = serde_json::from_slice(&frame.encode()?).unwrap();

    assert_eq!(value["type"], "request");
    assert_eq!(value["callId"], 1);
    assert_eq!(value["proxyId"], "svc");
    assert_eq!(value["method"], "ping");
    assert!(value["args"].as_array().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_decode_tolerates_unknown_fields() -> R<()> {
    // A newer peer may attach fields we don't know about yet.
    let bytes = br#"{
        "type": "request",
        "callId": 9,
        "proxyId": "svc",
        "method": "ping",
        "args": [],
        "deadlineMs": 5000,
        "trace": { "span": "abc" }
    }"#;

    let decoded = Envelope::decode(bytes)?;
    assert_eq!(decoded, Envelope::request(9, "svc", "ping", vec![]));
    Ok(())
}

#[test]
fn test_decode_missing_args_defaults_to_empty() -> R<()> {
    let bytes = br#"{ "type": "request", "callId": 1, "proxyId": "svc", "method": "ping" }"#;

    match Envelope::decode(bytes)? {
        Envelope::Request { args, .. } => assert!(args.is_empty()),
        _ => panic!("Expected Request frame"),
    }
    Ok(())
}

#[test]
fn test_decode_rejects_unknown_discriminant() {
    let bytes = br#"{ "type": "stream-chunk", "callId": 1 }"#;
    assert!(Envelope::decode(bytes).is_err());
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(Envelope::decode(b"\xff\xff\xff").is_err());
    assert!(Envelope::decode(b"[1, 2, 3]").is_err());
}

#[test]
fn test_remote_error_display() {
    let plain = RemoteError::new("it broke");
    assert_eq!(plain.to_string(), "it broke");

    let named = RemoteError::with_name(names::UNKNOWN_PROXY, "no instance for 'x'");
    assert_eq!(named.to_string(), "UnknownProxyIdentifier: no instance for 'x'");
}

#[test]
fn test_error_reply_without_name_survives() -> R<()> {
    // `name` is optional on the wire.
    let bytes = br#"{ "type": "reply", "callId": 3, "error": { "message": "boom" } }"#;

    match Envelope::decode(bytes)? {
        Envelope::Reply { error: Some(remote), .. } => {
            assert_eq!(remote.message, "boom");
            assert!(remote.name.is_none());
        }
        _ => panic!("Expected error Reply frame"),
    }
    Ok(())
}
