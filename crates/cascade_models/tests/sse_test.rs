//! Tests for streamed response accumulation.

use cascade_error::ProviderErrorKind;
use cascade_models::SseAccumulator;

const EVENTS: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"content\":\"Bonjour\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\", \"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"monde\"}}],\"usage\":{\"total_tokens\":4}}\n\n",
    "data: [DONE]\n\n",
);

#[test]
fn test_events_split_at_every_byte() {
    let mut acc = SseAccumulator::default();
    for byte in EVENTS.as_bytes() {
        acc.push(std::slice::from_ref(byte)).unwrap();
    }

    assert!(acc.is_done());
    let completion = acc.finish();
    assert_eq!(completion.content, "Bonjour, monde");
    assert_eq!(completion.total_tokens, 4);
}

#[test]
fn test_multibyte_text_split_mid_character() {
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo ☕\"}}]}\n\n".as_bytes();
    let split = body.iter().position(|b| *b == 0xC3).unwrap() + 1;

    let mut acc = SseAccumulator::default();
    acc.push(&body[..split]).unwrap();
    acc.push(&body[split..]).unwrap();

    assert_eq!(acc.content(), "héllo ☕");
}

#[test]
fn test_crlf_lines_and_comments() {
    let mut acc = SseAccumulator::default();
    acc.push(b": ping\r\nevent: message\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r\n\r\ndata: [DONE]\r\n\r\n")
        .unwrap();

    assert!(acc.is_done());
    assert_eq!(acc.finish().content, "x");
}

#[test]
fn test_data_after_done_is_ignored() {
    let mut acc = SseAccumulator::default();
    acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\ndata: [DONE]\n\n")
        .unwrap();
    acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n")
        .unwrap();

    assert_eq!(acc.finish().content, "a");
}

#[test]
fn test_stream_without_terminator_keeps_text() {
    let mut acc = SseAccumulator::default();
    acc.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}")
        .unwrap();

    assert!(!acc.is_done());
    let completion = acc.finish();
    assert_eq!(completion.content, "partial");
    assert_eq!(completion.total_tokens, 0);
}

#[test]
fn test_malformed_chunk_is_parse_error() {
    let mut acc = SseAccumulator::default();
    let err = acc.push(b"data: {not json}\n\n").unwrap_err();

    assert!(matches!(err, ProviderErrorKind::ResponseParsing(_)));
}
