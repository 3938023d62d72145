/*!
 * Tests for the OpenAI-compatible streaming client
 */

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use doctran::errors::ProviderError;
use doctran::providers::CompletionRequest;
use doctran::providers::openai::{ChatCompletionRequest, OpenAICompatible, SseProtocol, status_error};
use doctran::providers::stream::{ByteStream, decode_fragments};

/// Build a body stream from raw chunks
fn body(chunks: &[&str]) -> ByteStream {
    let items: Vec<Result<Bytes, ProviderError>> = chunks
        .iter()
        .map(|c| Ok(Bytes::from(c.to_string())))
        .collect();
    stream::iter(items).boxed()
}

/// Decode a body and split it into fragments and the trailing error, if any
fn decode(chunks: &[&str]) -> (Vec<String>, Option<ProviderError>) {
    let items: Vec<Result<String, ProviderError>> =
        tokio_test::block_on(decode_fragments(body(chunks), SseProtocol::new()).collect());

    let mut fragments = Vec::new();
    let mut error = None;
    for item in items {
        match item {
            Ok(fragment) => fragments.push(fragment),
            Err(e) => error = Some(e),
        }
    }
    (fragments, error)
}

fn content_event(text: &str) -> String {
    format!(
        "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}},\"finish_reason\":null}}]}}\n\n",
        serde_json::to_string(text).unwrap()
    )
}

/// Test a well-formed stream ending with [DONE]
#[test]
fn test_sse_withCompleteStream_shouldYieldFragmentsInOrder() {
    let first = content_event("<think>");
    let second = content_event("Xin chào");
    let chunks = [first.as_str(), second.as_str(), "data: [DONE]\n\n"];

    let (fragments, error) = decode(&chunks);

    assert_eq!(fragments, vec!["<think>", "Xin chào"]);
    assert!(error.is_none());
}

/// Test events split across arbitrary chunk boundaries, including inside a character
#[test]
fn test_sse_withEventsSplitAcrossChunks_shouldReassemble() {
    let event = content_event("Xin chào");
    let bytes = event.as_bytes();
    let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
    let items: Vec<Result<Bytes, ProviderError>> = vec![
        Ok(Bytes::copy_from_slice(&bytes[..10])),
        Ok(Bytes::copy_from_slice(&bytes[10..split])),
        Ok(Bytes::copy_from_slice(&bytes[split..])),
        Ok(Bytes::from_static(b"data: [DO")),
        Ok(Bytes::from_static(b"NE]\n\n")),
    ];
    let decoded: Vec<Result<String, ProviderError>> =
        tokio_test::block_on(decode_fragments(stream::iter(items).boxed(), SseProtocol::new()).collect());

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].as_ref().unwrap(), "Xin chào");
}

/// Test that comments and role-only deltas produce nothing
#[test]
fn test_sse_withCommentsAndEmptyDeltas_shouldSkipThem() {
    let chunks = [
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "event: message\ndata: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
        "data: [DONE]\n\n",
    ];

    let (fragments, error) = decode(&chunks);

    assert_eq!(fragments, vec!["Hi"]);
    assert!(error.is_none());
}

/// Test that a finish reason without [DONE] is a complete stream
#[test]
fn test_sse_withFinishReasonAndNoDone_shouldComplete() {
    let chunks = [
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    ];

    let (fragments, error) = decode(&chunks);

    assert_eq!(fragments, vec!["Hi"]);
    assert!(error.is_none());
}

/// Test that a stream cut short is reported
#[test]
fn test_sse_withTruncatedStream_shouldEndWithConnectionError() {
    let first = content_event("partial");
    let chunks = [first.as_str()];

    let (fragments, error) = decode(&chunks);

    assert_eq!(fragments, vec!["partial"]);
    assert!(matches!(error, Some(ProviderError::ConnectionError(_))));
}

/// Test malformed payloads
#[test]
fn test_sse_withMalformedJson_shouldEndWithParseError() {
    let chunks = ["data: {not json}\n\n", "data: [DONE]\n\n"];

    let (fragments, error) = decode(&chunks);

    assert!(fragments.is_empty());
    assert!(matches!(error, Some(ProviderError::ParseError(_))));
}

/// Test that an in-band error payload aborts the stream
#[test]
fn test_sse_withErrorPayload_shouldEndWithRequestFailed() {
    let first = content_event("Xin");
    let chunks = [
        first.as_str(),
        "data: {\"error\":{\"message\":\"Model is overloaded\"}}\n\n",
        "data: [DONE]\n\n",
    ];

    let (fragments, error) = decode(&chunks);

    assert_eq!(fragments, vec!["Xin"]);
    match error {
        Some(ProviderError::RequestFailed(message)) => assert!(message.contains("Model is overloaded")),
        other => panic!("Expected RequestFailed, got {:?}", other),
    }
}

/// Test that nothing after [DONE] is decoded
#[test]
fn test_sse_withDataAfterDone_shouldIgnoreIt() {
    let after = content_event("ignored");
    let chunks = ["data: [DONE]\n\n", after.as_str()];

    let (fragments, error) = decode(&chunks);

    assert!(fragments.is_empty());
    assert!(error.is_none());
}

/// Test status code mapping
#[test]
fn test_status_error_shouldMapStatusCodes() {
    assert!(matches!(
        status_error(StatusCode::UNAUTHORIZED, "bad token".to_string()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        status_error(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        status_error(StatusCode::BAD_GATEWAY, "upstream".to_string()),
        ProviderError::ApiError { status_code: 502, .. }
    ));
}

/// Test the request body sent for one completion
#[test]
fn test_chat_completion_request_shouldStreamSingleUserMessage() {
    let request = CompletionRequest::new("deepseek-ai/DeepSeek-R1", 0.0, "Translate this");

    let body = serde_json::to_value(ChatCompletionRequest::from(&request)).unwrap();

    assert_eq!(body["model"], "deepseek-ai/DeepSeek-R1");
    assert_eq!(body["stream"], true);
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Translate this");
}

/// Test URL construction
#[test]
fn test_completions_url_withTrailingSlash_shouldJoinCleanly() {
    let client = OpenAICompatible::new("Hugging Face", "https://router.huggingface.co/v1/", "hf_x", 30);

    assert_eq!(client.completions_url(), "https://router.huggingface.co/v1/chat/completions");
}
