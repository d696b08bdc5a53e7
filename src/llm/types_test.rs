use super::*;

// =============================================================================
// LlmError
// =============================================================================

#[test]
fn error_codes() {
    let cases: Vec<(LlmError, &str)> = vec![
        (LlmError::ConfigParse("bad".into()), "E_CONFIG_PARSE"),
        (LlmError::MissingApiKey { var: "KEY".into() }, "E_MISSING_API_KEY"),
        (LlmError::ApiRequest("timeout".into()), "E_API_REQUEST"),
        (LlmError::ApiResponse { status: 500, body: String::new() }, "E_API_RESPONSE"),
        (LlmError::ApiParse("json".into()), "E_API_PARSE"),
        (LlmError::HttpClientBuild("tls".into()), "E_HTTP_CLIENT_BUILD"),
    ];
    for (err, code) in cases {
        assert_eq!(err.error_code(), code);
    }
}

#[test]
fn transport_and_server_errors_are_retryable() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn client_errors_are_not_retryable() {
    assert!(!LlmError::ApiResponse { status: 401, body: String::new() }.retryable());
    assert!(!LlmError::MissingApiKey { var: "K".into() }.retryable());
    assert!(!LlmError::ApiParse("x".into()).retryable());
}

#[test]
fn display_includes_detail() {
    let err = LlmError::MissingApiKey { var: "HF_TOKEN".into() };
    assert_eq!(err.to_string(), "missing API key: env var HF_TOKEN not set");
}

// =============================================================================
// Content
// =============================================================================

#[test]
fn unknown_block_type_deserializes() {
    let block: ContentBlock = serde_json::from_value(serde_json::json!({ "type": "image", "data": 1 })).unwrap();
    assert_eq!(block, ContentBlock::Unknown);
}

#[test]
fn response_text_skips_thinking() {
    let resp = ChatResponse {
        content: vec![
            ContentBlock::Thinking { thinking: "hmm".into() },
            ContentBlock::Text { text: "{\"a\":".into() },
            ContentBlock::Unknown,
            ContentBlock::Text { text: "1}".into() },
        ],
        model: "m".into(),
        stop_reason: "end_turn".into(),
        input_tokens: 0,
        output_tokens: 0,
    };
    assert_eq!(resp.text(), "{\"a\":1}");
}

#[test]
fn user_message_serializes_as_plain_text() {
    let json = serde_json::to_value(Message::user("hi")).unwrap();
    assert_eq!(json, serde_json::json!({ "role": "user", "content": "hi" }));
}

#[test]
fn content_text_of_blocks() {
    let content = Content::Blocks(vec![ContentBlock::Text { text: "a".into() }, ContentBlock::Text { text: "b".into() }]);
    assert_eq!(content.text(), "ab");
}
