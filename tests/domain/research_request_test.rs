use research_relay::domain::{
    MessageRole, RequestValidationError, ResearchOptions, ResearchRequest,
};

#[test]
fn given_blank_query_when_validating_then_returns_empty_error() {
    let request = ResearchRequest::new("   ", ResearchOptions::default());

    assert_eq!(request.validate(3), Err(RequestValidationError::EmptyQuery));
}

#[test]
fn given_short_query_when_validating_then_reports_lengths() {
    let request = ResearchRequest::new(" ab ", ResearchOptions::default());

    assert_eq!(
        request.validate(3),
        Err(RequestValidationError::QueryTooShort { min: 3, actual: 2 })
    );
}

#[test]
fn given_multibyte_query_when_validating_then_counts_characters() {
    let request = ResearchRequest::new("日本語", ResearchOptions::default());

    assert!(request.validate(3).is_ok());
}

#[test]
fn given_system_prompt_when_building_messages_then_system_comes_first() {
    let request = ResearchRequest::new(
        "  latest fusion results ",
        ResearchOptions {
            system_prompt: Some("Cite sources.".to_string()),
            ..ResearchOptions::default()
        },
    );

    let messages = request.to_messages();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::System);
    assert_eq!(messages[1].role, MessageRole::User);
    assert_eq!(messages[1].content, "latest fusion results");
}

#[test]
fn given_no_system_prompt_when_building_messages_then_only_user_message() {
    let request = ResearchRequest::new("query", ResearchOptions::default()).with_session_id("s-1");

    let messages = request.to_messages();

    assert_eq!(messages.len(), 1);
    assert_eq!(request.session_id.as_deref(), Some("s-1"));
}
