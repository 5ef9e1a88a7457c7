//! Tests for the memory wrapper.

#[cfg(test)]
mod tests {
    use crate::context::CallContext;
    use crate::errors::FlowError;
    use crate::handlers::{handler_fn, Handler};
    use crate::memory::{BufferMemory, Memory, MockMemory, WithMemory};
    use crate::testing::{FakeMemory, MockHandler};
    use crate::values::{ChatMessage, ChatMessages, Values, DEFAULT_CHAT_KEY, DEFAULT_KEY};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn history() -> ChatMessages {
        vec![ChatMessage::user("h1"), ChatMessage::assistant("h2")].into()
    }

    #[tokio::test]
    async fn test_inner_sees_history_and_turn_is_saved() {
        let memory = Arc::new(FakeMemory::with_history(history()));
        let inner = Arc::new(MockHandler::returning(Values::from([(DEFAULT_KEY, "answer")])));
        let handler = WithMemory::new(memory.clone(), Arc::clone(&inner));

        let out = handler
            .call(&CallContext::background(), &[Values::from([("question", "hello")])])
            .await
            .unwrap();

        let seen = inner.recorded_inputs();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages(DEFAULT_CHAT_KEY).unwrap(), &history());
        assert_eq!(seen[0].get("question"), "hello");

        assert_eq!(memory.saved(), vec![("hello".to_string(), "answer".to_string())]);
        assert_eq!(out, Values::from([("question", "hello"), (DEFAULT_KEY, "answer")]));
    }

    #[tokio::test]
    async fn test_history_holds_exchange_after_call() {
        let memory = Arc::new(FakeMemory::with_history(vec![ChatMessage::user("h1")].into()));
        let handler = WithMemory::new(
            memory.clone(),
            MockHandler::returning(Values::from([(DEFAULT_KEY, "output")])),
        );
        let ctx = CallContext::background();

        let out = handler.call(&ctx, &[Values::from([(DEFAULT_KEY, "input")])]).await.unwrap();

        assert_eq!(out.get(DEFAULT_KEY), "output");
        assert_eq!(
            memory.load(&ctx).await.unwrap().into_vec(),
            vec![
                ChatMessage::user("h1"),
                ChatMessage::user("input"),
                ChatMessage::assistant("output"),
            ]
        );
    }

    #[tokio::test]
    async fn test_conversation_accumulates_in_buffer() {
        let memory = Arc::new(BufferMemory::new(0, None));
        let handler = WithMemory::new(
            memory.clone(),
            handler_fn(|vals| {
                let turns = vals.messages(DEFAULT_CHAT_KEY).map(ChatMessages::len).unwrap_or_default();
                Ok(Values::from([(DEFAULT_KEY, format!("seen {turns}"))]))
            }),
        );
        let ctx = CallContext::background();

        let first = handler.call(&ctx, &[Values::from([(DEFAULT_KEY, "one")])]).await.unwrap();
        let second = handler.call(&ctx, &[Values::from([(DEFAULT_KEY, "two")])]).await.unwrap();

        assert_eq!(first.get(DEFAULT_KEY), "seen 0");
        assert_eq!(second.get(DEFAULT_KEY), "seen 2");

        let stored: Vec<String> = memory.load(&ctx).await.unwrap().into_iter().map(|m| m.to_string()).collect();
        assert_eq!(
            stored,
            vec!["user: one", "assistant: seen 0", "user: two", "assistant: seen 2"]
        );
    }

    #[tokio::test]
    async fn test_multiple_keys_are_rejected_before_inner() {
        let memory = Arc::new(FakeMemory::new());
        let inner = Arc::new(MockHandler::new());
        let handler = WithMemory::new(memory.clone(), Arc::clone(&inner));

        let err = handler
            .call(&CallContext::background(), &[Values::from([("a", "1"), ("b", "2")])])
            .await
            .unwrap_err();

        match err {
            FlowError::AmbiguousInput { keys } => assert_eq!(keys, vec!["a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(inner.call_count(), 0);
        assert!(memory.saved().is_empty());
    }

    #[tokio::test]
    async fn test_ambiguous_message_text() {
        let handler = WithMemory::new(Arc::new(FakeMemory::new()), MockHandler::new());
        let err = handler
            .call(&CallContext::background(), &[Values::from([("a", "1"), ("b", "2")])])
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("input values have multiple keys, memory only supported when one key currently"));
    }

    #[tokio::test]
    async fn test_non_text_input_is_rejected() {
        let inner = Arc::new(MockHandler::new());
        let handler = WithMemory::new(Arc::new(FakeMemory::new()), Arc::clone(&inner));

        let err = handler
            .call(
                &CallContext::background(),
                &[Values::new().with("n", serde_json::json!(42))],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::TypeMismatch { ref key, .. } if key == "n"));
        assert_eq!(inner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_output_text_is_rejected() {
        let memory = Arc::new(FakeMemory::new());
        let handler = WithMemory::new(
            memory.clone(),
            MockHandler::returning(Values::from([("other", "x")])),
        );

        let err = handler
            .call(&CallContext::background(), &[Values::from([(DEFAULT_KEY, "q")])])
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::TypeMismatch { ref key, .. } if key == DEFAULT_KEY));
        assert!(memory.saved().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_skips_inner() {
        let mut memory = MockMemory::new();
        memory
            .expect_load()
            .times(1)
            .returning(|_| Err(FlowError::msg("load failed")));
        memory.expect_save().never();

        let inner = Arc::new(MockHandler::new());
        let handler = WithMemory::new(Arc::new(memory), Arc::clone(&inner));

        let err = handler
            .call(&CallContext::background(), &[Values::from([(DEFAULT_KEY, "q")])])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "load failed");
        assert_eq!(inner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_discards_output() {
        let mut memory = MockMemory::new();
        memory.expect_load().returning(|_| Ok(ChatMessages::new()));
        memory
            .expect_save()
            .withf(|_, input, output| input == "q" && output == "a")
            .times(1)
            .returning(|_, _, _| Err(FlowError::msg("save failed")));

        let handler = WithMemory::new(
            Arc::new(memory),
            MockHandler::returning(Values::from([(DEFAULT_KEY, "a")])),
        );

        let err = handler
            .call(&CallContext::background(), &[Values::from([(DEFAULT_KEY, "q")])])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "save failed");
    }

    #[tokio::test]
    async fn test_inner_failure_is_not_saved() {
        let memory = Arc::new(FakeMemory::new());
        let handler = WithMemory::new(
            memory.clone(),
            handler_fn(|_| Err(FlowError::msg("model down"))),
        );

        let err = handler
            .call(&CallContext::background(), &[Values::from([(DEFAULT_KEY, "q")])])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "model down");
        assert!(memory.saved().is_empty());
    }
}
