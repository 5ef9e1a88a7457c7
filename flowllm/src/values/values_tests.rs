//! Tests for the values container.

#[cfg(test)]
mod tests {
    use crate::errors::FlowError;
    use crate::values::{ChatMessage, ChatMessages, Value, Values, DEFAULT_CHAT_KEY, DEFAULT_KEY};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_last_source_wins() {
        let a = Values::from([("k", "a"), ("only_a", "x")]);
        let b = Values::from([("k", "b")]);
        let c = Values::from([("k", "c"), ("only_c", "y")]);

        let merged = a.merge([&b, &c]);
        assert_eq!(merged.get("k"), "c");
        assert_eq!(merged.get("only_a"), "x");
        assert_eq!(merged.get("only_c"), "y");
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = Values::from([("x", "1"), ("y", "1")]);
        let b = Values::from([("y", "2"), ("z", "2")]);
        let c = Values::from([("z", "3"), ("w", "3")]);

        let nested = a.merge([&b]).merge([&c]);
        let flat = a.merge([&b, &c]);
        assert_eq!(nested, flat);
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let a = Values::from([("k", "a")]);
        let b = Values::from([("j", "b")]);

        let mut merged = a.merge([&b]);
        merged.insert("k", "changed");
        merged.insert("new", "value");
        merged.remove("j");

        assert_eq!(a, Values::from([("k", "a")]));
        assert_eq!(b, Values::from([("j", "b")]));
    }

    #[test]
    fn test_merged_from_slice() {
        let inputs = vec![Values::from([("a", "1")]), Values::from([("a", "2"), ("b", "3")])];
        let merged = Values::merged(&inputs);
        assert_eq!(merged, Values::from([("a", "2"), ("b", "3")]));
        assert!(Values::merged(&[]).is_empty());
    }

    #[test]
    fn test_get_absent_is_empty() {
        let values = Values::new();
        assert_eq!(values.get("missing"), "");
    }

    #[test]
    fn test_get_renders_non_text() {
        let values = Values::new()
            .with("num", serde_json::json!(123))
            .with("str", serde_json::json!("raw"))
            .with("chat", vec![ChatMessage::user("hi")]);

        assert_eq!(values.get("num"), "123");
        assert_eq!(values.get("str"), "raw");
        assert_eq!(values.get("chat"), "user: hi");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let values = Values::from([("Key", "upper"), ("key", "lower")]);
        let mut keys = values.keys();
        keys.sort();
        assert_eq!(keys, vec!["Key".to_string(), "key".to_string()]);
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(Values::new().to_string(), "");
    }

    #[test]
    fn test_display_single_key() {
        assert_eq!(Values::from([("answer", "42")]).to_string(), "42");
    }

    #[test]
    fn test_display_prefers_default_key() {
        let values = Values::from([(DEFAULT_KEY, "main"), ("other", "ignored")]);
        assert_eq!(values.to_string(), "main");
    }

    #[test]
    fn test_display_multiple_keys_is_json() {
        let values = Values::from([("a", "1"), ("b", "2")]);
        let rendered = values.to_string();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, serde_json::json!({"a": "1", "b": "2"}));
    }

    #[test]
    fn test_typed_text_accessor() {
        let values = Values::new()
            .with(DEFAULT_KEY, "hello")
            .with("num", serde_json::json!(1));

        assert_eq!(values.text(DEFAULT_KEY).unwrap(), "hello");
        assert!(matches!(
            values.text("num"),
            Err(FlowError::TypeMismatch { expected: "text", .. })
        ));
        assert!(values.text("missing").is_err());
    }

    #[test]
    fn test_typed_messages_accessor() {
        let history: ChatMessages = vec![ChatMessage::user("h1")].into();
        let values = Values::new()
            .with(DEFAULT_CHAT_KEY, history.clone())
            .with(DEFAULT_KEY, "not messages");

        assert_eq!(values.messages(DEFAULT_CHAT_KEY).unwrap(), &history);
        assert!(matches!(
            values.messages(DEFAULT_KEY),
            Err(FlowError::TypeMismatch { expected: "chat messages", .. })
        ));
    }

    #[test]
    fn test_json_shape() {
        let values = Values::new()
            .with("text", "hi")
            .with("chat", vec![ChatMessage::assistant("yo")])
            .with("meta", serde_json::json!({"n": 1}));

        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "hi",
                "chat": [{"role": "assistant", "content": "yo"}],
                "meta": {"n": 1}
            })
        );

        let back: Values = serde_json::from_value(json).unwrap();
        assert_eq!(back.value("chat").and_then(Value::as_messages).map(ChatMessages::len), Some(1));
        assert_eq!(back.value("text").and_then(Value::as_text), Some("hi"));
    }
}
