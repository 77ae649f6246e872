use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};

pub mod labels;
pub mod tables;

use labels::Label;
use tables::support_messages;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub text: String,
}

impl Message {
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: "bot".into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub messages: Vec<Message>,
}

/// Fixed envelope for empty or whitespace-only input. The model is never
/// consulted and no label is attached.
pub fn greeting_response() -> ResponseEnvelope {
    ResponseEnvelope {
        label: None,
        messages: vec![Message::bot(support_messages().greeting())],
    }
}

/// Compose the support messages for a label coming out of the inference
/// layer. The raw label is echoed back verbatim; lookups for anything
/// outside the known categories fall back to the `normal` pool.
pub fn build_response(raw_label: &str) -> ResponseEnvelope {
    let tables = support_messages();
    let label = Label::parse(raw_label);

    let mut messages = Vec::with_capacity(2);
    if let Some(label) = label {
        if label != Label::Normal {
            if let Some(intro) = tables.intro(label) {
                messages.push(Message::bot(intro));
            }
        }
    }

    // Exactly one suggestion, re-sampled uniformly on every call.
    let pool = tables.suggestions(label);
    let suggestion = pool.choose(&mut thread_rng()).cloned().unwrap_or_default();
    messages.push(Message::bot(suggestion));

    ResponseEnvelope {
        label: Some(raw_label.to_string()),
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::labels::ALL_LABELS;
    use super::*;

    #[test]
    fn labeled_categories_get_intro_then_suggestion() {
        let tables = support_messages();
        for &label in ALL_LABELS {
            if label == Label::Normal {
                continue;
            }
            let envelope = build_response(label.as_str());
            assert_eq!(envelope.label.as_deref(), Some(label.as_str()));
            assert_eq!(envelope.messages.len(), 2);
            assert_eq!(envelope.messages[0].text, tables.intro(label).unwrap());
            assert!(tables
                .suggestions(Some(label))
                .contains(&envelope.messages[1].text));
        }
    }

    #[test]
    fn normal_gets_a_single_suggestion() {
        let tables = support_messages();
        let envelope = build_response("normal");
        assert_eq!(envelope.messages.len(), 1);
        assert!(tables
            .suggestions(Some(Label::Normal))
            .contains(&envelope.messages[0].text));
    }

    #[test]
    fn unknown_label_falls_back_to_the_normal_pool() {
        let tables = support_messages();
        let envelope = build_response("unknown_garbage_string");
        assert_eq!(envelope.label.as_deref(), Some("unknown_garbage_string"));
        assert_eq!(envelope.messages.len(), 1);
        assert!(tables
            .suggestions(None)
            .contains(&envelope.messages[0].text));
    }

    #[test]
    fn suggestion_is_always_a_pool_member() {
        let tables = support_messages();
        for _ in 0..32 {
            let envelope = build_response("anxiety");
            let suggestion = &envelope.messages[1].text;
            assert!(tables.suggestions(Some(Label::Anxiety)).contains(suggestion));
        }
    }

    #[test]
    fn intro_is_stable_across_calls() {
        let first = build_response("depression").messages[0].text.clone();
        for _ in 0..8 {
            assert_eq!(build_response("depression").messages[0].text, first);
        }
    }

    #[test]
    fn every_message_is_from_the_bot() {
        let envelope = build_response("stress");
        assert!(envelope.messages.iter().all(|m| m.sender == "bot"));
    }

    #[test]
    fn greeting_envelope_has_no_label_key() {
        let envelope = greeting_response();
        assert_eq!(envelope.messages.len(), 1);
        assert_eq!(
            envelope.messages[0].text,
            support_messages().greeting()
        );

        let value = serde_json::to_value(&envelope).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("label"));
        assert_eq!(
            object["messages"][0]["sender"],
            serde_json::json!("bot")
        );
    }
}
