use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

use super::labels::{Label, ALL_LABELS};

#[derive(Deserialize)]
struct SupportMessageFile {
    greeting: String,
    intros: HashMap<String, String>,
    suggestions: HashMap<String, Vec<String>>,
}

pub struct SupportMessageSet {
    greeting: String,
    intros: HashMap<String, String>,
    suggestions: HashMap<String, Vec<String>>,
}

impl SupportMessageSet {
    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn intro(&self, label: Label) -> Option<&str> {
        self.intros.get(label.as_str()).map(String::as_str)
    }

    /// Suggestion pool for a label; anything without an entry uses the
    /// `normal` pool.
    pub fn suggestions(&self, label: Option<Label>) -> &[String] {
        let key = label.map(|l| l.as_str()).unwrap_or("normal");
        self.suggestions
            .get(key)
            .or_else(|| self.suggestions.get(Label::Normal.as_str()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

static EN_SUPPORT_MESSAGES: Lazy<SupportMessageSet> = Lazy::new(|| {
    load_support_messages(include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/lang/en/support_messages.json"
    )))
});

pub fn support_messages() -> &'static SupportMessageSet {
    &EN_SUPPORT_MESSAGES
}

fn load_support_messages(raw: &str) -> SupportMessageSet {
    let parsed: SupportMessageFile =
        serde_json::from_str(raw).expect("invalid support message config");
    for label in ALL_LABELS {
        let pool = parsed.suggestions.get(label.as_str());
        assert!(
            pool.is_some_and(|p| !p.is_empty()),
            "label '{label}' has no suggestions"
        );
    }
    SupportMessageSet {
        greeting: parsed.greeting,
        intros: parsed.intros,
        suggestions: parsed.suggestions,
    }
}
