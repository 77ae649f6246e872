use std::fmt;

/// Categories produced by the support classifier, in the order of the
/// model's output logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Normal,
    Depression,
    Anxiety,
    Suicidal,
    Stress,
    Bipolar,
    PersonalityDisorder,
}

pub const ALL_LABELS: &[Label] = &[
    Label::Normal,
    Label::Depression,
    Label::Anxiety,
    Label::Suicidal,
    Label::Stress,
    Label::Bipolar,
    Label::PersonalityDisorder,
];

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Normal => "normal",
            Label::Depression => "depression",
            Label::Anxiety => "anxiety",
            Label::Suicidal => "suicidal",
            Label::Stress => "stress",
            Label::Bipolar => "bipolar",
            Label::PersonalityDisorder => "personality-disorder",
        }
    }

    /// Class index → label, following the head's logit order.
    pub fn from_index(idx: usize) -> Option<Label> {
        ALL_LABELS.get(idx).copied()
    }

    /// Parse a label string. Accepts the canonical kebab-case forms plus the
    /// spellings the training data uses.
    pub fn parse(raw: &str) -> Option<Label> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Label::Normal),
            "depression" => Some(Label::Depression),
            "anxiety" => Some(Label::Anxiety),
            "suicidal" => Some(Label::Suicidal),
            "stress" => Some(Label::Stress),
            "bipolar" | "bi-polar" => Some(Label::Bipolar),
            "personality-disorder" | "personality disorder" => Some(Label::PersonalityDisorder),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_mapping_matches_logit_order() {
        assert_eq!(Label::from_index(0), Some(Label::Normal));
        assert_eq!(Label::from_index(3), Some(Label::Suicidal));
        assert_eq!(Label::from_index(6), Some(Label::PersonalityDisorder));
        assert_eq!(Label::from_index(7), None);
        assert_eq!(Label::from_index(usize::MAX), None);
    }

    #[test]
    fn parse_round_trips_canonical_forms() {
        for &label in ALL_LABELS {
            assert_eq!(Label::parse(label.as_str()), Some(label));
        }
    }

    #[test]
    fn parse_accepts_dataset_spellings() {
        assert_eq!(Label::parse("Bi-Polar"), Some(Label::Bipolar));
        assert_eq!(Label::parse("Personality disorder"), Some(Label::PersonalityDisorder));
        assert_eq!(Label::parse("  Anxiety "), Some(Label::Anxiety));
    }

    #[test]
    fn parse_rejects_unknown_strings() {
        assert_eq!(Label::parse("unknown_garbage_string"), None);
        assert_eq!(Label::parse(""), None);
    }
}
