use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_text_defaults_to_empty() {
        let req: PredictRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.text, "");
    }

    #[test]
    fn text_field_is_parsed() {
        let req: PredictRequest =
            serde_json::from_str(r#"{"text": "I feel anxious"}"#).unwrap();
        assert_eq!(req.text, "I feel anxious");
    }
}
