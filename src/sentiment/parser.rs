use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::ClassScore;

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelResponse {
    Failure { error: String },
    /// All class scores per input.
    Nested(Vec<Vec<ClassScore>>),
    /// Either the class set of a single input, or the top class per input.
    Flat(Vec<ClassScore>),
}

/// `inputs` is the number of texts sent, needed to read the flat shape.
pub fn parse_model_response(body: &str, inputs: usize) -> Result<Vec<Vec<ClassScore>>> {
    let response: ModelResponse = serde_json::from_str(body.trim())
        .map_err(|e| Error::ParseError(format!("Unexpected model response: {}", e)))?;

    match response {
        ModelResponse::Failure { error } => Err(Error::Inference(error)),
        ModelResponse::Nested(items) => Ok(items),
        ModelResponse::Flat(items) if inputs == 1 => Ok(vec![items]),
        ModelResponse::Flat(items) => Ok(items.into_iter().map(|class| vec![class]).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_scores() {
        let body = r#"[
            [{"label": "NEGATIVE", "score": 0.9}, {"label": "POSITIVE", "score": 0.1}],
            [{"label": "NEGATIVE", "score": 0.02}, {"label": "POSITIVE", "score": 0.98}]
        ]"#;
        let result = parse_model_response(body, 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1][1], ClassScore::new("POSITIVE", 0.98));
    }

    #[test]
    fn test_parse_flat_top_labels() {
        let body = r#"[{"label": "POSITIVE", "score": 0.7}, {"label": "NEGATIVE", "score": 0.6}]"#;
        let result = parse_model_response(body, 2).unwrap();
        assert_eq!(result, vec![
            vec![ClassScore::new("POSITIVE", 0.7)],
            vec![ClassScore::new("NEGATIVE", 0.6)],
        ]);
    }

    #[test]
    fn test_parse_flat_class_set_for_single_input() {
        let body = r#"[{"label": "NEGATIVE", "score": 0.8}, {"label": "POSITIVE", "score": 0.2}]"#;
        let result = parse_model_response(body, 1).unwrap();
        assert_eq!(result, vec![vec![
            ClassScore::new("NEGATIVE", 0.8),
            ClassScore::new("POSITIVE", 0.2),
        ]]);
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#;
        assert!(matches!(parse_model_response(body, 1), Err(Error::Inference(_))));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_model_response("<html>", 1), Err(Error::ParseError(_))));
    }
}
