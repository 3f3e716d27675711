use std::fmt::Debug;
use std::future::Future;

use narration_sync::Error;

/// Language-model-backed matcher that proposes a background asset for
/// each narration sentence. Implementations return the model's raw text;
/// [`parse_asset_mapping`] turns it into a validated mapping.
pub trait AssetMatcher {
    type Error: Debug;

    fn match_assets(
        &self,
        sentences: &[String],
        asset_ids: &[String],
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Parses matcher output into an ordered `sentence -> asset-or-null`
/// mapping.
///
/// The model is asked for a JSON object; anything that is not an object
/// of string-or-null values is rejected rather than interpreted. Markdown
/// code fences around the object are tolerated.
pub fn parse_asset_mapping(raw: &str) -> Result<Vec<(String, Option<String>)>, Error> {
    let trimmed = strip_code_fence(raw.trim());

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| Error::MatcherOutput(format!("not valid JSON: {e}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::MatcherOutput("expected a JSON object".into()))?;

    object
        .iter()
        .map(|(sentence, asset)| match asset {
            serde_json::Value::String(id) => Ok((sentence.clone(), Some(id.clone()))),
            serde_json::Value::Null => Ok((sentence.clone(), None)),
            other => Err(Error::MatcherOutput(format!(
                "value for {sentence:?} is neither a string nor null: {other}"
            ))),
        })
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mapping_preserving_order() {
        let raw = r#"{"intro": "clip1.mp4", "body": null, "outro": "clip2.mp4"}"#;
        let mapping = parse_asset_mapping(raw).unwrap();
        assert_eq!(
            mapping,
            vec![
                ("intro".to_string(), Some("clip1.mp4".to_string())),
                ("body".to_string(), None),
                ("outro".to_string(), Some("clip2.mp4".to_string())),
            ]
        );
    }

    #[test]
    fn tolerates_markdown_fences() {
        let raw = "```json\n{\"intro\": \"clip1.mp4\"}\n```";
        let mapping = parse_asset_mapping(raw).unwrap();
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn rejects_non_object_output() {
        assert!(parse_asset_mapping(r#"["clip1.mp4"]"#).is_err());
        assert!(parse_asset_mapping("pick clip1 for the intro").is_err());
    }

    #[test]
    fn rejects_non_string_values() {
        let err = parse_asset_mapping(r#"{"intro": 3}"#).unwrap_err();
        assert!(matches!(err, Error::MatcherOutput(_)));
    }
}
