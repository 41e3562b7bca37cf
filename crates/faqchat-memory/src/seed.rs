// SPDX-FileCopyrightText: 2026 Blufio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seed file loading.

use std::path::Path;

use faqchat_core::FaqchatError;
use serde::Deserialize;

/// One `{question, response}` entry of the seed file.
///
/// Capitalized keys (`Question`, `Response`) are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedEntry {
    #[serde(alias = "Question")]
    pub question: String,
    #[serde(alias = "Response")]
    pub response: String,
}

/// Reads the JSON seed list at `path`.
///
/// A missing file, invalid JSON, or an entry with a blank question is a
/// [`FaqchatError::SeedData`] error.
pub async fn load_seed_file(path: &Path) -> Result<Vec<SeedEntry>, FaqchatError> {
    let seed_error = |message: String| FaqchatError::SeedData {
        path: path.display().to_string(),
        message,
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| seed_error(format!("failed to read seed file: {e}")))?;
    let entries: Vec<SeedEntry> =
        serde_json::from_str(&content).map_err(|e| seed_error(format!("malformed JSON: {e}")))?;

    if let Some(pos) = entries.iter().position(|e| e.question.trim().is_empty()) {
        return Err(seed_error(format!("entry {pos} has an empty question")));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_entries_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");
        std::fs::write(
            &path,
            r#"[
                {"question": "How do I reset my password?", "response": "Use the reset link."},
                {"question": "Where is my invoice?", "response": "Under Billing."}
            ]"#,
        )
        .unwrap();

        let entries = load_seed_file(&path).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].question, "Where is my invoice?");
    }

    #[tokio::test]
    async fn capitalized_keys_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Faq.json");
        std::fs::write(&path, r#"[{"Question": "Hours?", "Response": "9 to 5."}]"#).unwrap();

        let entries = load_seed_file(&path).await.unwrap();
        assert_eq!(
            entries,
            vec![SeedEntry {
                question: "Hours?".into(),
                response: "9 to 5.".into(),
            }]
        );
    }

    #[tokio::test]
    async fn missing_file_is_seed_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seed_file(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, FaqchatError::SeedData { .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_seed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");
        std::fs::write(&path, r#"{"question": "not an array"}"#).unwrap();

        let err = load_seed_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("malformed JSON"), "got: {err}");
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");
        std::fs::write(&path, r#"[{"question": "  ", "response": "x"}]"#).unwrap();

        let err = load_seed_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("entry 0"));
    }
}
