//! Document config – the JSON file that describes one PDF.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything needed to produce one document. Unknown keys are ignored and
/// missing keys default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentConfig {
    pub title: String,
    pub website: String,
    /// Comma separated.
    pub keywords: String,
    pub creator: String,
    pub image_url: String,
    pub overlay_url: String,
    pub sub_header1: String,
    /// Markup for the info block.
    pub sub_header2: String,
    /// Markup for the body.
    pub body: String,
    pub footer: String,
    pub output_file: String,
}

impl DocumentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// `"{website} - {title}"`.
    pub fn document_title(&self) -> String {
        format!("{} - {}", self.website, self.title)
    }

    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn camel_case_keys() {
        let config = DocumentConfig::from_json(
            r#"{"title":"T","website":"W","subHeader1":"s1","subHeader2":"<p>s2</p>",
                "outputFile":"o.pdf","imageUrl":"i.png"}"#,
        )
        .unwrap();
        assert_eq!(config.sub_header1, "s1");
        assert_eq!(config.sub_header2, "<p>s2</p>");
        assert_eq!(config.output_file, "o.pdf");
        assert_eq!(config.image_url, "i.png");
        assert_eq!(config.body, "");
        assert_eq!(config.document_title(), "W - T");
    }

    #[test]
    fn keywords_split_on_commas() {
        let config = DocumentConfig {
            keywords: "keto, diet,,recipes ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.keyword_list(), vec!["keto", "diet", "recipes"]);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = DocumentConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DocumentConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn json_roundtrip() {
        let config = DocumentConfig {
            title: "T".into(),
            body: "<p>b</p>".into(),
            ..Default::default()
        };
        assert_eq!(DocumentConfig::from_json(&config.to_json()).unwrap(), config);
    }
}
