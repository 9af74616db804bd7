//! Article records and the per-site crawl index

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One persisted article as stored in `index.json`
///
/// Paths are relative to the site directory and always use `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub url: String,

    /// Serialized as a one-element array, e.g. `["VA"]`
    #[serde(rename = "language", with = "language_list")]
    pub language_code: String,

    #[serde(rename = "path2html")]
    pub path_html: String,

    #[serde(rename = "path2plain")]
    pub path_plain: String,

    #[serde(rename = "path2md")]
    pub path_markdown: String,
}

mod language_list {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(code: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(std::iter::once(code))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let codes = Vec::<String>::deserialize(deserializer)?;
        codes
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("language list is empty"))
    }
}

/// Articles of one site run keyed by `{code}/{date}/{slug}`
///
/// Keys are kept sorted so the written JSON is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlIndex {
    entries: BTreeMap<String, ArticleRecord>,
}

impl CrawlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the key an article is stored under
    pub fn composite_key(language_code: &str, date_stamp: &str, slug: &str) -> String {
        format!("{}/{}/{}", language_code, date_stamp, slug)
    }

    /// Inserts a record, returning the one it replaced under the same key
    pub fn insert(&mut self, key: String, record: ArticleRecord) -> Option<ArticleRecord> {
        self.entries.insert(key, record)
    }

    pub fn get(&self, key: &str) -> Option<&ArticleRecord> {
        self.entries.get(key)
    }

    /// Entries whose key starts with `{language_code}/`
    pub fn for_language(&self, language_code: &str) -> CrawlIndex {
        let prefix = format!("{}/", language_code);
        let entries = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        CrawlIndex { entries }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON rendering with 4-space indentation
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, slug: &str) -> ArticleRecord {
        ArticleRecord {
            title: "Festes d'agost".to_string(),
            subtitle: "Sin subtítulo".to_string(),
            date: "01/08/2024".to_string(),
            url: format!("https://www.betera.es/{}/noticia/{}", code.to_lowercase(), slug),
            language_code: code.to_string(),
            path_html: format!("{}/html/2024-08-02/{}.html", code.to_lowercase(), slug),
            path_plain: format!("{}/plain/2024-08-02/{}.txt", code.to_lowercase(), slug),
            path_markdown: format!("{}/markdown/2024-08-02/{}.md", code.to_lowercase(), slug),
        }
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record("VA", "festes-agost-1")).unwrap();

        assert_eq!(json["language"], serde_json::json!(["VA"]));
        assert_eq!(json["path2html"], "va/html/2024-08-02/festes-agost-1.html");
        assert_eq!(json["path2plain"], "va/plain/2024-08-02/festes-agost-1.txt");
        assert_eq!(json["path2md"], "va/markdown/2024-08-02/festes-agost-1.md");
        assert!(json.get("language_code").is_none());
    }

    #[test]
    fn test_record_reads_back() {
        let original = record("ES", "fiestas-agosto-3");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_language_filter_uses_code_prefix() {
        let mut index = CrawlIndex::new();
        index.insert(
            CrawlIndex::composite_key("VA", "2024-08-02", "festes-agost-1"),
            record("VA", "festes-agost-1"),
        );
        index.insert(
            CrawlIndex::composite_key("ES", "2024-08-02", "fiestas-agosto-1"),
            record("ES", "fiestas-agosto-1"),
        );
        index.insert(
            CrawlIndex::composite_key("VAL", "2024-08-02", "altre-1"),
            record("VAL", "altre-1"),
        );

        let va = index.for_language("VA");
        assert_eq!(va.len(), 1);
        assert!(va.get("VA/2024-08-02/festes-agost-1").is_some());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_same_tokens_different_positions_do_not_collide() {
        let mut index = CrawlIndex::new();
        let first = crate::slug("Nova biblioteca municipal", 1);
        let second = crate::slug("Nova biblioteca municipal!", 2);

        assert!(index
            .insert(CrawlIndex::composite_key("VA", "2024-08-02", &first), record("VA", &first))
            .is_none());
        assert!(index
            .insert(CrawlIndex::composite_key("VA", "2024-08-02", &second), record("VA", &second))
            .is_none());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let mut index = CrawlIndex::new();
        index.insert("VA/2024-08-02/a-1".to_string(), record("VA", "a-1"));

        let json = index.to_json().unwrap();
        assert!(json.starts_with("{\n    \"VA/2024-08-02/a-1\": {\n        \"title\""));

        let parsed: CrawlIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, index);
    }

    #[test]
    fn test_empty_index_json() {
        assert_eq!(CrawlIndex::new().to_json().unwrap(), "{}");
    }
}
