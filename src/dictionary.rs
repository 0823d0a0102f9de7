use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rust_embed::Embed;
use thiserror::Error;

#[derive(Embed)]
#[folder = "assets/dictionaries/"]
struct DictionaryAssets;

pub const DEFAULT_DICTIONARY: &str = "en-es";

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("unknown bundled dictionary '{0}'")]
    UnknownBundle(String),
    #[error("failed to read dictionary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("dictionary is not a JSON object of word -> translation: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dictionary has no entries")]
    Empty,
    #[error("dictionary entry '{0}' has a blank word or translation")]
    BlankEntry(String),
}

/// Word -> translation mapping, in file order.
#[derive(Clone, Debug)]
pub struct Dictionary {
    entries: IndexMap<String, String>,
}

impl Dictionary {
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: IndexMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::validated(entries)
    }

    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let entries: IndexMap<String, String> = serde_json::from_str(json)?;
        Self::validated(entries)
    }

    pub fn load_file(path: &Path) -> Result<Self, DictionaryError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn load_bundled(name: &str) -> Result<Self, DictionaryError> {
        let file = DictionaryAssets::get(&format!("{name}.json"))
            .ok_or_else(|| DictionaryError::UnknownBundle(name.to_string()))?;
        let entries: IndexMap<String, String> = serde_json::from_slice(file.data.as_ref())?;
        Self::validated(entries)
    }

    pub fn bundled_names() -> Vec<String> {
        let mut names: Vec<String> = DictionaryAssets::iter()
            .filter_map(|f| f.strip_suffix(".json").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }

    fn validated(entries: IndexMap<String, String>) -> Result<Self, DictionaryError> {
        if entries.is_empty() {
            return Err(DictionaryError::Empty);
        }
        if let Some((word, _)) = entries
            .iter()
            .find(|(w, t)| w.trim().is_empty() || t.trim().is_empty())
        {
            return Err(DictionaryError::BlankEntry(word.clone()));
        }
        Ok(Self { entries })
    }

    pub fn translation(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn translations(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bundle_loads() {
        let dict = Dictionary::load_bundled(DEFAULT_DICTIONARY).unwrap();
        assert!(dict.len() >= 4);
        assert!(Dictionary::bundled_names().contains(&DEFAULT_DICTIONARY.to_string()));
    }

    #[test]
    fn test_unknown_bundle() {
        let err = Dictionary::load_bundled("xx-yy").unwrap_err();
        assert!(matches!(err, DictionaryError::UnknownBundle(_)));
    }

    #[test]
    fn test_json_keeps_file_order() {
        let dict = Dictionary::from_json(r#"{"b": "y", "a": "x"}"#).unwrap();
        assert_eq!(dict.words().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(dict.translation("a"), Some("x"));
        assert_eq!(dict.translation("c"), None);
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        assert!(matches!(
            Dictionary::from_json("{}").unwrap_err(),
            DictionaryError::Empty
        ));
        assert!(matches!(
            Dictionary::from_entries([("dog", " ")]).unwrap_err(),
            DictionaryError::BlankEntry(w) if w == "dog"
        ));
        assert!(matches!(
            Dictionary::from_json("[1, 2]").unwrap_err(),
            DictionaryError::Parse(_)
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("words.json");
        fs::write(&path, r#"{"dog": "perro"}"#).unwrap();
        let dict = Dictionary::load_file(&path).unwrap();
        assert_eq!(dict.translation("dog"), Some("perro"));
    }
}
