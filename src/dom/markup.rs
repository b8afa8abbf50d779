use super::{Display, Document, Element, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to read page {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML page description: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON page description: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported page format {0:?} (expected .toml or .json)")]
    UnsupportedFormat(String),
}

/// Serialized page description, the stand-in for the markup the site publishes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Markup {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Starts out with `display: none`
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_location() -> String {
    "about:blank".to_string()
}

fn default_tag() -> String {
    "div".to_string()
}

impl Markup {
    pub fn from_toml(contents: &str) -> Result<Self, PageError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_json(contents: &str) -> Result<Self, PageError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn into_document(self) -> Document {
        let mut doc = Document::new(self.location);
        let root = doc.root();
        for spec in self.nodes {
            insert(&mut doc, root, spec);
        }
        doc
    }
}

fn insert(doc: &mut Document, parent: NodeId, spec: NodeSpec) {
    let mut element = Element::new(spec.tag).with_text(spec.text);
    element.attrs = spec.attrs;
    element.classes = spec.classes.into_iter().collect();
    if spec.hidden {
        element.display = Display::None;
    }
    let id = doc.append_child(parent, element);
    for child in spec.children {
        insert(doc, id, child);
    }
}

/// Load a page description from a `.toml` or `.json` file
pub fn load_page(path: &Path) -> Result<Document, PageError> {
    let contents = fs::read_to_string(path).map_err(|source| PageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let markup = match ext.as_str() {
        "toml" => Markup::from_toml(&contents)?,
        "json" => Markup::from_json(&contents)?,
        other => return Err(PageError::UnsupportedFormat(other.to_string())),
    };

    Ok(markup.into_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attrs;
    use std::io::Write;

    const PAGE: &str = r#"
location = "https://event.example.com/sessions/keynote"

[[node]]
attrs = { "data-agenda-item" = "keynote", "data-start-time" = "2025-10-17 9:00", "data-end-time" = "2025-10-17 10:00" }

[[node.children]]
attrs = { "data-before-session" = "" }
text = "Starts soon"

[[node.children]]
attrs = { "data-during-session" = "-5" }
hidden = true
"#;

    #[test]
    fn test_toml_markup_builds_tree() {
        let doc = Markup::from_toml(PAGE).unwrap().into_document();
        assert_eq!(doc.location(), "https://event.example.com/sessions/keynote");

        let session = doc.query_value(doc.root(), attrs::AGENDA_ITEM, "keynote").unwrap();
        assert_eq!(doc.attr(session, attrs::START_TIME), Some("2025-10-17 9:00"));

        let before = doc.query(session, attrs::BEFORE_SESSION).unwrap();
        assert_eq!(doc.text(before), "Starts soon");

        let during = doc.query(session, attrs::DURING_SESSION).unwrap();
        assert_eq!(doc.display(during), Display::None);
        assert_eq!(doc.tag(during), "div");
    }

    #[test]
    fn test_load_page_json_and_bad_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("page.json");
        let mut f = fs::File::create(&json_path).unwrap();
        write!(
            f,
            r#"{{"location":"https://x/sessions/a","node":[{{"attrs":{{"data-agenda-item":"a"}}}}]}}"#
        )
        .unwrap();
        let doc = load_page(&json_path).unwrap();
        assert!(doc.query_value(doc.root(), attrs::AGENDA_ITEM, "a").is_some());

        let txt_path = dir.path().join("page.txt");
        fs::write(&txt_path, "").unwrap();
        assert!(matches!(
            load_page(&txt_path),
            Err(PageError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            load_page(&dir.path().join("missing.toml")),
            Err(PageError::Io { .. })
        ));
    }
}
