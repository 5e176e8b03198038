//! Request and response bodies of the solutions endpoints
//!
//! Outgoing payloads carry enumerations as their numeric codes. Incoming
//! records keep `status`, `type` and `visibility` as raw JSON so that
//! unexpected values decode to defaults instead of failing.

use kbsync_model::{Article, ArticleType, Category, Folder, Status, Visibility};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of a category create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPayload {
    /// Name, suffix already applied
    pub name: String,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Portal visibility scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_in_portals: Option<Vec<u64>>,
}

/// Body of a folder create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderPayload {
    /// Name
    pub name: String,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility code
    pub visibility: u8,
}

/// Body of an article create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticlePayload {
    /// Title
    pub title: String,
    /// HTML body
    pub description: String,
    /// Content type code
    #[serde(rename = "type")]
    pub article_type: u8,
    /// Status code
    pub status: u8,
}

/// Body of a category or folder translation create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedTranslationPayload {
    /// Translated name
    pub name: String,
    /// Translated description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of an article translation create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleTranslationPayload {
    /// Translated title
    pub title: String,
    /// Translated HTML body
    pub description: String,
    /// Status code
    pub status: u8,
}

/// Category as returned by the helpdesk
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategory {
    /// Remote ID
    pub id: u64,
    /// Name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Portal visibility scope
    #[serde(default)]
    pub visible_in_portals: Option<Vec<u64>>,
}

/// Folder as returned by the helpdesk
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFolder {
    /// Remote ID
    pub id: u64,
    /// Name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Raw visibility value
    #[serde(default)]
    pub visibility: Option<Value>,
}

/// Article as returned by the helpdesk
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteArticle {
    /// Remote ID
    pub id: u64,
    /// Title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// HTML body
    #[serde(default)]
    pub description: Option<String>,
    /// Plain-text body
    #[serde(default)]
    pub description_text: Option<String>,
    /// Raw content type value
    #[serde(default, rename = "type")]
    pub article_type: Option<Value>,
    /// Raw status value
    #[serde(default)]
    pub status: Option<Value>,
}

/// Explicit `null` reads like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn code(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64)
}

impl RemoteCategory {
    /// Content node for this record
    #[must_use]
    pub fn to_node(&self) -> Category {
        let mut category = Category::new(self.name.clone())
            .with_portals(self.visible_in_portals.clone().unwrap_or_default());
        category.description.clone_from(&self.description);
        category
    }
}

impl RemoteFolder {
    /// Content node for this record
    #[must_use]
    pub fn to_node(&self) -> Folder {
        let mut folder = Folder::new(self.name.clone())
            .with_visibility(Visibility::from_code(code(self.visibility.as_ref())));
        folder.description.clone_from(&self.description);
        folder
    }
}

impl RemoteArticle {
    /// Content node for this record
    #[must_use]
    pub fn to_node(&self) -> Article {
        Article::new(self.title.clone())
            .with_html(
                self.description.clone().unwrap_or_default(),
                self.description_text.clone(),
            )
            .with_type(ArticleType::from_code(code(self.article_type.as_ref())))
            .with_status(Status::from_code(code(self.status.as_ref())))
    }
}
