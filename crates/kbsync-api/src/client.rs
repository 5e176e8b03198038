//! Helpdesk knowledge-base client
//!
//! Wraps a [`HelpdeskTransport`] with typed endpoints for categories,
//! folders and articles, paginated listing and helpdesk settings. All
//! methods return classified [`ApiError`] values.

use crate::config::{HelpdeskConfig, MAX_PER_PAGE};
use crate::error::ApiError;
use crate::payload::{ArticlePayload, CategoryPayload, FolderPayload};
use crate::transport::{classify, ApiRequest, HelpdeskTransport};
use kbsync_model::{Language, NodeRef, RemoteId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// Settings endpoint
pub const SETTINGS_ENDPOINT: &str = "v2/settings/helpdesk";

/// Solutions resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `v2/solutions/categories`
    Category,
    /// `v2/solutions/folders`
    Folder,
    /// `v2/solutions/articles`
    Article,
}

impl ResourceKind {
    /// Path segment under `v2/solutions`
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            ResourceKind::Category => "categories",
            ResourceKind::Folder => "folders",
            ResourceKind::Article => "articles",
        }
    }

    /// Endpoint of one resource
    #[must_use]
    pub fn item(self, id: RemoteId) -> String {
        format!("v2/solutions/{}/{id}", self.segment())
    }

    /// Endpoint of one resource in one language
    #[must_use]
    pub fn translation(self, id: RemoteId, lang: Language) -> String {
        format!("v2/solutions/{}/{id}/{lang}", self.segment())
    }
}

impl From<NodeRef> for ResourceKind {
    fn from(node: NodeRef) -> Self {
        match node {
            NodeRef::Category(_) => ResourceKind::Category,
            NodeRef::Folder(_) => ResourceKind::Folder,
            NodeRef::Article(_) => ResourceKind::Article,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Category => "category",
            ResourceKind::Folder => "folder",
            ResourceKind::Article => "article",
        })
    }
}

/// Language settings of the helpdesk
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HelpdeskSettings {
    /// Primary language code
    #[serde(default)]
    pub primary_language: Option<String>,
    /// Supported language codes
    #[serde(default)]
    pub supported_languages: Option<Vec<String>>,
}

impl HelpdeskSettings {
    /// Primary language; English when unknown
    #[must_use]
    pub fn primary(&self) -> Language {
        self.primary_language
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or_default()
    }

    /// Recognized languages translations are fetched in
    ///
    /// Recognized ∩ supported, minus the primary language. Every recognized
    /// language is a candidate when the supported list is unknown.
    #[must_use]
    pub fn translation_languages(&self) -> Vec<Language> {
        let primary = self.primary();
        Language::ALL
            .into_iter()
            .filter(|lang| *lang != primary)
            .filter(|lang| match &self.supported_languages {
                Some(codes) => codes.iter().any(|c| Language::from_code(c) == Some(*lang)),
                None => true,
            })
            .collect()
    }
}

/// Typed client over a transport
#[derive(Debug)]
pub struct HelpdeskClient<T> {
    transport: T,
    per_page: u32,
    max_depth: u32,
    settings: HelpdeskSettings,
}

impl<T: HelpdeskTransport> HelpdeskClient<T> {
    /// Create a client with default paging and unknown settings
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            per_page: MAX_PER_PAGE,
            max_depth: 20,
            settings: HelpdeskSettings::default(),
        }
    }

    /// Create a client and load helpdesk settings
    ///
    /// Settings failures are logged; the client then falls back to English
    /// as primary and every recognized language as supported.
    pub fn connect(transport: T, config: &HelpdeskConfig) -> Self {
        let mut client = Self::new(transport).with_paging(config.per_page, config.max_depth);
        if let Err(err) = client.load_settings() {
            tracing::warn!("helpdesk settings unavailable ({}): {err}", err.class());
        }
        client
    }

    /// With paging bounds; the page size is capped at 100
    #[must_use]
    pub fn with_paging(mut self, per_page: u32, max_depth: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self.max_depth = max_depth.max(1);
        self
    }

    /// With known settings
    #[must_use]
    pub fn with_settings(mut self, settings: HelpdeskSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Underlying transport
    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current settings
    #[inline]
    pub fn settings(&self) -> &HelpdeskSettings {
        &self.settings
    }

    /// Page size used by list calls
    #[inline]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Fetch and keep the helpdesk language settings
    pub fn load_settings(&mut self) -> Result<&HelpdeskSettings, ApiError> {
        let value = self.get(SETTINGS_ENDPOINT)?;
        self.settings = serde_json::from_value(value)?;
        tracing::info!(
            primary = %self.settings.primary(),
            supported = ?self.settings.supported_languages,
            "helpdesk settings loaded"
        );
        Ok(&self.settings)
    }

    // ------------------------------------------------------------------
    // Raw calls
    // ------------------------------------------------------------------

    fn call(&self, request: &ApiRequest) -> Result<String, ApiError> {
        let response = self.transport.send(request)?;
        classify(response.status, &response.body)?;
        Ok(response.body)
    }

    fn decode(body: &str) -> Result<Value, ApiError> {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(body)?)
    }

    /// GET a resource
    pub fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        Self::decode(&self.call(&ApiRequest::get(endpoint))?)
    }

    /// POST a JSON body; returns the created resource
    pub fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError> {
        let request = ApiRequest::post(endpoint, serde_json::to_value(body)?);
        Self::decode(&self.call(&request)?)
    }

    /// DELETE a resource
    pub fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.call(&ApiRequest::delete(endpoint)).map(|_| ())
    }

    fn get_page(&self, endpoint: &str, page: u32) -> Result<Vec<Value>, ApiError> {
        let request = ApiRequest::get(endpoint)
            .with_query("page", page)
            .with_query("per_page", self.per_page);
        match Self::decode(&self.call(&request)?)? {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ApiError::Decode(format!(
                "expected a list from {endpoint}, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// List a paginated collection
    ///
    /// With an explicit `page` only that page is fetched. Otherwise pages are
    /// fetched from 1 until one returns fewer than `per_page` items or
    /// `max_depth` pages have been fetched.
    pub fn get_list(&self, endpoint: &str, page: Option<u32>) -> Result<Vec<Value>, ApiError> {
        if let Some(page) = page {
            return self.get_page(endpoint, page);
        }
        let per_page = self.per_page as usize;
        let mut items = Vec::new();
        for page in 1..=self.max_depth {
            let batch = self.get_page(endpoint, page)?;
            let done = batch.len() < per_page;
            items.extend(batch);
            if done {
                return Ok(items);
            }
        }
        tracing::warn!(
            endpoint,
            pages = self.max_depth,
            "page limit reached, list may be truncated"
        );
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Solutions
    // ------------------------------------------------------------------

    /// All categories
    pub fn list_categories(&self) -> Result<Vec<Value>, ApiError> {
        self.get_list("v2/solutions/categories", None)
    }

    /// Folders of a category
    pub fn list_folders(&self, category: RemoteId) -> Result<Vec<Value>, ApiError> {
        self.get_list(&format!("v2/solutions/categories/{category}/folders"), None)
    }

    /// Articles of a folder
    pub fn list_articles(&self, folder: RemoteId) -> Result<Vec<Value>, ApiError> {
        self.get_list(&format!("v2/solutions/folders/{folder}/articles"), None)
    }

    /// One translation of a resource; `None` when it does not exist
    pub fn get_translation(
        &self,
        kind: ResourceKind,
        id: RemoteId,
        lang: Language,
    ) -> Result<Option<Value>, ApiError> {
        match self.get(&kind.translation(id, lang)) {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn created_id(value: &Value) -> Result<RemoteId, ApiError> {
        value
            .get("id")
            .and_then(Value::as_u64)
            .map(RemoteId)
            .ok_or_else(|| ApiError::Decode("created resource has no id".to_string()))
    }

    /// Create a category
    pub fn create_category(&self, payload: &CategoryPayload) -> Result<RemoteId, ApiError> {
        Self::created_id(&self.post("v2/solutions/categories", payload)?)
    }

    /// Create a folder in a category
    pub fn create_folder(
        &self,
        category: RemoteId,
        payload: &FolderPayload,
    ) -> Result<RemoteId, ApiError> {
        let endpoint = format!("v2/solutions/categories/{category}/folders");
        Self::created_id(&self.post(&endpoint, payload)?)
    }

    /// Create an article in a folder
    pub fn create_article(
        &self,
        folder: RemoteId,
        payload: &ArticlePayload,
    ) -> Result<RemoteId, ApiError> {
        let endpoint = format!("v2/solutions/folders/{folder}/articles");
        Self::created_id(&self.post(&endpoint, payload)?)
    }

    /// Create one translation of an existing resource
    pub fn create_translation<B: Serialize>(
        &self,
        kind: ResourceKind,
        id: RemoteId,
        lang: Language,
        payload: &B,
    ) -> Result<(), ApiError> {
        self.post(&kind.translation(id, lang), payload).map(|_| ())
    }

    /// Delete a resource
    pub fn delete_resource(&self, kind: ResourceKind, id: RemoteId) -> Result<(), ApiError> {
        self.delete(&kind.item(id))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(
            ResourceKind::Folder.item(RemoteId(12)),
            "v2/solutions/folders/12"
        );
        assert_eq!(
            ResourceKind::Article.translation(RemoteId(3), Language::De),
            "v2/solutions/articles/3/de"
        );
    }

    #[test]
    fn translation_languages_follow_settings() {
        let settings = HelpdeskSettings::default();
        assert_eq!(settings.primary(), Language::En);
        assert_eq!(settings.translation_languages().len(), 5);

        let settings = HelpdeskSettings {
            primary_language: Some("fr".into()),
            supported_languages: Some(vec!["en".into(), "de".into(), "pt-BR".into()]),
        };
        assert_eq!(
            settings.translation_languages(),
            vec![Language::En, Language::De]
        );
    }
}
