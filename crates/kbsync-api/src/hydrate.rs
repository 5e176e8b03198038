//! Remote Hydrator: rebuild a content tree from helpdesk state
//!
//! Walks categories, their folders and the folders' articles through the
//! paginated list endpoints, fetching every translation of every node.
//! A missing translation (404) is not an error. Any other failure below
//! the category list costs only the affected subtree.

use crate::client::{HelpdeskClient, ResourceKind};
use crate::error::ApiError;
use crate::payload::{RemoteArticle, RemoteCategory, RemoteFolder};
use crate::transport::HelpdeskTransport;
use kbsync_model::{CategoryId, FolderId, Language, ModelError, Portal, RemoteId};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Failure while hydrating
#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    /// A remote call failed
    #[error("remote call failed: {0}")]
    Api(#[from] ApiError),

    /// A node could not be attached
    #[error("tree error: {0}")]
    Tree(#[from] ModelError),
}

/// Hydration options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrateOptions {
    /// Only these categories, by position in the remote list
    pub category_subset: Option<Vec<usize>>,
    /// Progress detail: 0 logs per-node progress at debug, higher at info
    pub verbosity: u8,
}

impl HydrateOptions {
    /// With a category subset
    #[inline]
    #[must_use]
    pub fn with_categories(mut self, indices: Vec<usize>) -> Self {
        self.category_subset = Some(indices);
        self
    }

    /// With verbosity
    #[inline]
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    fn includes(&self, index: usize) -> bool {
        self.category_subset
            .as_ref()
            .map_or(true, |subset| subset.contains(&index))
    }
}

macro_rules! progress {
    ($verbosity:expr, $($arg:tt)+) => {
        if $verbosity > 0 {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// A subtree that could not be read
///
/// The node named here is either missing from the portal or present
/// without some of its translations or children; re-running a pull of its
/// category fills the gap.
#[derive(Debug, thiserror::Error)]
#[error("{kind} {}: {error}", .remote_id.map_or_else(|| "?".to_string(), |id| id.to_string()))]
pub struct HydrateIssue {
    /// Kind of the affected node
    pub kind: ResourceKind,
    /// Remote ID of the affected node, when it was readable
    pub remote_id: Option<RemoteId>,
    /// What went wrong
    #[source]
    pub error: HydrateError,
}

impl HydrateIssue {
    fn new(kind: ResourceKind, remote_id: Option<RemoteId>, error: impl Into<HydrateError>) -> Self {
        let issue = Self {
            kind,
            remote_id,
            error: error.into(),
        };
        tracing::error!("hydration incomplete at {issue}");
        issue
    }
}

/// Result of a hydration
#[derive(Debug)]
pub struct HydrateReport {
    /// Everything that could be read
    pub portal: Portal,
    /// Subtrees skipped or left incomplete
    pub issues: Vec<HydrateIssue>,
}

impl HydrateReport {
    /// Whether every node was read
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Builds a [`Portal`] from the helpdesk
#[derive(Debug)]
pub struct Hydrator<'a, T> {
    client: &'a HelpdeskClient<T>,
    options: HydrateOptions,
}

impl<'a, T: HelpdeskTransport> Hydrator<'a, T> {
    /// Create a hydrator over a client
    pub fn new(client: &'a HelpdeskClient<T>) -> Self {
        Self {
            client,
            options: HydrateOptions::default(),
        }
    }

    /// With options
    #[must_use]
    pub fn with_options(mut self, options: HydrateOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the whole tree
    ///
    /// Only a failure to list the categories is an error. Any later failure
    /// skips the affected subtree, is logged and is recorded in
    /// [`HydrateReport::issues`].
    pub fn hydrate(&self, portal_name: &str) -> Result<HydrateReport, HydrateError> {
        let mut report = HydrateReport {
            portal: Portal::new(portal_name)
                .with_primary_language(self.client.settings().primary()),
            issues: Vec::new(),
        };

        let categories = self.client.list_categories()?;
        tracing::info!(portal = portal_name, count = categories.len(), "hydrating categories");

        for (index, raw) in categories.into_iter().enumerate() {
            if !self.options.includes(index) {
                continue;
            }
            let remote_id = raw_id(&raw);
            match decode::<RemoteCategory>(raw) {
                Ok(remote) => self.hydrate_category(&mut report, &remote),
                Err(err) => report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Category, remote_id, err)),
            }
        }

        let stats = report.portal.stats();
        tracing::info!(
            portal = portal_name,
            categories = stats.categories,
            folders = stats.folders,
            articles = stats.articles,
            translations = stats.translations,
            issues = report.issues.len(),
            "hydration complete"
        );
        Ok(report)
    }

    fn hydrate_category(&self, report: &mut HydrateReport, remote: &RemoteCategory) {
        let id = RemoteId(remote.id);
        progress!(self.options.verbosity, remote_id = remote.id, "category {}", remote.name);

        let category = report.portal.add_category(remote.to_node().with_remote_id(id));
        for (lang, raw) in self.translations(report, ResourceKind::Category, id) {
            let added = decode::<RemoteCategory>(raw)
                .map_err(HydrateError::from)
                .and_then(|t| {
                    Ok(report
                        .portal
                        .add_category_translation(category, lang, t.to_node())?)
                });
            if let Err(err) = added {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Category, Some(id), err));
            }
        }

        let folders = match self.client.list_folders(id) {
            Ok(folders) => folders,
            Err(err) => {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Category, Some(id), err));
                return;
            }
        };
        for raw in folders {
            let remote_id = raw_id(&raw);
            match decode::<RemoteFolder>(raw) {
                Ok(folder) => self.hydrate_folder(report, category, &folder),
                Err(err) => report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Folder, remote_id, err)),
            }
        }
    }

    fn hydrate_folder(&self, report: &mut HydrateReport, category: CategoryId, remote: &RemoteFolder) {
        let id = RemoteId(remote.id);
        progress!(self.options.verbosity, remote_id = remote.id, "  folder {}", remote.name);

        let folder = match report
            .portal
            .add_folder(category, remote.to_node().with_remote_id(id))
        {
            Ok(folder) => folder,
            Err(err) => {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Folder, Some(id), err));
                return;
            }
        };
        for (lang, raw) in self.translations(report, ResourceKind::Folder, id) {
            let added = decode::<RemoteFolder>(raw)
                .map_err(HydrateError::from)
                .and_then(|t| Ok(report.portal.add_folder_translation(folder, lang, t.to_node())?));
            if let Err(err) = added {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Folder, Some(id), err));
            }
        }

        let articles = match self.client.list_articles(id) {
            Ok(articles) => articles,
            Err(err) => {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Folder, Some(id), err));
                return;
            }
        };
        for raw in articles {
            let remote_id = raw_id(&raw);
            match decode::<RemoteArticle>(raw) {
                Ok(article) => self.hydrate_article(report, folder, &article),
                Err(err) => report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Article, remote_id, err)),
            }
        }
    }

    fn hydrate_article(&self, report: &mut HydrateReport, folder: FolderId, remote: &RemoteArticle) {
        let id = RemoteId(remote.id);
        progress!(self.options.verbosity, remote_id = remote.id, "    article {}", remote.title);

        let article = match report
            .portal
            .add_article(folder, remote.to_node().with_remote_id(id))
        {
            Ok(article) => article,
            Err(err) => {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Article, Some(id), err));
                return;
            }
        };
        for (lang, raw) in self.translations(report, ResourceKind::Article, id) {
            let added = decode::<RemoteArticle>(raw)
                .map_err(HydrateError::from)
                .and_then(|t| {
                    Ok(report
                        .portal
                        .add_article_translation(article, lang, t.to_node())?)
                });
            if let Err(err) = added {
                report
                    .issues
                    .push(HydrateIssue::new(ResourceKind::Article, Some(id), err));
            }
        }
    }

    /// Existing translations; a failing language is recorded and skipped
    fn translations(
        &self,
        report: &mut HydrateReport,
        kind: ResourceKind,
        id: RemoteId,
    ) -> Vec<(Language, Value)> {
        let mut found = Vec::new();
        for lang in self.client.settings().translation_languages() {
            match self.client.get_translation(kind, id, lang) {
                Ok(Some(value)) => found.push((lang, value)),
                Ok(None) => {}
                Err(err) => report.issues.push(HydrateIssue::new(kind, Some(id), err)),
            }
        }
        found
    }
}

fn raw_id(raw: &Value) -> Option<RemoteId> {
    raw.get("id").and_then(Value::as_u64).map(RemoteId)
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    Ok(serde_json::from_value(value)?)
}
