//! Sync Engine: drive a content tree into the helpdesk
//!
//! Every create is idempotent per node: a node that already carries a
//! remote ID is skipped without any remote call, and a successful create
//! records the returned ID on the node before anything else happens.
//!
//! - Parent resolution: explicit ID, then the parent's remote ID, then
//!   (on request) creating the parent first
//! - Translations are best-effort; a failed translation never undoes the
//!   primary node
//! - A failed node skips its own children but not its siblings

use crate::error::SyncError;
use crate::options::CreateOptions;
use crate::report::{CreateOutcome, DeleteOutcome, SyncReport};
use kbsync_api::{
    ApiError, ArticlePayload, ArticleTranslationPayload, CategoryPayload, FolderPayload,
    HelpdeskClient, HelpdeskTransport, NamedTranslationPayload, ResourceKind,
};
use kbsync_model::{
    ArticleId, CategoryId, FolderId, Language, NodeMeta, NodeRef, Portal, RemoteId,
};
use serde::Serialize;

/// Separator between a category name and its suffix
pub const SUFFIX_SEPARATOR: &str = " || ";

/// Creates and deletes tree nodes remotely
#[derive(Debug)]
pub struct SyncEngine<T> {
    client: HelpdeskClient<T>,
    portal_scope: Vec<u64>,
    report: SyncReport,
}

impl<T: HelpdeskTransport> SyncEngine<T> {
    /// Create an engine over a client
    pub fn new(client: HelpdeskClient<T>) -> Self {
        Self {
            client,
            portal_scope: Vec::new(),
            report: SyncReport::default(),
        }
    }

    /// With configured portal scope for new categories
    #[must_use]
    pub fn with_portal_scope(mut self, ids: Vec<u64>) -> Self {
        self.portal_scope = ids;
        self
    }

    /// Underlying client
    #[inline]
    pub fn client(&self) -> &HelpdeskClient<T> {
        &self.client
    }

    /// Report of the calls made so far
    #[inline]
    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    /// Take the report, starting a fresh one
    pub fn take_report(&mut self) -> SyncReport {
        std::mem::take(&mut self.report)
    }

    /// Create any node
    pub fn create(
        &mut self,
        portal: &mut Portal,
        node: NodeRef,
        options: &CreateOptions,
    ) -> Result<CreateOutcome, SyncError> {
        match node {
            NodeRef::Category(id) => self.create_category(portal, id, options),
            NodeRef::Folder(id) => self.create_folder(portal, id, options),
            NodeRef::Article(id) => self.create_article(portal, id, options),
        }
    }

    /// Create a category
    pub fn create_category(
        &mut self,
        portal: &mut Portal,
        category: CategoryId,
        options: &CreateOptions,
    ) -> Result<CreateOutcome, SyncError> {
        let node = NodeRef::from(category);
        if let Some(id) = self.already_synced(portal, node)? {
            return Ok(CreateOutcome::AlreadySynced(id));
        }
        let primary = portal.category(category).ok_or(SyncError::UnknownNode(node))?;

        let suffix = options
            .suffix
            .as_deref()
            .or_else(|| portal.suffix_for(category))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("{SUFFIX_SEPARATOR}{s}"))
            .unwrap_or_default();
        let portals = options
            .portal_ids
            .clone()
            .or_else(|| non_empty(&self.portal_scope))
            .or_else(|| non_empty(&primary.visible_in_portals));

        let payload = CategoryPayload {
            name: format!("{}{suffix}", primary.name),
            description: primary.description.clone(),
            visible_in_portals: portals,
        };
        let translations: Vec<(Language, NamedTranslationPayload)> = if options.translations {
            primary
                .translations()
                .iter()
                .filter_map(|(lang, id)| portal.category(*id).map(|t| (*lang, t)))
                .map(|(lang, t)| {
                    let payload = NamedTranslationPayload {
                        name: format!("{}{suffix}", t.name),
                        description: t.description.clone(),
                    };
                    (lang, payload)
                })
                .collect()
        } else {
            Vec::new()
        };
        let folders = primary.folders().to_vec();

        let created = self.client.create_category(&payload);
        let Some(id) = self.record(portal, node, &payload.name, created)? else {
            return Ok(CreateOutcome::AlreadyExists);
        };

        for (lang, translation) in &translations {
            self.create_translation(ResourceKind::Category, id, *lang, &translation.name, translation);
        }
        if options.children {
            let child_options = options.for_children();
            for folder in folders {
                if let Err(err) = self.create_folder(portal, folder, &child_options) {
                    tracing::debug!("folder skipped: {err}");
                }
            }
        }
        Ok(CreateOutcome::Created(id))
    }

    /// Create a folder
    pub fn create_folder(
        &mut self,
        portal: &mut Portal,
        folder: FolderId,
        options: &CreateOptions,
    ) -> Result<CreateOutcome, SyncError> {
        let node = NodeRef::from(folder);
        if let Some(id) = self.already_synced(portal, node)? {
            return Ok(CreateOutcome::AlreadySynced(id));
        }
        let parent = portal
            .folder(folder)
            .and_then(|f| f.category())
            .ok_or(SyncError::MissingParent(node))?;
        let category_id = self.resolve_parent(portal, node, parent.into(), options)?;
        let primary = portal.folder(folder).ok_or(SyncError::UnknownNode(node))?;

        let payload = FolderPayload {
            name: primary.name.clone(),
            description: primary.description.clone(),
            visibility: options.visibility.unwrap_or(primary.visibility).code(),
        };
        let translations: Vec<(Language, NamedTranslationPayload)> = if options.translations {
            primary
                .translations()
                .iter()
                .filter_map(|(lang, id)| portal.folder(*id).map(|t| (*lang, t)))
                .map(|(lang, t)| {
                    let payload = NamedTranslationPayload {
                        name: t.name.clone(),
                        description: t.description.clone(),
                    };
                    (lang, payload)
                })
                .collect()
        } else {
            Vec::new()
        };
        let articles = primary.articles().to_vec();

        let created = self.client.create_folder(category_id, &payload);
        let Some(id) = self.record(portal, node, &payload.name, created)? else {
            return Ok(CreateOutcome::AlreadyExists);
        };

        for (lang, translation) in &translations {
            self.create_translation(ResourceKind::Folder, id, *lang, &translation.name, translation);
        }
        if options.children {
            let child_options = options.for_children();
            for article in articles {
                if let Err(err) = self.create_article(portal, article, &child_options) {
                    tracing::debug!("article skipped: {err}");
                }
            }
        }
        Ok(CreateOutcome::Created(id))
    }

    /// Create an article
    pub fn create_article(
        &mut self,
        portal: &mut Portal,
        article: ArticleId,
        options: &CreateOptions,
    ) -> Result<CreateOutcome, SyncError> {
        let node = NodeRef::from(article);
        if let Some(id) = self.already_synced(portal, node)? {
            return Ok(CreateOutcome::AlreadySynced(id));
        }
        let parent = portal
            .article(article)
            .and_then(|a| a.folder())
            .ok_or(SyncError::MissingParent(node))?;
        let folder_id = self.resolve_parent(portal, node, parent.into(), options)?;
        let primary = portal.article(article).ok_or(SyncError::UnknownNode(node))?;

        let payload = ArticlePayload {
            title: primary.title.clone(),
            description: primary.description.clone(),
            article_type: options.article_type.unwrap_or(primary.article_type).code(),
            status: options.status.unwrap_or(primary.status).code(),
        };
        let translations: Vec<(Language, ArticleTranslationPayload)> = if options.translations {
            primary
                .translations()
                .iter()
                .filter_map(|(lang, id)| portal.article(*id).map(|t| (*lang, t)))
                .map(|(lang, t)| {
                    let payload = ArticleTranslationPayload {
                        title: t.title.clone(),
                        description: t.description.clone(),
                        status: options.status.unwrap_or(t.status).code(),
                    };
                    (lang, payload)
                })
                .collect()
        } else {
            Vec::new()
        };

        let created = self.client.create_article(folder_id, &payload);
        let Some(id) = self.record(portal, node, &payload.title, created)? else {
            return Ok(CreateOutcome::AlreadyExists);
        };

        for (lang, translation) in &translations {
            self.create_translation(ResourceKind::Article, id, *lang, &translation.title, translation);
        }
        Ok(CreateOutcome::Created(id))
    }

    /// Delete any node remotely and forget its remote ID
    ///
    /// 404 is reported as [`DeleteOutcome::AlreadyGone`] and 405 as
    /// [`DeleteOutcome::Refused`]; both clear the local ID like a delete.
    pub fn delete(&mut self, portal: &mut Portal, node: NodeRef) -> Result<DeleteOutcome, SyncError> {
        let meta = portal.meta(node).ok_or(SyncError::UnknownNode(node))?;
        if meta.is_translation() {
            return Err(SyncError::NotPrimary(node));
        }
        let label = portal.label(node).unwrap_or_default().to_string();
        let Some(id) = meta.remote_id() else {
            tracing::warn!("{node} '{label}' has no remote id, nothing to delete");
            return Err(SyncError::NoRemoteId(node));
        };

        tracing::info!(remote_id = %id, "deleting {node} '{label}'");
        let outcome = match self.client.delete_resource(ResourceKind::from(node), id) {
            Ok(()) => DeleteOutcome::Deleted(id),
            Err(ApiError::NotFound) => {
                tracing::warn!(remote_id = %id, "{node} '{label}' is already gone");
                DeleteOutcome::AlreadyGone(id)
            }
            Err(ApiError::MethodNotAllowed) => {
                tracing::warn!(remote_id = %id, "helpdesk refuses to delete {node} '{label}'");
                DeleteOutcome::Refused(id)
            }
            Err(err) => {
                tracing::error!(remote_id = %id, class = err.class(), "failed to delete {node} '{label}': {err}");
                self.report.fail(format!("delete {node} '{label}': {err}"));
                return Err(SyncError::api(node, err));
            }
        };
        portal.clear_remote_id(node)?;
        self.report.deleted += 1;
        Ok(outcome)
    }

    /// Delete a category
    pub fn delete_category(
        &mut self,
        portal: &mut Portal,
        category: CategoryId,
    ) -> Result<DeleteOutcome, SyncError> {
        self.delete(portal, category.into())
    }

    /// Delete a folder
    pub fn delete_folder(
        &mut self,
        portal: &mut Portal,
        folder: FolderId,
    ) -> Result<DeleteOutcome, SyncError> {
        self.delete(portal, folder.into())
    }

    /// Delete an article
    pub fn delete_article(
        &mut self,
        portal: &mut Portal,
        article: ArticleId,
    ) -> Result<DeleteOutcome, SyncError> {
        self.delete(portal, article.into())
    }

    // ------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------

    fn already_synced(&mut self, portal: &Portal, node: NodeRef) -> Result<Option<RemoteId>, SyncError> {
        let meta = portal.meta(node).ok_or(SyncError::UnknownNode(node))?;
        if meta.is_translation() {
            return Err(SyncError::NotPrimary(node));
        }
        let Some(id) = meta.remote_id() else {
            return Ok(None);
        };
        tracing::warn!(
            remote_id = %id,
            "{node} '{}' already exists remotely, use update instead",
            portal.label(node).unwrap_or_default()
        );
        self.report.skipped += 1;
        Ok(Some(id))
    }

    fn resolve_parent(
        &mut self,
        portal: &mut Portal,
        node: NodeRef,
        parent: NodeRef,
        options: &CreateOptions,
    ) -> Result<RemoteId, SyncError> {
        if let Some(id) = options.parent_id {
            return Ok(id);
        }
        if let Some(id) = portal.meta(parent).and_then(NodeMeta::remote_id) {
            return Ok(id);
        }
        let label = portal.label(node).unwrap_or_default().to_string();
        if !options.create_parent {
            tracing::error!("{node} '{label}': parent {parent} has no remote id");
            self.report.fail(format!("{node} '{label}': parent not created"));
            return Err(SyncError::MissingParent(node));
        }

        tracing::info!("{node} '{label}': creating parent {parent} first");
        match self.create(portal, parent, &options.for_parent()) {
            Ok(outcome) => {
                if let Some(id) = outcome.remote_id() {
                    return Ok(id);
                }
            }
            Err(err) => tracing::debug!("parent create failed: {err}"),
        }
        tracing::error!("{node} '{label}': failed to create parent, can't continue");
        self.report.fail(format!("{node} '{label}': parent creation failed"));
        Err(SyncError::ParentCreateFailed(node))
    }

    fn record(
        &mut self,
        portal: &mut Portal,
        node: NodeRef,
        label: &str,
        created: Result<RemoteId, ApiError>,
    ) -> Result<Option<RemoteId>, SyncError> {
        match created {
            Ok(id) => {
                portal.assign_remote_id(node, id)?;
                self.report.created += 1;
                tracing::info!(remote_id = %id, "created {node} '{label}'");
                Ok(Some(id))
            }
            Err(ApiError::AlreadyExists) => {
                tracing::warn!("{node} '{label}' already exists remotely, skipped");
                self.report.already_exists += 1;
                Ok(None)
            }
            Err(err) => {
                tracing::error!(class = err.class(), "failed to create {node} '{label}': {err}");
                self.report.fail(format!("{node} '{label}': {}", err.class()));
                Err(SyncError::api(node, err))
            }
        }
    }

    fn create_translation<B: Serialize>(
        &mut self,
        kind: ResourceKind,
        id: RemoteId,
        lang: Language,
        label: &str,
        payload: &B,
    ) {
        match self.client.create_translation(kind, id, lang, payload) {
            Ok(()) => {
                self.report.translations += 1;
                tracing::debug!(remote_id = %id, language = %lang, "created {kind} translation '{label}'");
            }
            Err(ApiError::AlreadyExists) => {
                self.report.already_exists += 1;
                tracing::warn!(remote_id = %id, language = %lang, "{kind} translation '{label}' already exists");
            }
            Err(err) => {
                tracing::warn!(
                    remote_id = %id,
                    language = %lang,
                    class = err.class(),
                    "failed to create {kind} translation '{label}': {err}"
                );
                self.report
                    .fail(format!("{kind} {id} translation {lang} '{label}': {}", err.class()));
            }
        }
    }
}

fn non_empty(ids: &[u64]) -> Option<Vec<u64>> {
    (!ids.is_empty()).then(|| ids.to_vec())
}
