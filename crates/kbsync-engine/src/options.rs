//! Create options

use kbsync_model::{ArticleType, RemoteId, Status, Visibility};

/// Options of a create call
///
/// Explicit values take precedence over what the node carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Also create every translation of the node
    pub translations: bool,
    /// Also create owned children, in tree order
    pub children: bool,
    /// Create the parent first when it has no remote ID
    pub create_parent: bool,
    /// Remote parent ID to create under
    pub parent_id: Option<RemoteId>,
    /// Category name suffix
    pub suffix: Option<String>,
    /// Portals a category is visible in
    pub portal_ids: Option<Vec<u64>>,
    /// Article content type
    pub article_type: Option<ArticleType>,
    /// Article status
    pub status: Option<Status>,
    /// Folder visibility
    pub visibility: Option<Visibility>,
}

impl CreateOptions {
    /// Create the node, its translations and its whole subtree
    #[must_use]
    pub fn recursive() -> Self {
        Self {
            translations: true,
            children: true,
            ..Self::default()
        }
    }

    /// With translation creation
    #[inline]
    #[must_use]
    pub fn with_translations(mut self, enabled: bool) -> Self {
        self.translations = enabled;
        self
    }

    /// With child creation
    #[inline]
    #[must_use]
    pub fn with_children(mut self, enabled: bool) -> Self {
        self.children = enabled;
        self
    }

    /// With parent creation
    #[inline]
    #[must_use]
    pub fn with_create_parent(mut self, enabled: bool) -> Self {
        self.create_parent = enabled;
        self
    }

    /// With explicit remote parent
    #[inline]
    #[must_use]
    pub fn with_parent_id(mut self, id: RemoteId) -> Self {
        self.parent_id = Some(id);
        self
    }

    /// With category name suffix
    #[inline]
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// With category portal scope
    #[inline]
    #[must_use]
    pub fn with_portals(mut self, ids: Vec<u64>) -> Self {
        self.portal_ids = Some(ids);
        self
    }

    /// With article content type
    #[inline]
    #[must_use]
    pub fn with_article_type(mut self, article_type: ArticleType) -> Self {
        self.article_type = Some(article_type);
        self
    }

    /// With article status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// With folder visibility
    #[inline]
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Options for children: each child is created under its own parent
    pub(crate) fn for_children(&self) -> Self {
        Self {
            create_parent: false,
            parent_id: None,
            ..self.clone()
        }
    }

    /// Options for a parent created on demand: no siblings, no explicit
    /// parent, and the parent keeps its own visibility, status and type
    pub(crate) fn for_parent(&self) -> Self {
        Self {
            children: false,
            parent_id: None,
            article_type: None,
            status: None,
            visibility: None,
            ..self.clone()
        }
    }
}
