//! Content tree nodes
//!
//! Categories, folders and articles live in arenas owned by the
//! [`Portal`](crate::Portal) and refer to each other by typed index. A
//! translation is a node of the same kind whose `primary` points back at the
//! node it translates; that pointer is a plain index, never ownership.

use crate::kinds::{ArticleType, Status, Visibility};
use crate::language::Language;
use crate::markup;
use crate::origin::Origin;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw arena index
            #[inline]
            #[must_use]
            pub const fn from_index(index: usize) -> Self {
                Self(index)
            }

            /// Raw arena index
            #[inline]
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{} #{}", $label, self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a category in its portal
    CategoryId,
    "category"
);
arena_id!(
    /// Index of a folder in its portal
    FolderId,
    "folder"
);
arena_id!(
    /// Index of an article in its portal
    ArticleId,
    "article"
);

/// Any node of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    /// A category
    Category(CategoryId),
    /// A folder
    Folder(FolderId),
    /// An article
    Article(ArticleId),
}

impl Display for NodeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Category(id) => id.fmt(f),
            NodeRef::Folder(id) => id.fmt(f),
            NodeRef::Article(id) => id.fmt(f),
        }
    }
}

impl From<CategoryId> for NodeRef {
    fn from(id: CategoryId) -> Self {
        NodeRef::Category(id)
    }
}

impl From<FolderId> for NodeRef {
    fn from(id: FolderId) -> Self {
        NodeRef::Folder(id)
    }
}

impl From<ArticleId> for NodeRef {
    fn from(id: ArticleId) -> Self {
        NodeRef::Article(id)
    }
}

/// Identifier assigned by the helpdesk once a node is created there
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RemoteId(pub u64);

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity fields shared by every node kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMeta {
    remote_id: Option<RemoteId>,
    /// Language of this node when it is a translation; `None` for primary nodes
    pub source_lang: Option<Language>,
    /// Spreadsheet cell this node was read from
    pub origin: Option<Origin>,
}

impl NodeMeta {
    /// Remote ID, if the node exists remotely
    #[inline]
    #[must_use]
    pub fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    /// Whether this node is a translation
    #[inline]
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.source_lang.is_some()
    }

    /// Assign the remote ID once; returns the existing ID if one is set
    pub fn assign_remote_id(&mut self, id: RemoteId) -> Result<(), RemoteId> {
        match self.remote_id {
            Some(existing) => Err(existing),
            None => {
                self.remote_id = Some(id);
                Ok(())
            }
        }
    }

    /// Forget the remote ID after the remote node was deleted
    pub fn clear_remote_id(&mut self) -> Option<RemoteId> {
        self.remote_id.take()
    }
}

/// Read access shared by every node kind
pub trait ContentNode {
    /// Name (categories, folders) or title (articles)
    fn label(&self) -> &str;

    /// Identity fields
    fn meta(&self) -> &NodeMeta;

    /// Mutable identity fields
    fn meta_mut(&mut self) -> &mut NodeMeta;
}

/// Crate-internal wiring between a primary node and its translations
pub(crate) trait Translatable: ContentNode + Sized {
    type Id: Copy + Eq;

    fn make_id(index: usize) -> Self::Id;
    fn index_of(id: Self::Id) -> usize;
    fn primary_id(&self) -> Option<Self::Id>;
    fn set_primary(&mut self, primary: Self::Id);
    fn translation_map_mut(&mut self) -> &mut IndexMap<Language, Self::Id>;
}

/// A category: the top level of a portal, one per source sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Display name
    pub name: String,
    /// Rich-text description
    pub description: Option<String>,
    /// Remote portal IDs the category is visible in
    pub visible_in_portals: Vec<u64>,
    /// Name suffix appended remotely (`"<name> || <suffix>"`)
    pub suffix: Option<String>,
    /// Identity fields
    pub meta: NodeMeta,
    pub(crate) folders: Vec<FolderId>,
    pub(crate) translations: IndexMap<Language, CategoryId>,
    pub(crate) primary: Option<CategoryId>,
}

impl Category {
    /// Create a category with a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With origin coordinates
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.meta.origin = Some(origin);
        self
    }

    /// With an already-known remote ID
    #[must_use]
    pub fn with_remote_id(mut self, id: RemoteId) -> Self {
        self.meta.remote_id = Some(id);
        self
    }

    /// With visible-in-portals list
    #[must_use]
    pub fn with_portals(mut self, portals: Vec<u64>) -> Self {
        self.visible_in_portals = portals;
        self
    }

    /// With name suffix
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Owned folders in declaration order
    #[inline]
    #[must_use]
    pub fn folders(&self) -> &[FolderId] {
        &self.folders
    }

    /// Translations keyed by language
    #[inline]
    #[must_use]
    pub fn translations(&self) -> &IndexMap<Language, CategoryId> {
        &self.translations
    }

    /// Primary category, when this one is a translation
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Option<CategoryId> {
        self.primary
    }
}

/// A folder inside a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Visibility level
    pub visibility: Visibility,
    /// Identity fields
    pub meta: NodeMeta,
    pub(crate) category: Option<CategoryId>,
    pub(crate) articles: Vec<ArticleId>,
    pub(crate) translations: IndexMap<Language, FolderId>,
    pub(crate) primary: Option<FolderId>,
}

impl Folder {
    /// Create a folder with a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With visibility
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// With origin coordinates
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.meta.origin = Some(origin);
        self
    }

    /// With an already-known remote ID
    #[must_use]
    pub fn with_remote_id(mut self, id: RemoteId) -> Self {
        self.meta.remote_id = Some(id);
        self
    }

    /// Owning category (unset for translations)
    #[inline]
    #[must_use]
    pub fn category(&self) -> Option<CategoryId> {
        self.category
    }

    /// Owned articles in declaration order
    #[inline]
    #[must_use]
    pub fn articles(&self) -> &[ArticleId] {
        &self.articles
    }

    /// Translations keyed by language
    #[inline]
    #[must_use]
    pub fn translations(&self) -> &IndexMap<Language, FolderId> {
        &self.translations
    }

    /// Primary folder, when this one is a translation
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Option<FolderId> {
        self.primary
    }
}

/// An article inside a folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Title
    pub title: String,
    /// Rich-text body (HTML)
    pub description: String,
    /// Plain-text summary of the body
    pub description_text: String,
    /// Content type
    pub article_type: ArticleType,
    /// Publication status
    pub status: Status,
    /// Identity fields
    pub meta: NodeMeta,
    pub(crate) folder: Option<FolderId>,
    pub(crate) translations: IndexMap<Language, ArticleId>,
    pub(crate) primary: Option<ArticleId>,
}

impl Article {
    /// Create an article with a title and an empty body
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Create an article from a Markdown body, rendering HTML and plain text
    #[must_use]
    pub fn from_markdown(title: impl Into<String>, body: &str) -> Self {
        Self {
            title: title.into(),
            description: markup::render_markup(body),
            description_text: markup::textify(body),
            ..Self::default()
        }
    }

    /// With an HTML body; the plain-text summary is derived when not given
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>, text: Option<String>) -> Self {
        let html = html.into();
        self.description_text = text.unwrap_or_else(|| markup::textify(&html));
        self.description = html;
        self
    }

    /// With content type
    #[must_use]
    pub fn with_type(mut self, article_type: ArticleType) -> Self {
        self.article_type = article_type;
        self
    }

    /// With publication status
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// With origin coordinates
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.meta.origin = Some(origin);
        self
    }

    /// With an already-known remote ID
    #[must_use]
    pub fn with_remote_id(mut self, id: RemoteId) -> Self {
        self.meta.remote_id = Some(id);
        self
    }

    /// Owning folder (unset for translations)
    #[inline]
    #[must_use]
    pub fn folder(&self) -> Option<FolderId> {
        self.folder
    }

    /// Translations keyed by language
    #[inline]
    #[must_use]
    pub fn translations(&self) -> &IndexMap<Language, ArticleId> {
        &self.translations
    }

    /// Primary article, when this one is a translation
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Option<ArticleId> {
        self.primary
    }
}

impl ContentNode for Category {
    fn label(&self) -> &str {
        &self.name
    }

    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }
}

impl ContentNode for Folder {
    fn label(&self) -> &str {
        &self.name
    }

    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }
}

impl ContentNode for Article {
    fn label(&self) -> &str {
        &self.title
    }

    fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut NodeMeta {
        &mut self.meta
    }
}

impl Translatable for Category {
    type Id = CategoryId;

    fn make_id(index: usize) -> CategoryId {
        CategoryId(index)
    }

    fn index_of(id: CategoryId) -> usize {
        id.0
    }

    fn primary_id(&self) -> Option<CategoryId> {
        self.primary
    }

    fn set_primary(&mut self, primary: CategoryId) {
        self.primary = Some(primary);
    }

    fn translation_map_mut(&mut self) -> &mut IndexMap<Language, CategoryId> {
        &mut self.translations
    }
}

impl Translatable for Folder {
    type Id = FolderId;

    fn make_id(index: usize) -> FolderId {
        FolderId(index)
    }

    fn index_of(id: FolderId) -> usize {
        id.0
    }

    fn primary_id(&self) -> Option<FolderId> {
        self.primary
    }

    fn set_primary(&mut self, primary: FolderId) {
        self.primary = Some(primary);
    }

    fn translation_map_mut(&mut self) -> &mut IndexMap<Language, FolderId> {
        &mut self.translations
    }
}

impl Translatable for Article {
    type Id = ArticleId;

    fn make_id(index: usize) -> ArticleId {
        ArticleId(index)
    }

    fn index_of(id: ArticleId) -> usize {
        id.0
    }

    fn primary_id(&self) -> Option<ArticleId> {
        self.primary
    }

    fn set_primary(&mut self, primary: ArticleId) {
        self.primary = Some(primary);
    }

    fn translation_map_mut(&mut self) -> &mut IndexMap<Language, ArticleId> {
        &mut self.translations
    }
}

fn write_langs<I: Iterator<Item = Language>>(f: &mut Formatter<'_>, langs: I) -> fmt::Result {
    let langs: Vec<String> = langs.map(|l| l.code().to_uppercase()).collect();
    if !langs.is_empty() {
        write!(f, " ({})", langs.join(","))?;
    }
    Ok(())
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Category \"{}\"", self.name)?;
        if let Some(id) = self.meta.remote_id {
            write!(f, " #{id}")?;
        }
        write_langs(f, self.translations.keys().copied())
    }
}

impl Display for Folder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Folder \"{}\"", self.name)?;
        if let Some(id) = self.meta.remote_id {
            write!(f, " #{id}")?;
        }
        write_langs(f, self.translations.keys().copied())
    }
}

impl Display for Article {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Article \"{}\"", self.title)?;
        if let Some(id) = self.meta.remote_id {
            write!(f, " #{id}")?;
        }
        write_langs(f, self.translations.keys().copied())
    }
}
