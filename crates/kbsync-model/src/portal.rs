//! Portal: the root of the content tree
//!
//! The portal owns three arenas (categories, folders, articles) and the
//! ordered list of top-level categories. Every parent/child and
//! primary/translation edge is a typed index into these arenas.
//!
//! - Children are attached only to primary nodes
//! - Translations are always attached to the primary node; adding a
//!   translation to a translation is routed up to its primary
//! - A translation keyed by the portal's primary language is rejected

use crate::error::ModelError;
use crate::language::Language;
use crate::node::{
    Article, ArticleId, Category, CategoryId, ContentNode, Folder, FolderId, NodeMeta, NodeRef,
    RemoteId, Translatable,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Node counts of a portal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortalStats {
    /// Primary categories
    pub categories: usize,
    /// Primary folders
    pub folders: usize,
    /// Primary articles
    pub articles: usize,
    /// Translation nodes of any kind
    pub translations: usize,
    /// Primary nodes that already carry a remote ID
    pub synced: usize,
}

/// Root of a content tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    /// Display name
    pub name: String,
    /// Source workbook, inherited by nodes whose origin carries none
    pub workbook_id: Option<String>,
    /// Remote portal IDs that scope category visibility
    pub remote_portal_ids: Vec<u64>,
    /// Suffix applied to descendant category names
    pub suffix: Option<String>,
    /// Language of primary nodes
    pub primary_language: Language,
    roots: Vec<CategoryId>,
    categories: Vec<Category>,
    folders: Vec<Folder>,
    articles: Vec<Article>,
}

impl Portal {
    /// Create an empty portal
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With source workbook
    #[inline]
    #[must_use]
    pub fn with_workbook(mut self, workbook_id: impl Into<String>) -> Self {
        self.workbook_id = Some(workbook_id.into());
        self
    }

    /// With remote portal scope
    #[inline]
    #[must_use]
    pub fn with_remote_portals(mut self, ids: Vec<u64>) -> Self {
        self.remote_portal_ids = ids;
        self
    }

    /// With category name suffix
    #[inline]
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// With primary language
    #[inline]
    #[must_use]
    pub fn with_primary_language(mut self, language: Language) -> Self {
        self.primary_language = language;
        self
    }

    // ------------------------------------------------------------------
    // Building
    // ------------------------------------------------------------------

    /// Add a top-level category
    ///
    /// The portal's remote portal IDs are appended to the category's
    /// visibility list and the portal suffix is copied when the category
    /// has none of its own.
    pub fn add_category(&mut self, mut category: Category) -> CategoryId {
        for id in &self.remote_portal_ids {
            if !category.visible_in_portals.contains(id) {
                category.visible_in_portals.push(*id);
            }
        }
        if category.suffix.is_none() {
            category.suffix.clone_from(&self.suffix);
        }
        category.meta.source_lang = None;
        category.primary = None;
        category.folders.clear();
        category.translations.clear();

        let id = CategoryId::from_index(self.categories.len());
        self.categories.push(category);
        self.roots.push(id);
        id
    }

    /// Add a folder to a primary category
    pub fn add_folder(
        &mut self,
        category: CategoryId,
        mut folder: Folder,
    ) -> Result<FolderId, ModelError> {
        let parent = self
            .categories
            .get(category.index())
            .ok_or(ModelError::UnknownNode(category.into()))?;
        if parent.meta.is_translation() {
            return Err(ModelError::ChildOfTranslation(category.into()));
        }

        folder.meta.source_lang = None;
        folder.category = Some(category);
        folder.primary = None;
        folder.articles.clear();
        folder.translations.clear();

        let id = FolderId::from_index(self.folders.len());
        self.folders.push(folder);
        self.categories[category.index()].folders.push(id);
        Ok(id)
    }

    /// Add an article to a primary folder
    pub fn add_article(
        &mut self,
        folder: FolderId,
        mut article: Article,
    ) -> Result<ArticleId, ModelError> {
        let parent = self
            .folders
            .get(folder.index())
            .ok_or(ModelError::UnknownNode(folder.into()))?;
        if parent.meta.is_translation() {
            return Err(ModelError::ChildOfTranslation(folder.into()));
        }

        article.meta.source_lang = None;
        article.folder = Some(folder);
        article.primary = None;
        article.translations.clear();

        let id = ArticleId::from_index(self.articles.len());
        self.articles.push(article);
        self.folders[folder.index()].articles.push(id);
        Ok(id)
    }

    /// Attach a category translation; replaces an existing one for `lang`
    pub fn add_category_translation(
        &mut self,
        target: CategoryId,
        lang: Language,
        translation: Category,
    ) -> Result<CategoryId, ModelError> {
        let primary_language = self.primary_language;
        attach_translation(&mut self.categories, primary_language, target, lang, translation)
    }

    /// Attach a folder translation; replaces an existing one for `lang`
    pub fn add_folder_translation(
        &mut self,
        target: FolderId,
        lang: Language,
        mut translation: Folder,
    ) -> Result<FolderId, ModelError> {
        translation.category = None;
        translation.articles.clear();
        let primary_language = self.primary_language;
        attach_translation(&mut self.folders, primary_language, target, lang, translation)
    }

    /// Attach an article translation; replaces an existing one for `lang`
    pub fn add_article_translation(
        &mut self,
        target: ArticleId,
        lang: Language,
        mut translation: Article,
    ) -> Result<ArticleId, ModelError> {
        translation.folder = None;
        let primary_language = self.primary_language;
        attach_translation(&mut self.articles, primary_language, target, lang, translation)
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// Top-level categories in insertion order
    #[inline]
    #[must_use]
    pub fn category_ids(&self) -> &[CategoryId] {
        &self.roots
    }

    /// Top-level categories with their IDs
    pub fn categories(&self) -> impl Iterator<Item = (CategoryId, &Category)> + '_ {
        self.roots
            .iter()
            .filter_map(|id| self.categories.get(id.index()).map(|c| (*id, c)))
    }

    /// Category by ID
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.index())
    }

    /// Mutable category by ID
    pub fn category_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.get_mut(id.index())
    }

    /// Folder by ID
    #[must_use]
    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(id.index())
    }

    /// Mutable folder by ID
    pub fn folder_mut(&mut self, id: FolderId) -> Option<&mut Folder> {
        self.folders.get_mut(id.index())
    }

    /// Article by ID
    #[must_use]
    pub fn article(&self, id: ArticleId) -> Option<&Article> {
        self.articles.get(id.index())
    }

    /// Mutable article by ID
    pub fn article_mut(&mut self, id: ArticleId) -> Option<&mut Article> {
        self.articles.get_mut(id.index())
    }

    /// Any node as a trait object
    #[must_use]
    pub fn node(&self, node: NodeRef) -> Option<&dyn ContentNode> {
        match node {
            NodeRef::Category(id) => self.category(id).map(|n| n as &dyn ContentNode),
            NodeRef::Folder(id) => self.folder(id).map(|n| n as &dyn ContentNode),
            NodeRef::Article(id) => self.article(id).map(|n| n as &dyn ContentNode),
        }
    }

    /// Identity fields of any node
    #[must_use]
    pub fn meta(&self, node: NodeRef) -> Option<&NodeMeta> {
        self.node(node).map(ContentNode::meta)
    }

    /// Mutable identity fields of any node
    pub fn meta_mut(&mut self, node: NodeRef) -> Option<&mut NodeMeta> {
        match node {
            NodeRef::Category(id) => self.category_mut(id).map(|n| &mut n.meta),
            NodeRef::Folder(id) => self.folder_mut(id).map(|n| &mut n.meta),
            NodeRef::Article(id) => self.article_mut(id).map(|n| &mut n.meta),
        }
    }

    /// Name or title of any node
    #[must_use]
    pub fn label(&self, node: NodeRef) -> Option<&str> {
        self.node(node).map(ContentNode::label)
    }

    /// Translations of a node as `(language, node)` pairs in map order
    #[must_use]
    pub fn translations_of(&self, node: NodeRef) -> Vec<(Language, NodeRef)> {
        match node {
            NodeRef::Category(id) => self
                .category(id)
                .map(|c| c.translations().iter().map(|(l, t)| (*l, (*t).into())).collect())
                .unwrap_or_default(),
            NodeRef::Folder(id) => self
                .folder(id)
                .map(|f| f.translations().iter().map(|(l, t)| (*l, (*t).into())).collect())
                .unwrap_or_default(),
            NodeRef::Article(id) => self
                .article(id)
                .map(|a| a.translations().iter().map(|(l, t)| (*l, (*t).into())).collect())
                .unwrap_or_default(),
        }
    }

    /// Non-owning parent: the primary for a translation, otherwise the
    /// owning category or folder
    #[must_use]
    pub fn parent_of(&self, node: NodeRef) -> Option<NodeRef> {
        match node {
            NodeRef::Category(id) => self.category(id)?.primary().map(NodeRef::from),
            NodeRef::Folder(id) => {
                let folder = self.folder(id)?;
                match folder.primary() {
                    Some(primary) => Some(primary.into()),
                    None => folder.category().map(NodeRef::from),
                }
            }
            NodeRef::Article(id) => {
                let article = self.article(id)?;
                match article.primary() {
                    Some(primary) => Some(primary.into()),
                    None => article.folder().map(NodeRef::from),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Record the remote ID of a node; fails if one is already set
    pub fn assign_remote_id(&mut self, node: NodeRef, id: RemoteId) -> Result<(), ModelError> {
        let meta = self.meta_mut(node).ok_or(ModelError::UnknownNode(node))?;
        meta.assign_remote_id(id)
            .map_err(|existing| ModelError::RemoteIdAlreadySet { node, existing })
    }

    /// Forget the remote ID of a node after a delete
    pub fn clear_remote_id(&mut self, node: NodeRef) -> Result<Option<RemoteId>, ModelError> {
        let meta = self.meta_mut(node).ok_or(ModelError::UnknownNode(node))?;
        Ok(meta.clear_remote_id())
    }

    /// Workbook ID for a node: its own origin, then its ancestors', then the portal's
    #[must_use]
    pub fn resolve_workbook_id(&self, node: NodeRef) -> Option<&str> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(wb) = self
                .meta(n)
                .and_then(|m| m.origin.as_ref())
                .and_then(|o| o.workbook_id.as_deref())
            {
                return Some(wb);
            }
            current = self.parent_of(n);
        }
        self.workbook_id.as_deref()
    }

    /// Deep link to the spreadsheet cell a node was read from
    #[must_use]
    pub fn link(&self, node: NodeRef) -> Option<String> {
        let origin = self.meta(node)?.origin.as_ref()?;
        origin.link(self.resolve_workbook_id(node))
    }

    /// Suffix for a category: its own, or the portal's
    #[must_use]
    pub fn suffix_for(&self, category: CategoryId) -> Option<&str> {
        let own = self.category(category).and_then(|c| {
            let primary = c.primary().and_then(|p| self.category(p)).unwrap_or(c);
            primary.suffix.as_deref()
        });
        own.or(self.suffix.as_deref())
    }

    /// Node counts
    #[must_use]
    pub fn stats(&self) -> PortalStats {
        let mut stats = PortalStats::default();
        let mut count = |meta: &NodeMeta, primary: &mut usize| {
            if meta.is_translation() {
                stats.translations += 1;
            } else {
                *primary += 1;
                if meta.remote_id().is_some() {
                    stats.synced += 1;
                }
            }
        };
        let (mut c, mut f, mut a) = (0, 0, 0);
        self.categories.iter().for_each(|n| count(&n.meta, &mut c));
        self.folders.iter().for_each(|n| count(&n.meta, &mut f));
        self.articles.iter().for_each(|n| count(&n.meta, &mut a));
        stats.categories = c;
        stats.folders = f;
        stats.articles = a;
        stats
    }

    /// Whether the portal has no categories
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn attach_translation<T: Translatable>(
    arena: &mut Vec<T>,
    primary_language: Language,
    target: T::Id,
    lang: Language,
    mut node: T,
) -> Result<T::Id, ModelError>
where
    T::Id: Into<NodeRef>,
{
    if lang == primary_language {
        return Err(ModelError::PrimaryLanguageTranslation(lang));
    }
    let primary = arena
        .get(T::index_of(target))
        .ok_or(ModelError::UnknownNode(target.into()))?
        .primary_id()
        .unwrap_or(target);

    node.meta_mut().source_lang = Some(lang);
    node.set_primary(primary);
    node.translation_map_mut().clear();

    let existing = arena
        .get_mut(T::index_of(primary))
        .ok_or(ModelError::UnknownNode(primary.into()))?
        .translation_map_mut()
        .get(&lang)
        .copied();

    match existing {
        Some(id) => {
            arena[T::index_of(id)] = node;
            Ok(id)
        }
        None => {
            let id = T::make_id(arena.len());
            arena.push(node);
            arena[T::index_of(primary)]
                .translation_map_mut()
                .insert(lang, id);
            Ok(id)
        }
    }
}

impl Display for Portal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Portal \"{}\"", self.name)?;
        if !self.remote_portal_ids.is_empty() {
            let ids: Vec<String> = self.remote_portal_ids.iter().map(u64::to_string).collect();
            write!(f, " [{}]", ids.join(","))?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, " || {suffix}")?;
        }
        writeln!(f)?;
        for (_, category) in self.categories() {
            writeln!(f, "  {category}")?;
            for folder in category.folders().iter().filter_map(|id| self.folder(*id)) {
                writeln!(f, "    {folder}")?;
                for article in folder.articles().iter().filter_map(|id| self.article(*id)) {
                    writeln!(f, "      {article}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::{CellRef, Origin};
    use pretty_assertions::assert_eq;

    fn sample() -> (Portal, CategoryId, FolderId, ArticleId) {
        let mut portal = Portal::new("Help");
        let cat = portal.add_category(Category::new("Billing"));
        let folder = portal.add_folder(cat, Folder::new("Invoices")).unwrap();
        let article = portal
            .add_article(folder, Article::new("Download an invoice"))
            .unwrap();
        (portal, cat, folder, article)
    }

    #[test]
    fn add_category_applies_portal_defaults() {
        let mut portal = Portal::new("Help")
            .with_remote_portals(vec![7, 8])
            .with_suffix("EU");
        let id = portal.add_category(Category::new("Billing").with_portals(vec![8]));
        let category = portal.category(id).unwrap();
        assert_eq!(category.visible_in_portals, vec![8, 7]);
        assert_eq!(category.suffix.as_deref(), Some("EU"));

        let own = portal.add_category(Category::new("Shipping").with_suffix("US"));
        assert_eq!(portal.category(own).unwrap().suffix.as_deref(), Some("US"));
    }

    #[test]
    fn children_keep_declaration_order() {
        let (mut portal, cat, first, _) = sample();
        let second = portal.add_folder(cat, Folder::new("Refunds")).unwrap();
        assert_eq!(portal.category(cat).unwrap().folders(), &[first, second]);
        assert_eq!(portal.folder(second).unwrap().category(), Some(cat));
    }

    #[test]
    fn translation_of_translation_routes_to_primary() {
        let (mut portal, cat, _, _) = sample();
        let fr = portal
            .add_category_translation(cat, Language::Fr, Category::new("Facturation"))
            .unwrap();
        let de = portal
            .add_category_translation(fr, Language::De, Category::new("Abrechnung"))
            .unwrap();

        let primary = portal.category(cat).unwrap();
        assert_eq!(primary.translations().len(), 2);
        assert_eq!(primary.translations().get(&Language::De), Some(&de));
        assert!(portal.category(fr).unwrap().translations().is_empty());
        assert_eq!(portal.category(de).unwrap().primary(), Some(cat));
        assert_eq!(portal.category(de).unwrap().meta.source_lang, Some(Language::De));
    }

    #[test]
    fn duplicate_translation_language_replaces() {
        let (mut portal, _, folder, _) = sample();
        let a = portal
            .add_folder_translation(folder, Language::Fr, Folder::new("Factures"))
            .unwrap();
        let b = portal
            .add_folder_translation(folder, Language::Fr, Folder::new("Les factures"))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(portal.folder(a).unwrap().name, "Les factures");
        assert_eq!(portal.folder(folder).unwrap().translations().len(), 1);
    }

    #[test]
    fn primary_language_translation_rejected() {
        let (mut portal, _, _, article) = sample();
        let err = portal
            .add_article_translation(article, Language::En, Article::new("Again"))
            .unwrap_err();
        assert_eq!(err, ModelError::PrimaryLanguageTranslation(Language::En));
    }

    #[test]
    fn translation_cannot_own_children() {
        let (mut portal, cat, _, _) = sample();
        let fr = portal
            .add_category_translation(cat, Language::Fr, Category::new("Facturation"))
            .unwrap();
        let err = portal.add_folder(fr, Folder::new("Factures")).unwrap_err();
        assert_eq!(err, ModelError::ChildOfTranslation(fr.into()));
    }

    #[test]
    fn remote_id_set_once_through_portal() {
        let (mut portal, _, folder, _) = sample();
        let node = NodeRef::from(folder);
        portal.assign_remote_id(node, RemoteId(11)).unwrap();
        let err = portal.assign_remote_id(node, RemoteId(12)).unwrap_err();
        assert_eq!(
            err,
            ModelError::RemoteIdAlreadySet {
                node,
                existing: RemoteId(11)
            }
        );
        assert_eq!(portal.clear_remote_id(node).unwrap(), Some(RemoteId(11)));
        assert_eq!(portal.meta(node).unwrap().remote_id(), None);
    }

    #[test]
    fn unknown_node_reported() {
        let mut portal = Portal::new("Empty");
        let node = NodeRef::Article(ArticleId::from_index(3));
        assert_eq!(
            portal.assign_remote_id(node, RemoteId(1)),
            Err(ModelError::UnknownNode(node))
        );
    }

    #[test]
    fn workbook_inherited_for_links() {
        let mut portal = Portal::new("Help").with_workbook("wb-portal");
        let cat = portal.add_category(Category::new("Billing").with_origin(Origin::new(
            Some("wb-cat".into()),
            "Billing",
            Some(5),
            CellRef::new(1, 0),
        )));
        let folder = portal
            .add_folder(
                cat,
                Folder::new("Invoices").with_origin(Origin::new(
                    None,
                    "Billing",
                    Some(5),
                    CellRef::new(3, 0),
                )),
            )
            .unwrap();
        assert_eq!(portal.resolve_workbook_id(folder.into()), Some("wb-cat"));
        assert_eq!(
            portal.link(folder.into()).as_deref(),
            Some("https://docs.google.com/spreadsheets/d/wb-cat/edit#gid=5&range=A4")
        );

        let bare = portal.add_category(Category::new("Other"));
        assert_eq!(portal.resolve_workbook_id(bare.into()), Some("wb-portal"));
        assert_eq!(portal.link(bare.into()), None);
    }

    #[test]
    fn suffix_for_translation_uses_primary() {
        let mut portal = Portal::new("Help").with_suffix("EU");
        let cat = portal.add_category(Category::new("Billing"));
        let own = portal.add_category(Category::new("Shipping").with_suffix("US"));
        let fr = portal
            .add_category_translation(own, Language::Fr, Category::new("Livraison"))
            .unwrap();
        assert_eq!(portal.suffix_for(cat), Some("EU"));
        assert_eq!(portal.suffix_for(fr), Some("US"));
    }

    #[test]
    fn stats_and_display() {
        let (mut portal, cat, _, _) = sample();
        portal
            .add_category_translation(cat, Language::Fr, Category::new("Facturation"))
            .unwrap();
        portal.assign_remote_id(cat.into(), RemoteId(3)).unwrap();

        let stats = portal.stats();
        assert_eq!(
            stats,
            PortalStats {
                categories: 1,
                folders: 1,
                articles: 1,
                translations: 1,
                synced: 1,
            }
        );

        let text = portal.to_string();
        assert_eq!(
            text,
            "Portal \"Help\"\n  Category \"Billing\" #3 (FR)\n    Folder \"Invoices\"\n      Article \"Download an invoice\"\n"
        );
    }
}
