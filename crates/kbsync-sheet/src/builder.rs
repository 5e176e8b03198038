//! Sheet → tree
//!
//! Each sheet yields one category:
//!
//! - header row + 1: category name (origin column, then each translation column)
//! - header row + 2: category description
//! - every later row: a non-empty origin cell starts a folder; a non-empty
//!   cell right of it starts an article in the current folder, whose body
//!   (Markdown) is the next cell over
//!
//! Translation column groups mirror the same offsets. A blank translation
//! cell means "not translated" and produces no translation node.

use crate::error::ParseError;
use crate::grid::{Sheet, Workbook};
use crate::locator::{locate_header, HeaderLocation};
use kbsync_model::{
    Article, CategoryId, CellRef, Category, Folder, FolderId, Language, Origin, Portal, RemoteId,
};

/// Options for a workbook parse
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Portal name; defaults to the trimmed workbook title
    pub portal_name: Option<String>,
    /// Sheets skipped by name
    pub exclude_sheets: Vec<String>,
    /// Sheets skipped by position
    pub exclude_indices: Vec<usize>,
}

impl ParseOptions {
    /// With portal name
    #[inline]
    #[must_use]
    pub fn with_portal_name(mut self, name: impl Into<String>) -> Self {
        self.portal_name = Some(name.into());
        self
    }

    /// Skip a sheet by name
    #[inline]
    #[must_use]
    pub fn exclude_sheet(mut self, name: impl Into<String>) -> Self {
        self.exclude_sheets.push(name.into());
        self
    }

    /// Skip a sheet by position
    #[inline]
    #[must_use]
    pub fn exclude_index(mut self, index: usize) -> Self {
        self.exclude_indices.push(index);
        self
    }

    fn skips(&self, index: usize, sheet: &Sheet) -> bool {
        self.exclude_indices.contains(&index) || self.exclude_sheets.contains(&sheet.name)
    }
}

/// Result of a workbook parse
#[derive(Debug, Clone)]
pub struct ParseReport {
    /// Tree built from every readable sheet
    pub portal: Portal,
    /// Categories in sheet order
    pub categories: Vec<CategoryId>,
    /// Per-sheet failures; partial categories stay in the portal
    pub issues: Vec<ParseError>,
}

/// Build a portal from a workbook
#[must_use]
pub fn parse_workbook(workbook: &Workbook, options: &ParseOptions) -> ParseReport {
    let name = options
        .portal_name
        .clone()
        .unwrap_or_else(|| workbook.portal_name().to_string());
    let mut portal = Portal::new(name);
    portal.workbook_id.clone_from(&workbook.id);

    let mut categories = Vec::new();
    let mut issues = Vec::new();
    for (index, sheet) in workbook.sheets.iter().enumerate() {
        if options.skips(index, sheet) {
            tracing::debug!(sheet = %sheet.name, "sheet excluded");
            continue;
        }
        tracing::info!(sheet = %sheet.name, "parsing sheet");

        let before = portal.category_ids().len();
        match build_category(&mut portal, sheet, workbook.id.as_deref()) {
            Ok(id) => categories.push(id),
            Err(err) => {
                match &err {
                    ParseError::NoContentFound { .. } => tracing::warn!("{err}"),
                    ParseError::MalformedGrid { .. } => tracing::error!("{err}"),
                }
                categories.extend_from_slice(&portal.category_ids()[before..]);
                issues.push(err);
            }
        }
    }

    ParseReport {
        portal,
        categories,
        issues,
    }
}

/// Build the category of one sheet into `portal`
///
/// On [`ParseError::MalformedGrid`] the nodes built before the failing row
/// stay in the portal.
pub fn build_category(
    portal: &mut Portal,
    sheet: &Sheet,
    workbook_id: Option<&str>,
) -> Result<CategoryId, ParseError> {
    let location = locate_header(&sheet.grid).ok_or_else(|| ParseError::NoContentFound {
        sheet: sheet.name.clone(),
    })?;
    SheetWalker {
        sheet,
        workbook_id,
        location: &location,
        skip_lang: portal.primary_language,
    }
    .walk(portal)
}

struct SheetWalker<'a> {
    sheet: &'a Sheet,
    workbook_id: Option<&'a str>,
    location: &'a HeaderLocation,
    skip_lang: Language,
}

impl SheetWalker<'_> {
    fn malformed(&self, row: usize, column: usize) -> ParseError {
        ParseError::MalformedGrid {
            sheet: self.sheet.name.clone(),
            row,
            column,
        }
    }

    fn origin(&self, row: usize, col: usize) -> Origin {
        Origin::new(
            self.workbook_id.map(str::to_string),
            self.sheet.name.clone(),
            self.sheet.id,
            CellRef::new(row, col),
        )
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.sheet.grid.cell(row, col)
    }

    fn translation_columns(&self) -> impl Iterator<Item = (Language, usize)> + '_ {
        self.location
            .translations
            .iter()
            .map(|(lang, col)| (*lang, *col))
            .filter(|(lang, _)| *lang != self.skip_lang)
    }

    fn walk(&self, portal: &mut Portal) -> Result<CategoryId, ParseError> {
        let col = self.location.origin_col;
        let name_row = self.location.header_row + 1;
        let desc_row = name_row + 1;

        let name = self
            .sheet
            .grid
            .get(name_row, col)
            .ok_or_else(|| self.malformed(name_row, col))?;
        let description = self.sheet.grid.get(desc_row, col);

        let mut category = Category::new(name).with_origin(self.origin(name_row, col));
        if let Some(desc) = description.filter(|d| !d.is_empty()) {
            category = category.with_description(desc);
        }
        if let Some(id) = self.existing_remote_id(name_row, col) {
            category = category.with_remote_id(id);
        }
        let category_id = portal.add_category(category);

        for (lang, tcol) in self.translation_columns() {
            let name = self.cell(name_row, tcol);
            if name.trim().is_empty() {
                continue;
            }
            let mut translation = Category::new(name).with_origin(self.origin(name_row, tcol));
            let desc = self.cell(desc_row, tcol);
            if !desc.is_empty() {
                translation = translation.with_description(desc);
            }
            portal
                .add_category_translation(category_id, lang, translation)
                .map_err(|err| self.malformed_from(&err, name_row, tcol))?;
        }

        if description.is_none() {
            return Err(self.malformed(desc_row, col));
        }

        let mut folder: Option<FolderId> = None;
        for row in desc_row + 1..self.sheet.grid.height() {
            if !self.cell(row, col).trim().is_empty() {
                folder = Some(self.add_folder(portal, category_id, row)?);
            }
            if !self.cell(row, col + 1).trim().is_empty() {
                match folder {
                    Some(folder_id) => self.add_article(portal, folder_id, row)?,
                    None => tracing::warn!(
                        sheet = %self.sheet.name,
                        row,
                        "article before any folder, skipped"
                    ),
                }
            }
        }

        Ok(category_id)
    }

    fn add_folder(
        &self,
        portal: &mut Portal,
        category: CategoryId,
        row: usize,
    ) -> Result<FolderId, ParseError> {
        let col = self.location.origin_col;
        let folder = Folder::new(self.cell(row, col).trim()).with_origin(self.origin(row, col));
        let folder_id = portal
            .add_folder(category, folder)
            .map_err(|err| self.malformed_from(&err, row, col))?;

        for (lang, tcol) in self.translation_columns() {
            let name = self.cell(row, tcol).trim();
            if name.is_empty() {
                continue;
            }
            let translation = Folder::new(name).with_origin(self.origin(row, tcol));
            portal
                .add_folder_translation(folder_id, lang, translation)
                .map_err(|err| self.malformed_from(&err, row, tcol))?;
        }
        Ok(folder_id)
    }

    fn add_article(
        &self,
        portal: &mut Portal,
        folder: FolderId,
        row: usize,
    ) -> Result<(), ParseError> {
        let col = self.location.origin_col + 1;
        let article = Article::from_markdown(
            self.cell(row, col).trim(),
            self.cell(row, col + 1).trim(),
        )
        .with_origin(self.origin(row, col));
        let article_id = portal
            .add_article(folder, article)
            .map_err(|err| self.malformed_from(&err, row, col))?;

        for (lang, tcol) in self.translation_columns() {
            let title = self.cell(row, tcol + 1).trim();
            if title.is_empty() {
                continue;
            }
            let translation = Article::from_markdown(title, self.cell(row, tcol + 2).trim())
                .with_origin(self.origin(row, tcol + 1));
            portal
                .add_article_translation(article_id, lang, translation)
                .map_err(|err| self.malformed_from(&err, row, tcol + 1))?;
        }
        Ok(())
    }

    /// A previous write-back leaves the remote ID right of the name cell
    fn existing_remote_id(&self, row: usize, col: usize) -> Option<RemoteId> {
        let raw = self.cell(row, col + 1).trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<u64>() {
            Ok(id) => Some(RemoteId(id)),
            Err(_) => {
                tracing::warn!(
                    sheet = %self.sheet.name,
                    cell = %CellRef::new(row, col + 1),
                    value = raw,
                    "ignoring non-numeric remote id"
                );
                None
            }
        }
    }

    fn malformed_from(&self, err: &kbsync_model::ModelError, row: usize, col: usize) -> ParseError {
        tracing::error!(sheet = %self.sheet.name, row, col, "{err}");
        self.malformed(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use kbsync_model::ContentNode;
    use pretty_assertions::assert_eq;

    fn sheet(rows: Vec<Vec<&str>>) -> Sheet {
        Sheet::new("Billing", Some(11), Grid::from_rows(rows))
    }

    #[test]
    fn reads_category_rows_below_header() {
        let sheet = sheet(vec![
            vec!["Billing FAQ"],
            vec!["en", "", "", "de"],
            vec!["Billing", "", "", "Abrechnung"],
            vec!["Money matters", "", "", "Geld"],
        ]);
        let mut portal = Portal::new("Help");
        let id = build_category(&mut portal, &sheet, Some("wb")).unwrap();
        let category = portal.category(id).unwrap();
        assert_eq!(category.name, "Billing");
        assert_eq!(category.description.as_deref(), Some("Money matters"));
        assert_eq!(
            category.meta.origin.as_ref().map(|o| o.cell),
            Some(CellRef::new(2, 0))
        );

        let de = category.translations()[&Language::De];
        let de = portal.category(de).unwrap();
        assert_eq!(de.name, "Abrechnung");
        assert_eq!(de.description.as_deref(), Some("Geld"));
        assert_eq!(de.meta.origin.as_ref().map(|o| o.cell), Some(CellRef::new(2, 3)));
    }

    #[test]
    fn remote_id_next_to_name_is_kept() {
        let sheet = sheet(vec![vec!["en"], vec!["Billing", " 4021 "], vec!["desc"]]);
        let mut portal = Portal::new("Help");
        let id = build_category(&mut portal, &sheet, None).unwrap();
        assert_eq!(
            portal.category(id).unwrap().meta().remote_id(),
            Some(RemoteId(4021))
        );

        let sheet = Sheet::new(
            "x",
            None,
            Grid::from_rows([vec!["en"], vec!["Billing", "n/a"], vec!["desc"]]),
        );
        let id = build_category(&mut portal, &sheet, None).unwrap();
        assert_eq!(portal.category(id).unwrap().meta().remote_id(), None);
    }

    #[test]
    fn articles_follow_current_folder() {
        let sheet = sheet(vec![
            vec!["en", "", ""],
            vec!["Billing", "", ""],
            vec!["", "", ""],
            vec!["Invoices", "Download", "Click **Download**."],
            vec!["", "Resend", "Use *Resend*."],
            vec!["", "", ""],
            vec![" Refunds ", "", ""],
            vec!["", "Request", "Open a ticket."],
        ]);
        let mut portal = Portal::new("Help");
        let id = build_category(&mut portal, &sheet, None).unwrap();
        let category = portal.category(id).unwrap();
        assert_eq!(category.description, None);

        let folders: Vec<_> = category
            .folders()
            .iter()
            .map(|f| portal.folder(*f).unwrap())
            .collect();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[1].name, "Refunds");

        let titles: Vec<&str> = folders[0]
            .articles()
            .iter()
            .map(|a| portal.article(*a).unwrap().title.as_str())
            .collect();
        assert_eq!(titles, vec!["Download", "Resend"]);

        let article = portal.article(folders[0].articles()[0]).unwrap();
        assert!(article.description.contains("<strong>Download</strong>"));
        assert_eq!(article.description_text, "Click Download.");
        assert_eq!(
            article.meta.origin.as_ref().map(|o| o.cell.to_a1()),
            Some("B4".to_string())
        );
    }

    #[test]
    fn orphan_article_is_skipped() {
        let sheet = sheet(vec![
            vec!["en"],
            vec!["Billing"],
            vec!["desc"],
            vec!["", "Lost", "nobody owns me"],
            vec!["Invoices"],
        ]);
        let mut portal = Portal::new("Help");
        let id = build_category(&mut portal, &sheet, None).unwrap();
        let folder = portal.category(id).unwrap().folders()[0];
        assert!(portal.folder(folder).unwrap().articles().is_empty());
    }

    #[test]
    fn missing_rows_are_malformed() {
        let mut portal = Portal::new("Help");
        let err = build_category(&mut portal, &sheet(vec![vec!["en"]]), None).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedGrid {
                sheet: "Billing".into(),
                row: 1,
                column: 0
            }
        );
        assert!(portal.is_empty());

        let err = build_category(&mut portal, &sheet(vec![vec!["en"], vec!["Billing"]]), None)
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedGrid { row: 2, .. }));
        assert_eq!(portal.category_ids().len(), 1);
    }

    #[test]
    fn workbook_parse_skips_and_reports() {
        let workbook = Workbook::new(Some("wb".into()), " Help Center ")
            .with_sheet(Sheet::new("Intro", Some(1), Grid::from_rows([vec!["Welcome"]])))
            .with_sheet(sheet(vec![vec!["en"], vec!["Billing"], vec!["desc"]]))
            .with_sheet(Sheet::new("Draft", Some(3), Grid::from_rows([vec!["en"]])))
            .with_sheet(Sheet::new("Broken", Some(4), Grid::from_rows([vec!["en"], vec!["Half"]])));

        let report = parse_workbook(&workbook, &ParseOptions::default().exclude_sheet("Draft"));
        assert_eq!(report.portal.name, "Help Center");
        assert_eq!(report.portal.workbook_id.as_deref(), Some("wb"));
        assert_eq!(report.categories.len(), 2);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[0].sheet(), "Intro");
        assert_eq!(report.issues[1].sheet(), "Broken");

        let report = parse_workbook(
            &workbook,
            &ParseOptions::default()
                .with_portal_name("Support")
                .exclude_index(0)
                .exclude_index(3),
        );
        assert_eq!(report.portal.name, "Support");
        assert_eq!(report.issues.len(), 1);
    }
}
