//! Header row location
//!
//! The header row is the first row whose first non-empty cell is a
//! recognized language code. In that row the `en` column is the origin
//! column group and every other recognized code opens a translation column
//! group. A code that appears twice keeps its last column.

use crate::grid::Grid;
use indexmap::IndexMap;
use kbsync_model::Language;

/// Language of the origin column group
pub const ORIGIN_LANGUAGE: Language = Language::En;

/// Where the content of a sheet starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    /// Row holding the language codes
    pub header_row: usize,
    /// Column of the origin language
    pub origin_col: usize,
    /// First column of each translation group
    pub translations: IndexMap<Language, usize>,
}

/// Find the header row and its language columns
///
/// Returns `None` when no row qualifies as a header or the header has no
/// origin column.
#[must_use]
pub fn locate_header(grid: &Grid) -> Option<HeaderLocation> {
    let header_row = grid.rows().iter().position(|row| {
        row.iter()
            .find(|cell| !cell.trim().is_empty())
            .is_some_and(|cell| Language::from_code(cell).is_some())
    })?;

    let mut origin_col = None;
    let mut translations = IndexMap::new();
    for (col, cell) in grid.rows()[header_row].iter().enumerate() {
        match Language::from_code(cell) {
            Some(lang) if lang == ORIGIN_LANGUAGE => origin_col = Some(col),
            Some(lang) => {
                translations.insert(lang, col);
            }
            None => {}
        }
    }

    let origin_col = origin_col?;
    tracing::trace!(header_row, origin_col, translations = translations.len(), "header located");
    Some(HeaderLocation {
        header_row,
        origin_col,
        translations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn finds_first_language_row() {
        let grid = Grid::from_rows([
            vec!["Title", "", ""],
            vec!["", "", ""],
            vec!["EN", "", "fr", "", "De"],
            vec!["en", "", "it"],
        ]);
        let loc = locate_header(&grid).unwrap();
        assert_eq!(loc.header_row, 2);
        assert_eq!(loc.origin_col, 0);
        assert_eq!(
            loc.translations.into_iter().collect::<Vec<_>>(),
            vec![(Language::Fr, 2), (Language::De, 4)]
        );
    }

    #[test]
    fn first_non_empty_cell_decides() {
        let grid = Grid::from_rows([vec!["", "", "en", "", "es"]]);
        let loc = locate_header(&grid).unwrap();
        assert_eq!(loc.origin_col, 2);
        assert_eq!(loc.translations.get(&Language::Es), Some(&4));
    }

    #[test]
    fn duplicate_code_keeps_last_column() {
        let grid = Grid::from_rows([vec!["en", "", "fr", "", "fr"]]);
        let loc = locate_header(&grid).unwrap();
        assert_eq!(loc.translations.len(), 1);
        assert_eq!(loc.translations.get(&Language::Fr), Some(&4));
    }

    #[test]
    fn no_header_or_no_origin() {
        assert_eq!(locate_header(&Grid::default()), None);
        assert_eq!(
            locate_header(&Grid::from_rows([vec!["Name", "en"]])),
            None
        );
        assert_eq!(locate_header(&Grid::from_rows([vec!["fr", "", "de"]])), None);
    }

    fn header_cell() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("fr".to_string()),
            Just("DE".to_string()),
            Just("it".to_string()),
            Just("Es".to_string()),
            Just("ca".to_string()),
            "[a-z]{3,6}",
        ]
    }

    proptest! {
        #[test]
        fn origin_found_iff_en_present(
            cells in prop::collection::vec(header_cell(), 1..8),
            en_at in prop::option::of(0usize..8),
        ) {
            let mut row = cells;
            row.insert(0, "fr".to_string());
            if let Some(at) = en_at {
                let at = 1 + at % row.len();
                row.insert(at, "En".to_string());
            }
            let grid = Grid::from_rows([row.clone()]);
            let loc = locate_header(&grid);
            match en_at {
                Some(_) => {
                    let loc = loc.unwrap();
                    prop_assert!(row[loc.origin_col].eq_ignore_ascii_case("en"));
                    prop_assert!(!loc.translations.contains_key(&Language::En));
                }
                None => prop_assert!(loc.is_none()),
            }
        }
    }
}
