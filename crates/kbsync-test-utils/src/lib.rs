//! Testing utilities for the kbsync workspace
//!
//! Shared fixtures and an in-memory helpdesk.

#![allow(missing_docs)]

mod fake;

pub use fake::{FakeHelpdesk, FIRST_ID};

use kbsync_model::Portal;
use kbsync_sheet::{parse_workbook, Grid, ParseOptions, Sheet, Workbook};

pub const WORKBOOK_ID: &str = "wb-test";

/// Two-language sheet: one category, one folder, one article
pub fn scenario_grid() -> Grid {
    Grid::from_rows([
        vec!["en", "", "fr", ""],
        vec!["Cat A", "", "Catégorie A", ""],
        vec!["desc A", "", "desc A fr", ""],
        vec!["Folder 1", "Art 1", "Dossier 1", "Article 1"],
    ])
}

/// Three-language sheet with two folders and Markdown bodies
pub fn billing_grid() -> Grid {
    Grid::from_rows([
        vec!["", "", "", "", "", "", "", "", ""],
        vec!["en", "", "", "fr", "", "", "de", "", ""],
        vec!["Billing", "", "", "Facturation", "", "", "Abrechnung", "", ""],
        vec!["Invoices and payments", "", "", "Factures", "", "", "Rechnungen", "", ""],
        vec!["Invoices", "", "", "Factures", "", "", "", "", ""],
        vec![
            "",
            "Download an invoice",
            "Open **Billing** and click *Download*.",
            "",
            "Télécharger une facture",
            "Ouvrez **Facturation**.",
            "",
            "Rechnung herunterladen",
            "",
        ],
        vec!["", "Change currency", "Contact support.", "", "", "", "", "", ""],
        vec!["Refunds", "", "", "Remboursements", "", "", "Erstattungen", "", ""],
        vec!["", "Request a refund", "Use the form.", "", "", "", "", "", ""],
    ])
}

pub fn scenario_workbook() -> Workbook {
    Workbook::new(Some(WORKBOOK_ID.into()), " Help Center ")
        .with_sheet(Sheet::new("Cat A", Some(0), scenario_grid()))
}

pub fn billing_workbook() -> Workbook {
    Workbook::new(Some(WORKBOOK_ID.into()), "Help Center")
        .with_sheet(Sheet::new("Cat A", Some(0), scenario_grid()))
        .with_sheet(Sheet::new("Billing", Some(7), billing_grid()))
}

/// Portal built from [`scenario_workbook`]
pub fn scenario_portal() -> Portal {
    parse_workbook(&scenario_workbook(), &ParseOptions::default()).portal
}

/// Portal built from [`billing_workbook`]
pub fn billing_portal() -> Portal {
    parse_workbook(&billing_workbook(), &ParseOptions::default()).portal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_parse_cleanly() {
        let report = parse_workbook(&billing_workbook(), &ParseOptions::default());
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        let stats = report.portal.stats();
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.folders, 3);
        assert_eq!(stats.articles, 4);
    }
}
