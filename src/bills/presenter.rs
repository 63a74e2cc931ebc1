//! Bill list view model
//!
//! A pure mapping from the controller state to what the page shows; the
//! `ui` module turns it into widgets.

use super::controller::{BillRow, ListState};
use super::ordering;

pub const PAGE_TITLE: &str = "Mes notes de frais";
pub const NEW_BILL_LABEL: &str = "Nouvelle note de frais";
pub const COLUMNS: [&str; 6] = ["Type", "Nom", "Date", "Montant", "Statut", "Actions"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    /// Headline, e.g. "Erreur 404"
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillTable {
    pub title: &'static str,
    pub new_bill_label: &'static str,
    pub columns: [&'static str; 6],
    /// Newest first
    pub rows: Vec<BillRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillsView {
    Loading,
    Error(ErrorView),
    Table(BillTable),
}

/// Build the view for the current list state
pub fn present(state: &ListState) -> BillsView {
    match state {
        ListState::Idle | ListState::Loading => BillsView::Loading,
        ListState::Error(error) => BillsView::Error(ErrorView {
            message: error.to_string(),
        }),
        ListState::Displayed(rows) => {
            let mut rows = rows.clone();
            ordering::sort_newest_first(&mut rows, |row| row.sort_date);
            BillsView::Table(BillTable {
                title: PAGE_TITLE,
                new_bill_label: NEW_BILL_LABEL,
                columns: COLUMNS,
                rows,
            })
        }
    }
}
