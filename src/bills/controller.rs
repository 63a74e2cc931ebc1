//! Bill list retrieval and the receipt viewer
//!
//! State machine: `idle -> loading -> {displayed, error}`. There is no
//! automatic retry; re-activating the page starts a new fetch.

use std::sync::Arc;
use tracing::{info, warn};

use super::ordering::{self, ComparableDate};
use crate::error::{FetchError, StoreError};
use crate::state::data::BillRecord;
use crate::store::BillStore;

/// Width of the receipt modal, in logical pixels
pub const MODAL_WIDTH: f32 = 800.0;

/// A bill normalized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRow {
    pub category: String,
    pub name: String,
    /// "D Mon. YY", or the raw stored value when it could not be formatted
    pub date: String,
    /// Ordering key taken from the stored date, century included
    pub sort_date: ComparableDate,
    /// Amount with its currency, e.g. "400 €"
    pub amount: String,
    pub status: String,
    pub file_url: Option<String>,
}

impl BillRow {
    /// Normalize a record. A date that cannot be formatted is kept as is;
    /// the record is never dropped.
    pub fn from_record(record: &BillRecord) -> Self {
        let (date, sort_date) = match ordering::parse_iso(&record.date) {
            Ok(date) => (ordering::display(date), ComparableDate::Date(date)),
            Err(e) => {
                warn!(
                    "⚠️  Keeping raw date {:?} for bill {:?}: {}",
                    record.date, record.key, e
                );
                (record.date.clone(), ordering::parse(&record.date))
            }
        };

        Self {
            category: record.category.clone(),
            name: record.name.clone(),
            date,
            sort_date,
            amount: format!("{} €", record.amount.normalize()),
            status: record.status.label().to_string(),
            file_url: record.receipt.as_ref().map(|r| r.file_url.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Displayed(Vec<BillRow>),
    Error(FetchError),
}

/// Image shown in the receipt modal
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptImage {
    pub src: String,
    pub width: f32,
}

impl ReceiptImage {
    /// Local file path for `file://` sources, None for remote ones
    pub fn local_path(&self) -> Option<&str> {
        self.src.strip_prefix("file://")
    }

    /// Text shown in place of a remote receipt, which the viewer does not
    /// download. None for local receipts.
    pub fn remote_caption(&self) -> Option<String> {
        match self.local_path() {
            Some(_) => None,
            None => Some(format!(
                "Aperçu indisponible : ce justificatif est hébergé à distance ({})",
                self.src
            )),
        }
    }
}

/// The receipt viewer. Its body holds at most one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptModal {
    body: Option<ReceiptImage>,
    visible: bool,
}

impl ReceiptModal {
    /// Replace whatever the body held
    pub fn set_image(&mut self, image: ReceiptImage) {
        self.body = Some(image);
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn image(&self) -> Option<&ReceiptImage> {
        self.body.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct BillListController {
    state: ListState,
    modal: ReceiptModal,
}

impl BillListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn modal(&self) -> &ReceiptModal {
        &self.modal
    }

    /// Enter the loading state. The caller runs `fetch_bills` and feeds the
    /// result back through `on_bills_loaded`.
    pub fn activate(&mut self) {
        self.state = ListState::Loading;
        self.modal.hide();
    }

    /// Request the full bill collection
    pub async fn fetch_bills(store: Arc<dyn BillStore>) -> Result<Vec<BillRecord>, StoreError> {
        store.list().await
    }

    pub fn on_bills_loaded(&mut self, result: Result<Vec<BillRecord>, StoreError>) {
        self.state = match result {
            Ok(records) => {
                info!("📊 Loaded {} bills", records.len());
                ListState::Displayed(records.iter().map(BillRow::from_record).collect())
            }
            Err(e) => {
                warn!("⚠️  Could not fetch bills: {} (status {:?})", e, e.status);
                ListState::Error(FetchError::from(&e))
            }
        };
    }

    /// Show the receipt of a row in the modal
    pub fn on_view_receipt(&mut self, row: &BillRow) {
        let Some(file_url) = &row.file_url else {
            warn!("⚠️  Bill {:?} has no receipt to show", row.name);
            return;
        };

        self.modal.set_image(ReceiptImage {
            src: file_url.clone(),
            width: (MODAL_WIDTH * 0.5).floor(),
        });
        self.modal.show();
    }

    pub fn close_receipt(&mut self) {
        self.modal.hide();
    }
}
