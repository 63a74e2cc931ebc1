//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the catalog layer and the UI layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Percentage used when the form leaves `pct` empty or unparseable
pub const DEFAULT_PCT: u32 = 20;

/// Lifecycle of a bill. Only `Pending` is ever set by this application;
/// the approval process moves bills to the other two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    /// Value stored in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BillStatus::Pending),
            "accepted" => Some(BillStatus::Accepted),
            "refused" => Some(BillStatus::Refused),
            _ => None,
        }
    }

    /// Label shown in the bill list
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refusé",
        }
    }
}

/// Where an uploaded receipt lives. URL and name always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRef {
    /// Absolute URL of the stored receipt image
    pub file_url: String,
    /// Original file name as picked by the user
    pub file_name: String,
}

/// A single expense bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    /// Store key (None until the store assigns one)
    #[serde(default, rename = "id")]
    pub key: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Category label, e.g. "Transports"
    #[serde(rename = "type")]
    pub category: String,
    pub name: String,
    /// ISO date (YYYY-MM-DD) as stored; may be malformed when read back
    pub date: String,
    pub amount: Decimal,
    #[serde(default)]
    pub vat: Option<Decimal>,
    #[serde(default = "default_pct")]
    pub pct: u32,
    #[serde(default)]
    pub commentary: Option<String>,
    #[serde(flatten)]
    pub receipt: Option<ReceiptRef>,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub comment_admin: Option<String>,
}

fn default_pct() -> u32 {
    DEFAULT_PCT
}

/// Categories offered by the new bill form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BillCategory {
    #[default]
    Transports,
    Restaurants,
    Hotel,
    OnlineServices,
    It,
    Equipment,
    OfficeSupplies,
}

impl BillCategory {
    pub const ALL: [BillCategory; 7] = [
        BillCategory::Transports,
        BillCategory::Restaurants,
        BillCategory::Hotel,
        BillCategory::OnlineServices,
        BillCategory::It,
        BillCategory::Equipment,
        BillCategory::OfficeSupplies,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BillCategory::Transports => "Transports",
            BillCategory::Restaurants => "Restaurants et bars",
            BillCategory::Hotel => "Hôtel et logement",
            BillCategory::OnlineServices => "Services en ligne",
            BillCategory::It => "IT et électronique",
            BillCategory::Equipment => "Equipement et matériel",
            BillCategory::OfficeSupplies => "Fournitures de bureau",
        }
    }
}

impl fmt::Display for BillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A receipt file picked by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name only (e.g., "taxi.jpg")
    pub name: String,
    /// Declared media type; empty when the source does not provide one
    pub media_type: String,
    /// Full path to the file on disk
    pub path: PathBuf,
}

impl SelectedFile {
    /// Build from a path picked in a native dialog. Desktop pickers do not
    /// declare a media type, so validation falls back to the extension.
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self {
            name,
            media_type: String::new(),
            path,
        }
    }
}

/// Multipart-like upload body: the receipt and who it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file: SelectedFile,
    pub email: String,
}

/// What the store returns after a receipt upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedReceipt {
    pub file_url: String,
    pub file_name: String,
    /// Key of the draft record to update on submission
    pub key: String,
}

impl UploadedReceipt {
    pub fn receipt_ref(&self) -> ReceiptRef {
        ReceiptRef {
            file_url: self.file_url.clone(),
            file_name: self.file_name.clone(),
        }
    }
}
