//! Store interfaces consumed by the controllers
//!
//! `BillStore` is the data store holding bills and receipts; `KeyValueStore`
//! is the small persistent store holding the logged-in user. The catalog in
//! `state::library` implements both.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::state::data::{BillRecord, UploadPayload, UploadedReceipt};

#[async_trait]
pub trait BillStore: Send + Sync {
    /// Every submitted bill, in storage order
    async fn list(&self) -> Result<Vec<BillRecord>, StoreError>;

    /// Upload a receipt; creates a draft record and returns its key
    async fn create(&self, payload: UploadPayload) -> Result<UploadedReceipt, StoreError>;

    /// Fill the record stored under `key`
    async fn update(&self, key: &str, bill: BillRecord) -> Result<BillRecord, StoreError>;
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
