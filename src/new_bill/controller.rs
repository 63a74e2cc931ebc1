//! The create-bill workflow
//!
//! ```text
//! empty ──select──▶ file_selected_invalid
//!   │
//!   └────select──▶ uploading ──▶ upload_complete ──submit──▶ submitting ──▶ submitted
//!                      └───────▶ upload_failed
//! ```
//!
//! Selecting a file from any state starts over. Each selection gets a new
//! attempt number and upload results carrying any other number are dropped,
//! so a slow upload can never overwrite a newer one. Attempt numbers are
//! unique for the whole process, not per page visit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::form::{FileInput, NewBillForm};
use super::validator;
use crate::error::{StoreError, ValidationError};
use crate::state::data::{BillRecord, BillStatus, UploadPayload, UploadedReceipt};
use crate::state::session::Session;
use crate::store::BillStore;

static NEXT_ATTEMPT: AtomicU64 = AtomicU64::new(1);

fn next_attempt() -> u64 {
    NEXT_ATTEMPT.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Empty,
    FileSelectedInvalid,
    Uploading { attempt: u64 },
    UploadComplete,
    UploadFailed,
    Submitting,
    Submitted,
}

/// Everything known about the current receipt selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    pub is_file_valid: bool,
    /// Name of the selected file, recorded whether valid or not
    pub file_name: Option<String>,
    /// Set once the upload of the current selection succeeded
    pub uploaded: Option<UploadedReceipt>,
}

/// Background upload to run for a valid selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub attempt: u64,
    pub payload: UploadPayload,
}

/// Result of an upload, tagged with the attempt that started it
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub attempt: u64,
    pub result: Result<UploadedReceipt, StoreError>,
}

/// A fully assembled bill waiting to be persisted under `key`
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBill {
    pub key: String,
    pub record: BillRecord,
}

#[derive(Debug)]
pub struct NewBillController {
    session: Session,
    state: WorkflowState,
    validation: ValidationState,
    attempt: u64,
}

impl NewBillController {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: WorkflowState::Empty,
            validation: ValidationState::default(),
            attempt: 0,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn is_file_valid(&self) -> bool {
        self.validation.is_file_valid
    }

    /// Start over for a new visit of the page. Uploads still in flight keep
    /// their attempt numbers and will be dropped when they finish.
    pub fn reset(&mut self) {
        self.state = WorkflowState::Empty;
        self.validation = ValidationState::default();
    }

    /// Handle a change of the receipt input.
    ///
    /// The input is cleared in every case. Returns the upload to run when the
    /// file is acceptable.
    pub fn on_file_selected(&mut self, input: &mut FileInput) -> Option<UploadJob> {
        let file = input.take_first()?;

        self.attempt = next_attempt();
        let is_file_valid = validator::is_acceptable(&file);
        self.validation = ValidationState {
            is_file_valid,
            file_name: Some(file.name.clone()),
            uploaded: None,
        };

        if !is_file_valid {
            info!("🚫 Refused receipt {}", file.name);
            self.state = WorkflowState::FileSelectedInvalid;
            return None;
        }

        self.state = WorkflowState::Uploading {
            attempt: self.attempt,
        };

        Some(UploadJob {
            attempt: self.attempt,
            payload: UploadPayload {
                file,
                email: self.session.email().to_string(),
            },
        })
    }

    /// Send the receipt to the store
    pub async fn upload(store: Arc<dyn BillStore>, job: UploadJob) -> UploadOutcome {
        UploadOutcome {
            attempt: job.attempt,
            result: store.create(job.payload).await,
        }
    }

    /// Apply an upload result. Returns false when the result belongs to a
    /// superseded selection and was dropped.
    pub fn on_upload_finished(&mut self, outcome: UploadOutcome) -> bool {
        if self.state != (WorkflowState::Uploading { attempt: outcome.attempt }) {
            debug!(
                "Dropping upload result of attempt {} (current attempt {})",
                outcome.attempt, self.attempt
            );
            return false;
        }

        match outcome.result {
            Ok(uploaded) => {
                info!("📎 Receipt uploaded: {}", uploaded.file_url);
                self.validation.uploaded = Some(uploaded);
                self.state = WorkflowState::UploadComplete;
            }
            Err(e) => {
                error!("❌ Receipt upload failed: {}", e);
                self.state = WorkflowState::UploadFailed;
            }
        }
        true
    }

    /// Handle the form submission.
    ///
    /// An invalid file blocks everything: nothing is assembled and the caller
    /// must neither persist nor navigate.
    pub fn on_submit(&mut self, form: &NewBillForm) -> Result<PendingBill, ValidationError> {
        if !self.validation.is_file_valid {
            return Err(ValidationError::UnsupportedFile);
        }

        let uploaded = match (&self.state, &self.validation.uploaded) {
            (WorkflowState::UploadComplete, Some(uploaded)) => uploaded,
            _ => return Err(ValidationError::ReceiptNotUploaded),
        };

        let values = form.parse()?;

        let record = BillRecord {
            key: Some(uploaded.key.clone()),
            email: Some(self.session.email().to_string()),
            category: values.category.to_string(),
            name: values.name,
            date: values.date.format("%Y-%m-%d").to_string(),
            amount: values.amount,
            vat: values.vat,
            pct: values.pct,
            commentary: values.commentary,
            receipt: Some(uploaded.receipt_ref()),
            status: BillStatus::Pending,
            comment_admin: None,
        };

        let pending = PendingBill {
            key: uploaded.key.clone(),
            record,
        };
        self.state = WorkflowState::Submitting;
        Ok(pending)
    }

    /// Store the submitted bill
    pub async fn persist(
        store: Arc<dyn BillStore>,
        pending: PendingBill,
    ) -> Result<BillRecord, StoreError> {
        store.update(&pending.key, pending.record).await
    }

    /// Apply the persist result. On success the selection is consumed and
    /// the caller navigates to the bill list.
    ///
    /// A file selected while the save was running takes precedence: the
    /// result is then only logged and the newer selection is left untouched.
    pub fn on_persisted(&mut self, result: &Result<BillRecord, StoreError>) {
        if self.state != WorkflowState::Submitting {
            debug!("Persist result arrived in state {:?}, newer selection left as is", self.state);
            if let Err(e) = result {
                error!("❌ Bill could not be saved: {}", e);
            }
            return;
        }

        match result {
            Ok(bill) => {
                info!("✅ Bill {} submitted", bill.key.as_deref().unwrap_or("?"));
                self.validation = ValidationState::default();
                self.state = WorkflowState::Submitted;
            }
            Err(e) => {
                error!("❌ Bill could not be saved: {}", e);
                // Receipt is still uploaded; the user may submit again
                self.state = WorkflowState::UploadComplete;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_bill::form::FormEdit;
    use crate::state::data::{BillCategory, SelectedFile};
    use crate::store::mock::MockStore;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn controller() -> NewBillController {
        NewBillController::new(Session::employee("employee@test.tld"))
    }

    fn input_with(name: &str) -> FileInput {
        let mut input = FileInput::default();
        input.choose(SelectedFile::from_path(PathBuf::from(format!("/tmp/{name}"))));
        input
    }

    fn filled_form() -> NewBillForm {
        let mut form = NewBillForm::default();
        form.apply(FormEdit::Category(BillCategory::Transports));
        form.apply(FormEdit::Name("Taxi".to_string()));
        form.apply(FormEdit::Amount("100".to_string()));
        form.apply(FormEdit::Date("2023-09-12".to_string()));
        form.apply(FormEdit::Vat("20".to_string()));
        form.apply(FormEdit::Commentary("Business trip".to_string()));
        form
    }

    #[test]
    fn test_invalid_file_blocks_submission() {
        let mut controller = controller();
        let mut input = input_with("invoice.pdf");

        assert!(controller.on_file_selected(&mut input).is_none());
        assert_eq!(controller.state(), WorkflowState::FileSelectedInvalid);
        assert!(!controller.is_file_valid());
        assert_eq!(controller.validation().file_name.as_deref(), Some("invoice.pdf"));

        let error = controller.on_submit(&filled_form()).unwrap_err();
        assert_eq!(error, ValidationError::UnsupportedFile);
        assert!(error.to_string().contains("jpg, jpeg ou png"));
        assert_eq!(controller.state(), WorkflowState::FileSelectedInvalid);
    }

    #[test]
    fn test_submit_without_any_file_is_refused() {
        let mut controller = controller();
        assert_eq!(
            controller.on_submit(&filled_form()),
            Err(ValidationError::UnsupportedFile)
        );
    }

    #[test]
    fn test_input_cleared_on_every_selection() {
        let mut controller = controller();

        let mut input = input_with("test.png");
        let job = controller.on_file_selected(&mut input).unwrap();
        assert_eq!(input.value(), "");
        assert!(controller.is_file_valid());
        assert_eq!(job.payload.email, "employee@test.tld");

        let mut input = input_with("test.gif");
        assert!(controller.on_file_selected(&mut input).is_none());
        assert_eq!(input.value(), "");
        assert!(!controller.is_file_valid());
        assert_eq!(controller.validation().file_name.as_deref(), Some("test.gif"));

        let mut input = input_with("again.jpeg");
        assert!(controller.on_file_selected(&mut input).is_some());
        assert_eq!(input.value(), "");
        assert!(controller.is_file_valid());
    }

    #[tokio::test]
    async fn test_upload_then_submit_assembles_pending_bill() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("test.jpg")).unwrap();
        assert_eq!(controller.state(), WorkflowState::Uploading { attempt: job.attempt });

        let outcome = NewBillController::upload(store.clone(), job).await;
        assert!(controller.on_upload_finished(outcome));
        assert_eq!(controller.state(), WorkflowState::UploadComplete);

        let uploaded = controller.validation().uploaded.clone().unwrap();
        assert_eq!(uploaded.file_url, "https://localhost:3456/images/test.jpg");
        assert_eq!(uploaded.file_name, "test.jpg");

        let pending = controller.on_submit(&filled_form()).unwrap();
        assert_eq!(pending.key, uploaded.key);
        let record = &pending.record;
        assert_eq!(record.status, BillStatus::Pending);
        assert_eq!(record.receipt, Some(uploaded.receipt_ref()));
        assert_eq!(record.category, "Transports");
        assert_eq!(record.date, "2023-09-12");
        assert_eq!(record.amount, dec!(100));
        assert_eq!(record.pct, 20);
        assert_eq!(record.email.as_deref(), Some("employee@test.tld"));

        let result = NewBillController::persist(store.clone(), pending.clone()).await;
        controller.on_persisted(&result);
        assert_eq!(controller.state(), WorkflowState::Submitted);
        assert_eq!(controller.validation(), &ValidationState::default());

        let updated = store.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0], (uploaded.key.clone(), pending.record));
    }

    #[tokio::test]
    async fn test_submit_before_upload_completes_is_refused() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("test.png")).unwrap();
        assert_eq!(
            controller.on_submit(&filled_form()),
            Err(ValidationError::ReceiptNotUploaded)
        );

        let outcome = NewBillController::upload(store.clone(), job).await;
        controller.on_upload_finished(outcome);
        assert!(controller.on_submit(&filled_form()).is_ok());
        assert_eq!(store.update_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_upload_is_dropped() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let first = controller.on_file_selected(&mut input_with("first.png")).unwrap();
        let second = controller.on_file_selected(&mut input_with("second.png")).unwrap();
        assert!(second.attempt > first.attempt);

        // The newer upload finishes first, then the older one
        let second_outcome = NewBillController::upload(store.clone(), second).await;
        let first_outcome = NewBillController::upload(store.clone(), first).await;

        assert!(controller.on_upload_finished(second_outcome));
        assert!(!controller.on_upload_finished(first_outcome));
        assert_eq!(
            controller.validation().uploaded.as_ref().unwrap().file_name,
            "second.png"
        );
    }

    #[tokio::test]
    async fn test_reselecting_discards_previous_upload() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("first.png")).unwrap();
        let outcome = NewBillController::upload(store.clone(), job).await;
        controller.on_upload_finished(outcome);
        assert!(controller.validation().uploaded.is_some());

        controller.on_file_selected(&mut input_with("notes.txt"));
        assert!(controller.validation().uploaded.is_none());
        assert_eq!(controller.state(), WorkflowState::FileSelectedInvalid);
    }

    #[tokio::test]
    async fn test_upload_failure_is_recorded_not_applied() {
        let store = Arc::new(MockStore::failing_upload(StoreError::internal("Erreur 500")));
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("test.png")).unwrap();
        let outcome = NewBillController::upload(store, job).await;
        assert!(controller.on_upload_finished(outcome));
        assert_eq!(controller.state(), WorkflowState::UploadFailed);
        assert!(controller.validation().uploaded.is_none());
        assert_eq!(
            controller.on_submit(&filled_form()),
            Err(ValidationError::ReceiptNotUploaded)
        );
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_receipt_for_retry() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("test.png")).unwrap();
        let outcome = NewBillController::upload(store, job).await;
        controller.on_upload_finished(outcome);
        controller.on_submit(&filled_form()).unwrap();

        controller.on_persisted(&Err(StoreError::not_found("Erreur 404")));
        assert_eq!(controller.state(), WorkflowState::UploadComplete);
        assert!(controller.validation().uploaded.is_some());
    }

    #[tokio::test]
    async fn test_upload_from_previous_page_visit_is_dropped() {
        let store = Arc::new(MockStore::default());

        // First visit: the upload is still running when the user leaves
        let mut first_visit = controller();
        let old_job = first_visit.on_file_selected(&mut input_with("old.png")).unwrap();

        // Second visit with a fresh controller
        let mut second_visit = controller();
        let new_job = second_visit.on_file_selected(&mut input_with("new.png")).unwrap();
        assert_ne!(old_job.attempt, new_job.attempt);

        let old_outcome = NewBillController::upload(store.clone(), old_job).await;
        assert!(!second_visit.on_upload_finished(old_outcome));
        assert!(second_visit.validation().uploaded.is_none());

        let new_outcome = NewBillController::upload(store.clone(), new_job).await;
        assert!(second_visit.on_upload_finished(new_outcome));

        let pending = second_visit.on_submit(&filled_form()).unwrap();
        assert_eq!(pending.record.receipt.unwrap().file_name, "new.png");
    }

    #[tokio::test]
    async fn test_reset_keeps_older_uploads_stale() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let old_job = controller.on_file_selected(&mut input_with("old.png")).unwrap();
        controller.reset();
        assert_eq!(controller.state(), WorkflowState::Empty);
        assert_eq!(controller.validation(), &ValidationState::default());

        let new_job = controller.on_file_selected(&mut input_with("new.png")).unwrap();
        let old_outcome = NewBillController::upload(store.clone(), old_job).await;
        assert!(!controller.on_upload_finished(old_outcome));

        let new_outcome = NewBillController::upload(store, new_job).await;
        assert!(controller.on_upload_finished(new_outcome));
        assert_eq!(
            controller.validation().uploaded.as_ref().unwrap().file_name,
            "new.png"
        );
    }

    #[tokio::test]
    async fn test_failed_save_does_not_override_newer_selection() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("a.png")).unwrap();
        let outcome = NewBillController::upload(store.clone(), job).await;
        controller.on_upload_finished(outcome);
        controller.on_submit(&filled_form()).unwrap();
        assert_eq!(controller.state(), WorkflowState::Submitting);

        // A new file is picked while the save is running, then the save fails
        let newer = controller.on_file_selected(&mut input_with("b.png")).unwrap();
        controller.on_persisted(&Err(StoreError::internal("Erreur 500")));
        assert_eq!(controller.state(), WorkflowState::Uploading { attempt: newer.attempt });

        let outcome = NewBillController::upload(store, newer).await;
        assert!(controller.on_upload_finished(outcome));

        let pending = controller.on_submit(&filled_form()).unwrap();
        assert_eq!(pending.record.receipt.unwrap().file_name, "b.png");
    }

    #[tokio::test]
    async fn test_successful_save_keeps_newer_selection() {
        let store = Arc::new(MockStore::default());
        let mut controller = controller();

        let job = controller.on_file_selected(&mut input_with("a.png")).unwrap();
        let outcome = NewBillController::upload(store.clone(), job).await;
        controller.on_upload_finished(outcome);
        let pending = controller.on_submit(&filled_form()).unwrap();

        let newer = controller.on_file_selected(&mut input_with("b.png")).unwrap();
        let saved = NewBillController::persist(store, pending).await;
        controller.on_persisted(&saved);

        assert_eq!(controller.state(), WorkflowState::Uploading { attempt: newer.attempt });
        assert_eq!(controller.validation().file_name.as_deref(), Some("b.png"));
        assert!(controller.is_file_valid());
    }

    #[test]
    fn test_empty_selection_changes_nothing() {
        let mut controller = controller();
        let mut input = FileInput::default();
        assert!(controller.on_file_selected(&mut input).is_none());
        assert_eq!(controller.state(), WorkflowState::Empty);
    }
}
