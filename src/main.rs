use iced::{Element, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use billed::bills::controller::{BillListController, BillRow};
use billed::bills::presenter;
use billed::config::AppConfig;
use billed::error::{AppError, StoreError};
use billed::new_bill::controller::{NewBillController, UploadOutcome};
use billed::new_bill::form::{FormEdit, NewBillForm};
use billed::state::data::{BillRecord, SelectedFile};
use billed::state::library::Library;
use billed::state::session::Session;
use billed::store::BillStore;

// Declare the ui module
mod ui;

/// Pages of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Bills,
    NewBill,
}

/// Main application state
struct Billed {
    /// Where bills and receipts are stored
    store: Arc<dyn BillStore>,
    /// Page currently displayed
    route: Route,
    bills: BillListController,
    new_bill: NewBillController,
    form: NewBillForm,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Replace the displayed page
    Navigate(Route),
    /// Background bill fetch completed
    BillsLoaded(Result<Vec<BillRecord>, StoreError>),
    /// User clicked the receipt button of a row
    ViewReceipt(BillRow),
    CloseReceipt,
    /// User clicked "Choisir un fichier"
    PickReceipt,
    /// Background receipt upload completed
    ReceiptUploaded(UploadOutcome),
    FormEdited(FormEdit),
    Submit,
    /// Background save of the submitted bill completed
    BillPersisted(Result<BillRecord, StoreError>),
}

impl Billed {
    /// Create a new instance of the application, starting on the bill list
    fn new(library: Library, session: Session) -> (Self, Task<Message>) {
        let mut app = Billed {
            store: Arc::new(library),
            new_bill: NewBillController::new(session),
            route: Route::Bills,
            bills: BillListController::new(),
            form: NewBillForm::default(),
        };

        let task = app.navigate(Route::Bills);
        (app, task)
    }

    /// Swap the displayed page and start whatever it needs
    fn navigate(&mut self, route: Route) -> Task<Message> {
        info!("🧭 Navigating to {:?}", route);
        self.route = route;

        match route {
            Route::Bills => {
                self.bills.activate();
                Task::perform(
                    BillListController::fetch_bills(self.store.clone()),
                    Message::BillsLoaded,
                )
            }
            Route::NewBill => {
                self.new_bill.reset();
                self.form = NewBillForm::default();
                Task::none()
            }
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(route) => self.navigate(route),
            Message::BillsLoaded(result) => {
                self.bills.on_bills_loaded(result);
                Task::none()
            }
            Message::ViewReceipt(row) => {
                self.bills.on_view_receipt(&row);
                Task::none()
            }
            Message::CloseReceipt => {
                self.bills.close_receipt();
                Task::none()
            }
            Message::PickReceipt => {
                // Show the native file picker; the validator decides what is accepted
                let picked = FileDialog::new()
                    .set_title("Sélectionner un justificatif")
                    .pick_file();

                let Some(path) = picked else {
                    return Task::none();
                };

                self.form.receipt.choose(SelectedFile::from_path(path));
                match self.new_bill.on_file_selected(&mut self.form.receipt) {
                    Some(job) => Task::perform(
                        NewBillController::upload(self.store.clone(), job),
                        Message::ReceiptUploaded,
                    ),
                    None => Task::none(),
                }
            }
            Message::ReceiptUploaded(outcome) => {
                self.new_bill.on_upload_finished(outcome);
                Task::none()
            }
            Message::FormEdited(edit) => {
                self.form.apply(edit);
                Task::none()
            }
            Message::Submit => match self.new_bill.on_submit(&self.form) {
                Ok(pending) => Task::perform(
                    NewBillController::persist(self.store.clone(), pending),
                    Message::BillPersisted,
                ),
                Err(e) => {
                    warn!("🚫 Submission refused: {}", e);
                    show_notice(&e.to_string());
                    Task::none()
                }
            },
            Message::BillPersisted(result) => {
                self.new_bill.on_persisted(&result);
                match result {
                    Ok(_) => self.navigate(Route::Bills),
                    Err(e) => {
                        show_notice(&format!("La note de frais n'a pas pu être enregistrée : {}", e));
                        Task::none()
                    }
                }
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        match self.route {
            Route::Bills => ui::bills_page::view(
                presenter::present(self.bills.state()),
                self.bills.modal(),
            ),
            Route::NewBill => ui::new_bill_page::view(&self.form, &self.new_bill),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Blocking notice with a single OK button
fn show_notice(description: &str) {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Note de frais")
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.log_filter);

    // The app cannot function without its catalog
    let library = Library::open(&config)?;

    if let Some(email) = &config.user_email {
        Session::employee(email.clone()).save(&library)?;
    }

    if let Some(seed) = &config.seed_path {
        if library.bill_count()? == 0 {
            library.seed_from_json(seed)?;
        }
    }

    let session = Session::load(&library)?;
    info!(
        "🎨 Billed initialized for {} with {} bills",
        session.email(),
        library.bill_count()?
    );

    iced::application("Billed", Billed::update, Billed::view)
        .theme(Billed::theme)
        .centered()
        .run_with(move || Billed::new(library, session))?;

    Ok(())
}
