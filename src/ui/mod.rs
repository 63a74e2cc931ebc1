/// User interface module
///
/// Turns the page view models into iced widgets:
/// - `bills_page.rs` - bill list, loading and error pages
/// - `new_bill_page.rs` - new bill form
/// - `modal.rs` - overlay used by the receipt viewer

pub mod bills_page;
pub mod modal;
pub mod new_bill_page;
