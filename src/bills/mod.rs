/// Bill list page
///
/// - `ordering.rs` - display dates and newest-first ordering
/// - `controller.rs` - fetching bills, error classification, receipt viewer
/// - `presenter.rs` - view model of the page

pub mod ordering;
pub mod controller;
pub mod presenter;
