/// New bill page
///
/// - `validator.rs` - receipt file allow-list
/// - `form.rs` - raw form fields and their parsing
/// - `controller.rs` - selection, upload and submission workflow

pub mod validator;
pub mod form;
pub mod controller;
