//! billed: expense reports for employees. List submitted bills and file new
//! ones with a receipt image.

pub mod bills;
pub mod config;
pub mod error;
pub mod new_bill;
pub mod state;
pub mod store;
