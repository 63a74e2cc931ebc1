/// State management module
///
/// This module handles all application state, including:
/// - The SQLite catalog of bills and stored items (library.rs)
/// - Shared data structures (data.rs)
/// - The logged-in user (session.rs)

pub mod library;
pub mod data;
pub mod session;
