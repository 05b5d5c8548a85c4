//! City Route engine library.
//!
//! Server-side code for the board and city editor.
//!
//! ## Structure
//!
//! - `use_cases/` - Board editing service, forms and validation
//! - `infrastructure/` - Ports, SQLite storage, clock and configuration
//! - `api/` - HTTP routes and middleware
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
