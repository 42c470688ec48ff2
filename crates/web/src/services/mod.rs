//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, and the password-reset lifecycle
//! - `mail` - Transactional email over SMTP
//! - `uploads` - Store photo validation, resizing, and storage

pub mod auth;
pub mod mail;
pub mod uploads;

pub use auth::{AuthError, AuthService};
pub use mail::{MailError, MailService};
pub use uploads::{PhotoStore, UploadError};
