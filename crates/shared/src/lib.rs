//! Shared errors, configuration and email delivery for Blobmail.
//!
//! This crate provides the pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - The email capability and its SMTP implementation

pub mod config;
pub mod email;
pub mod error;

pub use config::{AppConfig, EmailConfig, NotificationConfig, StorageSettings};
pub use email::{EmailError, EmailSender, SmtpEmailSender};
pub use error::{AppError, AppResult};
