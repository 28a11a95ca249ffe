//! E-mail delivery of invoices.
//!
//! A thin layer over [lettre](https://lettre.rs): [`compose_message`] builds a
//! `multipart/mixed` message from a body file and an optional attachment,
//! [`deliver`] hands it to any lettre transport.

mod message;
mod transport;

use std::path::PathBuf;

use thiserror::Error;

pub use message::compose_message;
pub use transport::{deliver, send_from_settings, smtp_transport};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Failed to read attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read message body {path}: {source}")]
    Body {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SMTP error: {0}")]
    Smtp(String),
}
