use std::path::Path;

use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use tracing::debug;

use crate::MailError;

const OCTET_STREAM: &str = "application/octet-stream";

/// Build a `multipart/mixed` message.
///
/// The first part is the UTF-8 text read from `body_path`. When an
/// `attachment` is given its raw bytes follow as a base64 part named after
/// the file.
pub fn compose_message(
    from: &str,
    to: &str,
    subject: &str,
    body_path: &Path,
    attachment: Option<&Path>,
) -> Result<Message, MailError> {
    let text = std::fs::read_to_string(body_path).map_err(|source| MailError::Body {
        path: body_path.to_path_buf(),
        source,
    })?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(text));
    if let Some(path) = attachment {
        parts = parts.singlepart(attachment_part(path)?);
    }

    Message::builder()
        .from(parse_mailbox(from)?)
        .to(parse_mailbox(to)?)
        .subject(subject)
        .multipart(parts)
        .map_err(|e| MailError::Build(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn attachment_part(path: &Path) -> Result<SinglePart, MailError> {
    let bytes = std::fs::read(path).map_err(|source| MailError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("Attaching {} ({} bytes)", filename, bytes.len());

    let body = Body::new_with_encoding(bytes, ContentTransferEncoding::Base64)
        .map_err(|_| MailError::Build(format!("{filename} cannot be base64 encoded")))?;
    let content_type =
        ContentType::parse(OCTET_STREAM).map_err(|e| MailError::Build(e.to_string()))?;

    Ok(Attachment::new(filename).body(body, content_type))
}
