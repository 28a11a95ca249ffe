use std::fmt::Display;

use billing_core::settings::MailerSettings;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::message::compose_message;
use crate::MailError;

/// A STARTTLS relay on `host:port` authenticating with `username`/`password`.
pub fn smtp_transport(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
) -> Result<SmtpTransport, MailError> {
    let credentials = Credentials::new(username.to_string(), password.to_string());
    let transport = SmtpTransport::starttls_relay(host)
        .map_err(|e| MailError::Smtp(format!("SMTP relay error: {e}")))?
        .port(port)
        .credentials(credentials)
        .build();
    Ok(transport)
}

/// Send `message` through `transport`.
pub fn deliver<T>(transport: &T, message: &Message) -> Result<(), MailError>
where
    T: Transport,
    T::Error: Display,
{
    transport
        .send(message)
        .map(|_| ())
        .map_err(|e| MailError::Smtp(e.to_string()))
}

/// Compose the message described by `settings` and send it over SMTP.
pub fn send_from_settings(settings: &MailerSettings) -> Result<(), MailError> {
    let message = compose_message(
        &settings.fromaddr,
        &settings.toaddr,
        &settings.subject,
        &settings.body,
        settings.attachment.as_deref(),
    )?;

    let transport = smtp_transport(
        &settings.smtp_host,
        settings.smtp_port,
        settings.username(),
        &settings.smtp_password,
    )?;
    deliver(&transport, &message)?;

    info!(
        "Sent {:?} from {} to {} via {}:{}",
        settings.subject, settings.fromaddr, settings.toaddr, settings.smtp_host, settings.smtp_port
    );
    Ok(())
}
