use anyhow::{Context, Result};
use billing_core::logging::setup_logging;
use billing_core::settings::MailerSettings;
use billing_mail::send_from_settings;
use clap::Parser;

fn main() -> Result<()> {
    // A missing .env is fine; flags and the real environment still apply.
    dotenv::dotenv().ok();

    let settings = MailerSettings::parse();
    setup_logging(&settings.log_level);
    tracing::debug!("{:?}", settings);

    send_from_settings(&settings)
        .with_context(|| format!("sending {} to {}", settings.body.display(), settings.toaddr))?;
    Ok(())
}
