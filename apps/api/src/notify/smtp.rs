use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::notify::templates::{self, Email};
use crate::notify::Notifier;

/// SMTP relay settings. Absent settings leave the notifier disabled.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_name: String,
}

/// Sends mail through an authenticated STARTTLS relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(settings: Option<SmtpSettings>) -> Self {
        let Some(settings) = settings else {
            warn!("SMTP is not configured; outgoing email is disabled");
            return Self::disabled();
        };

        let from = match settings.user.parse::<Address>() {
            Ok(address) => Mailbox::new(Some(settings.from_name.clone()), address),
            Err(e) => {
                warn!("SMTP_USER is not a valid sender address: {e}");
                return Self::disabled();
            }
        };

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host) {
            Ok(builder) => builder
                .port(settings.port)
                .credentials(Credentials::new(settings.user, settings.password))
                .build(),
            Err(e) => {
                warn!("Invalid SMTP relay {}: {e}", settings.host);
                return Self::disabled();
            }
        };

        info!("SMTP notifier initialized ({}:{})", settings.host, settings.port);
        Self {
            transport: Some(transport),
            from: Some(from),
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
        }
    }

    async fn deliver(&self, to_email: &str, to_name: &str, email: Email) -> bool {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            warn!("Skipping '{}' email to {to_email}: SMTP disabled", email.subject);
            return false;
        };

        let to = match to_email.parse::<Address>() {
            Ok(address) => Mailbox::new(Some(to_name.to_string()), address),
            Err(e) => {
                warn!("Invalid recipient address {to_email}: {e}");
                return false;
            }
        };

        let message = match Message::builder()
            .from(from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
        {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to build email to {to_email}: {e}");
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => {
                info!("Email '{}' sent to {to_email}", email.subject);
                true
            }
            Err(e) => {
                warn!("SMTP delivery to {to_email} failed: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_welcome(&self, email: &str, full_name: &str) -> bool {
        self.deliver(email, full_name, templates::welcome(full_name))
            .await
    }

    async fn send_credentials(&self, email: &str, full_name: &str, password: &str) -> bool {
        self.deliver(email, full_name, templates::credentials(full_name, email, password))
            .await
    }
}
