//! Transactional email.
//!
//! Implementations never return errors: any configuration, address or
//! transport problem is logged and reported as `false`. Callers decide what a
//! failed send means for their operation.

use async_trait::async_trait;

pub mod smtp;
mod templates;

pub use smtp::{SmtpNotifier, SmtpSettings};

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Welcome message after self-registration.
    async fn send_welcome(&self, email: &str, full_name: &str) -> bool;

    /// Generated login credentials. The plaintext password only ever travels
    /// through this call.
    async fn send_credentials(&self, email: &str, full_name: &str, password: &str) -> bool;
}
