//! Startup provisioning of the console administrator.

use anyhow::Result;
use tracing::{info, warn};

use crate::auth::password::{check_policy, hash_password};
use crate::models::account::Role;
use crate::models::normalize_email;
use crate::store::AccountStore;

/// Creates the admin account unless an account with that email exists.
/// An existing account is left untouched, whatever its role or password.
pub async fn ensure_admin(accounts: &dyn AccountStore, email: &str, password: &str) -> Result<bool> {
    let email = normalize_email(email);
    if let Some(existing) = accounts.find_by_email(&email).await? {
        if existing.role != Role::Admin {
            warn!("ADMIN_EMAIL {email} belongs to a non-admin account; not seeding");
        }
        return Ok(false);
    }

    let violations = check_policy(password);
    if !violations.is_empty() {
        warn!("ADMIN_PASSWORD is weak: {}", violations.join("; "));
    }

    accounts.create(&email, &hash_password(password)?, Role::Admin).await?;
    info!("Seeded admin account {email}");
    Ok(true)
}
