// ABOUTME: Secure credential storage using system keychain
// Uses keyring crate for cross-platform support (macOS Keychain, Linux Secret Service)

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "cardiocheck";

/// Credential keys for different secrets
#[derive(Debug, Clone, Copy)]
pub enum CredentialKey {
    ApiToken,
}

impl CredentialKey {
    fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::ApiToken => "api_token",
        }
    }
}

/// Store a credential in the system keychain
pub fn store_credential(key: CredentialKey, value: &str) -> Result<()> {
    if value.is_empty() {
        anyhow::bail!("Refusing to store an empty {}", key.as_str());
    }

    let entry = Entry::new(SERVICE_NAME, key.as_str()).context("Failed to create keyring entry")?;

    entry
        .set_password(value)
        .context("Failed to store credential in keychain")?;

    tracing::info!("Stored credential: {}", key.as_str());
    Ok(())
}

/// Retrieve a credential from the system keychain
pub fn get_credential(key: CredentialKey) -> Result<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, key.as_str()).context("Failed to create keyring entry")?;

    match entry.get_password() {
        Ok(password) => {
            tracing::debug!("Retrieved credential: {}", key.as_str());
            Ok(Some(password))
        }
        Err(keyring::Error::NoEntry) => {
            tracing::debug!("No credential found for: {}", key.as_str());
            Ok(None)
        }
        Err(e) => {
            tracing::warn!("Failed to retrieve credential {}: {}", key.as_str(), e);
            Err(anyhow::anyhow!("Failed to retrieve credential: {}", e))
        }
    }
}

/// Delete a credential from the system keychain
pub fn delete_credential(key: CredentialKey) -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, key.as_str()).context("Failed to create keyring entry")?;

    match entry.delete_credential() {
        Ok(()) => {
            tracing::info!("Deleted credential: {}", key.as_str());
            Ok(())
        }
        // Already gone
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(anyhow::anyhow!("Failed to delete credential: {}", e)),
    }
}

/// Masked token for display, e.g. `eyJhbGciOi••••••••`
pub fn mask_token(token: &str) -> String {
    match token.get(..10) {
        Some(prefix) if token.len() > 16 => format!("{}••••••••", prefix),
        _ => "••••••••".to_string(),
    }
}
