//! Backend token storage in the OS keyring.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE: &str = "timecard-sync-backend";
const ACCOUNT: &str = "default";

fn entry() -> Result<Entry> {
    Entry::new(SERVICE, ACCOUNT).context("Failed to open keyring entry for the backend token")
}

pub fn store_backend_token(token: &str) -> Result<()> {
    entry()?
        .set_password(token)
        .context("Failed to store backend token in keyring")
}

pub fn get_backend_token() -> Result<String> {
    entry()?
        .get_password()
        .context("No backend token in keyring")
}

pub fn delete_backend_token() -> Result<()> {
    entry()?
        .delete_credential()
        .context("Failed to delete backend token from keyring")
}
