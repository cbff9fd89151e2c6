use anyhow::{Context, Result};

pub fn login(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Token must not be empty");
    }
    crate::keyring::store_backend_token(token.trim()).context("Failed to save token")?;
    println!("✓ Backend token saved to the system keyring");
    Ok(())
}

pub fn logout() -> Result<()> {
    crate::keyring::delete_backend_token().context("No stored token to remove")?;
    println!("✓ Backend token removed");
    Ok(())
}
