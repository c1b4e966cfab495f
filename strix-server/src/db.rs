use anyhow::{Context, Result, anyhow};
use url::Url;

pub fn validate_database_url(base: &str) -> Result<()> {
    let url = Url::parse(base).context("invalid PostgreSQL URL")?;
    let name = url.path().trim_start_matches('/');
    if name.is_empty() {
        return Err(anyhow!("database URL must include database name"));
    }
    Ok(())
}
