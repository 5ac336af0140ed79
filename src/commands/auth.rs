use anyhow::Result;

use crate::config::{self, Tokens};
use crate::providers::google;

pub async fn run() -> Result<()> {
    let config = config::load_config()?;

    let tokens = google::auth::authenticate(&config.google).await?;

    config::save_tokens(&Tokens {
        google: Some(tokens),
    })?;

    println!("Tokens saved to {}", config::tokens_path()?.display());

    Ok(())
}
