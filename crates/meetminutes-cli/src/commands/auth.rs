//! Interactive authorization command.

use tracing::info;

use meetminutes_google::{Authorizer, CredentialStore, archive_scopes};

use crate::config::AppConfig;
use crate::error::CliResult;

/// Runs the interactive Google authorization flow.
///
/// With usable cached credentials and no `--force` this is a no-op; the
/// archive pipeline will authorize from the cache on its own.
pub async fn run(config: &AppConfig, force: bool) -> CliResult<()> {
    let store = CredentialStore::new(&config.google.token_file);

    if !force && store.load().is_some() {
        println!("Already authorized; cached credentials at {:?}.", store.path());
        println!("Use --force to run the browser flow again.");
        return Ok(());
    }

    println!("Starting Google authorization...");
    println!();
    println!("A browser window will open for you to grant access to Meet");
    println!("records, Meet artifacts in Drive, and sending mail.");
    println!("If the browser doesn't open, copy the URL from the terminal.");
    println!();

    let authorizer = Authorizer::new(store, &config.google.credentials_file, archive_scopes());
    authorizer.authorize_interactive().await?;

    info!("interactive authorization complete");
    println!();
    println!("Authorization complete. Credentials cached at {:?}.", config.google.token_file);
    Ok(())
}
