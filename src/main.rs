//! `da-mirror`: incremental DeviantArt mirror.
//!
//! Wires the desktop bridges, the client-credentials session and the
//! DeviantArt connector into a [`SyncCoordinator`] and runs one plan.

mod cli;

use anyhow::{Context, Result};
use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
use bridge_traits::{FileSystemAccess, HttpClient, LogEntry, LoggerSink};
use clap::Parser;
use cli::Cli;
use core_auth::{ClientCredentials, ClientCredentialsFlow, ClientCredentialsSession, OAuthConfig};
use core_runtime::{logging::init_logging, ErrorChannel, RunConfig};
use core_sync::{FolderListing, SyncConfig, SyncCoordinator};
use provider_deviantart::DeviantArtConnector;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.run_config()?;
    init_logging(cli.logging_config())?;

    let errors = Arc::new(
        ErrorChannel::open(config.error_output.as_deref())
            .context("Failed to open error output")?,
    );

    let result = mirror(&config, errors.clone()).await;
    if let Err(e) = &result {
        error!(error = %e, "Run failed");
        let entry = LogEntry::error("da_mirror", format!("Run failed: {:#}", e));
        if let Err(log_err) = errors.log(entry).await {
            error!(error = %log_err, "Failed to report run failure");
        }
    }

    errors.close().context("Failed to close error output")?;
    result
}

async fn mirror(config: &RunConfig, errors: Arc<ErrorChannel>) -> Result<()> {
    let credentials = ClientCredentials::from_file(&config.credentials_path)
        .await
        .context("Failed to load client credentials")?;

    let http_client: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(config.request_timeout)?);
    let flow = ClientCredentialsFlow::new(
        OAuthConfig::deviantart(credentials),
        Arc::clone(&http_client),
    );
    let session = ClientCredentialsSession::establish(flow)
        .await
        .context("Authentication failed")?;
    info!(user = %config.username, "Authenticated");

    let filesystem: Arc<dyn FileSystemAccess> = Arc::new(TokioFileSystem::new());
    let connector = DeviantArtConnector::new(
        http_client,
        Arc::new(session),
        Arc::clone(&filesystem),
        config.username.as_str(),
    )
    .with_request_timeout(config.request_timeout);

    let error_sink: Arc<dyn LoggerSink> = errors.clone();
    let coordinator = SyncCoordinator::new(
        SyncConfig::from(config),
        Arc::new(connector),
        filesystem,
        error_sink,
    );

    if config.list_only {
        let listing = coordinator.list_folders().await?;
        print!("{}", render_listing(&listing));
        return Ok(());
    }

    let summary = coordinator.run(&config.plan).await?;
    info!(
        folders = summary.folders_synced,
        aborted = summary.folders_aborted,
        downloaded = summary.items_downloaded,
        skipped = summary.items_skipped,
        failed = summary.items_failed,
        reported = errors.reported(),
        "Mirror finished"
    );
    Ok(())
}

fn render_listing(listing: &FolderListing) -> String {
    let mut out = String::from("Gallery folders:\n");
    for folder in &listing.galleries {
        out.push_str(&format!("  {}\n", folder.name));
    }
    out.push_str("Collection folders:\n");
    for folder in &listing.collections {
        out.push_str(&format!("  {}\n", folder.name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{Folder, SourceKind};

    #[test]
    fn test_render_listing() {
        let listing = FolderListing {
            galleries: vec![
                Folder::new("g1", "Sketches", SourceKind::Gallery),
                Folder::new("g2", "Paintings", SourceKind::Gallery),
            ],
            collections: vec![Folder::new("c1", "Favourites", SourceKind::Collection)],
        };

        assert_eq!(
            render_listing(&listing),
            "Gallery folders:\n  Sketches\n  Paintings\nCollection folders:\n  Favourites\n"
        );
    }

    #[test]
    fn test_render_empty_listing() {
        assert_eq!(
            render_listing(&FolderListing::default()),
            "Gallery folders:\nCollection folders:\n"
        );
    }
}
