//! Building a session from the global arguments.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use authkeep_core::{ApiUrl, AuthSession, SessionConfig};
use authkeep_http::ReqwestTransport;

use crate::cli::GlobalArgs;

/// Resolve the credential directory, creating it if needed.
fn store_dir(args: &GlobalArgs) -> Result<PathBuf> {
    let dir = match &args.store_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("", "", "authkeep")
            .context("Could not determine data directory")?
            .data_dir()
            .to_path_buf(),
    };

    fs::create_dir_all(&dir).context("Failed to create credential directory")?;
    Ok(dir)
}

/// Open the session described by the global arguments.
pub fn open_session(args: &GlobalArgs) -> Result<AuthSession> {
    let base_url = ApiUrl::new(&args.api).context("Invalid API URL")?;
    let dir = store_dir(args)?;
    debug!(store = %dir.display(), api = %base_url, "opening session");

    let config =
        SessionConfig::new(base_url).with_request_timeout(Duration::from_millis(args.timeout_ms));
    let transport = ReqwestTransport::new().context("Failed to build HTTP client")?;

    AuthSession::new(config, authkeep_file::open(&dir), Arc::new(transport))
        .context("Invalid session configuration")
}
