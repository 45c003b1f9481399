use std::path::Path;
use std::process::{Command, Output};

use authkeep_core::{AccessToken, RefreshToken, TokenPair};

/// Run the CLI against `api_url`, keeping credentials in `store_dir`.
pub fn run_cli_with_env(args: &[&str], store_dir: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authkeep"));
    cmd.args(args);
    cmd.env("HOME", store_dir);
    cmd.env("XDG_DATA_HOME", store_dir.join("data"));
    cmd.env("AUTHKEEP_STORE_DIR", store_dir);
    cmd.env("AUTHKEEP_API_URL", api_url);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_with_env_success(args: &[&str], store_dir: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, store_dir, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_with_env_failure(args: &[&str], store_dir: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, store_dir, api_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Store a token pair as if a login had happened.
pub async fn seed_tokens(store_dir: &Path, access: &str, refresh: &str) {
    authkeep_file::open(store_dir)
        .set_tokens(&TokenPair::new(
            AccessToken::new(access),
            RefreshToken::new(refresh),
        ))
        .await;
}

/// Read back the stored token pair.
pub async fn stored_tokens(store_dir: &Path) -> Option<(String, String)> {
    authkeep_file::open(store_dir)
        .tokens()
        .await
        .map(|pair| (pair.access.as_str().to_string(), pair.refresh.as_str().to_string()))
}
