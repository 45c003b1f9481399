//! Whoami command implementation.

use anyhow::{Result, bail};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let session = context::open_session(global)?;

    if !session.is_authenticated().await {
        bail!("No active session. Run 'authkeep session login' first.");
    }

    output::field("API", session.config().base_url.as_str());
    match session.store().user_data().await {
        Some(user) => super::print_user(&user),
        None => output::field("User", "(not cached)"),
    }

    Ok(())
}
