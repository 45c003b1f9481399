//! Google login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use authkeep_core::UserType;

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct GoogleLoginArgs {
    /// Google ID token obtained from the sign-in flow
    #[arg(long, env = "AUTHKEEP_GOOGLE_ID_TOKEN", hide_env_values = true)]
    pub id_token: String,

    /// Create an account instead of signing in
    #[arg(long)]
    pub signup: bool,

    /// Account type (creator or brand)
    #[arg(long, default_value = "creator")]
    pub user_type: UserType,
}

pub async fn run(args: GoogleLoginArgs, global: &GlobalArgs) -> Result<()> {
    let session = context::open_session(global)?;

    eprintln!("{}", "Logging in with Google...".dimmed());

    let body = session
        .auth()
        .google_auth(&args.id_token, args.signup, args.user_type)
        .await
        .context("Failed to login")?;

    if !session.is_authenticated().await {
        anyhow::bail!("Login response did not include a session");
    }

    output::success("Logged in successfully");
    if let Some(user) = body.get("user") {
        println!();
        super::print_user(user);
    }

    Ok(())
}
