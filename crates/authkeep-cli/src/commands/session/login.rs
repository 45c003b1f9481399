//! OTP login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use authkeep_core::{OtpCredentials, UserType};

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Phone number the code was sent to
    #[arg(long)]
    pub phone: String,

    /// One-time code
    #[arg(long)]
    pub code: String,

    /// Full name, when creating an account
    #[arg(long)]
    pub full_name: Option<String>,

    /// Account type (creator or brand)
    #[arg(long, default_value = "creator")]
    pub user_type: UserType,
}

pub async fn run(args: LoginArgs, global: &GlobalArgs) -> Result<()> {
    let session = context::open_session(global)?;
    let credentials = OtpCredentials::new(&args.phone, &args.code);

    eprintln!("{}", "Logging in...".dimmed());

    let body = session
        .auth()
        .verify_otp(&credentials, args.full_name.as_deref(), args.user_type)
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
