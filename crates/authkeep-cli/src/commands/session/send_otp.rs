//! Send-OTP command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct SendOtpArgs {
    /// Phone number to send the code to
    #[arg(long)]
    pub phone: String,

    /// Only check whether an account exists for the number
    #[arg(long)]
    pub check_only: bool,
}

pub async fn run(args: SendOtpArgs, global: &GlobalArgs) -> Result<()> {
    let session = context::open_session(global)?;

    if args.check_only {
        let body = session
            .auth()
            .check_user_exists(&args.phone)
            .await
            .context("Failed to look up account")?;
        return output::json_pretty(&body);
    }

    eprintln!("{}", "Sending code...".dimmed());

    session
        .auth()
        .send_otp(&args.phone)
        .await
        .context("Failed to send code")?;

    output::success(&format!("Code sent to {}", args.phone));

    Ok(())
}
