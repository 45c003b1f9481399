//! Session subcommand implementations.

mod google_login;
mod login;
mod logout;
mod profile;
mod refresh_token;
mod request;
mod send_otp;
mod update_name;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::GlobalArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(subcommand)]
    pub command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Text a one-time code to a phone number
    SendOtp(send_otp::SendOtpArgs),

    /// Sign in with a one-time code
    Login(login::LoginArgs),

    /// Sign in with a Google ID token
    GoogleLogin(google_login::GoogleLoginArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Fetch the full profile
    Profile(profile::ProfileArgs),

    /// Change the account name
    UpdateName(update_name::UpdateNameArgs),

    /// Refresh the session tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Call any endpoint with the stored credentials
    Request(request::RequestArgs),

    /// Sign out and clear stored credentials
    Logout(logout::LogoutArgs),
}

pub async fn handle(cmd: SessionCommand, global: &GlobalArgs) -> Result<()> {
    match cmd.command {
        SessionSubcommand::SendOtp(args) => send_otp::run(args, global).await,
        SessionSubcommand::Login(args) => login::run(args, global).await,
        SessionSubcommand::GoogleLogin(args) => google_login::run(args, global).await,
        SessionSubcommand::Whoami(args) => whoami::run(args, global).await,
        SessionSubcommand::Profile(args) => profile::run(args, global).await,
        SessionSubcommand::UpdateName(args) => update_name::run(args, global).await,
        SessionSubcommand::RefreshToken(args) => refresh_token::run(args, global).await,
        SessionSubcommand::Request(args) => request::run(args, global).await,
        SessionSubcommand::Logout(args) => logout::run(args, global).await,
    }
}

/// Point the user at login when an authenticated call ended the session.
fn report(err: authkeep_core::Error) -> anyhow::Error {
    if err.is_session_expired() {
        output::error("Session expired. Run 'authkeep session login' to sign in again.");
    }
    err.into()
}

/// Print the identifying fields of a user object.
fn print_user(user: &serde_json::Value) {
    output::fields_from(
        user,
        &[
            ("id", "ID"),
            ("name", "Name"),
            ("phone", "Phone"),
            ("email", "Email"),
            ("userType", "Type"),
        ],
    );
}
