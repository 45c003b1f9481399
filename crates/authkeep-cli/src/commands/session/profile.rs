//! Profile command implementation.

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

/// Which profile record to fetch.
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ProfileKind {
    /// The full profile
    #[default]
    Full,
    /// The account record
    Account,
    /// The creator-specific profile
    Creator,
    /// The brand-specific profile
    Brand,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Fetch the account record instead of the full profile
    #[arg(long, conflicts_with = "kind")]
    pub account: bool,

    /// Profile record to fetch
    #[arg(long, value_enum, default_value_t = ProfileKind::Full)]
    pub kind: ProfileKind,
}

pub async fn run(args: ProfileArgs, global: &GlobalArgs) -> Result<()> {
    let session = context::open_session(global)?;

    let kind = if args.account {
        ProfileKind::Account
    } else {
        args.kind
    };
    let body = match kind {
        ProfileKind::Full => session.profile().profile().await,
        ProfileKind::Account => session.auth().user_profile().await,
        ProfileKind::Creator => session.profile().creator_profile().await,
        ProfileKind::Brand => session.profile().brand_profile().await,
    }
    .map_err(super::report)?;

    output::json_pretty(&body)
}
