//! Update-name command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct UpdateNameArgs {
    /// New display name
    #[arg(long)]
    pub name: String,
}

pub async fn run(args: UpdateNameArgs, global: &GlobalArgs) -> Result<()> {
    let session = context::open_session(global)?;

    session
        .auth()
        .update_name(&args.name)
        .await
        .map_err(super::report)?;

    if let Some(mut user) = session.store().user_data().await
        && let Some(fields) = user.as_object_mut()
    {
        fields.insert("name".to_string(), args.name.clone().into());
        session.store().set_user_data(&user).await;
    }

    output::success(&format!("Name updated to {}", args.name));

    Ok(())
}
