//! Generic authenticated request command.

use anyhow::{Context, Result, anyhow};
use clap::Args;

use authkeep_core::{Method, RequestOptions, Retry};

use crate::cli::GlobalArgs;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method
    pub method: Method,

    /// Endpoint path (or absolute URL)
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Extra header as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Do not refresh and retry on 401
    #[arg(long)]
    pub no_retry: bool,
}

pub async fn run(args: RequestArgs, global: &GlobalArgs) -> Result<()> {
    let mut options = RequestOptions::new(args.method);

    if let Some(data) = &args.data {
        let body = serde_json::from_str(data).context("--data is not valid JSON")?;
        options = options.json(body);
    }

    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid header '{}': expected NAME:VALUE", header))?;
        options = options.header(name.trim(), value.trim());
    }

    let retry = if args.no_retry {
        Retry::Never
    } else {
        Retry::OnUnauthorized
    };

    let session = context::open_session(global)?;
    let body = session
        .execute(&args.path, options, retry)
        .await
        .map_err(super::report)?;

    output::json_pretty(&body)
}
