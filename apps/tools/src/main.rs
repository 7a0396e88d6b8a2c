use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use shared::{
    domain::ComponentRef,
    error::ApiError,
    protocol::{DependencySummary, OutputRef, UpdateComponentRequest, ValueUpdate},
};
use url::Url;

#[derive(Parser, Debug)]
struct Cli {
    /// Base URL of the server. Routes are resolved below its full path,
    /// so `http://host/app` and `http://host/app/` are equivalent.
    #[arg(long, default_value = "http://127.0.0.1:8050/")]
    server_url: Url,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one update request and print the callback's response.
    Update {
        /// Output to recompute, as `id.property`.
        #[arg(long)]
        output: ComponentRef,
        /// Input value, as `id.property=json`. Repeatable.
        #[arg(long = "input")]
        inputs: Vec<String>,
        /// State value, as `id.property=json`. Repeatable.
        #[arg(long = "state")]
        state: Vec<String>,
    },
    /// List the callbacks registered on the server.
    Dependencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Command::Update {
            output,
            inputs,
            state,
        } => {
            let payload = UpdateComponentRequest {
                inputs: parse_updates(&inputs)?,
                state: parse_updates(&state)?,
                output: Some(OutputRef {
                    id: output.id,
                    property: output.property,
                }),
            };
            let url = endpoint(&cli.server_url, "_dash-update-component")?;
            let response = client.post(url).json(&payload).send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let err: ApiError = response
                    .json()
                    .await
                    .with_context(|| format!("server answered {status} without an error body"))?;
                bail!("server answered {status}: {err}");
            }
            let value: Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Dependencies => {
            let url = endpoint(&cli.server_url, "_dash-dependencies")?;
            let deps: Vec<DependencySummary> = client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            for dep in deps {
                println!(
                    "{} <- inputs [{}] state [{}]",
                    dep.output,
                    join_refs(&dep.inputs),
                    join_refs(&dep.state)
                );
            }
        }
    }

    Ok(())
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn endpoint(base: &Url, route: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(route)
        .with_context(|| format!("cannot build {route} url from {base}"))
}

fn parse_updates(raw: &[String]) -> Result<Vec<ValueUpdate>> {
    raw.iter().map(|entry| parse_update(entry)).collect()
}

/// Parses `id.property=value`. The value is read as JSON and falls back to
/// a plain string, so `name.value=Ada` works without quoting.
fn parse_update(entry: &str) -> Result<ValueUpdate> {
    let (component, raw_value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("expected id.property=value, got '{entry}'"))?;
    let component: ComponentRef = component.parse()?;
    let value =
        serde_json::from_str(raw_value).unwrap_or_else(|_| Value::String(raw_value.into()));
    Ok(ValueUpdate::new(component.id, component.property, value))
}

fn join_refs(refs: &[ComponentRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
