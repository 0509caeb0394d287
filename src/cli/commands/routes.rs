use serde_json::json;

use crate::cli::commands::{provision, ConfigArgs};
use crate::cli::utils::{flag, print_json};
use crate::cli::OutputFormat;

pub async fn handle(args: ConfigArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let stack = provision(&args)?;
    let endpoints = stack.routes.endpoints();

    match output_format {
        OutputFormat::Json => print_json(&json!({ "routes": endpoints }))?,
        OutputFormat::Text => {
            println!("{:<30} {:<8} {:<34} {:<10} {}", "PATH", "METHOD", "BINDING", "AUTHORIZER", "API KEY");
            println!("{}", "-".repeat(92));

            for endpoint in &endpoints {
                println!(
                    "{:<30} {:<8} {:<34} {:<10} {}",
                    endpoint.path,
                    endpoint.method,
                    endpoint.binding,
                    format!("{:?}", endpoint.options.authorization).to_uppercase(),
                    flag(endpoint.options.api_key_required)
                );
            }
        }
    }

    Ok(())
}
