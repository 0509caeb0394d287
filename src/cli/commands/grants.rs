use serde_json::json;

use crate::cli::commands::{provision, ConfigArgs};
use crate::cli::utils::print_json;
use crate::cli::OutputFormat;

pub async fn handle(args: ConfigArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let stack = provision(&args)?;
    let roles = stack.all_roles();

    match output_format {
        OutputFormat::Json => print_json(&json!({ "roles": roles }))?,
        OutputFormat::Text => {
            for role in roles {
                println!("Role: {}", role.name);
                if let Some(principal) = &role.assumed_by {
                    println!("  Assumed by: {}", principal);
                }
                for policy in &role.managed_policies {
                    println!("  Managed: {}", policy);
                }
                for grant in role.grants() {
                    println!("  Allow:");
                    for action in &grant.actions {
                        println!("    {}", action);
                    }
                    println!("  On:");
                    for resource in &grant.resources {
                        println!("    {}", resource);
                    }
                }
                println!();
            }
        }
    }

    Ok(())
}
