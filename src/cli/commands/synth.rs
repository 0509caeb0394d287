use crate::cli::commands::{provision, ConfigArgs};
use crate::cli::utils::print_json;
use crate::cli::OutputFormat;
use crate::types::CrudRole;

pub async fn handle(args: ConfigArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let stack = provision(&args)?;

    match output_format {
        OutputFormat::Json => print_json(&stack)?,
        OutputFormat::Text => {
            println!("Tenant: {}", stack.tenant_id);
            println!("Fingerprint: {}", stack.fingerprint()?);
            println!(
                "Routes: {} ({} methods)",
                stack.routes.route_count(),
                stack.routes.method_count()
            );
            println!();

            for unit in &stack.units {
                println!("{} -> table {} ({})", unit.name, unit.store.name, unit.store.identifier);
                for role in CrudRole::ALL {
                    if let Some(binding) = unit.binding(role) {
                        println!(
                            "  {:<10} {:<32} {}.{}",
                            role.label(),
                            binding.function_name,
                            binding.index,
                            binding.handler
                        );
                    }
                }
            }

            for aux in [&stack.user_management, &stack.ai_concierge] {
                println!(
                    "{} -> {} (role {}, timeout {}s)",
                    aux.name, aux.binding.function_name, aux.role.name, aux.binding.timeout_secs
                );
            }
        }
    }

    Ok(())
}
