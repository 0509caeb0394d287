pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "tenantctl")]
#[command(about = "tenantctl - Provision and inspect tenant service stacks")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Provision a tenant stack and print it")]
    Synth(commands::ConfigArgs),

    #[command(about = "Print the route table of a provisioned stack")]
    Routes(commands::ConfigArgs),

    #[command(about = "Print every role with its managed policies and grants")]
    Grants(commands::ConfigArgs),

    #[command(about = "Validate a provisioning config without printing the stack")]
    Validate(commands::ConfigArgs),

    #[command(about = "Issue a bearer token for gated gateway methods")]
    Token {
        #[arg(help = "Token subject")]
        subject: String,

        #[arg(long, help = "Tenant claim")]
        tenant: Option<String>,

        #[arg(long, default_value_t = 24, help = "Lifetime in hours")]
        ttl_hours: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Synth(args) => commands::synth::handle(args, output_format).await,
        Commands::Routes(args) => commands::routes::handle(args, output_format).await,
        Commands::Grants(args) => commands::grants::handle(args, output_format).await,
        Commands::Validate(args) => commands::validate::handle(args, output_format).await,
        Commands::Token {
            subject,
            tenant,
            ttl_hours,
        } => commands::token::handle(subject, tenant, ttl_hours, output_format).await,
    }
}
