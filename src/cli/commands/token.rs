use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::middleware::{generate_token, Claims};

pub async fn handle(
    subject: String,
    tenant: Option<String>,
    ttl_hours: i64,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let secret = &config().security.authorizer_secret;
    if secret.is_empty() {
        anyhow::bail!("SECURITY_AUTHORIZER_SECRET is not set");
    }

    let claims = Claims::new(subject, tenant, ttl_hours);
    let token = generate_token(&claims, secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Token issued",
            Some(json!({ "token": token, "expiresAt": claims.exp })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
