//! Check command implementation.

use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use rankright_llm::{AzureOpenAiProvider, GatewayConfig};

/// Execute the check command.
pub async fn execute_check(args: CheckArgs, formatter: &Formatter) -> Result<()> {
    let config = GatewayConfig::from_env()?;

    for line in describe(&config) {
        println!("{}", line);
    }

    let issues = config.issues();
    if !issues.is_empty() {
        for issue in &issues {
            println!("{}", formatter.error(issue));
        }
        return Err(CliError::Config(format!(
            "{} configuration issue(s) found",
            issues.len()
        )));
    }
    println!("{}", formatter.success("Configuration is complete"));

    if args.offline {
        return Ok(());
    }

    let provider = AzureOpenAiProvider::new(config)?;
    println!("{}", formatter.info("Testing connection to the model..."));
    provider.test_connection().await?;
    println!("{}", formatter.success("Model responded"));
    Ok(())
}

/// Settings as shown to the user, with the API key hidden.
pub fn describe(config: &GatewayConfig) -> Vec<String> {
    let endpoint = match config.effective_endpoint() {
        Ok(url) => url.to_string(),
        Err(_) => "(invalid)".to_string(),
    };
    let key = if config.api_key.is_empty() {
        "(not set)"
    } else {
        "(set)"
    };

    let mut lines = vec![
        format!("Endpoint:    {}", endpoint),
        format!("Deployment:  {}", config.deployment),
        format!("API version: {}", config.api_version),
        format!("API key:     {}", key),
        format!("Timeout:     {}s", config.request_timeout_secs),
    ];

    if config.use_private_endpoint {
        lines.push(format!(
            "Private endpoint: ip={} fqdn={}",
            config.private_ip.as_deref().unwrap_or("-"),
            config.private_fqdn.as_deref().unwrap_or("-")
        ));
    }
    lines
}
