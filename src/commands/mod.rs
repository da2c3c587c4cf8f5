pub mod access;
pub mod audit;

use crate::{Config, billing::BillingError, costs::ValidationErrors};
use clap::Subcommand;
use thiserror::Error;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Run the cost and credits queries once and print a JSON report
    Audit(audit::AuditArgs),
    /// Print the AWS identity the dashboard runs as
    Whoami,
    /// Attach the billing read-only policy to an IAM user or role
    GrantBillingAccess(access::GrantArgs),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid query: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Billing API error: {0}")]
    Billing(#[from] BillingError),
    #[error("STS error: {0}")]
    Sts(String),
    #[error("IAM error: {0}")]
    Iam(String),
    #[error("Invalid ARN: {0}")]
    InvalidArn(String),
    #[error("Cannot derive a user or role from identity {0}; pass --user or --role")]
    UnsupportedIdentity(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Run a one-shot operator command. `Serve` is handled by the binary.
pub async fn handle_command(command: Commands, config: &Config) -> Result<(), CommandError> {
    match command {
        Commands::Serve => Ok(()),
        Commands::Audit(args) => audit::handle_audit_command(args, config).await,
        Commands::Whoami => access::handle_whoami_command(config).await,
        Commands::GrantBillingAccess(args) => access::handle_grant_command(args, config).await,
    }
}
