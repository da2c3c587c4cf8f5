use super::CommandError;
use crate::Config;
use aws_config::SdkConfig;
use aws_sdk_sts::error::DisplayErrorContext;
use clap::Args;
use serde::Serialize;
use tracing::info;

pub const BILLING_READ_ONLY_POLICY: &str = "arn:aws:iam::aws:policy/AWSBillingReadOnlyAccess";

#[derive(Debug, Args)]
pub struct GrantArgs {
    #[arg(long, conflicts_with = "role", help = "IAM user to grant access to")]
    pub user: Option<String>,
    #[arg(long, help = "IAM role to grant access to")]
    pub role: Option<String>,
    #[arg(long, default_value = BILLING_READ_ONLY_POLICY, help = "Managed policy to attach")]
    pub policy_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

/// IAM principal that receives the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyTarget {
    User(String),
    Role(String),
}

/// Resolve the IAM principal behind a caller ARN.
///
/// IAM users (`arn:aws:iam::<acct>:user/<path/>name`) map to their user
/// name; assumed-role sessions (`arn:aws:sts::<acct>:assumed-role/name/session`)
/// and IAM roles map to the role name. Root and federated identities are
/// rejected.
pub fn target_from_arn(arn: &str) -> Result<PolicyTarget, CommandError> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    let [prefix, _partition, service, _region, _account, resource] = parts.as_slice() else {
        return Err(CommandError::InvalidArn(arn.to_string()));
    };
    if *prefix != "arn" {
        return Err(CommandError::InvalidArn(arn.to_string()));
    }

    let name = |path: &str| {
        path.rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    };

    let target = match (*service, resource.split_once('/')) {
        ("iam", Some(("user", path))) => name(path).map(PolicyTarget::User),
        ("iam", Some(("role", path))) => name(path).map(PolicyTarget::Role),
        ("sts", Some(("assumed-role", rest))) => rest
            .split('/')
            .next()
            .filter(|role| !role.is_empty())
            .map(|role| PolicyTarget::Role(role.to_string())),
        _ => None,
    };

    target.ok_or_else(|| CommandError::UnsupportedIdentity(arn.to_string()))
}

async fn caller_identity(sdk_config: &SdkConfig) -> Result<CallerIdentity, CommandError> {
    let output = aws_sdk_sts::Client::new(sdk_config)
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| CommandError::Sts(DisplayErrorContext(&e).to_string()))?;

    Ok(CallerIdentity {
        account: output.account().unwrap_or_default().to_string(),
        arn: output.arn().unwrap_or_default().to_string(),
        user_id: output.user_id().unwrap_or_default().to_string(),
    })
}

pub async fn handle_whoami_command(config: &Config) -> Result<(), CommandError> {
    let sdk_config = config.aws.build_sdk_config().await;
    let identity = caller_identity(&sdk_config).await?;

    println!("{}", serde_json::to_string_pretty(&identity)?);
    Ok(())
}

pub async fn handle_grant_command(args: GrantArgs, config: &Config) -> Result<(), CommandError> {
    let sdk_config = config.aws.build_sdk_config().await;

    let target = match (args.user, args.role) {
        (Some(user), _) => PolicyTarget::User(user),
        (None, Some(role)) => PolicyTarget::Role(role),
        (None, None) => {
            let identity = caller_identity(&sdk_config).await?;
            info!(arn = %identity.arn, "Deriving target from caller identity");
            target_from_arn(&identity.arn)?
        }
    };

    let iam = aws_sdk_iam::Client::new(&sdk_config);
    match &target {
        PolicyTarget::User(user) => {
            iam.attach_user_policy()
                .user_name(user)
                .policy_arn(&args.policy_arn)
                .send()
                .await
                .map_err(|e| CommandError::Iam(DisplayErrorContext(&e).to_string()))?;
            info!(user = %user, policy = %args.policy_arn, "Attached policy to user");
        }
        PolicyTarget::Role(role) => {
            iam.attach_role_policy()
                .role_name(role)
                .policy_arn(&args.policy_arn)
                .send()
                .await
                .map_err(|e| CommandError::Iam(DisplayErrorContext(&e).to_string()))?;
            info!(role = %role, policy = %args.policy_arn, "Attached policy to role");
        }
    }

    println!("Attached {} to {:?}", args.policy_arn, target);
    Ok(())
}
