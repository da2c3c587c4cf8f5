use super::CommandError;
use crate::{
    Config,
    billing::{BillingClient, cost_explorer::CostExplorerClient},
    cache::NoopCache,
    costs::{CostQuery, CostService, CostsPayload, CostsQueryParams, CreditsPayload},
};
use chrono::{NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Args)]
pub struct AuditArgs {
    #[arg(long, help = "Start date, YYYY-MM-DD (default: 30 days ago)")]
    pub start: Option<String>,
    #[arg(long, help = "End date, YYYY-MM-DD (default: today)")]
    pub end: Option<String>,
    #[arg(long, help = "DAILY or MONTHLY (default: DAILY)")]
    pub granularity: Option<String>,
    #[arg(long, help = "SERVICE or NONE (default: SERVICE)")]
    pub group_by: Option<String>,
}

impl From<AuditArgs> for CostsQueryParams {
    fn from(args: AuditArgs) -> Self {
        Self {
            start: args.start,
            end: args.end,
            granularity: args.granularity,
            group_by: args.group_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub generated_on: NaiveDate,
    pub costs: CostsPayload,
    pub credits: CreditsPayload,
}

pub async fn handle_audit_command(args: AuditArgs, config: &Config) -> Result<(), CommandError> {
    let billing = Arc::new(CostExplorerClient::new(config.aws.clone()).await);
    let report = build_report(billing, args.into(), Utc::now().date_naive()).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Run the cost pipeline once, uncached, alongside the credits aggregation
pub async fn build_report(
    billing: Arc<dyn BillingClient>,
    params: CostsQueryParams,
    today: NaiveDate,
) -> Result<AuditReport, CommandError> {
    let query = CostQuery::from_params(&params, today)?;
    let service = CostService::new(billing, Arc::new(NoopCache::new()));

    info!(
        start = %query.start,
        end = %query.end,
        granularity = %query.granularity,
        group_by = %query.group_by,
        "Running cost audit"
    );

    let costs = service.get_costs(&query).await?;
    let credits = service.get_credits(today).await;

    Ok(AuditReport {
        generated_on: today,
        costs,
        credits,
    })
}
