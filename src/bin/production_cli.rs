use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use production_planner::{
    catalog::DbCatalog,
    config::{self, AppConfig},
    db::{self, DbPool},
    planning::{AllocationEngine, PlanPolicy, ProductionPlan},
    services::production::ProductionService,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Plan => handle_plan(&context, cli.json).await?,
        Commands::Migrate => handle_migrate(&context, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "production-cli",
    about = "Operator tools for the production planner",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the production plan for the current stock
    Plan,
    /// Apply pending database migrations
    Migrate,
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;

        Ok(Self {
            config,
            db: Arc::new(db_pool),
        })
    }

    fn production_service(&self) -> ProductionService {
        ProductionService::new(
            Arc::new(DbCatalog::new(self.db.clone())),
            AllocationEngine::new(self.config.plan_policy()),
        )
    }
}

async fn handle_plan(context: &CliContext, json: bool) -> Result<()> {
    let service = context.production_service();
    let plan = service
        .calculate_production()
        .await
        .context("failed to calculate production plan")?;

    if json {
        print_json(&plan)?;
    } else {
        render_plan(&plan, service.engine().policy());
    }

    Ok(())
}

async fn handle_migrate(context: &CliContext, json: bool) -> Result<()> {
    db::run_migrations(&context.db)
        .await
        .context("failed to apply migrations")?;

    if json {
        print_json(&serde_json::json!({ "migrated": true }))?;
    } else {
        println!("Migrations applied");
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_plan(plan: &ProductionPlan, policy: PlanPolicy) {
    println!(
        "Quantities truncated to {} decimals, values rounded to {} decimals",
        policy.quantity_scale, policy.value_scale
    );
    if plan.is_empty() {
        println!("Nothing can be produced with the current stock");
        println!("Total value: {}", plan.total_value);
        return;
    }

    println!(
        "{:<12} {:<30} {:>12} {:>12} {:>14}",
        "CODE", "NAME", "UNIT VALUE", "QUANTITY", "TOTAL"
    );
    for item in &plan.items {
        println!(
            "{:<12} {:<30} {:>12} {:>12} {:>14}",
            item.product_code, item.product_name, item.unit_value, item.quantity, item.total_value
        );
    }
    println!("Total value: {}", plan.total_value);
}
