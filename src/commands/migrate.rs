//! Database migration command.

use sharegate_core::config::AppConfig;
use sharegate_core::error::AppError;
use sharegate_database::{DatabasePool, migration};

use crate::output;

/// Apply pending migrations
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    migration::run_migrations(pool.pool()).await?;
    output::print_success("Migrations applied");
    Ok(())
}
