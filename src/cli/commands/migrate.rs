use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database).await?;
    DatabaseManager::migrate(&pool).await?;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": true, "migrated": true })),
        OutputFormat::Text => println!("Migrations applied"),
    }
    Ok(())
}
