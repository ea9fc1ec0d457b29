use school_api::cli::{self, commands::serve::ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and JWT_SECRET are picked up
    let _ = dotenvy::dotenv();

    let config = school_api::config::config();
    cli::init_tracing(config);

    cli::commands::serve::handle(ServeArgs::default()).await
}
