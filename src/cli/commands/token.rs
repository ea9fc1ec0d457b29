//! Development stand-in for the external identity provider.

use clap::Args;
use serde_json::json;

use crate::auth::generate_jwt;
use crate::cli::{auth_settings, OutputFormat};
use crate::config::config;
use crate::database::models::{new_id, NewUser};
use crate::database::{DatabaseManager, PgStorage, Storage};
use crate::types::Role;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id (token subject); a new id is generated when omitted")]
    pub user_id: Option<String>,

    #[arg(long, value_parser = parse_role, default_value = "parent", help = "admin, teacher or parent")]
    pub role: Role,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse()
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let auth = auth_settings(config)?;

    let pool = DatabaseManager::connect(&config.database).await?;
    let storage = PgStorage::new(pool);

    let user_id = args.user_id.unwrap_or_else(new_id);
    let user = storage
        .upsert_user(
            &user_id,
            NewUser {
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
                profile_image_url: None,
                role: args.role,
            },
        )
        .await?;

    let token = generate_jwt(&user.id, &auth)?;
    tracing::debug!("Issued token for {} ({})", user.id, user.role);

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "userId": user.id,
                "role": user.role,
                "expiresInHours": auth.expiry_hours,
                "token": token,
            })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
