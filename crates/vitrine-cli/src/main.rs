use anyhow::Context;
use clap::{Parser, Subcommand};

use vitrine_nuvemshop::{AppCredentials, NuvemshopClient, StoreCredentials};

#[derive(Debug, Parser)]
#[command(name = "vitrine-cli")]
#[command(about = "Vitrine command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one catalog page and print the normalized products as JSON.
    Products {
        #[arg(long, default_value = "1")]
        page: String,
        #[arg(long = "per-page", default_value = "30")]
        per_page: String,
    },
    /// Exchange an OAuth authorization code for an access token.
    Token {
        #[arg(long)]
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = vitrine_core::load_app_config_from_env()?;
    let client = NuvemshopClient::with_base_urls(
        config.request_timeout_secs,
        &config.user_agent,
        &config.api_base_url,
        &config.token_url,
    )?;

    match cli.command {
        Commands::Products { page, per_page } => {
            let store = StoreCredentials {
                store_id: config
                    .store_id
                    .context("NUVEMSHOP_USER_ID must be set")?,
                access_token: config
                    .access_token
                    .context("NUVEMSHOP_ACCESS_TOKEN must be set")?,
            };

            let raw = client.list_products(&store, &page, &per_page).await?;
            let products = vitrine_nuvemshop::normalize_products(raw);
            let in_stock = products.iter().filter(|p| p.in_stock()).count();
            tracing::info!(
                count = products.len(),
                in_stock,
                page = %page,
                "fetched catalog page"
            );
            println!("{}", serde_json::to_string_pretty(&products)?);
        }
        Commands::Token { code } => {
            let app = AppCredentials {
                client_id: config.app_id.context("NUVEMSHOP_APP_ID must be set")?,
                client_secret: config
                    .client_secret
                    .context("NUVEMSHOP_CLIENT_SECRET must be set")?,
                redirect_uri: config
                    .redirect_uri
                    .context("NUVEMSHOP_REDIRECT_URI must be set")?,
            };

            let grant = client.exchange_code(&app, &code).await?;
            println!("{}", serde_json::to_string_pretty(&grant)?);
        }
    }

    Ok(())
}
