mod recommend;
mod select;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefront_campaign::ResponseMode;
use tracing_subscriber::EnvFilter;

use crate::select::OptionArg;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront selection and campaign tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch campaign placements through a shared batching orchestrator.
    Recommend {
        /// Placement id; repeat for several placements.
        #[arg(long = "placement", required = true)]
        placements: Vec<String>,
        #[arg(long, default_value = "html")]
        mode: ResponseMode,
        #[arg(long)]
        product: Option<String>,
        #[arg(long, requires = "product")]
        variant: Option<String>,
    },
    /// Resolve a SKU from option-group choices against an inline SKU table.
    Select {
        /// JSON file holding an array of `{id, price, listPrice, image, altImage}`.
        #[arg(long)]
        skus: PathBuf,
        /// `GROUP=ID,ID,...`; repeat once per option group.
        #[arg(long = "option", value_parser = select::parse_option_arg)]
        options: Vec<OptionArg>,
        /// Add the resolved SKU to the cart at `STOREFRONT_SHOP_URL`.
        #[arg(long)]
        add_to_cart: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            placements,
            mode,
            product,
            variant,
        } => {
            let config = storefront_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            tracing::debug!(?config, "configuration loaded");
            recommend::run(
                &config,
                &placements,
                mode,
                product.as_deref(),
                variant.as_deref(),
            )
            .await
        }
        Commands::Select {
            skus,
            options,
            add_to_cart,
        } => {
            let config = if add_to_cart {
                Some(storefront_core::load_app_config()?)
            } else {
                None
            };
            init_tracing(config.as_ref().map_or("info", |c| c.log_level.as_str()))?;
            let cart = config.as_ref().map(select::cart_client).transpose()?;
            let raw = std::fs::read_to_string(&skus)?;
            let report = select::run(&raw, &options, cart.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
