pub mod cli;
pub mod history;
pub mod locale;
pub mod models;
pub mod server;
pub mod title;

use cli::Args;
use log::info;
use std::error::Error;
use std::sync::Arc;
use title::generator::{ HttpTitleGenerator, TitleGenerator };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("AI Backend URL: {}", args.ai_base_url);
    info!("Conversation Store Type: {}", args.history_type);
    info!("Conversation Store Host: {}", args.history_host);
    info!("-------------------------");

    let store = history::initialize_conversation_store(&args)?;
    let titles: Arc<dyn TitleGenerator> = Arc::new(HttpTitleGenerator::from_config(&args));

    server::run_server(args.server_addr.clone(), store, titles).await
}
