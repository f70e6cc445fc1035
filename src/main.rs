use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;

use daily_affirmations::{callback_handler, command_handler, import_csv, BotState, Command, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env may carry RUST_LOG, so load it before the logger reads it.
    let env_file = dotenvy::dotenv();
    pretty_env_logger::init();
    if let Err(e) = env_file {
        log::debug!("No .env file loaded: {}", e);
    }

    let config = Config::from_env();
    log::info!("Starting daily affirmations bot...");
    log::info!("Using data directory {}", config.data_dir.display());

    // Initialize bot with token from environment
    let bot = Bot::from_env();

    let state = BotState::initialize(config).await?;

    if let Some(path) = state.config.import_csv.clone() {
        match import_csv(&state.store, &path).await {
            Ok(summary) => log::info!(
                "Imported {} categories and {} affirmations from {}",
                summary.categories_count,
                summary.affirmations_count,
                path.display()
            ),
            Err(e) => log::error!("Failed to import {}: {}. Continuing with stored data.", path.display(), e),
        }
    }

    let categories = state.engine.categories().await?;
    log::info!("Loaded {} affirmation categories", categories.len());
    log::info!("Loaded {} affirmations", state.store.affirmation_count().await?);

    let state = Arc::new(state);

    let handler = dptree::entry()
        .branch(Update::filter_message().filter_command::<Command>().endpoint(
            |bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>| async move {
                command_handler(bot, msg, cmd, state).await
            },
        ))
        .branch(callback_handler(state.clone()));

    log::info!("Starting command dispatching...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
