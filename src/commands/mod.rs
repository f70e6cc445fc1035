use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Show today's affirmation")]
    Affirmation,
    #[command(description = "Choose affirmation categories")]
    Categories,
    #[command(description = "Set display language, e.g. /language es")]
    Language(String),
    #[command(description = "Show your affirmation preferences")]
    Preferences,
    #[command(description = "Show help message")]
    Help,
}
