use clap::Parser;

/// Cardboard — a desktop-app starter with floating card windows.
#[derive(Parser, Debug)]
#[command(name = "cardboard", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// List available cards and exit.
    #[arg(long)]
    pub list_cards: bool,

    /// Open the given card(s) at startup (repeatable).
    #[arg(long = "open", value_name = "CARD_ID")]
    pub open: Vec<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
