pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "content-api")]
#[command(about = "Content API - posts, comments, albums and photos over HTTP")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides API_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Use the in-memory store instead of PostgreSQL")]
        memory: bool,
        #[arg(long, value_name = "USER:PASSWORD", help = "Create this user at startup")]
        seed_user: Option<String>,
    },

    #[command(about = "Create tables and indexes in the configured database")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Mint an access token for an existing user id")]
    Token {
        #[arg(help = "User id (token subject)")]
        user_id: i64,
        #[arg(help = "Username carried in the token")]
        username: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Serve { port, memory, seed_user } => {
            commands::serve::handle(config, port, memory, seed_user).await
        }
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::User { cmd } => commands::user::handle(config, cmd, output_format).await,
        Commands::Token { user_id, username } => {
            commands::token::handle(config, user_id, &username, output_format)
        }
    }
}
