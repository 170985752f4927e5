// src/main.rs

mod api;
mod models;
mod session;

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use url::Url;

use crate::{api::ApiClient, session::Session};

#[derive(Debug, Parser)]
#[command(name = "quiz", about = "Take quizzes from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start an interactive quiz session.
    Start(Start),
}

#[derive(Debug, Parser)]
struct Start {
    /// Base URL of the quiz server.
    #[arg(long, env = "API_URL", default_value = "http://localhost:8080")]
    api_url: Url,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start(opt) => start(opt).await,
    }
}

async fn start(opt: Start) -> Result<()> {
    if opt.debug {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(io::stderr)
            .init();
    }
    tracing::debug!(api_url = %opt.api_url, "Starting session");

    let client = ApiClient::new(opt.api_url)?;
    let stdin = io::stdin().lock();
    let color = !opt.no_color && io::stdout().is_terminal();
    Session::new(client, stdin, io::stdout())
        .colored(color)
        .run()
        .await
}
