use crate::config::Config;
use crate::database::Database;
use crate::repl::{Flow, Session};
use clap::{ArgAction, Parser};
use eyre::WrapErr;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{Level, info};

mod command;
mod config;
mod database;
mod display;
mod model;
mod repl;

#[derive(Parser)]
#[command(author, version, about)]
struct Options {
    /// Use FILE instead of hbtracker.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Database URL, overriding the configuration file
    #[arg(short, long, value_name = "URL")]
    database: Option<String>,
    /// Run COMMAND instead of prompting (can be repeated)
    #[arg(short, long, value_name = "COMMAND")]
    execute: Vec<String>,
    /// Set verbosity level
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let options = Options::parse();
    let level = match options.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    let mut config = match &options.config {
        Some(file_name) => Config::load(file_name)?,
        None => Config::load_default()?,
    };
    if let Some(url) = options.database {
        config.database.url = url;
    }
    let mut db = Database::connect(&config.database.url)
        .await
        .wrap_err("cannot connect to database")?;
    info!("connected to database");
    {
        let mut session = Session::new(&mut db, io::stdout());
        if options.execute.is_empty() && io::stdin().is_terminal() {
            let mut editor = DefaultEditor::new()?;
            session.run_editor(&mut editor, &config.repl.prompt).await?;
        } else if options.execute.is_empty() {
            session
                .run(BufReader::new(tokio::io::stdin()), &config.repl.prompt)
                .await?;
        } else {
            for line in &options.execute {
                if session.execute(line).await? == Flow::Quit {
                    break;
                }
            }
        }
    }
    db.close()
        .await
        .wrap_err("error when closing database connection")?;
    Ok(())
}
