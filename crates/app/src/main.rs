//! `lesson`: run Hebrew reading lessons in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use storage::seed::DEFAULT_SKILL;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod render;

#[derive(Parser)]
#[command(name = "lesson", version, about = "Hebrew reading lessons in the terminal")]
struct Cli {
    /// Curriculum bundle (JSON); the built-in curriculum is used when unset
    #[arg(long, global = true, env = "LESSON_CURRICULUM")]
    curriculum: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work through a skill: learn, practice, then test
    Run {
        /// Skill to open
        #[arg(long, env = "LESSON_SKILL", default_value = DEFAULT_SKILL)]
        skill: String,

        /// Correct answers needed to pass the test
        #[arg(long, env = "LESSON_PASS_MARK")]
        pass_mark: Option<u32>,

        /// Hide the keep-practicing option after practice
        #[arg(long)]
        no_keep_practicing: bool,
    },

    /// List levels and skills with their status
    Skills,

    /// Validate a curriculum bundle
    Validate,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let curriculum = cli.curriculum.as_deref();

    let result = match cli.command {
        Commands::Run {
            skill,
            pass_mark,
            no_keep_practicing,
        } => commands::run::execute(curriculum, &skill, pass_mark, !no_keep_practicing).await,
        Commands::Skills => commands::skills::execute(curriculum).await,
        Commands::Validate => commands::validate::execute(curriculum).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
