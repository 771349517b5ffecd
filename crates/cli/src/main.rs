mod commands;

use crate::commands::check::handle_check;
use crate::commands::compile::handle_compile;
use crate::commands::graph::handle_graph;
use clap::{Parser, Subcommand};
use defs_core::error::BuildError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "defc")]
pub struct Cli {
    #[arg(
        long = "project-path",
        short = 'p',
        help = "path to the directory containing platform-project.yml",
        global = true
    )]
    pub project_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Validate every configuration surface without emitting anything
    Check,
    /// Build the definitions bundle and print it as JSON
    Compile,
    /// Print the ELT resource lineage in DOT format
    Graph,
}

fn run_cmd(result: Result<(), BuildError>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main() {
    logging::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Cmd::Check => run_cmd(handle_check(cli.project_path)),
        Cmd::Compile => run_cmd(handle_compile(cli.project_path)),
        Cmd::Graph => run_cmd(handle_graph(cli.project_path)),
    }
}
