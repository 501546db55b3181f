use clap::{Parser, Subcommand};

use self::{evolve::EvolveArg, score::ScoreArg, types::TypesArg};

mod evolve;
mod score;
mod types;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Search for a planting layout using a genetic algorithm
    Evolve(#[clap(flatten)] EvolveArg),
    /// Score an existing planting layout
    Score(#[clap(flatten)] ScoreArg),
    /// Show the grid size, maps and types of a data directory
    Types(#[clap(flatten)] TypesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evolve(arg) => evolve::run(&arg)?,
        Mode::Score(arg) => score::run(&arg)?,
        Mode::Types(arg) => types::run(&arg)?,
    }
    Ok(())
}
