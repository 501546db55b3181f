use std::path::PathBuf;

use chrono::Utc;
use permaculture_engine::{fitness::Scorer, genetic::Evolver, layout, stats::FitnessStats};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::{data::GardenData, render, schema::run_record::RunRecord, util::Output};

const GENERATIONS: usize = 10_000;
const POPULATION_COUNT: usize = 100;
const MUTATION_RATE: f64 = 0.05;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolveArg {
    /// Directory containing terrain.csv, light.csv, preferences.csv and neighbours.csv
    #[arg(long, default_value = "game")]
    data: PathBuf,
    /// Number of generations to run
    #[arg(long, default_value_t = GENERATIONS)]
    generations: usize,
    /// Number of individuals per generation
    #[arg(long, default_value_t = POPULATION_COUNT)]
    population: usize,
    /// Probability of replacing each cell of an offspring
    #[arg(long, default_value_t = MUTATION_RATE)]
    mutation_rate: f64,
    /// Random seed (drawn from the OS when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Print the run record as JSON instead of the text grid
    #[arg(long)]
    json: bool,
    /// Write the run record as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvolveArg) -> anyhow::Result<()> {
    let EvolveArg {
        data,
        generations,
        population,
        mutation_rate,
        seed,
        json,
        output,
    } = arg;

    let data = GardenData::load(data)?;
    let scorer = Scorer::new(data.fitness_model())?;
    let evolver = Evolver {
        generations: *generations,
        population_size: *population,
        mutation_rate: *mutation_rate,
    };

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64::seed_from_u64(seed);
    eprintln!(
        "Evolving {}x{} grid with {} types (seed {seed})",
        data.size.width,
        data.size.height,
        data.types.len()
    );

    let mut top_score = f64::NEG_INFINITY;
    let population = evolver.evolve(
        &data.types,
        data.size.len(),
        &scorer,
        &mut rng,
        |progress| {
            let score = progress.best().fitness();
            if score > top_score {
                eprintln!("Best score: {score} (generation #{})", progress.generation);
                top_score = score;
            }
        },
    )?;

    let best = population.best();
    let grid = layout::refold(best.candidate(), data.size.height, data.size.width)?;

    eprintln!(
        "{}",
        run_summary(population.fitness_stats(), scorer.evaluations())
    );

    let record = RunRecord {
        planned_at: Utc::now(),
        seed,
        generations: evolver.generations,
        population_size: evolver.population_size,
        mutation_rate: evolver.mutation_rate,
        size: data.size,
        score: best.fitness(),
        grid,
    };

    if *json {
        Output::save_json(&record, output.clone())?;
    } else {
        println!("Winning score: {}", record.score);
        println!("{}", render::render_rows(&record.grid));
        if let Some(path) = output {
            Output::save_json(&record, Some(path.clone()))?;
            eprintln!("Run record saved to {}", path.display());
        }
    }

    Ok(())
}

fn run_summary(stats: Option<FitnessStats>, evaluations: usize) -> String {
    let mut lines = vec![];
    if let Some(stats) = stats {
        lines.push("Final population:".to_owned());
        lines.push(format!("  Min:     {:.3}", stats.min));
        lines.push(format!("  Max:     {:.3}", stats.max));
        lines.push(format!("  Mean:    {:.3}", stats.mean));
        lines.push(format!("  Median:  {:.3}", stats.median));
        lines.push(format!("  Std dev: {:.3}", stats.std_dev));
    }
    lines.push(format!("Evaluated {evaluations} distinct layouts"));
    lines.join("\n")
}
