use std::path::{Path, PathBuf};

use anyhow::ensure;
use permaculture_engine::{fitness::Scorer, layout, layout::GridSize};

use crate::{
    data::{self, GardenData},
    schema::run_record::RunRecord,
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ScoreArg {
    /// Directory containing terrain.csv, light.csv, preferences.csv and neighbours.csv
    #[arg(long, default_value = "game")]
    data: PathBuf,
    /// Layout to score, as a CSV grid of type labels
    #[arg(long, required_unless_present = "record", conflicts_with = "record")]
    plan: Option<PathBuf>,
    /// Layout to score, as a run record written by `evolve --output`
    #[arg(long)]
    record: Option<PathBuf>,
}

pub(crate) fn run(arg: &ScoreArg) -> anyhow::Result<()> {
    let ScoreArg { data, plan, record } = arg;
    let data = GardenData::load(data)?;

    let candidate = match (plan, record) {
        (Some(path), _) => data::load_plan(path, data.size)?,
        (None, Some(path)) => load_record(path, data.size)?,
        (None, None) => unreachable!("clap requires --plan or --record"),
    };

    let scorer = Scorer::new(data.fitness_model())?;
    let breakdown = scorer.breakdown(&candidate)?;

    println!("Diversity:   {:.3}", breakdown.diversity);
    println!("Environment: {:.3}", breakdown.environment);
    println!("Neighbor:    {:.3}", breakdown.neighbor);
    println!("Total:       {:.3}", breakdown.total());
    Ok(())
}

/// Reads a run record and flattens its grid, checking it against `size`.
fn load_record(path: &Path, size: GridSize) -> anyhow::Result<Vec<String>> {
    let record: RunRecord = util::read_json_file("run record", path)?;
    ensure!(
        record.size == size,
        "Run record grid is {}x{} but the data grid is {}x{}",
        record.size.width,
        record.size.height,
        size.width,
        size.height,
    );
    Ok(layout::flatten(&record.grid))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::util::Output;

    fn save_record(path: &Path) {
        let record = RunRecord {
            planned_at: Utc::now(),
            seed: 7,
            generations: 10,
            population_size: 4,
            mutation_rate: 0.05,
            size: GridSize::new(2, 2),
            score: 9.0,
            grid: vec![
                vec!["bean".to_owned(), "corn".to_owned()],
                vec!["corn".to_owned(), "bean".to_owned()],
            ],
        };
        Output::save_json(&record, Some(path.to_path_buf())).unwrap();
    }

    #[test]
    fn test_saved_record_loads_as_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        save_record(&path);
        let candidate = load_record(&path, GridSize::new(2, 2)).unwrap();
        assert_eq!(candidate, vec!["bean", "corn", "corn", "bean"]);
    }

    #[test]
    fn test_record_for_other_grid_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        save_record(&path);
        let err = load_record(&path, GridSize::new(4, 1)).unwrap_err();
        assert!(err.to_string().contains("but the data grid is 4x1"), "{err}");
    }

    #[test]
    fn test_missing_record_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_record(&dir.path().join("absent.json"), GridSize::new(2, 2)).unwrap_err();
        assert!(err.to_string().contains("Failed to open run record"), "{err}");
    }
}
