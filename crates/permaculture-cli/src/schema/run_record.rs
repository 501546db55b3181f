use chrono::{DateTime, Utc};
use permaculture_engine::layout::GridSize;
use serde::{Deserialize, Serialize};

/// Result of one search run, as exported with `evolve --output`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunRecord {
    pub planned_at: DateTime<Utc>,
    pub seed: u64,
    pub generations: usize,
    pub population_size: usize,
    pub mutation_rate: f64,
    pub size: GridSize,
    pub score: f64,
    /// Winning layout, one row of type labels per grid row.
    pub grid: Vec<Vec<String>>,
}
