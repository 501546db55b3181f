//! Loading garden data from a directory of CSV files.
//!
//! A data directory contains:
//!
//! - `terrain.csv`, `light.csv` - environmental maps, one grid row per line, no header
//! - `preferences.csv` - header `type,<map>...`; the required value of each map per type
//! - `neighbours.csv` - header `type,<type>...`; affinity from the row's type to the
//!   column's type
//!
//! The set of types is taken from `preferences.csv`, in file order.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, bail, ensure};
use permaculture_engine::{fitness::FitnessModel, layout, layout::GridSize};

/// Environmental maps read from the data directory, by name.
pub(crate) const MAP_NAMES: [&str; 2] = ["terrain", "light"];

const TYPE_COLUMN: &str = "type";

/// Garden data in the flat form consumed by the search engine.
#[derive(Debug, Clone)]
pub(crate) struct GardenData {
    pub(crate) size: GridSize,
    pub(crate) types: Vec<String>,
    pub(crate) maps: BTreeMap<String, Vec<String>>,
    pub(crate) preferences: BTreeMap<String, BTreeMap<String, String>>,
    pub(crate) affinity: BTreeMap<String, BTreeMap<String, f64>>,
}

impl GardenData {
    pub(crate) fn load(dir: &Path) -> anyhow::Result<Self> {
        let mut size = None;
        let mut maps = BTreeMap::new();
        for name in MAP_NAMES {
            let path = dir.join(format!("{name}.csv"));
            let matrix = load_matrix(&path)?;
            let matrix_size = matrix_size(&matrix)
                .with_context(|| format!("Map file is empty: {}", path.display()))?;
            let expected = *size.get_or_insert(matrix_size);
            ensure!(
                matrix_size == expected,
                "Map {} is {}x{} but the grid is {}x{}",
                path.display(),
                matrix_size.width,
                matrix_size.height,
                expected.width,
                expected.height,
            );
            maps.insert(name.to_owned(), layout::flatten(&matrix));
        }
        let Some(size) = size else {
            bail!("No environmental maps configured");
        };

        let (types, preferences) = group_by_type(load_objects(&dir.join("preferences.csv"))?);
        ensure!(!types.is_empty(), "No types defined in preferences.csv");

        let path = dir.join("neighbours.csv");
        let (_, affinity) = group_by_type(load_objects(&path)?);
        let affinity = parse_affinity(affinity)
            .with_context(|| format!("Failed to read affinities from {}", path.display()))?;

        log::debug!(
            "loaded {}x{} grid with {} types from {}",
            size.width,
            size.height,
            types.len(),
            dir.display(),
        );

        Ok(Self {
            size,
            types,
            maps,
            preferences,
            affinity,
        })
    }

    pub(crate) fn fitness_model(&self) -> FitnessModel {
        FitnessModel {
            width: self.size.width,
            maps: self.maps.clone(),
            preferences: self.preferences.clone(),
            affinity: self.affinity.clone(),
        }
    }
}

/// Reads a headerless CSV file as rows of cells.
///
/// All rows must have the same number of cells.
pub(crate) fn load_matrix(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .records()
        .map(|record| -> anyhow::Result<Vec<String>> {
            let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(record.iter().map(str::to_owned).collect())
        })
        .collect()
}

/// Reads a CSV file with a `type` column as `(type, {column → value})` rows.
///
/// The `type` column itself is not included in the row values.
pub(crate) fn load_objects(path: &Path) -> anyhow::Result<Vec<(String, BTreeMap<String, String>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();
    let Some(type_index) = headers.iter().position(|h| h == TYPE_COLUMN) else {
        bail!("Missing '{TYPE_COLUMN}' column in {}", path.display());
    };

    reader
        .records()
        .map(|record| -> anyhow::Result<(String, BTreeMap<String, String>)> {
            let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
            let label = record[type_index].to_owned();
            let values = headers
                .iter()
                .zip(&record)
                .enumerate()
                .filter(|(i, _)| *i != type_index)
                .map(|(_, (header, value))| (header.to_owned(), value.to_owned()))
                .collect();
            Ok((label, values))
        })
        .collect()
}

/// Groups rows by type, keeping the order in which types first appear.
///
/// When a type appears more than once, the last row wins.
pub(crate) fn group_by_type<V>(rows: Vec<(String, V)>) -> (Vec<String>, BTreeMap<String, V>) {
    let mut order = vec![];
    let mut grouped = BTreeMap::new();
    for (label, value) in rows {
        if grouped.insert(label.clone(), value).is_none() {
            order.push(label);
        }
    }
    (order, grouped)
}

fn parse_affinity(
    rows: BTreeMap<String, BTreeMap<String, String>>,
) -> anyhow::Result<BTreeMap<String, BTreeMap<String, f64>>> {
    rows.into_iter()
        .map(|(from, row)| -> anyhow::Result<(String, BTreeMap<String, f64>)> {
            let row = row
                .into_iter()
                .map(|(to, value)| -> anyhow::Result<(String, f64)> {
                    let parsed = value
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .with_context(|| {
                            format!("Invalid affinity '{value}' from '{from}' to '{to}'")
                        })?;
                    Ok((to, parsed))
                })
                .collect::<anyhow::Result<_>>()?;
            Ok((from, row))
        })
        .collect()
}

fn matrix_size(matrix: &[Vec<String>]) -> Option<GridSize> {
    let width = matrix.first()?.len();
    (width > 0).then(|| GridSize::new(width, matrix.len()))
}

/// Reads a grid of type labels (a planting plan) and checks it against `size`.
pub(crate) fn load_plan(path: &Path, size: GridSize) -> anyhow::Result<Vec<String>> {
    let matrix = load_matrix(path)?;
    ensure!(
        matrix_size(&matrix) == Some(size),
        "Plan {} does not match the {}x{} grid",
        path.display(),
        size.width,
        size.height,
    );
    Ok(layout::flatten(&matrix))
}
