use std::path::PathBuf;

use crate::data::GardenData;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TypesArg {
    /// Directory containing terrain.csv, light.csv, preferences.csv and neighbours.csv
    #[arg(long, default_value = "game")]
    data: PathBuf,
}

pub(crate) fn run(arg: &TypesArg) -> anyhow::Result<()> {
    let data = GardenData::load(&arg.data)?;

    println!(
        "Grid: {}x{} ({} cells)",
        data.size.width,
        data.size.height,
        data.size.len()
    );
    println!(
        "Maps: {}",
        data.maps.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
    );
    println!("Types:");
    for label in &data.types {
        let preferences = data.preferences[label]
            .iter()
            .map(|(map, value)| format!("{map}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {label}: {preferences}");
    }
    Ok(())
}
