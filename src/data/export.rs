use std::io::Write;

use anyhow::{Context, Result};

use super::model::Boat;

/// Write listings as CSV (header row + one row per listing) using the
/// backend column names, so the file can be opened again as a snapshot.
pub fn export_csv<'a, W: Write>(
    boats: impl IntoIterator<Item = &'a Boat>,
    writer: W,
) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut count = 0;
    for boat in boats {
        csv_writer
            .serialize(boat)
            .with_context(|| format!("writing listing {}", boat.id))?;
        count += 1;
    }
    csv_writer.flush().context("flushing CSV output")?;
    Ok(count)
}
