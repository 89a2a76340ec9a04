//! JSON Lines writer for conformed tables.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::notice::DATE_FIELD;
use crate::schema::{Record, Table};

/// Name of the file written per output directory.
pub const OUTPUT_FILE_NAME: &str = "notices.jsonl";

/// Partition used for rows without a date.
const UNKNOWN_PARTITION: &str = "unknown";

/// Write every row as one JSON object per line.
///
/// Columns appear in table order; LIST values are arrays, SCALAR values are
/// strings and absent values are `null`.
///
/// # Returns
/// The number of lines written.
pub fn write_jsonl<W: Write>(table: &Table, writer: W) -> Result<usize> {
    write_rows(table.rows.iter(), writer)
}

fn write_rows<'a, W: Write>(rows: impl Iterator<Item = &'a Record>, writer: W) -> Result<usize> {
    let mut writer = BufWriter::new(writer);
    let mut count = 0;
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Save a table under `output_dir`.
///
/// Without partitioning everything goes to `<output_dir>/notices.jsonl`.
/// With partitioning rows are grouped by their `DATE` column into
/// `<output_dir>/date=<YYYYMMDD>/notices.jsonl`.
///
/// # Returns
/// The written file paths, sorted.
pub fn save_table(table: &Table, output_dir: &Path, partition_by_date: bool) -> Result<Vec<PathBuf>> {
    if !partition_by_date {
        let path = save_rows(table.rows.iter(), output_dir)?;
        return Ok(vec![path]);
    }

    let mut partitions: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for row in &table.rows {
        let date = row
            .get(DATE_FIELD)
            .and_then(|v| v.first())
            .filter(|d| !d.is_empty())
            .unwrap_or(UNKNOWN_PARTITION);
        partitions.entry(date.to_string()).or_default().push(row);
    }

    partitions
        .into_iter()
        .map(|(date, rows)| save_rows(rows.into_iter(), &output_dir.join(format!("date={date}"))))
        .collect()
}

/// Write rows to `<dir>/notices.jsonl` through a temporary file.
fn save_rows<'a>(rows: impl Iterator<Item = &'a Record>, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let output_file = dir.join(OUTPUT_FILE_NAME);
    let temp_file = dir.join(format!(".{OUTPUT_FILE_NAME}.tmp"));

    {
        let file = File::create(&temp_file)?;
        let count = write_rows(rows, &file)?;
        file.sync_all()?;
        tracing::debug!(path = %output_file.display(), records = count, "Wrote records");
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;

    Ok(output_file)
}
