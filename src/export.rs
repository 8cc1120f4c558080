use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs::File, io::Write, path::Path};

/// Write `records` as CSV with a header row to `writer`.
///
/// Missing values become empty fields.
pub fn write_records<W, T>(writer: W, records: &[T]) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record).context("failed to serialize record")?;
    }
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

pub fn save_records<P, T>(file: P, records: &[T]) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let file = file.as_ref();
    let out = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    write_records(out, records).with_context(|| format!("failed to write {file:?}"))?;
    log::info!("wrote {} records to {file:?}", records.len());
    Ok(())
}
