use crate::config::InputConfig;
use crate::error::Error;
use crate::series::{RawSeries, SeriesLabel};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};

/// One snapshot record: a label plus a delimiter-joined string of daily values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    pub label: String,
    pub values: String,
}

/// Maps record labels to column roles.
#[derive(Debug, Clone)]
pub struct LabelScheme {
    pub upper_band: Option<String>,
    pub lower_band: Option<String>,
    pub skip_labels: Vec<String>,
    pub delimiter: char,
}

impl LabelScheme {
    pub fn new(input: &InputConfig, upper_band: Option<String>, lower_band: Option<String>) -> Self {
        Self {
            upper_band,
            lower_band,
            skip_labels: input.skip_labels.clone(),
            delimiter: input.delimiter,
        }
    }

    /// Resolve a record label, `None` for labels that are skipped.
    pub fn resolve(&self, label: &str) -> Result<Option<SeriesLabel>, Error> {
        let label = label.trim();
        if self.upper_band.as_deref() == Some(label) {
            return Ok(Some(SeriesLabel::UpperBand));
        }
        if self.lower_band.as_deref() == Some(label) {
            return Ok(Some(SeriesLabel::LowerBand));
        }
        if self.skip_labels.iter().any(|skip| skip == label) {
            return Ok(None);
        }
        let year = label
            .parse()
            .map_err(|_| Error::malformed(label, "label is neither a year nor a known band"))?;
        Ok(Some(SeriesLabel::Year(year)))
    }

    /// Parse a record into a labeled series, `None` if it is skipped.
    pub fn parse_record(&self, record: &RawRecord) -> Result<Option<RawSeries>, Error> {
        let Some(label) = self.resolve(&record.label)? else {
            return Ok(None);
        };
        let values = parse_values(&record.values, self.delimiter)
            .map_err(|reason| Error::malformed(label, reason))?;
        Ok(Some(RawSeries::new(label, values)))
    }

    pub fn parse_records(&self, records: &[RawRecord]) -> Result<Vec<RawSeries>, Error> {
        let mut series = Vec::with_capacity(records.len());
        for record in records {
            match self.parse_record(record)? {
                Some(raw) => series.push(raw),
                None => log::warn!("skipped record {:?}", record.label),
            }
        }
        Ok(series)
    }
}

/// Split a delimiter-joined value string into daily values.
///
/// Empty, `NA`, `null` and `NaN` tokens are missing. An empty string is an
/// empty series.
pub fn parse_values(values: &str, delimiter: char) -> Result<Vec<Option<f64>>, String> {
    if values.trim().is_empty() {
        return Ok(Vec::new());
    }
    values
        .split(delimiter)
        .enumerate()
        .map(|(i_tok, token)| parse_token(token).map_err(|err| format!("token {}: {err}", i_tok + 1)))
        .collect()
}

fn parse_token(token: &str) -> Result<Option<f64>, String> {
    let token = token.trim();
    if token.is_empty()
        || token.eq_ignore_ascii_case("na")
        || token.eq_ignore_ascii_case("null")
        || token.eq_ignore_ascii_case("nan")
    {
        return Ok(None);
    }
    let val: f64 = token
        .parse()
        .map_err(|_| format!("{token:?} is not a number"))?;
    if !val.is_finite() {
        return Err(format!("{token:?} is not finite"));
    }
    Ok(Some(val))
}

/// Load the records of a snapshot file.
pub fn load_records<P: AsRef<Path>>(file: P) -> Result<Vec<RawRecord>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let reader = BufReader::new(file);
    let records = serde_json::from_reader(reader).context("failed to deserialize records")?;
    Ok(records)
}
