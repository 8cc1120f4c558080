use crate::baseline::BaselineWindow;
use crate::input::LabelScheme;
use crate::series::SeriesLabel;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Analysis configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub bands: BandsConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Baseline window parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// First year of the baseline window (inclusive).
    pub first_year: i32,
    /// Last year of the baseline window (inclusive).
    pub last_year: i32,
}

/// Record labels of the supplementary bands.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct BandsConfig {
    pub upper: Option<String>,
    pub lower: Option<String>,
}

/// Snapshot input parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Snapshot file, relative to the run directory.
    pub file: String,
    /// Separator of the daily values in each record.
    pub delimiter: char,
    /// Record labels that are neither years nor bands and are dropped.
    pub skip_labels: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file: "series.json".to_string(),
            delimiter: ',',
            skip_labels: Vec::new(),
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.baseline.first_year, 1..10_000).context("invalid first baseline year")?;
        check_num(self.baseline.last_year, self.baseline.first_year..10_000)
            .context("invalid last baseline year")?;
        // The sample standard deviation needs at least two years.
        check_num(
            self.baseline.last_year - self.baseline.first_year + 1,
            2..1_000,
        )
        .context("invalid baseline window length")?;

        check_label(self.bands.upper.as_deref()).context("invalid upper band label")?;
        check_label(self.bands.lower.as_deref()).context("invalid lower band label")?;
        if self.bands.upper.is_some() && self.bands.upper == self.bands.lower {
            bail!("upper and lower band labels must differ");
        }

        if self.input.file.trim().is_empty() {
            bail!("input file must not be empty");
        }
        if self.input.delimiter.is_ascii_digit() || matches!(self.input.delimiter, '.' | '-' | '+') {
            bail!("delimiter {:?} clashes with numeric tokens", self.input.delimiter);
        }

        Ok(())
    }

    pub fn window(&self) -> BaselineWindow {
        BaselineWindow::span(self.baseline.first_year, self.baseline.last_year)
    }

    pub fn label_scheme(&self) -> LabelScheme {
        LabelScheme::new(&self.input, self.bands.upper.clone(), self.bands.lower.clone())
    }

    /// Band columns the snapshot must contain.
    pub fn required_bands(&self) -> Vec<SeriesLabel> {
        let mut bands = Vec::new();
        if self.bands.upper.is_some() {
            bands.push(SeriesLabel::UpperBand);
        }
        if self.bands.lower.is_some() {
            bands.push(SeriesLabel::LowerBand);
        }
        bands
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_label(label: Option<&str>) -> Result<()> {
    let Some(label) = label else {
        return Ok(());
    };
    if label.trim().is_empty() {
        bail!("label must not be empty");
    }
    if label.trim().parse::<i32>().is_ok() {
        bail!("label must not be a year, but is {label:?}");
    }
    Ok(())
}
