use crate::baseline::Baseline;
use crate::config::Config;
use crate::export::save_records;
use crate::input::load_records;
use crate::metrics::{MetricMatrix, Transform};
use crate::series::{N_DAYS, SeriesLabel, SeriesMatrix};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    run_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(run_dir: P) -> Result<Self> {
        let run_dir = run_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(run_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { run_dir, cfg })
    }

    /// Build the series matrix from the snapshot named in the config.
    pub fn load_matrix(&self) -> Result<SeriesMatrix> {
        let input_file = self.run_dir.join(&self.cfg.input.file);
        let records = load_records(&input_file)
            .with_context(|| format!("failed to load {input_file:?}"))?;
        log::info!("loaded {} records from {input_file:?}", records.len());

        let series = self
            .cfg
            .label_scheme()
            .parse_records(&records)
            .context("failed to parse records")?;
        let matrix = SeriesMatrix::build(series).context("failed to build series matrix")?;

        matrix
            .require(self.cfg.window().labels())
            .context("snapshot lacks a baseline year")?;
        matrix
            .require(&self.cfg.required_bands())
            .context("snapshot lacks a configured band")?;

        Ok(matrix)
    }

    pub fn run_analysis(&self) -> Result<()> {
        let matrix = self.load_matrix()?;
        log::info!(
            "built series matrix with {} columns ({} bands)",
            matrix.n_columns(),
            matrix.bands().count()
        );

        let window = self.cfg.window();
        let baseline = Baseline::compute(&matrix, &window).context("failed to compute baseline")?;
        log::info!("computed baseline over {} years", window.len());
        for fault in baseline.faults() {
            log::warn!("{fault}");
        }

        save_records(self.results_file("raw"), &matrix.long_records())
            .context("failed to save raw series")?;
        save_records(self.results_file("baseline"), &baseline.records())
            .context("failed to save baseline")?;

        for transform in [Transform::Sigma, Transform::Anomaly] {
            let metric = MetricMatrix::derive(&matrix, &baseline, transform);
            let n_faults = metric.faults().len();
            if n_faults > 0 {
                log::warn!("{transform} is missing on {n_faults} days");
            }
            for fault in metric.faults().values() {
                log::debug!("{transform}: {fault}");
            }
            log_latest(&matrix, &metric);

            save_records(self.results_file(&transform.to_string()), &metric.long_records())
                .with_context(|| format!("failed to save {transform} series"))?;
        }

        Ok(())
    }

    pub fn clean_results(&self) -> Result<()> {
        let pattern = self.run_dir.join("results-*.csv");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        for file in glob(pattern)
            .context("failed to glob results files")?
            .filter_map(Result::ok)
        {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    fn results_file(&self, kind: &str) -> PathBuf {
        self.run_dir.join(format!("results-{kind}.csv"))
    }
}

/// Log the most recent derived value of the latest year.
fn log_latest(matrix: &SeriesMatrix, metric: &MetricMatrix) {
    let Some(year) = metric.years().last() else {
        return;
    };
    let latest = (1..=N_DAYS)
        .rev()
        .find_map(|day| metric.value(day, year).map(|val| (day, val)));
    if let Some((day, val)) = latest {
        let raw = matrix.value(day, &SeriesLabel::Year(year));
        let transform = metric.transform();
        log::info!("latest {transform} of {year} on day {day}: {val} (raw {raw:?})");
    }
}
