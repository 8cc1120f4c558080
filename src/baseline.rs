use crate::error::Error;
use crate::series::{N_DAYS, SeriesLabel, SeriesMatrix};
use crate::stats::Accumulator;
use rayon::prelude::*;
use serde::Serialize;

/// The years whose values define the baseline, in accumulation order.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineWindow {
    labels: Vec<SeriesLabel>,
}

impl BaselineWindow {
    /// Consecutive years `first_year..=last_year`.
    pub fn span(first_year: i32, last_year: i32) -> Self {
        Self::from_years(first_year..=last_year)
    }

    pub fn from_years<I: IntoIterator<Item = i32>>(years: I) -> Self {
        let labels = years.into_iter().map(SeriesLabel::Year).collect();
        Self { labels }
    }

    pub fn labels(&self) -> &[SeriesLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBaseline {
    pub mean: f64,
    /// Sample standard deviation (`n_vals - 1` denominator).
    pub std_dev: f64,
    pub n_vals: usize,
}

/// Baseline statistics for every day of the year.
///
/// Days with fewer than two baseline values hold
/// [`Error::InsufficientBaselineData`] instead of statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    days: Vec<Result<DayBaseline, Error>>,
}

/// One row of the per-day baseline table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineRecord {
    pub day: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub n_vals: usize,
    pub fault: Option<String>,
}

impl Baseline {
    /// Compute the baseline of `matrix` over `window`.
    ///
    /// # Errors
    /// Returns [`Error::MissingColumn`] if a window year has no column.
    pub fn compute(matrix: &SeriesMatrix, window: &BaselineWindow) -> Result<Self, Error> {
        matrix.require(window.labels())?;

        let columns: Vec<_> = window
            .labels()
            .iter()
            .filter_map(|label| matrix.column(label))
            .collect();

        let days = (0..N_DAYS)
            .into_par_iter()
            .map(|i_day| {
                let acc: Accumulator = columns.iter().map(|column| column[i_day]).collect();
                let report = acc.report();
                match report.std_dev {
                    Some(std_dev) => Ok(DayBaseline {
                        mean: report.mean,
                        std_dev,
                        n_vals: report.n_vals,
                    }),
                    None => Err(Error::InsufficientBaselineData {
                        day: i_day + 1,
                        n_vals: report.n_vals,
                    }),
                }
            })
            .collect();

        Ok(Self { days })
    }

    /// Statistics for `day` (1-based), `None` outside `1..=366`.
    pub fn day(&self, day: usize) -> Option<Result<&DayBaseline, &Error>> {
        let i_day = day.checked_sub(1)?;
        self.days.get(i_day).map(Result::as_ref)
    }

    pub fn faults(&self) -> impl Iterator<Item = &Error> + '_ {
        self.days.iter().filter_map(|day| day.as_ref().err())
    }

    pub fn records(&self) -> Vec<BaselineRecord> {
        self.days
            .iter()
            .enumerate()
            .map(|(i_day, day)| match day {
                Ok(stats) => BaselineRecord {
                    day: i_day + 1,
                    mean: Some(stats.mean),
                    std_dev: Some(stats.std_dev),
                    n_vals: stats.n_vals,
                    fault: None,
                },
                Err(err) => BaselineRecord {
                    day: i_day + 1,
                    mean: None,
                    std_dev: None,
                    n_vals: match err {
                        Error::InsufficientBaselineData { n_vals, .. } => *n_vals,
                        _ => 0,
                    },
                    fault: Some(err.to_string()),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::RawSeries;
    use rand::{SeedableRng, seq::SliceRandom};
    use rand_chacha::ChaCha12Rng;

    /// Year `first + i` gets `vals[i]` on every day.
    fn constant_years(first: i32, vals: &[f64]) -> Vec<RawSeries> {
        vals.iter()
            .enumerate()
            .map(|(i, &val)| RawSeries::new(SeriesLabel::Year(first + i as i32), vec![Some(val); N_DAYS]))
            .collect()
    }

    #[test]
    fn day_45_scenario() {
        let mut series = constant_years(1991, &[20.0, 20.0, 20.0, 21.0, 19.0]);
        series.push(RawSeries::new(SeriesLabel::Year(2024), vec![Some(21.0); N_DAYS]));
        let matrix = SeriesMatrix::build(series).unwrap();

        let baseline = Baseline::compute(&matrix, &BaselineWindow::span(1991, 1995)).unwrap();
        let day = baseline.day(45).unwrap().unwrap();
        assert_eq!(day.n_vals, 5);
        assert_eq!(day.mean, 20.0);
        assert!((day.std_dev - 0.7071).abs() < 1e-4);
    }

    #[test]
    fn excludes_bands_and_years_outside_window() {
        let mut series = constant_years(2000, &[1.0, 3.0, 100.0]);
        series.push(RawSeries::new(SeriesLabel::UpperBand, vec![Some(50.0); N_DAYS]));
        series.push(RawSeries::new(SeriesLabel::LowerBand, vec![Some(-50.0); N_DAYS]));
        let matrix = SeriesMatrix::build(series).unwrap();

        let baseline = Baseline::compute(&matrix, &BaselineWindow::span(2000, 2001)).unwrap();
        let day = baseline.day(1).unwrap().unwrap();
        assert_eq!(day.n_vals, 2);
        assert_eq!(day.mean, 2.0);
        assert_eq!(baseline.faults().count(), 0);
    }

    #[test]
    fn missing_values_are_ignored() {
        let mut vals_a = vec![Some(1.0); N_DAYS];
        vals_a[9] = None;
        let matrix = SeriesMatrix::build(vec![
            RawSeries::new(SeriesLabel::Year(2000), vals_a),
            RawSeries::new(SeriesLabel::Year(2001), vec![Some(2.0); N_DAYS]),
            RawSeries::new(SeriesLabel::Year(2002), vec![Some(4.0); N_DAYS]),
        ])
        .unwrap();

        let baseline = Baseline::compute(&matrix, &BaselineWindow::span(2000, 2002)).unwrap();
        let day_10 = baseline.day(10).unwrap().unwrap();
        assert_eq!(day_10.n_vals, 2);
        assert_eq!(day_10.mean, 3.0);
        let day_11 = baseline.day(11).unwrap().unwrap();
        assert_eq!(day_11.n_vals, 3);
    }

    #[test]
    fn one_value_is_insufficient() {
        // Only the leap year 2000 has a day 366.
        let matrix = SeriesMatrix::build(vec![
            RawSeries::new(SeriesLabel::Year(2000), vec![Some(1.0); N_DAYS]),
            RawSeries::new(SeriesLabel::Year(2001), vec![Some(2.0); N_DAYS - 1]),
        ])
        .unwrap();

        let baseline = Baseline::compute(&matrix, &BaselineWindow::span(2000, 2001)).unwrap();
        assert!(matches!(baseline.day(365), Some(Ok(_))));
        assert_eq!(
            baseline.day(366),
            Some(Err(&Error::InsufficientBaselineData { day: 366, n_vals: 1 }))
        );
        assert_eq!(baseline.faults().count(), 1);

        let records = baseline.records();
        assert_eq!(records.len(), N_DAYS);
        assert_eq!(records[365].mean, None);
        assert_eq!(records[365].n_vals, 1);
        assert!(records[365].fault.is_some());
    }

    #[test]
    fn days_outside_the_year_are_none() {
        let matrix = SeriesMatrix::build(constant_years(2000, &[1.0, 2.0])).unwrap();
        let baseline = Baseline::compute(&matrix, &BaselineWindow::span(2000, 2001)).unwrap();
        assert_eq!(baseline.day(0), None);
        assert_eq!(baseline.day(N_DAYS + 1), None);
        assert!(baseline.day(N_DAYS).is_some());
    }

    #[test]
    fn absent_window_year_aborts() {
        let matrix = SeriesMatrix::build(constant_years(2000, &[1.0, 2.0])).unwrap();
        let err = Baseline::compute(&matrix, &BaselineWindow::span(1999, 2001)).unwrap_err();
        assert_eq!(
            err,
            Error::MissingColumn {
                label: "1999".to_string()
            }
        );
    }

    #[test]
    fn window_is_fixed_when_years_are_appended() {
        let window = BaselineWindow::span(2000, 2002);
        let short = SeriesMatrix::build(constant_years(2000, &[1.0, 2.0, 3.0])).unwrap();
        let long = SeriesMatrix::build(constant_years(2000, &[1.0, 2.0, 3.0, 40.0, 50.0])).unwrap();

        let baseline_short = Baseline::compute(&short, &window).unwrap();
        let baseline_long = Baseline::compute(&long, &window).unwrap();
        assert_eq!(baseline_short.day(1), baseline_long.day(1));
    }

    #[test]
    fn statistics_do_not_depend_on_window_order() {
        let vals = [12.3, 11.8, 13.1, 12.9, 10.4, 11.1, 12.0, 13.7, 9.9, 12.6];
        let matrix = SeriesMatrix::build(constant_years(1981, &vals)).unwrap();

        let mut years: Vec<i32> = (1981..1991).collect();
        let reference = Baseline::compute(&matrix, &BaselineWindow::from_years(years.clone())).unwrap();
        let reference = *reference.day(100).unwrap().unwrap();

        let mut rng = ChaCha12Rng::seed_from_u64(42);
        for _ in 0..8 {
            years.shuffle(&mut rng);
            let baseline = Baseline::compute(&matrix, &BaselineWindow::from_years(years.clone())).unwrap();
            let day = baseline.day(100).unwrap().unwrap();
            assert_eq!(day.n_vals, reference.n_vals);
            assert!((day.mean - reference.mean).abs() < 1e-12);
            assert!((day.std_dev - reference.std_dev).abs() < 1e-12);
        }
    }

    #[test]
    fn recomputation_is_reproducible() {
        let vals = [0.1, 0.7, 0.3, 0.9, 0.2];
        let matrix = SeriesMatrix::build(constant_years(2010, &vals)).unwrap();
        let window = BaselineWindow::span(2010, 2014);
        let first = Baseline::compute(&matrix, &window).unwrap();
        let second = Baseline::compute(&matrix, &window).unwrap();
        assert_eq!(first, second);
    }
}
