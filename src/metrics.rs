use crate::baseline::{Baseline, DayBaseline};
use crate::error::Error;
use crate::series::{self, LongRecord, N_DAYS, SeriesLabel, SeriesMatrix};
use crate::stats::round_to;
use rayon::prelude::*;
use std::{collections::BTreeMap, fmt};

/// Decimal places kept in derived values.
pub const DECIMALS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// `round(v - mean) / std_dev`
    Sigma,
    /// `v - mean`
    Anomaly,
}

impl Transform {
    /// Baseline of `day` if it supports this transform.
    fn check(
        self,
        day: usize,
        stats: Option<Result<&DayBaseline, &Error>>,
    ) -> Result<DayBaseline, Error> {
        let stats = stats.ok_or(Error::InsufficientBaselineData { day, n_vals: 0 })?;
        let stats = *stats.map_err(Clone::clone)?;
        if self == Transform::Sigma && (stats.std_dev == 0.0 || !stats.std_dev.is_finite()) {
            return Err(Error::DegenerateBaseline {
                day,
                std_dev: stats.std_dev,
            });
        }
        Ok(stats)
    }

    /// Sigma is the rounded anomaly over the standard deviation, so that it
    /// agrees with the published anomaly to within the rounding step.
    fn apply(self, val: f64, stats: &DayBaseline) -> f64 {
        let anomaly = round_to(val - stats.mean, DECIMALS);
        match self {
            Transform::Anomaly => anomaly,
            Transform::Sigma => round_to(anomaly / stats.std_dev, DECIMALS),
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Sigma => write!(f, "sigma"),
            Transform::Anomaly => write!(f, "anomaly"),
        }
    }
}

/// Derived values for every ordinary year of a series matrix.
///
/// Supplementary bands are never transformed. Days whose baseline cannot
/// support the transform have all cells missing and a fault explaining why.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricMatrix {
    transform: Transform,
    columns: BTreeMap<i32, Vec<Option<f64>>>,
    faults: BTreeMap<usize, Error>,
}

impl MetricMatrix {
    pub fn derive(matrix: &SeriesMatrix, baseline: &Baseline, transform: Transform) -> Self {
        let years: Vec<i32> = matrix.years().collect();
        let year_columns: Vec<_> = years
            .iter()
            .filter_map(|&year| matrix.column(&SeriesLabel::Year(year)))
            .collect();

        // Each day only reads its own row and its own baseline.
        let rows: Vec<_> = (1..=N_DAYS)
            .into_par_iter()
            .map(|day| -> Result<Vec<Option<f64>>, Error> {
                let stats = transform.check(day, baseline.day(day))?;
                Ok(year_columns
                    .iter()
                    .map(|column| column[day - 1].map(|val| transform.apply(val, &stats)))
                    .collect())
            })
            .collect();

        let mut columns: BTreeMap<i32, Vec<Option<f64>>> = years
            .iter()
            .map(|&year| (year, Vec::with_capacity(N_DAYS)))
            .collect();
        let mut faults = BTreeMap::new();
        for (i_day, row) in rows.into_iter().enumerate() {
            match row {
                Ok(row) => {
                    for (column, val) in columns.values_mut().zip(row) {
                        column.push(val);
                    }
                }
                Err(err) => {
                    for column in columns.values_mut() {
                        column.push(None);
                    }
                    faults.insert(i_day + 1, err);
                }
            }
        }

        Self {
            transform,
            columns,
            faults,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn column(&self, year: i32) -> Option<&[Option<f64>]> {
        self.columns.get(&year).map(Vec::as_slice)
    }

    pub fn value(&self, day: usize, year: i32) -> Option<f64> {
        let column = self.column(year)?;
        day.checked_sub(1).and_then(|i_day| column.get(i_day)).copied()?
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.columns.keys().copied()
    }

    /// Faulted days, keyed by day index.
    pub fn faults(&self) -> &BTreeMap<usize, Error> {
        &self.faults
    }

    pub fn long_records(&self) -> Vec<LongRecord> {
        series::long_records(self.columns.iter().map(|(year, col)| (year.to_string(), col)))
    }
}
