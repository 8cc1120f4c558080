use crate::error::Error;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

/// Number of day-of-year rows (day 366 exists only in leap years).
pub const N_DAYS: usize = 366;

/// Role and identity of a matrix column.
///
/// Ordered so that years come first in chronological order, followed by the
/// supplementary bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesLabel {
    Year(i32),
    UpperBand,
    LowerBand,
}

impl SeriesLabel {
    pub fn year(&self) -> Option<i32> {
        match self {
            SeriesLabel::Year(year) => Some(*year),
            _ => None,
        }
    }

    pub fn is_band(&self) -> bool {
        self.year().is_none()
    }
}

impl fmt::Display for SeriesLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesLabel::Year(year) => write!(f, "{year}"),
            SeriesLabel::UpperBand => write!(f, "upper-band"),
            SeriesLabel::LowerBand => write!(f, "lower-band"),
        }
    }
}

/// A labeled daily series as delivered by ingestion, possibly shorter than a year.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub label: SeriesLabel,
    pub values: Vec<Option<f64>>,
}

impl RawSeries {
    pub fn new(label: SeriesLabel, values: Vec<Option<f64>>) -> Self {
        Self { label, values }
    }
}

/// One `(day, series, value)` row of a long-format record stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub day: usize,
    pub series: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMatrix {
    columns: BTreeMap<SeriesLabel, Vec<Option<f64>>>,
}

impl SeriesMatrix {
    /// Assemble a matrix from labeled series.
    ///
    /// Series shorter than [`N_DAYS`] are padded with missing values up to
    /// day 366.
    ///
    /// # Errors
    /// Returns [`Error::MalformedSeries`] if a series is longer than
    /// [`N_DAYS`], holds a non-finite value, or if a label is declared more
    /// than once.
    pub fn build(series: Vec<RawSeries>) -> Result<Self, Error> {
        let mut columns = BTreeMap::new();
        for RawSeries { label, mut values } in series {
            let len = values.len();
            if len > N_DAYS {
                return Err(Error::malformed(
                    label,
                    format!("length must be at most {N_DAYS}, but is {len}"),
                ));
            }
            if columns.contains_key(&label) {
                return Err(Error::malformed(label, "label is duplicated"));
            }
            let non_finite = values.iter().position(|val| val.is_some_and(|val| !val.is_finite()));
            if let Some(i_day) = non_finite {
                return Err(Error::malformed(
                    label,
                    format!("value of day {} is not finite", i_day + 1),
                ));
            }
            values.resize(N_DAYS, None);
            columns.insert(label, values);
        }
        Ok(Self { columns })
    }

    pub fn column(&self, label: &SeriesLabel) -> Option<&[Option<f64>]> {
        self.columns.get(label).map(Vec::as_slice)
    }

    /// Value at `day` (1-based) of the column `label`.
    pub fn value(&self, day: usize, label: &SeriesLabel) -> Option<f64> {
        let column = self.column(label)?;
        day.checked_sub(1).and_then(|i_day| column.get(i_day)).copied()?
    }

    /// Ordinary years in chronological order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.columns.keys().filter_map(SeriesLabel::year)
    }

    pub fn bands(&self) -> impl Iterator<Item = SeriesLabel> + '_ {
        self.columns.keys().copied().filter(SeriesLabel::is_band)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Check that every label in `labels` has a column.
    pub fn require<'a, I>(&self, labels: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a SeriesLabel>,
    {
        for label in labels {
            if !self.columns.contains_key(label) {
                return Err(Error::MissingColumn {
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    /// All cells as long-format records, ordered by label then day.
    pub fn long_records(&self) -> Vec<LongRecord> {
        long_records(self.columns.iter().map(|(label, col)| (label.to_string(), col)))
    }
}

pub fn long_records<'a, I>(columns: I) -> Vec<LongRecord>
where
    I: IntoIterator<Item = (String, &'a Vec<Option<f64>>)>,
{
    columns
        .into_iter()
        .flat_map(|(series, column)| {
            column.iter().enumerate().map(move |(i_day, &value)| LongRecord {
                day: i_day + 1,
                series: series.clone(),
                value,
            })
        })
        .collect()
}
