//! Date Indexer
//!
//! Dense zero-based ranks for the distinct dates of the dataset. The rank
//! is the only coordinate the date slider knows about, so it stays
//! contiguous even when the feed skips days.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Sorted distinct dates and their ranks
#[derive(Debug, Clone, Default)]
pub struct DateIndex {
    dates: Vec<NaiveDate>,
    ranks: HashMap<NaiveDate, usize>,
}

/// A labelled slider tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliderMark {
    pub index: usize,
    pub label: String,
}

impl DateIndex {
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let dates: Vec<NaiveDate> = dates
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let ranks = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        Self { dates, ranks }
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.ranks.get(&date).copied()
    }

    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    /// Highest index, i.e. the most recent date
    pub fn max_index(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Nearest valid index for an arbitrary slider value
    pub fn clamp(&self, requested: i64) -> Option<usize> {
        let max = self.max_index()?;
        if requested <= 0 {
            return Some(0);
        }
        Some(usize::try_from(requested).map_or(max, |r| r.min(max)))
    }

    /// One tick at the first indexed date of each calendar month
    pub fn month_marks(&self) -> Vec<SliderMark> {
        let mut marks = Vec::new();
        let mut last_month = None;

        for (index, date) in self.dates.iter().enumerate() {
            let month = (date.year(), date.month());
            if last_month != Some(month) {
                marks.push(SliderMark {
                    index,
                    label: date.format("%Y-%m-%d").to_string(),
                });
                last_month = Some(month);
            }
        }

        marks
    }
}
