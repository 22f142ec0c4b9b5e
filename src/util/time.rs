use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Args, ValueEnum};

use crate::feed::date::{parse_target_date, DateError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RelativeDay {
    Today,
    Yesterday,
    DayBefore,
}

impl RelativeDay {
    fn days_back(self) -> i64 {
        match self {
            RelativeDay::Today => 0,
            RelativeDay::Yesterday => 1,
            RelativeDay::DayBefore => 2,
        }
    }
}

/// Target-date selection shared by `run` and `feed show`.
#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
    /// Target date, YYYY-MM-DD
    #[arg(long, conflicts_with = "relative")]
    pub date: Option<String>,
    /// Relative target date (UTC); defaults to yesterday
    #[arg(long, value_enum)]
    pub relative: Option<RelativeDay>,
}

impl DateArgs {
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<NaiveDate, DateError> {
        if let Some(raw) = &self.date {
            return parse_target_date(raw);
        }
        let rel = self.relative.unwrap_or(RelativeDay::Yesterday);
        Ok(relative_date(rel, now))
    }
}

pub fn relative_date(rel: RelativeDay, now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(rel.days_back())).date_naive()
}
