//! Degree classification bands for semester averages.

use std::fmt;

use serde::Serialize;

/// UK degree classification band for a percentage average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    FirstClass,
    UpperSecond,
    LowerSecond,
    Third,
    Fail,
    /// No average could be computed.
    Unclassified,
}

impl Classification {
    /// Band an average; `None` and non-finite values are unclassified.
    pub fn from_average(average: Option<f64>) -> Self {
        match average {
            Some(avg) if avg.is_finite() => {
                if avg >= 70.0 {
                    Classification::FirstClass
                } else if avg >= 60.0 {
                    Classification::UpperSecond
                } else if avg >= 50.0 {
                    Classification::LowerSecond
                } else if avg >= 40.0 {
                    Classification::Third
                } else {
                    Classification::Fail
                }
            }
            _ => Classification::Unclassified,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::FirstClass => "First Class",
            Classification::UpperSecond => "Upper Second (2:1)",
            Classification::LowerSecond => "Lower Second (2:2)",
            Classification::Third => "Third Class",
            Classification::Fail => "Fail",
            Classification::Unclassified => "—",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Classification::UpperSecond => "2:1",
            Classification::LowerSecond => "2:2",
            other => other.label(),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
