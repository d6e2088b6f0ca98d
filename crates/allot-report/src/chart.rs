use allot_types::Allocator;
use serde::{Deserialize, Serialize};

use crate::report::{AllocatorSection, FundingSummary};

/// One slice of a chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: f64,
}

/// Pie-chart payload: a title and its slices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub title: String,
    pub series: Vec<ChartSeries>,
}

impl PieChart {
    /// Chart over the positive values of `slices`, `None` when there are none.
    pub fn from_slices<N: Into<String>>(
        title: &str,
        slices: impl IntoIterator<Item = (N, f64)>,
    ) -> Option<Self> {
        let series: Vec<ChartSeries> = slices
            .into_iter()
            .filter(|(_, data)| *data > 0.0)
            .map(|(name, data)| ChartSeries {
                name: name.into(),
                data,
            })
            .collect();
        if series.is_empty() {
            return None;
        }
        Some(Self {
            chart_type: "pie".to_string(),
            title: title.to_string(),
            series,
        })
    }

    /// Budget used against budget left over, across every allocator.
    pub fn usage(summary: &FundingSummary) -> Self {
        Self {
            chart_type: "pie".to_string(),
            title: "Share of total allocator budget used".to_string(),
            series: vec![
                ChartSeries {
                    name: "Used".to_string(),
                    data: summary.total_spent,
                },
                ChartSeries {
                    name: "Remaining".to_string(),
                    data: summary.total_remaining,
                },
            ],
        }
    }

    pub fn used(&self) -> f64 {
        self.series.first().map(|s| s.data).unwrap_or(0.0)
    }

    pub fn remaining(&self) -> f64 {
        self.series.get(1).map(|s| s.data).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.series.iter().map(|s| s.data).sum()
    }
}

/// The three charts of a single allocator. A chart with no data is omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocatorCharts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intentions: Option<PieChart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PieChart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributions: Option<PieChart>,
}

impl AllocatorCharts {
    pub fn build(allocator: &Allocator, section: &AllocatorSection) -> Self {
        let intentions = PieChart::from_slices(
            "Intended budget per category",
            allocator
                .intentions
                .iter()
                .map(|i| (i.category.as_str(), i.amount)),
        );
        let preferences = PieChart::from_slices(
            "Preference points per category",
            allocator
                .preferences
                .iter()
                .map(|(category, score)| (category.as_str(), f64::from(*score))),
        );
        let contributions = PieChart::from_slices(
            "Contributed budget per category",
            section
                .contributions
                .iter()
                .map(|group| (group.category.as_str(), group.total())),
        );
        Self {
            intentions,
            preferences,
            contributions,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieChart> {
        [&self.intentions, &self.preferences, &self.contributions]
            .into_iter()
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
