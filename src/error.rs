use std::path::PathBuf;
use thiserror::Error;

use crate::selection::{ChartType, Variant};

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors a user interaction can run into.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load dataset from '{}'", path.display())]
    DataLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{chart} is not offered by the {variant} dashboard")]
    UnsupportedChartType { chart: ChartType, variant: Variant },

    #[error("{chart} needs an attribute for the x-axis")]
    MissingAttribute { chart: ChartType },

    #[error("unknown {kind} '{value}'")]
    UnknownOption { kind: &'static str, value: String },
}

/// Recoverable input problems, shown in place of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select at least one model.")]
    NoModelsSelected,
}
