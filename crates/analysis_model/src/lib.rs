pub mod model;
pub mod settings;
pub mod spec;

pub use model::{Model, Prior};
pub use settings::{
    DEFAULT_PERCENTILE, DEFAULT_SIMULATIONS, DistanceMetric, Method, ModelTest, Objective,
    RunSettings, THRESHOLD_UNSET,
};
pub use spec::{AnalysisSpec, DataSource, SpecError};
