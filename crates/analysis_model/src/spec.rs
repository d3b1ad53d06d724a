use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::settings::{DistanceMetric, Method, ModelTest, Objective, RunSettings};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecError {
    ModelNotFound(String),
    InvalidTestSelection,
}

impl Display for SpecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelNotFound(name) => write!(f, "model not found: {name}"),
            Self::InvalidTestSelection => write!(f, "no valid model selected for test"),
        }
    }
}

impl std::error::Error for SpecError {}

/// Loaded observation data: file path plus the delimiter the consumer will
/// parse it with. Both are set and cleared together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub datafile: Option<String>,
    pub delimiter: Option<String>,
}

/// The specification tree for one ABC analysis session. All mutation goes
/// through the methods here; the validator and the generator only read it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSpec {
    data: DataSource,
    models: Vec<Model>,
    summary: String,
    distance: String,
    settings: RunSettings,
}

impl AnalysisSpec {
    pub fn new() -> Self {
        Self::default()
    }

    // --- models ---

    /// Appends a new model. Name uniqueness among models is the caller's
    /// responsibility; this does not auto-disambiguate.
    pub fn add_model(&mut self, name: impl Into<String>) -> &mut Model {
        let idx = self.models.len();
        self.models.push(Model::new(name, None));
        &mut self.models[idx]
    }

    /// [`add_model`](Self::add_model) with the simulate snippet up front.
    pub fn add_model_with_simulate(
        &mut self,
        name: impl Into<String>,
        simulate: impl Into<String>,
    ) -> &mut Model {
        let idx = self.models.len();
        self.models.push(Model::new(name, Some(simulate.into())));
        &mut self.models[idx]
    }

    /// Renames the first model called `old`. Collisions with an existing
    /// name are not checked here; that stays with the caller.
    pub fn rename_model(&mut self, old: &str, new: impl Into<String>) -> Result<(), SpecError> {
        self.model_mut(old)?.set_name(new);
        Ok(())
    }

    pub fn delete_model(&mut self, name: &str) -> Result<(), SpecError> {
        let idx = self
            .models
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| SpecError::ModelNotFound(name.to_string()))?;
        self.models.remove(idx);
        Ok(())
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name() == name)
    }

    fn model_mut(&mut self, name: &str) -> Result<&mut Model, SpecError> {
        self.models
            .iter_mut()
            .find(|m| m.name() == name)
            .ok_or_else(|| SpecError::ModelNotFound(name.to_string()))
    }

    /// Inserts a prior on the named model. `Ok(false)` means the prior name
    /// was already taken and nothing changed.
    pub fn add_prior_to_model(
        &mut self,
        param: impl Into<String>,
        code: impl Into<String>,
        model: &str,
    ) -> Result<bool, SpecError> {
        Ok(self.model_mut(model)?.add_prior(param, code))
    }

    /// Removes the prior at `idx` from the named model. An out-of-range
    /// index panics (see [`Model::remove_prior`]).
    pub fn delete_prior_from_model(&mut self, idx: usize, model: &str) -> Result<(), SpecError> {
        self.model_mut(model)?.remove_prior(idx);
        Ok(())
    }

    pub fn add_simulate_to_model(
        &mut self,
        code: impl Into<String>,
        model: &str,
    ) -> Result<(), SpecError> {
        self.model_mut(model)?.set_simulate(code);
        Ok(())
    }

    // --- summary / distance ---

    pub fn set_summary(&mut self, code: impl Into<String>) {
        self.summary = code.into();
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn set_distance(&mut self, code: impl Into<String>) {
        self.distance = code.into();
    }

    /// The distance snippet, or `None` unless the metric is custom. The
    /// stored text is ignored for the default metric.
    pub fn distance(&self) -> Option<&str> {
        match self.settings.distance_metric {
            DistanceMetric::Custom => Some(&self.distance),
            DistanceMetric::Default => None,
        }
    }

    // --- data ---

    pub fn set_data_file_and_delimiter(
        &mut self,
        datafile: impl Into<String>,
        delimiter: impl Into<String>,
    ) {
        self.data.datafile = Some(datafile.into());
        self.data.delimiter = Some(delimiter.into());
    }

    pub fn clear_data(&mut self) {
        self.data = DataSource::default();
    }

    pub fn data_file(&self) -> Option<&str> {
        self.data.datafile.as_deref()
    }

    pub fn data_file_and_delimiter(&self) -> (Option<&str>, Option<&str>) {
        (self.data.datafile.as_deref(), self.data.delimiter.as_deref())
    }

    // --- settings ---

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn set_output_dir(&mut self, dir: impl Into<String>) {
        self.settings.outputdir = dir.into();
    }

    pub fn output_dir(&self) -> &str {
        &self.settings.outputdir
    }

    pub fn set_distance_metric(&mut self, metric: DistanceMetric) {
        self.settings.distance_metric = metric;
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.settings.objective = objective;
    }

    pub fn objective(&self) -> Objective {
        self.settings.objective
    }

    pub fn set_method(&mut self, method: Method) {
        self.settings.method = method;
    }

    pub fn method(&self) -> Method {
        self.settings.method
    }

    pub fn set_simulations(&mut self, simulations: u64) {
        self.settings.simulations = simulations;
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.settings.threshold = threshold;
    }

    pub fn set_percentile(&mut self, percentile: f64) {
        self.settings.percentile = percentile;
    }

    pub fn set_model_test_index(&mut self, idx: usize) {
        self.settings.modeltest = ModelTest::Index(idx);
    }

    pub fn clear_model_test(&mut self) {
        self.settings.modeltest = ModelTest::Off;
    }

    pub fn model_test(&self) -> ModelTest {
        self.settings.modeltest
    }

    pub fn set_fixed_parameters(&mut self, params: Vec<(String, f64)>) {
        self.settings.fixedparameters = params;
    }

    pub fn fixed_parameters(&self) -> &[(String, f64)] {
        &self.settings.fixedparameters
    }

    /// The model picked for a model-test run. Fails when model test is off
    /// or the stored index no longer points into the model list.
    pub fn selected_model_for_test(&self) -> Result<&Model, SpecError> {
        match self.settings.modeltest {
            ModelTest::Index(idx) => {
                self.models.get(idx).ok_or(SpecError::InvalidTestSelection)
            }
            ModelTest::Off => Err(SpecError::InvalidTestSelection),
        }
    }

    // --- snapshot ---

    /// Replaces the whole tree with a restored snapshot. Model entities are
    /// rebuilt from their plain records; previous instances are dropped.
    pub fn restore(&mut self, snapshot: AnalysisSpec) {
        *self = snapshot;
    }
}
