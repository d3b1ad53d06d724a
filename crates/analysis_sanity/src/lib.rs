//! Pre-run sanity checks over an analysis specification. The battery is
//! fail-fast: the first broken check is reported and the rest are skipped.

use std::fmt::{Display, Formatter};

use analysis_model::{AnalysisSpec, ModelTest, Objective};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SanityError {
    NoModels,
    MissingDataFile,
    MissingOutputDir,
    ComparisonNeedsTwoModels,
}

impl Display for SanityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoModels => {
                write!(f, "No models defined. A project needs at least one model.")
            }
            Self::MissingDataFile => write!(
                f,
                "Since this is not a model test, a data file must be loaded."
            ),
            Self::MissingOutputDir => write!(f, "No output directory set."),
            Self::ComparisonNeedsTwoModels => write!(
                f,
                "Objective \"comparison\" needs at least two models."
            ),
        }
    }
}

impl std::error::Error for SanityError {}

/// Gate for starting a run. Checks, in order: at least one model, a data
/// file (unless in model-test mode), an output directory, and two or more
/// models when the objective is comparison.
pub fn sanity_check(spec: &AnalysisSpec) -> Result<(), SanityError> {
    if spec.models().is_empty() {
        return Err(SanityError::NoModels);
    }
    if spec.model_test() == ModelTest::Off && spec.data_file().is_none() {
        return Err(SanityError::MissingDataFile);
    }
    if spec.output_dir().is_empty() {
        return Err(SanityError::MissingOutputDir);
    }
    if spec.objective() == Objective::Comparison && spec.models().len() < 2 {
        return Err(SanityError::ComparisonNeedsTwoModels);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_comparison_spec() -> AnalysisSpec {
        let mut spec = AnalysisSpec::new();
        spec.add_model("A");
        spec.add_model("B");
        spec.set_data_file_and_delimiter("data.csv", ",");
        spec.set_output_dir("/tmp/out");
        spec.set_objective(Objective::Comparison);
        spec
    }

    #[test]
    fn empty_spec_fails_on_models_first() {
        // No data file and no output dir either, but models are checked first.
        let spec = AnalysisSpec::new();
        assert_eq!(sanity_check(&spec), Err(SanityError::NoModels));
    }

    #[test]
    fn data_file_required_outside_model_test() {
        let mut spec = valid_comparison_spec();
        spec.clear_data();
        assert_eq!(sanity_check(&spec), Err(SanityError::MissingDataFile));
        spec.set_model_test_index(0);
        assert_eq!(sanity_check(&spec), Ok(()));
    }

    #[test]
    fn output_dir_required() {
        let mut spec = valid_comparison_spec();
        spec.set_output_dir("");
        assert_eq!(sanity_check(&spec), Err(SanityError::MissingOutputDir));
    }

    #[test]
    fn comparison_needs_two_models() {
        let mut spec = valid_comparison_spec();
        spec.delete_model("B").expect("delete");
        assert_eq!(
            sanity_check(&spec),
            Err(SanityError::ComparisonNeedsTwoModels)
        );
        spec.add_model("B");
        assert_eq!(sanity_check(&spec), Ok(()));
    }

    #[test]
    fn inference_passes_with_one_model() {
        let mut spec = valid_comparison_spec();
        spec.delete_model("B").expect("delete");
        spec.set_objective(Objective::Inference);
        assert_eq!(sanity_check(&spec), Ok(()));
    }
}
