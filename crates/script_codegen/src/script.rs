//! Renders the standalone analysis script. The whole script is assembled
//! in memory first; nothing touches the filesystem until every section has
//! been produced, so a failed generation never leaves a partial file.

use std::fmt::Write as _;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

use analysis_model::{AnalysisSpec, ModelTest};
use chrono::Local;

use crate::outpath;
use crate::snippet::{self, SnippetError};

/// Base name for generated scripts; collisions are resolved with `_<n>`.
pub const SCRIPT_BASE_NAME: &str = "analysis.py";

const INDENT: &str = "    ";

#[derive(Debug)]
pub enum GenerateError {
    MissingSummary,
    MissingDistance,
    MissingSimulate(String),
    MalformedSnippet { section: String, source: SnippetError },
    Io(io::Error),
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSummary => write!(f, "summary function is not set"),
            Self::MissingDistance => {
                write!(f, "distance metric is custom but no distance function is set")
            }
            Self::MissingSimulate(model) => {
                write!(f, "model {model} has no simulate function")
            }
            Self::MalformedSnippet { section, source } => {
                write!(f, "{section}: {source}")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedSnippet { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GenerateError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A model's simulate snippet after collision renaming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulateFn {
    pub model: String,
    pub code: String,
    pub ident: String,
}

/// Renames every model's simulate function to `<declared>_<modelName>`, in
/// model list order, so the generated script holds distinct top-level
/// functions even when every model declares `def simulate`.
pub fn simulate_functions(spec: &AnalysisSpec) -> Result<Vec<SimulateFn>, GenerateError> {
    let mut out = Vec::with_capacity(spec.models().len());
    for model in spec.models() {
        let code = model
            .simulate()
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| GenerateError::MissingSimulate(model.name().to_string()))?;
        let renamed = snippet::rename_function(code, model.name()).map_err(|source| {
            GenerateError::MalformedSnippet {
                section: format!("simulate function of model {}", model.name()),
                source,
            }
        })?;
        out.push(SimulateFn {
            model: model.name().to_string(),
            code: renamed.code,
            ident: renamed.ident,
        });
    }
    Ok(out)
}

/// Produces the full script text: seven sections in fixed order, separated
/// by exactly two blank lines. Missing required content (summary, custom
/// distance, any simulate) fails here, before any write.
pub fn render_script(spec: &AnalysisSpec, timestamp: &str) -> Result<String, GenerateError> {
    let summary_code = spec.summary();
    if summary_code.trim().is_empty() {
        return Err(GenerateError::MissingSummary);
    }
    let summary_ident = snippet::declared_function_name(summary_code).map_err(|source| {
        GenerateError::MalformedSnippet {
            section: "summary function".to_string(),
            source,
        }
    })?;

    let distance = match spec.distance() {
        Some(code) if code.trim().is_empty() => return Err(GenerateError::MissingDistance),
        Some(code) => {
            let ident = snippet::declared_function_name(code).map_err(|source| {
                GenerateError::MalformedSnippet {
                    section: "distance function".to_string(),
                    source,
                }
            })?;
            Some((code, ident))
        }
        None => None,
    };

    let simulate = simulate_functions(spec)?;

    let mut sections = Vec::new();
    sections.push(header_section(timestamp));
    sections.push(import_section());
    sections.push(summary_code.trim_end().to_string());
    if let Some((code, _)) = &distance {
        sections.push(code.trim_end().to_string());
    }
    for entry in &simulate {
        sections.push(entry.code.trim_end().to_string());
    }
    sections.push(config_section(
        spec,
        &simulate,
        &summary_ident,
        distance.as_ref().map(|(_, ident)| ident.as_str()),
    ));
    sections.push(main_section());

    Ok(format!("{}\n", sections.join("\n\n\n")))
}

/// Renders and writes the script under the spec's output directory, picking
/// a collision-free file name. Returns the path written.
pub fn write_script(spec: &AnalysisSpec, timestamp: &str) -> Result<PathBuf, GenerateError> {
    let text = render_script(spec, timestamp)?;
    let path = outpath::resolve(Path::new(spec.output_dir()), SCRIPT_BASE_NAME);
    std::fs::write(&path, text)?;
    Ok(path)
}

/// [`write_script`] stamped with the current local time.
pub fn generate(spec: &AnalysisSpec) -> Result<PathBuf, GenerateError> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    write_script(spec, &timestamp)
}

fn header_section(timestamp: &str) -> String {
    format!(
        "\"\"\"\nAutomatically generated by the abcstudio GUI.\nCreated on {timestamp}.\n\"\"\""
    )
}

fn import_section() -> String {
    [
        "# Required imports",
        "import numpy as np",
        "from scipy import stats",
        "from abcstudio.core.algorithm import Abc",
    ]
    .join("\n")
}

fn config_section(
    spec: &AnalysisSpec,
    simulate: &[SimulateFn],
    summary_ident: &str,
    distance_ident: Option<&str>,
) -> String {
    let mut out = String::from("CONFIG = {\n");

    // data: the datafile only; the delimiter is parsed by the consumer and
    // is deliberately absent from the literal.
    out.push_str(&format!("{INDENT}\"data\": {{\n"));
    out.push_str(&format!(
        "{INDENT}{INDENT}\"datafile\": {}\n",
        py_str_or_none(spec.data_file())
    ));
    out.push_str(&format!("{INDENT}}},\n"));

    out.push_str(&format!("{INDENT}\"models\": [\n"));
    for (model, entry) in spec.models().iter().zip(simulate) {
        out.push_str(&format!("{INDENT}{INDENT}{{\n"));
        out.push_str(&format!(
            "{INDENT}{INDENT}{INDENT}\"name\": \"{}\",\n",
            model.name()
        ));
        out.push_str(&format!("{INDENT}{INDENT}{INDENT}\"priors\": [\n"));
        for prior in model.priors() {
            // Raw prior code: priors are not subject to renaming.
            out.push_str(&format!(
                "{INDENT}{INDENT}{INDENT}{INDENT}{{\"{}\": {}}},\n",
                prior.name, prior.code
            ));
        }
        out.push_str(&format!("{INDENT}{INDENT}{INDENT}],\n"));
        out.push_str(&format!(
            "{INDENT}{INDENT}{INDENT}\"simulate\": {}\n",
            entry.ident
        ));
        out.push_str(&format!("{INDENT}{INDENT}}},\n"));
    }
    out.push_str(&format!("{INDENT}],\n"));

    out.push_str(&format!("{INDENT}\"summary\": {summary_ident},\n"));
    out.push_str(&format!(
        "{INDENT}\"distance\": {},\n",
        distance_ident.unwrap_or("None")
    ));

    out.push_str(&format!("{INDENT}\"settings\": {{\n"));
    out.push_str(&settings_block(spec));
    out.push_str(&format!("{INDENT}}}\n"));
    out.push('}');
    out
}

/// The settings literal: alphabetical key order, `outputdir` stripped,
/// `fixedparameters` as a dict in insertion order.
fn settings_block(spec: &AnalysisSpec) -> String {
    let settings = spec.settings();
    let mut fixed = String::from("{");
    for (i, (name, value)) in settings.fixedparameters.iter().enumerate() {
        if i > 0 {
            fixed.push_str(", ");
        }
        let _ = write!(fixed, "\"{name}\": {value}");
    }
    fixed.push('}');

    let modeltest = match settings.modeltest {
        ModelTest::Off => "False".to_string(),
        ModelTest::Index(idx) => idx.to_string(),
    };

    let entries = [
        (
            "distance_metric",
            format!("\"{}\"", settings.distance_metric.as_str()),
        ),
        ("fixedparameters", fixed),
        ("method", format!("\"{}\"", settings.method.as_str())),
        ("modeltest", modeltest),
        (
            "objective",
            format!("\"{}\"", settings.objective.as_str()),
        ),
        ("percentile", settings.percentile.to_string()),
        ("simulations", settings.simulations.to_string()),
        ("threshold", settings.threshold.to_string()),
    ];

    let mut out = String::new();
    for (i, (key, value)) in entries.iter().enumerate() {
        let sep = if i + 1 < entries.len() { "," } else { "" };
        let _ = writeln!(out, "{INDENT}{INDENT}\"{key}\": {value}{sep}");
    }
    out
}

fn main_section() -> String {
    format!(
        "if __name__ == \"__main__\":\n{INDENT}abc = Abc(config=CONFIG)\n{INDENT}abc.run()"
    )
}

fn py_str_or_none(value: Option<&str>) -> String {
    match value {
        Some(text) => format!("\"{text}\""),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_model::{DistanceMetric, Objective};

    fn scenario_spec() -> AnalysisSpec {
        let mut spec = AnalysisSpec::new();
        spec.set_data_file_and_delimiter("data.csv", ",");
        spec.add_model("A");
        spec.add_model("B");
        spec.add_prior_to_model("mu", "stats.norm(0, 1)", "A").expect("model A");
        spec.add_prior_to_model("sigma", "stats.uniform(0, 10)", "B").expect("model B");
        spec.add_simulate_to_model("def simulate(params):\n    pass", "A").expect("model A");
        spec.add_simulate_to_model("def simulate(params):\n    pass", "B").expect("model B");
        spec.set_summary("def summary(data):\n    return data.mean()");
        spec.set_objective(Objective::Comparison);
        spec.set_output_dir("/tmp/out");
        spec
    }

    #[test]
    fn colliding_simulate_names_are_made_distinct() {
        let text = render_script(&scenario_spec(), "2026-01-01 00:00:00").expect("render");
        assert!(text.contains("def simulate_A(params):"));
        assert!(text.contains("def simulate_B(params):"));
        assert!(text.contains("\"simulate\": simulate_A"));
        assert!(text.contains("\"simulate\": simulate_B"));
        assert!(!text.contains("def simulate(params):"));
    }

    #[test]
    fn config_key_order_is_fixed() {
        let text = render_script(&scenario_spec(), "2026-01-01 00:00:00").expect("render");
        let data = text.find("\"data\":").expect("data key");
        let models = text.find("\"models\":").expect("models key");
        let summary = text.rfind("\"summary\":").expect("summary key");
        let distance = text.rfind("\"distance\":").expect("distance key");
        let settings = text.find("\"settings\":").expect("settings key");
        assert!(data < models && models < summary && summary < distance && distance < settings);
    }

    #[test]
    fn settings_literal_never_contains_outputdir() {
        let text = render_script(&scenario_spec(), "2026-01-01 00:00:00").expect("render");
        assert!(!text.contains("outputdir"));
        assert!(!text.contains("/tmp/out"));
    }

    #[test]
    fn priors_stay_unrenamed() {
        let text = render_script(&scenario_spec(), "2026-01-01 00:00:00").expect("render");
        assert!(text.contains("{\"mu\": stats.norm(0, 1)},"));
        assert!(text.contains("{\"sigma\": stats.uniform(0, 10)},"));
    }

    #[test]
    fn distance_section_only_for_custom_metric() {
        let mut spec = scenario_spec();
        let text = render_script(&spec, "2026-01-01 00:00:00").expect("render");
        assert!(text.contains("\"distance\": None"));
        assert!(!text.contains("def distance"));

        spec.set_distance("def distance(a, b):\n    return abs(a - b)");
        spec.set_distance_metric(DistanceMetric::Custom);
        let text = render_script(&spec, "2026-01-01 00:00:00").expect("render");
        assert!(text.contains("def distance(a, b):"));
        assert!(text.contains("\"distance\": distance,"));
    }

    #[test]
    fn missing_content_fails_before_rendering() {
        let mut spec = scenario_spec();
        spec.set_summary("");
        assert!(matches!(
            render_script(&spec, "t"),
            Err(GenerateError::MissingSummary)
        ));

        let mut spec = scenario_spec();
        spec.set_distance_metric(DistanceMetric::Custom);
        assert!(matches!(
            render_script(&spec, "t"),
            Err(GenerateError::MissingDistance)
        ));

        let mut spec = scenario_spec();
        spec.add_model("C");
        let err = render_script(&spec, "t").expect_err("no simulate");
        assert!(matches!(err, GenerateError::MissingSimulate(ref m) if m == "C"));
    }

    #[test]
    fn sections_are_separated_by_two_blank_lines() {
        let text = render_script(&scenario_spec(), "2026-01-01 00:00:00").expect("render");
        // header, imports, summary, simulate A, simulate B, config, main
        assert_eq!(text.matches("\n\n\n").count(), 6);
        assert!(text.starts_with("\"\"\"\n"));
        assert!(text.contains("Created on 2026-01-01 00:00:00."));
        assert!(text.ends_with("abc.run()\n"));
    }

    #[test]
    fn summary_reference_uses_declared_identifier() {
        let mut spec = scenario_spec();
        spec.set_summary("def my_stats(data):\n    return data.mean()");
        let text = render_script(&spec, "t").expect("render");
        assert!(text.contains("\"summary\": my_stats,"));
    }
}
