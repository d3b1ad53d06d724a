use std::env;
use std::fs;

use analysis_model::{AnalysisSpec, ModelTest};
use analysis_sanity::sanity_check;
use script_codegen::{GenerateError, generate};

const EXIT_VALIDATION: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_INVALID_COMMAND: i32 = 3;

#[derive(Debug, PartialEq, Eq)]
enum Commands {
    Show { project: String },
    Validate { project: String },
    Generate { project: String, out: Option<String> },
}

struct CliError {
    code: i32,
    message: String,
}

impl CliError {
    fn io(message: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: message.into() }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self { code: EXIT_VALIDATION, message: message.into() }
    }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{}", usage());
            std::process::exit(EXIT_INVALID_COMMAND);
        }
    };
    match run(command) {
        Ok(out) => println!("{out}"),
        Err(err) => {
            eprintln!("{}", err.message);
            std::process::exit(err.code);
        }
    }
}

fn parse_command(args: &[String]) -> Result<Commands, String> {
    let mut it = args.iter();
    let Some(name) = it.next() else {
        return Err("no command given".to_string());
    };
    match name.as_str() {
        "show" => {
            let project = it.next().ok_or("show requires a project file")?;
            Ok(Commands::Show { project: project.clone() })
        }
        "validate" => {
            let project = it.next().ok_or("validate requires a project file")?;
            Ok(Commands::Validate { project: project.clone() })
        }
        "generate" => {
            let project = it.next().ok_or("generate requires a project file")?;
            let mut out = None;
            while let Some(arg) = it.next() {
                match arg.as_str() {
                    "--out" => {
                        let dir = it.next().ok_or("--out requires a directory")?;
                        out = Some(dir.clone());
                    }
                    other => return Err(format!("unknown argument: {other}")),
                }
            }
            Ok(Commands::Generate { project: project.clone(), out })
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn run(command: Commands) -> Result<String, CliError> {
    match command {
        Commands::Show { project } => {
            let spec = load_spec(&project)?;
            Ok(describe(&spec))
        }
        Commands::Validate { project } => {
            let spec = load_spec(&project)?;
            sanity_check(&spec).map_err(|reason| CliError::validation(reason.to_string()))?;
            Ok("OK".to_string())
        }
        Commands::Generate { project, out } => {
            let mut spec = load_spec(&project)?;
            if let Some(dir) = out {
                spec.set_output_dir(dir);
            }
            sanity_check(&spec).map_err(|reason| CliError::validation(reason.to_string()))?;
            let path = generate(&spec).map_err(|err| match err {
                GenerateError::Io(io_err) => CliError::io(io_err.to_string()),
                other => CliError::validation(other.to_string()),
            })?;
            Ok(path.display().to_string())
        }
    }
}

fn load_spec(path: &str) -> Result<AnalysisSpec, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| CliError::io(format!("cannot read {path}: {err}")))?;
    serde_json::from_str(&raw)
        .map_err(|err| CliError::io(format!("cannot parse {path}: {err}")))
}

fn describe(spec: &AnalysisSpec) -> String {
    let mut out = String::new();
    out.push_str(&format!("Data file: {}\n", spec.data_file().unwrap_or("<none>")));
    out.push_str(&format!("Models ({}):\n", spec.models().len()));
    for model in spec.models() {
        let priors: Vec<&str> = model.priors().iter().map(|p| p.name.as_str()).collect();
        out.push_str(&format!(
            "  {} | priors: [{}], simulate: {}\n",
            model.name(),
            priors.join(", "),
            if model.simulate().is_some() { "set" } else { "unset" },
        ));
    }
    let settings = spec.settings();
    out.push_str(&format!(
        "Objective: {} ({})\n",
        settings.objective.as_str(),
        settings.method.as_str()
    ));
    out.push_str(&format!("Simulations: {}\n", settings.simulations));
    match settings.modeltest {
        ModelTest::Off => out.push_str("Model test: off"),
        ModelTest::Index(idx) => out.push_str(&format!("Model test: model #{idx}")),
    }
    out
}

fn usage() -> &'static str {
    "usage:\n  abcstudio show <project.json>\n  abcstudio validate <project.json>\n  abcstudio generate <project.json> [--out DIR]"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn parses_generate_with_out_override() {
        let parsed = parse_command(&args(&["generate", "p.json", "--out", "/tmp"]));
        assert_eq!(
            parsed,
            Ok(Commands::Generate {
                project: "p.json".to_string(),
                out: Some("/tmp".to_string()),
            })
        );
    }

    #[test]
    fn rejects_unknown_command_and_missing_args() {
        assert!(parse_command(&args(&["frobnicate"])).is_err());
        assert!(parse_command(&args(&["validate"])).is_err());
        assert!(parse_command(&args(&["generate", "p.json", "--out"])).is_err());
        assert!(parse_command(&[]).is_err());
    }
}
