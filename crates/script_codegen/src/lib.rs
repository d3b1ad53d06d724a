pub mod outpath;
pub mod script;
pub mod snippet;

pub use outpath::resolve;
pub use script::{
    GenerateError, SCRIPT_BASE_NAME, SimulateFn, generate, render_script, simulate_functions,
    write_script,
};
pub use snippet::{RenamedFunction, SnippetError, declared_function_name, rename_function};
