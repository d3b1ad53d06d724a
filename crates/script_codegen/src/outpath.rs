//! Collision-free output path selection.

use std::path::{Path, PathBuf};

/// Returns `dir/base_name` if nothing is there yet; otherwise inserts a
/// `_<n>` counter before the extension (`analysis.py`, `analysis_1.py`,
/// `analysis_2.py`, ...) until a free path is found. Unbounded by design;
/// callers must not point this at a namespace with infinite collisions.
pub fn resolve(dir: &Path, base_name: &str) -> PathBuf {
    let first = dir.join(base_name);
    if !first.exists() {
        return first;
    }
    let (stem, ext) = match base_name.rfind('.') {
        Some(pos) => (&base_name[..pos], &base_name[pos..]),
        None => (base_name, ""),
    };
    let mut n = 1u64;
    loop {
        let candidate = dir.join(format!("{stem}_{n}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
