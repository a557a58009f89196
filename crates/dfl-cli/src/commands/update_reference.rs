use std::path::Path;

use anyhow::Result;
use dfl_cli::load_settings;
use dfl_io::{FinalStateComparator, TestLayout};
use dfl_verify::refresh_references;

pub fn handle(root: &Path, testdir: &str, settings: Option<&Path>) -> Result<()> {
    let settings = load_settings(settings)?;
    let comparator = FinalStateComparator::new(settings.tolerance.tolerance());
    let refreshed = refresh_references(&TestLayout::new(root, testdir), &comparator)?;
    for path in &refreshed {
        println!("Update reference output: {}", path.display());
    }
    println!("{} reference file(s) updated", refreshed.len());
    Ok(())
}
