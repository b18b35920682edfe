//! Init command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the init command.
///
/// Writes `config` to `path`. An existing file is left alone unless `force`
/// is set.
pub fn execute_init(config: &Config, path: &Path, force: bool, formatter: &Formatter) -> Result<()> {
    if path.exists() && !force {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} already exists; use --force to overwrite it",
                path.display()
            ))
        );
        return Ok(());
    }

    config.save_to(path)?;
    println!(
        "{}",
        formatter.success(&format!("Configuration written to {}", path.display()))
    );
    Ok(())
}
