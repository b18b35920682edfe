//! Stats and clear command implementations.

use crate::error::Result;
use crate::output::Formatter;
use rankright_store::SqliteStore;
use std::io::{self, BufRead, Write};

/// Execute the stats command.
pub fn execute_stats(store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let stats = store.stats()?;
    println!("{}", formatter.format_stats(&stats)?);
    Ok(())
}

/// Execute the clear command.
pub fn execute_clear(yes: bool, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    if !yes {
        let stdin = io::stdin();
        if !confirm(&mut stdin.lock(), "Delete every stored analysis?")? {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(());
        }
    }

    let removed = store.clear()?;
    println!(
        "{}",
        formatter.success(&format!("Deleted {} analysis(es)", removed))
    );
    Ok(())
}

/// Ask a yes/no question; anything but `y` or `yes` is a no.
fn confirm(input: &mut impl BufRead, question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;
    let response = response.trim();
    Ok(response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use rankright_domain::traits::AnalysisStore;
    use rankright_domain::Analysis;

    #[test]
    fn test_confirm_answers() {
        assert!(confirm(&mut "y\n".as_bytes(), "?").unwrap());
        assert!(confirm(&mut "YES\n".as_bytes(), "?").unwrap());
        assert!(!confirm(&mut "\n".as_bytes(), "?").unwrap());
        assert!(!confirm(&mut "nope\n".as_bytes(), "?").unwrap());
    }

    #[test]
    fn test_clear_with_yes() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.create(&Analysis::new("a.txt")).unwrap();
        store.create(&Analysis::new("b.txt")).unwrap();

        let formatter = Formatter::new(OutputFormat::Table, false);
        execute_clear(true, &mut store, &formatter).unwrap();
        assert!(store.list(10, 0).unwrap().is_empty());
    }
}
