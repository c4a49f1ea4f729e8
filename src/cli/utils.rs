//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use cartonize::wizard::{GenerationIssue, Wizard, WizardContext};

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// One issue per line, indented under a heading.
pub fn issue_report(heading: &str, issues: &[GenerationIssue]) -> anyhow::Error {
    let mut message = heading.to_string();
    for issue in issues {
        message.push_str(&format!("\n  - {issue}"));
    }
    anyhow!(message)
}

/// Commit every step in order, stopping at the first rejected one.
pub fn commit_all(mut wizard: Wizard) -> Result<WizardContext> {
    while !wizard.is_finished() {
        let title = wizard.current().map(|step| step.title()).unwrap_or("step");
        wizard
            .advance()
            .map_err(|issues| issue_report(&format!("{title} rejected:"), &issues))?;
    }
    Ok(wizard.context().clone())
}
