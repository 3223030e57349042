// Init-templates command - write the bundled templates to disk

use anyhow::{Context, Result};

use crate::cli::args::InitTemplatesArgs;
use crate::report::template::{FRAGMENTS, TemplateSet};

pub fn handle_init_templates(args: &InitTemplatesArgs) -> Result<()> {
    if !args.force {
        let existing: Vec<_> = FRAGMENTS
            .iter()
            .map(|fragment| args.dir.join(format!("{}.html", fragment)))
            .filter(|path| path.exists())
            .collect();
        if let Some(path) = existing.first() {
            anyhow::bail!(
                "Template {} already exists (use --force to overwrite)",
                path.display()
            );
        }
    }

    TemplateSet::write_bundled(&args.dir)
        .with_context(|| format!("Failed to write templates to {}", args.dir.display()))?;

    println!("Templates written to {}", args.dir.display());
    Ok(())
}
