// Main entry point for testview

use anyhow::Result;
use clap::Parser;
use tracing::info;

use testview::cli::{Cli, Commands};
use testview::commands::{handle_completion, handle_highlight, handle_init_templates, handle_render};
use testview::config::{self, Config};
use testview::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting testview v{}", env!("CARGO_PKG_VERSION"));
    }

    // Load configuration from file (if exists)
    let file_config = Config::load();

    // Handle config flag
    if cli.config {
        print_config(file_config.as_ref());
        return Ok(());
    }

    // Handle init_config flag
    if let Some(config_file) = cli.init_config {
        let toml_content = Config::default().to_toml();
        std::fs::write(&config_file, toml_content)?;
        println!("Configuration file created: {}", config_file.display());
        println!("\nYou can now edit the file to customize your settings.");
        print_precedence();
        return Ok(());
    }

    // Handle completion flag
    if let Some(shell_type) = cli.completion {
        return handle_completion(&shell_type);
    }

    let config = file_config.unwrap_or_default();
    match &cli.command {
        Some(Commands::Render(args)) => handle_render(args, &config),
        Some(Commands::Highlight(args)) => handle_highlight(args),
        Some(Commands::InitTemplates(args)) => handle_init_templates(args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn print_config(file_config: Option<&Config>) {
    println!("Current configuration:");

    if let Some(cfg) = file_config {
        println!("\n  Configuration file loaded:");
        match cfg.report.templates {
            Some(ref dir) => println!("    Templates: {}", dir.display()),
            None => println!("    Templates: bundled"),
        }
        if let Some(ref title) = cfg.report.title {
            println!("    Title: {}", title);
        }
        println!("    Format: {}", cfg.report.format);
        if let Some(ref output) = cfg.report.output {
            println!("    Output: {}", output.display());
        }
        println!("    Context lines: {}", cfg.source.context_lines);
        println!(
            "    Listings: {}",
            if cfg.source.listings { "enabled" } else { "disabled" }
        );
    } else {
        println!("\n  No configuration file loaded");
        println!("  Create one with: testview --init-config .testviewrc.toml");
    }

    println!("\n  Environment variables:");
    match std::env::var(config::ENV_TESTVIEW_TEMPLATES) {
        Ok(dir) => println!("    {}: {}", config::ENV_TESTVIEW_TEMPLATES, dir),
        Err(_) => println!(
            "    {}: not set (default: bundled templates)",
            config::ENV_TESTVIEW_TEMPLATES
        ),
    }

    print_precedence();
}

fn print_precedence() {
    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Configuration file");
    println!("  3. Environment variables");
    println!("  4. Built-in defaults (lowest)");
}
