//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use relnotes_core::config::{
    default_config_toml, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML, DEFAULT_CONFIG_YAML,
};

use crate::cli::{output, Cli};

/// Initialize a new relnotes configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Write TOML instead of YAML
    #[arg(long)]
    pub toml: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, toml = self.toml, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self.config_path(&cwd);

        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                output::warning("Aborted.");
                return Ok(());
            }
        }

        let content = if self.toml {
            default_config_toml()?
        } else {
            DEFAULT_CONFIG_TEMPLATE.to_string()
        };

        std::fs::write(&config_path, &content)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            output::info(&format!(
                "Run {} to check it, then {} to build a changelog",
                style("relnotes validate").cyan(),
                style("relnotes changelog OWNER/REPO").cyan()
            ));
        }

        Ok(())
    }

    fn config_path(&self, cwd: &Path) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None if self.toml => cwd.join(DEFAULT_CONFIG_TOML),
            None => cwd.join(DEFAULT_CONFIG_YAML),
        }
    }
}
