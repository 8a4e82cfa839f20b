//! Validate command

use clap::Args;
use console::style;
use tracing::info;

use relnotes_core::config::{load_config_from_dir, Config};
use relnotes_host::{GitHubClient, HostClient};

use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Validate configuration and host access
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Also check that OWNER/REPO is reachable on the host
    #[arg(long, value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            repository = ?self.repository,
            strict = self.strict,
            "executing validate command"
        );
        let cwd = std::env::current_dir()?;

        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        // Loading also validates
        let (config, config_path) = match load_config_from_dir(&cwd) {
            Ok((c, p)) => (Some(c), Some(p)),
            Err(e) => {
                errors.push(format!("Configuration: {}", e));
                (None, None)
            }
        };

        if let Some(ref cfg) = config {
            warnings.extend(token_warning(cfg));

            if let Some(ref repository) = self.repository {
                if let Err(e) = check_repository(cfg, repository) {
                    errors.push(format!("Host: {}", e));
                }
            }
        }

        if self.strict {
            errors.append(&mut warnings);
        }

        let passed = errors.is_empty();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "config_path": config_path.map(|p| p.to_string_lossy().to_string()),
                    "errors": errors,
                    "warnings": warnings
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", style("Validation Results").bold());
                    println!();

                    if let Some(path) = config_path {
                        println!("Config: {}", style(path.display()).cyan());
                        println!();
                    }

                    if !errors.is_empty() {
                        println!("{}", style("Errors:").red().bold());
                        for error in &errors {
                            println!("  {} {}", style("✗").red(), error);
                        }
                        println!();
                    }

                    if !warnings.is_empty() {
                        println!("{}", style("Warnings:").yellow().bold());
                        for warning in &warnings {
                            println!("  {} {}", style("!").yellow(), warning);
                        }
                        println!();
                    }

                    if passed {
                        if warnings.is_empty() {
                            println!("{}", style("✓ All checks passed").green().bold());
                        } else {
                            println!(
                                "{} with {} warning(s)",
                                style("✓ Validation passed").green().bold(),
                                warnings.len()
                            );
                        }
                    } else {
                        println!(
                            "{} with {} error(s)",
                            style("✗ Validation failed").red().bold(),
                            errors.len()
                        );
                    }
                }
            }
        }

        if !passed {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }

        Ok(())
    }
}

/// Warn when no token is available for the host
fn token_warning(config: &Config) -> Option<String> {
    let present = std::env::var(&config.host.token_env)
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false);

    (!present).then(|| {
        format!(
            "{} is not set; requests are unauthenticated and heavily rate limited",
            config.host.token_env
        )
    })
}

fn check_repository(config: &Config, repository: &str) -> anyhow::Result<()> {
    let (owner, repo) = repository
        .split_once('/')
        .filter(|(o, r)| !o.is_empty() && !r.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Invalid repository '{}', expected OWNER/REPO", repository))?;

    let client = GitHubClient::new(&config.host)?;
    let rt = tokio::runtime::Runtime::new()?;
    let info = rt.block_on(client.get_repository(owner, repo))?;
    info!(repository = %info.full_name, default_branch = ?info.default_branch, "repository reachable");
    Ok(())
}
