//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "relnotes.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "relnotes.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".relnotes.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".relnotes.toml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Generate default configuration TOML
pub fn default_config_toml() -> crate::error::Result<String> {
    let config = Config::default();
    let content = toml::to_string_pretty(&config).map_err(crate::error::ConfigError::from)?;
    Ok(content)
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# relnotes configuration

host:
  api_url: https://api.github.com
  web_url: https://github.com
  token_env: GITHUB_TOKEN
  timeout_secs: 30
  user_agent: relnotes

pipeline:
  per_page: 100
  concurrency: 4
  anchor_first_release_at_origin: true

changelog:
  empty_message: No changes found for this release.
  strip_ci_markers: true
  rules:
    - category: feature
      title_prefixes: [feat, feature, add, enhance, new]
      message_markers: ["feat:", "feature:"]
    - category: fix
      title_prefixes: [fix, bug, issue, resolve, close]
      message_markers: ["fix:", "bug:"]
    - category: improvement
      title_prefixes: [refactor, perf, improve, update, optimize, chore]
      message_markers: ["refactor:", "perf:", "improve:", "update:"]
    - category: docs
      title_prefixes: [doc, readme, changelog]
      message_markers: ["doc:", "docs:", "readme:"]
"#;
