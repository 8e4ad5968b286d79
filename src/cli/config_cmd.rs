//! Config command for Lexicard.
//!
//! Prints the effective configuration after every layer is applied.

use serde::{Deserialize, Serialize};

use crate::config::{state_path, user_config_path, Config};

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the config command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The config command implementation.
pub struct ConfigCommand {
    config: Config,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the config command.
    pub fn run(&self, _options: &ConfigOptions) -> ConfigOutput {
        ConfigOutput {
            success: true,
            config: Some(self.config.clone()),
            user_config_path: user_config_path().map(|p| p.display().to_string()),
            state_path: state_path().map(|p| p.display().to_string()),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConfigOutput, options: &ConfigOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let mut lines = Vec::new();
        if let Some(path) = &output.user_config_path {
            lines.push(format!("# config file: {}", path));
        }
        if let Some(path) = &output.state_path {
            lines.push(format!("# state file:  {}", path));
        }
        match output.config.as_ref().map(Config::to_toml) {
            Some(Ok(toml)) => lines.push(toml),
            Some(Err(e)) => lines.push(format!("Failed to render config: {}", e)),
            None => lines.push(format!(
                "Failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            )),
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_config_paths_follow_home() {
        let temp = TempDir::new().unwrap();
        env::set_var("LEXICARD_HOME", temp.path());

        let cmd = ConfigCommand::new(Config::default());
        let output = cmd.run(&ConfigOptions::default());
        env::remove_var("LEXICARD_HOME");

        assert!(output.success);
        assert!(output
            .state_path
            .unwrap()
            .starts_with(&temp.path().display().to_string()));
    }

    #[test]
    #[serial]
    fn test_human_output_is_toml() {
        let cmd = ConfigCommand::new(Config::default());
        let output = cmd.run(&ConfigOptions::default());
        let text = cmd.format_output(&output, &ConfigOptions::default());
        assert!(text.contains("[practice]"));
        assert!(text.contains("feedback_delay_ms = 2000"));
    }

    #[test]
    #[serial]
    fn test_json_output() {
        let cmd = ConfigCommand::new(Config::default());
        let output = cmd.run(&ConfigOptions::default());
        let json = cmd.format_output(
            &output,
            &ConfigOptions {
                json: true,
                quiet: false,
            },
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["config"]["extraction"]["model"], "gemini-1.5-flash");
    }
}
