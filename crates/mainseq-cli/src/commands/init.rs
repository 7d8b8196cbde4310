//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_FILE: &str = "mainseq.toml";

const DEFAULT_CONFIG: &str = r#"# mainseq configuration

[analyzer]
# Module root, relative to the working directory (holds go.mod)
root = "."

# Glob patterns, relative to the module root, left out of discovery
exclude = [
    # "internal/mocks/**",
    # "**/*.pb.go",
]

# Files read or parsed at the same time (default: number of CPUs)
# max_concurrency = 8

[output]
# text, json or compact
format = "text"

# Decimals shown for each score (0-6)
precision = 1

# Colored text table
color = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    write_config(config_path, force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to exclude generated code");
    println!("  2. Run: mainseq analyse");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mainseq_core::Config;
    use tempfile::TempDir;

    #[test]
    fn template_is_a_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.output.format, "text");
        assert!(config.analyzer.exclude.is_empty());
        assert!(config.analyzer.max_concurrency.is_none());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
