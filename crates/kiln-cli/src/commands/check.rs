//! Check command implementation.
//!
//! Loads the layered configuration and runs the same validation a build
//! would, without compiling or bundling anything.

use crate::cli::CheckArgs;
use crate::config::KilnConfig;
use crate::error::Result;
use crate::ui;
use kiln_bundler::resolve_target;
use std::path::Path;

/// Execute the check command.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let mut config = KilnConfig::load(args.config.as_deref())?;
    if let Some(cwd) = &args.cwd {
        config.cwd = Some(cwd.clone());
    }

    config.validate()?;

    // The bundler-side validation needs resolved paths: entry existence,
    // output file naming, rule shadowing.
    let root = resolve_target(&config.project_root(), &[] as &[&Path])?;
    config.to_build_config(&root).validate()?;

    ui::success(&format!(
        "Configuration OK: entry {} -> {}/{}",
        config.entry,
        config.out_dir.display(),
        config.out_file
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CheckArgs;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_check_passes_for_valid_project() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.js"), "console.log(1);").unwrap();
        let config_path = dir.path().join("kiln.config.json");
        fs::write(&config_path, r#"{ "entry": "src/index.js" }"#).unwrap();

        let args = CheckArgs {
            config: Some(config_path),
            cwd: Some(dir.path().to_path_buf()),
        };
        execute(args).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_fails_for_missing_entry() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("kiln.config.json");
        fs::write(&config_path, r#"{ "entry": "src/missing.js" }"#).unwrap();

        let args = CheckArgs {
            config: Some(config_path),
            cwd: Some(dir.path().to_path_buf()),
        };
        let err = execute(args).await.unwrap_err();
        assert!(err.to_string().contains("entry"));
    }
}
