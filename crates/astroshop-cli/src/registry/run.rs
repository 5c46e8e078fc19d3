use std::fs::create_dir_all;
use std::path::PathBuf;

use astroshop_generate::GenerateOptions;

use super::RegistryResult;

/// Artifact paths inside the output directory.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub out_dir: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
}

impl RunPaths {
    /// Resolve artifact paths without touching the filesystem.
    pub fn resolve(options: &GenerateOptions) -> Self {
        let out_dir = options.out_dir.clone();
        Self {
            config_path: out_dir.join("config.toml"),
            logs_path: out_dir.join("logs.ndjson"),
            out_dir,
        }
    }
}

/// Create the output directory and record the resolved configuration.
pub fn record_run(paths: &RunPaths, options: &GenerateOptions) -> RegistryResult<()> {
    create_dir_all(&paths.out_dir)?;
    std::fs::write(&paths.config_path, toml::to_string_pretty(options)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_options() -> GenerateOptions {
        GenerateOptions {
            out_dir: std::env::temp_dir().join(format!("astroshop-run-{}", uuid::Uuid::new_v4())),
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn resolving_paths_writes_nothing() {
        let options = scratch_options();
        let paths = RunPaths::resolve(&options);
        assert_eq!(paths.config_path, options.out_dir.join("config.toml"));
        assert_eq!(paths.logs_path, options.out_dir.join("logs.ndjson"));
        assert!(!options.out_dir.exists());
    }

    #[test]
    fn recorded_config_round_trips() {
        let options = scratch_options();
        let paths = RunPaths::resolve(&options);
        record_run(&paths, &options).expect("record run");

        let content = std::fs::read_to_string(&paths.config_path).expect("config file");
        let parsed: GenerateOptions = toml::from_str(&content).expect("parse config");
        assert_eq!(parsed, options);
        let _ = std::fs::remove_dir_all(&options.out_dir);
    }
}
