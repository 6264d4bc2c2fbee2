//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ClientConfig;

/// chunkdrop - resumable chunked file uploader.
#[derive(Debug, Parser)]
#[command(
    name = "chunkdrop",
    version,
    about = "chunkdrop - resumable chunked file uploader"
)]
pub struct Cli {
    /// Files to upload
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Server base URL (overrides the config file)
    #[arg(short = 's', long = "server", value_name = "URL")]
    pub server: Option<String>,

    /// Number of files uploaded at the same time
    #[arg(short = 'j', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Config file to use instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Upload files whose type is not on the allowlist
    #[arg(long = "allow-any-type")]
    pub allow_any_type: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.allow_any_type {
            config.enforce_allowed_types = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["chunkdrop"]).is_err());
    }

    #[test]
    fn overrides_apply_on_top_of_config() {
        let cli = Cli::try_parse_from([
            "chunkdrop",
            "--server",
            "http://10.0.0.5:5000/",
            "-j",
            "5",
            "--allow-any-type",
            "a.bin",
            "b.bin",
        ])
        .unwrap();
        assert_eq!(cli.files.len(), 2);

        let mut config = ClientConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.server_url, "http://10.0.0.5:5000/");
        assert_eq!(config.concurrency, 5);
        assert!(!config.enforce_allowed_types);
    }

    #[test]
    fn no_overrides_keeps_config() {
        let cli = Cli::try_parse_from(["chunkdrop", "a.txt"]).unwrap();
        let mut config = ClientConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, ClientConfig::default());
    }
}
