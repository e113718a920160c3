//! Command-line surface of the `da-mirror` binary.

use bridge_traits::sink::LogLevel;
use clap::Parser;
use core_runtime::config::{FolderSelection, RunConfig, DEFAULT_CREDENTIALS_PATH};
use core_runtime::logging::{LogFormat, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "da-mirror")]
#[command(about = "Incrementally mirror a DeviantArt user's galleries and collections")]
#[command(version)]
pub struct Cli {
    /// User whose content is mirrored
    pub user: String,

    /// Client credentials file ({"client_id": .., "client_secret": ..})
    #[arg(short = 'a', long, env = "DA_MIRROR_CREDS", default_value = DEFAULT_CREDENTIALS_PATH)]
    pub auth_creds: PathBuf,

    /// Output root; content lands in <output>/<user>
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Write failures to this file instead of stderr
    #[arg(short, long)]
    pub error_output: Option<PathBuf>,

    /// Print folder names and exit
    #[arg(short, long)]
    pub list: bool,

    /// Ignore cache markers and walk every page
    #[arg(short, long)]
    pub force_rebuild: bool,

    /// Gallery folders to sync; no names means all of them
    #[arg(short, long, num_args = 0.., value_name = "NAME")]
    pub galleries: Option<Vec<String>>,

    /// Sync the gallery "all items" folder
    #[arg(long)]
    pub gallery_all: bool,

    /// Collection folders to sync; no names means all of them
    #[arg(short, long, num_args = 0.., value_name = "NAME")]
    pub collections: Option<Vec<String>>,

    /// Attempts per listing call
    #[arg(long, default_value_t = core_runtime::config::DEFAULT_RETRY_ATTEMPTS)]
    pub retries: u32,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    pub log_format: LogFormat,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn run_config(&self) -> core_runtime::Result<RunConfig> {
        let mut builder = RunConfig::builder()
            .username(self.user.as_str())
            .output_root(&self.output)
            .credentials_path(&self.auth_creds)
            .error_output(self.error_output.clone())
            .list_only(self.list)
            .force_rebuild(self.force_rebuild)
            .gallery_all(self.gallery_all)
            .retry_attempts(self.retries);

        if let Some(names) = &self.galleries {
            builder = builder.galleries(FolderSelection::from_names(names.clone()));
        }
        if let Some(names) = &self.collections {
            builder = builder.collections(FolderSelection::from_names(names.clone()));
        }

        builder.build()
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let level = match self.verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };
        LoggingConfig::default()
            .with_format(self.log_format)
            .with_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("da-mirror").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["someartist"]);
        let config = cli.run_config().unwrap();

        assert_eq!(config.username, "someartist");
        assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
        assert!(config.error_output.is_none());
        assert!(config.plan.is_empty());
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_folder_selections() {
        let cli = parse(&["someartist", "-g", "-c", "Favourites", "Studies", "--gallery-all"]);
        let config = cli.run_config().unwrap();

        assert!(config.plan.gallery_all);
        assert_eq!(config.plan.galleries, Some(FolderSelection::All));
        assert_eq!(
            config.plan.collections,
            Some(FolderSelection::Named(vec![
                "Favourites".to_string(),
                "Studies".to_string()
            ]))
        );
    }

    #[test]
    fn test_flags_and_paths() {
        let cli = parse(&[
            "someartist",
            "-a",
            "/etc/da/creds.json",
            "-o",
            "/srv/mirror",
            "-e",
            "errors.log",
            "-l",
            "-f",
            "--retries",
            "5",
            "-vv",
        ]);
        let config = cli.run_config().unwrap();

        assert!(config.list_only);
        assert!(config.force_rebuild);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.user_root(), PathBuf::from("/srv/mirror/someartist"));
        assert_eq!(config.error_output, Some(PathBuf::from("errors.log")));
        assert_eq!(cli.logging_config().level, LogLevel::Trace);
    }

    #[test]
    fn test_zero_retries_rejected() {
        let cli = parse(&["someartist", "--retries", "0"]);
        assert!(cli.run_config().is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = Cli::try_parse_from(["da-mirror", "someartist", "--log-format", "xml"]);
        assert!(result.is_err());
    }
}
