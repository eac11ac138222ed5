// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `assetline`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetline",
    version,
    about = "Build and watch front-end assets from a declarative task table.",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Project root. Every relative path in the configuration is resolved
    /// against it.
    #[arg(long, global = true, value_name = "PATH", default_value = ".")]
    pub root: PathBuf,

    /// Explicit configuration file (TOML), relative to `--root` unless
    /// absolute.
    ///
    /// Default: `assetline.toml` in the root, or the bundled configuration
    /// when that file does not exist.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Production mode: minify output and skip source maps.
    #[arg(long, global = true)]
    pub minify: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETLINE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run every task once and exit.
    Build,
    /// Build once, then rebuild tasks whose files change until Ctrl-C.
    ///
    /// Reload signals for the configured dev-server are published on an
    /// in-process channel only; this command does not serve files or reload
    /// browsers by itself.
    Watch,
    /// Remove the destination directory.
    Clean,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_follow_the_subcommand() {
        let args = CliArgs::try_parse_from([
            "assetline",
            "watch",
            "--minify",
            "--root",
            "/p",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Watch);
        assert!(args.minify);
        assert_eq!(args.root, PathBuf::from("/p"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.config.is_none());
    }

    #[test]
    fn watch_help_says_reloads_stay_in_process() {
        use clap::CommandFactory;

        let mut cmd = CliArgs::command();
        let help = cmd
            .find_subcommand_mut("watch")
            .expect("watch subcommand")
            .render_long_help()
            .to_string();
        assert!(help.contains("in-process channel only"), "{help}");
    }

    #[test]
    fn subcommand_is_required() {
        assert!(CliArgs::try_parse_from(["assetline"]).is_err());
    }
}
