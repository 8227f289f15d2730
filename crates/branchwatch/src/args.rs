use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(
    version,
    about = "Report whether this installation is behind its upstream branch"
)]
pub struct CliArgs {
    /// Directory holding version.json (defaults to the executable's directory).
    #[arg(long, env = "BRANCHWATCH_INSTALL_DIR")]
    pub install_dir: Option<PathBuf>,

    #[arg(long, env = "BRANCHWATCH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Extra PEM root certificate to trust for API requests.
    #[arg(long, env = "BRANCHWATCH_CA_FILE")]
    pub ca_file: Option<PathBuf>,

    #[arg(long, default_value = branchwatch_core::DEFAULT_API_BASE, env = "BRANCHWATCH_API_BASE")]
    pub api_base: String,

    /// Additional remote to track, as a branch tree URL. May be repeated.
    #[arg(long = "builtin-remote", value_name = "TREE_URL")]
    pub builtin_remotes: Vec<String>,

    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the scheduled check if one is due (the default).
    Startup,
    /// Check now, regardless of the schedule.
    Check {
        /// Branch tree URL to check instead of the installed remote.
        #[arg(long, value_name = "TREE_URL")]
        remote: Option<String>,
    },
    /// Print settings, known results and errors without checking.
    Status,
    /// Track another remote, given as a branch tree URL.
    AddRemote { url: String },
    /// Write version metadata for a build, as done in CI.
    WriteVersion {
        /// Repository slug, `owner/repo`.
        repository: String,
        /// Branch the build was made from.
        ref_name: String,
        sha: String,
        #[arg(short, long, default_value = "version.json")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::{CliArgs, Command};

    #[test]
    fn no_subcommand_defaults_to_none() {
        let args = CliArgs::try_parse_from(["branchwatch"]).expect("bare invocation should parse");

        assert!(args.command.is_none());
        assert_eq!(args.api_base, branchwatch_core::DEFAULT_API_BASE);
        assert!(!args.verbose);
    }

    #[test]
    fn check_accepts_remote_and_global_flags() {
        let args = CliArgs::try_parse_from([
            "branchwatch",
            "--builtin-remote",
            "https://github.com/octo/widgets/tree/next",
            "--ca-file",
            "/opt/certs/root.pem",
            "check",
            "--remote",
            "https://github.com/octo/widgets/tree/dev",
        ])
        .expect("check invocation should parse");

        assert_eq!(args.builtin_remotes.len(), 1);
        assert!(args.ca_file.is_some());
        assert!(matches!(
            args.command,
            Some(Command::Check { remote: Some(ref url) }) if url.ends_with("/tree/dev")
        ));
    }

    #[test]
    fn write_version_takes_ci_values() {
        let args = CliArgs::try_parse_from([
            "branchwatch",
            "write-version",
            "octo/widgets",
            "main",
            "0123456789abcdef0123456789abcdef01234567",
            "--output",
            "dist/version.json",
        ])
        .expect("write-version invocation should parse");

        let Some(Command::WriteVersion {
            repository, output, ..
        }) = args.command
        else {
            panic!("expected write-version command");
        };
        assert_eq!(repository, "octo/widgets");
        assert!(output.ends_with("version.json"));
    }
}
