use std::path::{Path, PathBuf};
use std::time::Duration;

use branchwatch_core::error_log::keys;
use branchwatch_core::{
    ClientBuildError, ClientConfig, CompareClient, RemoteIdentity, UpdateChecker, VersionRecord,
    render_report,
};
use branchwatch_platform::AppPaths;
use chrono::Utc;
use log::info;

use crate::args::{CliArgs, Command};
use crate::error::AppError;
use crate::logging;
use crate::settings::HostSettings;

pub async fn run(args: CliArgs) -> Result<(), AppError> {
    match args.command.clone().unwrap_or(Command::Startup) {
        Command::WriteVersion {
            repository,
            ref_name,
            sha,
            output,
        } => write_version(&repository, &ref_name, &sha, &output),
        Command::AddRemote { url } => {
            let mut session = Session::open(&args)?;
            add_remote(&mut session.settings, &session.settings_path, &url)
        }
        Command::Status => Session::open(&args)?.status(&args),
        Command::Check { remote } => Session::open(&args)?.check(&args, remote.as_deref()).await,
        Command::Startup => Session::open(&args)?.startup(&args).await,
    }
}

/// Loaded host settings plus where they are saved back to.
struct Session {
    settings_path: PathBuf,
    settings: HostSettings,
}

impl Session {
    fn open(args: &CliArgs) -> Result<Self, AppError> {
        let paths = AppPaths::new()?;
        let session = Self::load(&paths, args.settings.clone())?;

        logging::init_logging(
            &paths.log_file(),
            session.settings.debug_logging || args.verbose,
            args.verbose,
            session.settings.max_log_size_bytes,
        );

        Ok(session)
    }

    fn load(paths: &AppPaths, settings_path: Option<PathBuf>) -> Result<Self, AppError> {
        paths
            .ensure_dirs()
            .map_err(|source| AppError::CreateDirs { source })?;

        let settings_path = settings_path.unwrap_or_else(|| paths.settings_file());
        let settings = HostSettings::load(&settings_path);

        Ok(Self {
            settings_path,
            settings,
        })
    }

    fn checker(&self, args: &CliArgs) -> Result<UpdateChecker, AppError> {
        let install_dir = args
            .install_dir
            .clone()
            .or_else(AppPaths::install_dir)
            .ok_or(AppError::InstallDirUnknown)?;

        build_checker(args, &install_dir, self.settings.http_timeout_secs)
    }

    fn save(&self) -> Result<(), AppError> {
        self.settings
            .save(&self.settings_path)
            .map_err(|source| AppError::SaveSettings {
                path: self.settings_path.clone(),
                source,
            })
    }

    fn status(&self, args: &CliArgs) -> Result<(), AppError> {
        let checker = self.checker(args)?;
        println!("{}", render_report(&self.settings.update_checker, &checker));
        Ok(())
    }

    async fn startup(mut self, args: &CliArgs) -> Result<(), AppError> {
        let mut checker = self.checker(args)?;
        let before = self.settings.update_checker.clone();

        let result = checker
            .run_startup_check(&mut self.settings.update_checker, Utc::now())
            .await;

        if self.settings.update_checker != before {
            self.save()?;
        }
        println!("{}", render_report(&self.settings.update_checker, &checker));

        let outcome = result?;
        info!("Startup check finished: {outcome:?}");
        Ok(())
    }

    async fn check(mut self, args: &CliArgs, remote_url: Option<&str>) -> Result<(), AppError> {
        let checker = self.checker(args)?;
        let remote = remote_url
            .map(RemoteIdentity::parse_tree_url)
            .transpose()?;
        let installed = checker.version().map(|version| &version.remote);

        let result = match remote {
            Some(remote) if installed != Some(&remote) => checker.check_remote(&remote).await,
            _ => {
                let result = checker
                    .check_installed(&mut self.settings.update_checker, Utc::now())
                    .await;
                if result.is_ok() {
                    self.save()?;
                }
                result
            }
        };

        println!("{}", render_report(&self.settings.update_checker, &checker));
        let outcome = result?;
        info!(
            "On-demand check finished: {} new commit(s), {} behind",
            outcome.ahead_by, outcome.behind_by
        );
        Ok(())
    }
}

/// Wire the session context for `install_dir`.
///
/// Problems with inputs the user did not pass explicitly (the bundled
/// certificate, built-in remotes) are recorded in the error log instead of
/// failing the command.
fn build_checker(
    args: &CliArgs,
    install_dir: &Path,
    timeout_secs: u64,
) -> Result<UpdateChecker, AppError> {
    let config = ClientConfig {
        api_base: args.api_base.clone(),
        ca_file: None,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        ..ClientConfig::default()
    };
    let mut wiring_errors: Vec<(&str, String)> = Vec::new();

    let client = match (&args.ca_file, AppPaths::bundled_ca_file(install_dir)) {
        (Some(ca_file), _) => CompareClient::new(&ClientConfig {
            ca_file: Some(ca_file.clone()),
            ..config
        })?,
        (None, Some(bundled)) => match CompareClient::new(&ClientConfig {
            ca_file: Some(bundled),
            ..config.clone()
        }) {
            Ok(client) => client,
            Err(
                build_error @ (ClientBuildError::ReadCertificate { .. }
                | ClientBuildError::InvalidCertificate { .. }),
            ) => {
                wiring_errors.push((keys::TRUSTED_CERTIFICATE, build_error.to_string()));
                CompareClient::new(&config)?
            }
            Err(build_error) => return Err(build_error.into()),
        },
        (None, None) => CompareClient::new(&config)?,
    };

    let mut builtin = Vec::new();
    let mut rejected = Vec::new();
    for url in &args.builtin_remotes {
        match RemoteIdentity::parse_tree_url(url) {
            Ok(remote) => builtin.push(remote),
            Err(parse_error) => rejected.push(parse_error.to_string()),
        }
    }
    if !rejected.is_empty() {
        wiring_errors.push((keys::BUILTIN_REMOTE, rejected.join("\n")));
    }

    let checker = UpdateChecker::load(&AppPaths::version_file(install_dir), client, builtin);
    for (key, detail) in wiring_errors {
        checker.errors().set(key, detail);
    }
    Ok(checker)
}

fn add_remote(settings: &mut HostSettings, settings_path: &Path, url: &str) -> Result<(), AppError> {
    if settings.update_checker.add_custom_remote_from_url(url)? {
        settings
            .save(settings_path)
            .map_err(|source| AppError::SaveSettings {
                path: settings_path.to_path_buf(),
                source,
            })?;
        info!("Tracking custom remote {url}");
        println!("Added {url}");
    } else {
        println!("{url} is already tracked");
    }
    Ok(())
}

fn write_version(
    repository: &str,
    ref_name: &str,
    sha: &str,
    output: &Path,
) -> Result<(), AppError> {
    let record = VersionRecord::from_ci(repository, ref_name, sha)?;
    record.write(output)?;
    println!(
        "Wrote {} for {} at {}",
        output.display(),
        record.remote,
        record.commit.as_deref().unwrap_or("branch tip")
    );
    Ok(())
}
