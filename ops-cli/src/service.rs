use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::error::{DevenvError, Result};
use crate::exit_status::is_exit_status;
use crate::paths;
use crate::state::ServiceState;

/// A service of the monorepo, e.g. `ams` living in `account-service`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Service {
    #[serde(rename = "name")]
    pub short_name: String,
    /// Directory and executable name.
    pub directory: String,
    /// Not started or stopped by devenv.
    #[serde(rename = "skip", default)]
    pub skip_management: bool,
    #[serde(rename = "internal", default)]
    pub uses_internal_packages: bool,
    #[serde(default)]
    pub pci: bool,

    #[serde(skip)]
    root: PathBuf,
}

impl Service {
    pub fn new<S: Into<String>, D: Into<String>>(short_name: S, directory: D) -> Self {
        Self {
            short_name: short_name.into(),
            directory: directory.into(),
            skip_management: false,
            uses_internal_packages: false,
            pci: false,
            root: paths::monorepo_path(),
        }
    }

    /// Resolve paths against `root` instead of the monorepo found in the
    /// environment.
    #[must_use]
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = root.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn full_path(&self) -> PathBuf {
        self.root.join(&self.directory)
    }

    pub fn log_file(&self) -> PathBuf {
        self.full_path().join(format!("{}.log", self.short_name))
    }

    pub fn internal_path(&self) -> &'static str {
        if self.uses_internal_packages {
            "internal"
        } else {
            ""
        }
    }

    pub fn configuration_path(&self) -> PathBuf {
        self.full_path().join(self.internal_path()).join("configuration")
    }

    pub fn executable_path(&self) -> PathBuf {
        self.full_path().join(&self.directory)
    }

    /// `<service>/cmd/<service>`
    pub fn cmd_executable_path(&self) -> PathBuf {
        self.full_path().join("cmd").join(&self.directory)
    }

    pub fn has_cmd_executable(&self) -> bool {
        self.cmd_executable_path().is_dir()
    }

    /// Build and run the service unless it is running already.
    ///
    /// # Errors
    ///
    /// Fails when the state check, the build or the launch fails.
    pub fn start(&self, cover: bool) -> Result<ServiceState> {
        if self.pid().map_err(state_error)?.is_some() {
            return Ok(ServiceState::Running);
        }

        self.build(cover).map_err(|err| DevenvError::Build(Box::new(err)))?;
        self.run_executable(cover).map_err(|err| DevenvError::Run(Box::new(err)))?;

        match self.pid().map_err(state_error)? {
            Some(_) => Ok(ServiceState::Started),
            None => Ok(ServiceState::Unknown),
        }
    }

    /// Stop the service if it is running.
    ///
    /// # Errors
    ///
    /// Fails when the state check or `kill` fails.
    pub fn stop(&self) -> Result<ServiceState> {
        let Some(pid) = self.pid().map_err(state_error)? else {
            return Ok(ServiceState::NotRunning);
        };

        let mut kill = Command::new("kill");
        kill.arg(&pid);
        run(&mut kill).map_err(|err| DevenvError::Stop(Box::new(err)))?;

        match self.pid().map_err(state_error)? {
            None => Ok(ServiceState::Stopped),
            Some(_) => Ok(ServiceState::Unknown),
        }
    }

    /// `go build` the service, code-signing the result on macOS when
    /// `CODESIGN` is true.
    ///
    /// # Errors
    ///
    /// Fails when the compiler or `codesign` fails.
    pub fn build(&self, cover: bool) -> Result<()> {
        let mut command = Command::new("go");
        command.args(self.build_args(cover)).current_dir(self.full_path());
        run(&mut command)?;

        if env::consts::OS == "macos" && env::var("CODESIGN").is_ok_and(|value| parse_bool(&value)) {
            self.code_sign().map_err(|err| DevenvError::CodeSign(Box::new(err)))?;
        }

        Ok(())
    }

    pub fn build_args(&self, cover: bool) -> Vec<String> {
        let mut args = vec!["build".to_string()];
        let has_cmd = self.has_cmd_executable();

        if has_cmd {
            // go build -C cmd/<service> -o ../../
            args.push("-C".into());
            args.push(Path::new("cmd").join(&self.directory).to_string_lossy().into_owned());
            args.push("-o".into());
            args.push(Path::new("..").join("..").to_string_lossy().into_owned());
        }

        if cover {
            args.push("-cover".into());
            args.push("-covermode=atomic".into());
        }

        if !has_cmd {
            args.push(".".into());
        }

        args
    }

    /// Sign the executable with the developer certificate. An executable
    /// that is already signed is fine.
    ///
    /// # Errors
    ///
    /// Fails when `codesign` fails for any other reason.
    pub fn code_sign(&self) -> Result<()> {
        let mut command = Command::new("codesign");
        command
            .args(["-s", "Developer Certificate", &self.directory])
            .current_dir(self.full_path());

        match run(&mut command) {
            Err(DevenvError::CommandFailed { output, .. }) if output.contains("is already signed") => Ok(()),
            other => other.map(drop),
        }
    }

    /// PID of the running service, `None` when it is not running.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported OS or when the process lookup fails.
    pub fn pid(&self) -> Result<Option<String>> {
        let mut command = match env::consts::OS {
            "macos" => {
                let mut command = Command::new("pgrep");
                command.args(["-x", &self.directory]);
                command
            }
            "linux" => {
                let line = format!(
                    "ps -eo pid,cmd | awk '$2 == \"{}\" {{print $1}}'",
                    self.executable_path().display()
                );
                let mut command = Command::new("bash");
                command.args(["-c", &line]);
                command
            }
            other => return Err(DevenvError::UnsupportedOs(other.to_string())),
        };

        match run(&mut command) {
            Ok(output) => {
                let pid = output.trim();
                Ok((!pid.is_empty()).then(|| pid.to_string()))
            }
            // no process matched
            Err(err) if is_exit_status(&err, 1) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Launch the executable in the background. With `cover`, coverage data
    /// goes to the integration coverage directory.
    ///
    /// # Errors
    ///
    /// Fails when the coverage directory cannot be created or the executable
    /// cannot be spawned.
    // The service outlives devenv and is never waited for.
    #[allow(clippy::zombie_processes)]
    pub fn run_executable(&self, cover: bool) -> Result<()> {
        let executable = self.executable_path();
        let mut command = Command::new(&executable);
        command
            .current_dir(self.full_path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if cover {
            let directory = paths::integration_coverage_path(&self.root);
            fs::create_dir_all(&directory).map_err(|source| DevenvError::CreateDirectory {
                directory: directory.display().to_string(),
                source,
            })?;
            command.env("GOCOVERDIR", &directory);
        }

        debug!(program = %executable.display(), cover, "starting service");
        command.spawn().map_err(|source| DevenvError::Spawn {
            program: executable.display().to_string(),
            source,
        })?;

        Ok(())
    }

    pub(crate) fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.short_name, self.directory)
    }
}

fn state_error(err: DevenvError) -> DevenvError {
    DevenvError::State(Box::new(err))
}

/// Run `command` to completion, returning its stdout. A non-zero exit is an
/// error carrying stdout and stderr combined.
pub(crate) fn run(command: &mut Command) -> Result<String> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(
        program = %program,
        args = ?command.get_args().collect::<Vec<_>>(),
        "executing subprocess"
    );

    let output = command.output().map_err(|source| DevenvError::Spawn {
        program: program.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return Ok(stdout);
    }

    Err(DevenvError::CommandFailed {
        program,
        status: output.status,
        output: stdout + &String::from_utf8_lossy(&output.stderr),
    })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(root: &Path) -> Service {
        Service::new("ams", "account-service").with_root(root)
    }

    #[test]
    fn test_paths() {
        let mut service = service(Path::new("/mono"));

        assert_eq!(service.to_string(), "ams (account-service)");
        assert_eq!(service.full_path(), PathBuf::from("/mono/account-service"));
        assert_eq!(service.log_file(), PathBuf::from("/mono/account-service/ams.log"));
        assert_eq!(
            service.executable_path(),
            PathBuf::from("/mono/account-service/account-service")
        );
        assert_eq!(
            service.cmd_executable_path(),
            PathBuf::from("/mono/account-service/cmd/account-service")
        );
        assert_eq!(
            service.configuration_path(),
            PathBuf::from("/mono/account-service/configuration")
        );

        service.uses_internal_packages = true;
        assert_eq!(
            service.configuration_path(),
            PathBuf::from("/mono/account-service/internal/configuration")
        );
    }

    #[test]
    fn test_build_args_without_cmd_directory() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());

        assert!(!service.has_cmd_executable());
        assert_eq!(service.build_args(false), vec!["build", "."]);
        assert_eq!(
            service.build_args(true),
            vec!["build", "-cover", "-covermode=atomic", "."]
        );
    }

    #[test]
    fn test_build_args_with_cmd_directory() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());
        fs::create_dir_all(service.cmd_executable_path()).unwrap();

        assert!(service.has_cmd_executable());
        assert_eq!(
            service.build_args(true),
            vec!["build", "-C", "cmd/account-service", "-o", "../..", "-cover", "-covermode=atomic"]
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool(""));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_status_and_output() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo err >&2; exit 3"]);

        let err = run(&mut command).unwrap_err();
        assert!(is_exit_status(&err, 3));
        match err {
            DevenvError::CommandFailed { output, .. } => assert_eq!(output, "out\nerr\n"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_pid_of_service_that_is_not_running() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(service(root.path()).pid().unwrap(), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stop_service_that_is_not_running() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(service(root.path()).stop().unwrap(), ServiceState::NotRunning);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_executable_creates_coverage_directory() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());

        // no executable, so spawning fails after the directory is created
        let err = service.run_executable(true).unwrap_err();
        assert!(matches!(err, DevenvError::Spawn { .. }));
        assert!(paths::integration_coverage_path(root.path()).is_dir());
    }
}
