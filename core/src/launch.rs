//! Hand control to the wrapped command.

use std::ffi::OsString;
use std::process::{Command, ExitCode};

use crate::error::LaunchError;

/// Run `command` in place of the current process.
///
/// On Unix the process image is replaced, so this only returns on failure.
/// Elsewhere the command runs as a child with inherited stdio and its exit
/// code is returned. An empty command returns success straight away.
///
/// # Errors
///
/// Returns [`LaunchError`] if the command cannot be started.
pub fn launch(command: &[OsString]) -> Result<ExitCode, LaunchError> {
    let Some((program, args)) = command.split_first() else {
        tracing::debug!("No command given, exiting");
        return Ok(ExitCode::SUCCESS);
    };

    tracing::debug!(program = %program.to_string_lossy(), args = args.len(), "Launching");
    let mut cmd = Command::new(program);
    cmd.args(args);

    run(&mut cmd, program)
}

/// Replace the current process with `cmd`.
#[cfg(unix)]
fn run(cmd: &mut Command, program: &OsString) -> Result<ExitCode, LaunchError> {
    use std::os::unix::process::CommandExt;

    let source = cmd.exec();
    Err(LaunchError::Exec {
        program: program.to_string_lossy().into_owned(),
        source,
    })
}

/// Run `cmd` as a child and propagate its exit code.
#[cfg(not(unix))]
fn run(cmd: &mut Command, program: &OsString) -> Result<ExitCode, LaunchError> {
    let mut child = cmd.spawn().map_err(|source| LaunchError::Exec {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;

    let status = child.wait().map_err(|source| LaunchError::Wait {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;

    Ok(status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_empty_command_succeeds() {
        let code = launch(&[]).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn test_unknown_program_is_reported() {
        let command = [OsString::from("/nonexistent/bootcfg-test-binary")];

        let result = launch(&command);

        assert!(matches!(
            result,
            Err(LaunchError::Exec { ref program, .. }) if program == "/nonexistent/bootcfg-test-binary"
        ));
    }
}
