//! Subprocess execution for the 1Password CLI and rotation hooks

use std::process::Command;

use crate::error::{Result, RotationError};

/// Run a program and return its trimmed stdout.
///
/// `label` names the command in errors and logs; it must not contain
/// secret arguments.
pub fn run_program(program: &str, args: &[&str], label: &str) -> Result<String> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    run(cmd, program, label)
}

/// Run a shell command line with extra environment variables.
pub fn run_shell(command_line: &str, envs: &[(&str, &str)]) -> Result<String> {
    let (shell, flag) = if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    let mut cmd = Command::new(shell);
    cmd.arg(flag).arg(command_line);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    run(cmd, shell, command_line)
}

fn run(mut cmd: Command, program: &str, label: &str) -> Result<String> {
    tracing::debug!(command = label, "Running subprocess");

    let output = cmd.output().map_err(|source| RotationError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);
        Err(RotationError::CommandFailed {
            command: label.to_string(),
            code,
            stderr,
        })
    }
}
