use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};
use log::{debug, info, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use crate::config::GeneralConfig;
use crate::error::DockError;

/// The external commands a preset capture or apply needs.
pub trait DockTool {
    fn list(&self) -> Result<String, DockError>;
    fn remove_all(&self) -> Result<(), DockError>;
    fn add(&self, fragment: &str) -> Result<(), DockError>;
    fn restart_dock(&self) -> Result<(), DockError>;
}

pub struct DockUtil {
    tool_path: String,
    shell: String,
    dock_process: String,
}

impl DockUtil {
    pub fn new(config: &GeneralConfig) -> Self {
        Self {
            tool_path: config.dockutil_path.clone(),
            shell: config.shell.clone(),
            dock_process: config.dock_process.clone(),
        }
    }

    fn run(&self, command: &mut Command) -> Result<Output, DockError> {
        command.stdin(Stdio::null());
        debug!("Running {:?}", command);

        let output = command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                DockError::ToolUnavailable(format!("{}: {}", self.tool_path, e))
            }
            _ => DockError::ExecutionFailed { status: -1, message: e.to_string() },
        })?;

        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(DockError::ExecutionFailed {
            status: output.status.code().unwrap_or(-1),
            message,
        })
    }
}

impl DockTool for DockUtil {
    fn list(&self) -> Result<String, DockError> {
        let output = self.run(Command::new(&self.tool_path).args(["--list", "--no-restart"]))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn remove_all(&self) -> Result<(), DockError> {
        self.run(Command::new(&self.tool_path).args(["--remove", "all", "--no-restart"]))?;
        Ok(())
    }

    fn add(&self, fragment: &str) -> Result<(), DockError> {
        // Fragments are stored shell-quoted, so they go through the shell verbatim.
        let script = add_script(&self.tool_path, fragment);
        self.run(Command::new(&self.shell).arg("-c").arg(script))?;
        Ok(())
    }

    fn restart_dock(&self) -> Result<(), DockError> {
        let output = self.run(Command::new("pgrep").args(["-x", &self.dock_process]))?;
        let pids: Vec<i32> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|l| l.trim().parse().ok())
            .collect();

        if pids.is_empty() {
            return Err(DockError::ExecutionFailed {
                status: 1,
                message: format!("no running process named {}", self.dock_process),
            });
        }

        for pid in pids {
            if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
                warn!("Could not signal {} ({}): {}", self.dock_process, pid, e);
                return Err(DockError::ExecutionFailed { status: e as i32, message: e.desc().to_string() });
            }
        }
        info!("Sent SIGTERM to {}", self.dock_process);
        Ok(())
    }
}

fn add_script(tool_path: &str, fragment: &str) -> String {
    let tool = if tool_path.contains(' ') {
        format!("'{}'", tool_path.replace('\'', r"'\''"))
    } else {
        tool_path.to_string()
    };
    format!("{} --add {} --no-restart", tool, fragment)
}
