use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::error::LaunchError;

use super::host::CommandSpec;

const RULE: &str = "========================================================";

/// Work that has to own the terminal. The event loop suspends the TUI,
/// runs it, then restores the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundJob {
    /// Run the script directly with inherited stdio, then wait for Enter.
    Script {
        display_name: String,
        path: PathBuf,
        command: CommandSpec,
    },
    /// Attach to a tmux session that already runs the script.
    Attach { session: String, command: CommandSpec },
}

impl ForegroundJob {
    pub fn describe(&self) -> String {
        match self {
            ForegroundJob::Script { display_name, .. } => {
                format!("Ran {} in this terminal", display_name)
            }
            ForegroundJob::Attach { session, .. } => {
                format!("Detached from tmux session {}", session)
            }
        }
    }
}

fn banner(out: &mut impl Write, display_name: &str, path: &Path) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Running script directly (no terminal multiplexer found) ===")?;
    writeln!(out, "Script: {}", display_name)?;
    writeln!(out, "Path:   {}", path.display())?;
    writeln!(out, "Install tmux to run scripts without leaving the browser.")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    out.flush()
}

fn wait_for_enter(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    write!(out, "Script finished. Press Enter to return...")?;
    out.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// Blocks until the job finishes. Call only while the TUI is suspended.
pub fn run_foreground(job: &ForegroundJob) -> Result<(), LaunchError> {
    let mut out = io::stdout();
    match job {
        ForegroundJob::Script {
            display_name,
            path,
            command,
        } => {
            banner(&mut out, display_name, path).map_err(|source| LaunchError::Foreground { source })?;
            let status = command
                .to_command()
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|source| LaunchError::Foreground { source })?;
            tracing::info!(script = %display_name, %status, "foreground script finished");
            wait_for_enter(&mut out).map_err(|source| LaunchError::Foreground { source })?;
            Ok(())
        }
        ForegroundJob::Attach { session, command } => {
            let status = command
                .to_command()
                .status()
                .map_err(|source| LaunchError::Foreground { source })?;
            tracing::info!(%session, %status, "tmux client exited");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_names_the_script() {
        let mut buf = Vec::new();
        banner(&mut buf, "a.sh", &PathBuf::from("/s/a.sh")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Script: a.sh"));
        assert!(text.contains("/s/a.sh"));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let job = ForegroundJob::Attach {
            session: "pwr-x".into(),
            command: CommandSpec::new("pwr-no-such-program-xyz", ["x"]),
        };
        assert!(matches!(
            run_foreground(&job),
            Err(LaunchError::Foreground { .. })
        ));
        assert_eq!(job.describe(), "Detached from tmux session pwr-x");
    }
}
