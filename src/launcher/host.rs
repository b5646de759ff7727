use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// A process invocation built as plain data so strategies can be inspected
/// without running anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Trailing argument handed to the program verbatim on Windows, where
    /// cmd.exe parses its own quotes and the C runtime's escaping breaks them.
    pub raw_arg: Option<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            raw_arg: None,
        }
    }

    pub fn with_raw_arg(mut self, arg: impl Into<String>) -> Self {
        self.raw_arg = Some(arg.into());
        self
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(raw) = &self.raw_arg {
            #[cfg(windows)]
            {
                use std::os::windows::process::CommandExt;
                cmd.raw_arg(raw);
            }
            #[cfg(not(windows))]
            cmd.arg(raw);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        if let Some(raw) = &self.raw_arg {
            write!(f, " {}", raw)?;
        }
        Ok(())
    }
}

/// Everything the dispatcher needs from the machine it runs on.
pub trait Host {
    /// Non-empty value of an environment variable.
    fn env(&self, key: &str) -> Option<String>;
    fn find_executable(&self, name: &str) -> Option<PathBuf>;
    /// Start `cmd` and return immediately. The child outlives the UI.
    fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()>;
    /// Run `cmd` to completion with no terminal attached; true on success.
    fn run(&self, cmd: &CommandSpec) -> io::Result<bool>;
}

pub struct SystemHost;

impl Host for SystemHost {
    fn env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()> {
        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group: Ctrl+C in the browser must not reach the script.
            command.process_group(0);
        }
        let mut child = command.spawn()?;
        let program = cmd.program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) => tracing::debug!(%program, %status, "detached child exited"),
            Err(e) => tracing::debug!(%program, error = %e, "detached child wait failed"),
        });
        Ok(())
    }

    fn run(&self, cmd: &CommandSpec) -> io::Result<bool> {
        let status = cmd
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments() {
        let spec = CommandSpec::new("tmux", ["new-window", "-n", "a b.sh"]);
        assert_eq!(spec.to_string(), r#"tmux "new-window" "-n" "a b.sh""#);
    }

    #[test]
    fn raw_argument_is_displayed_verbatim() {
        let spec = CommandSpec::new("cmd", ["/K"]).with_raw_arg(r#""echo "a b"""#);
        assert_eq!(spec.to_string(), r#"cmd "/K" "echo "a b"""#);
    }

    #[test]
    fn env_ignores_empty_values() {
        let host = SystemHost;
        assert!(host.env("PWR_TEST_SURELY_UNSET_VARIABLE").is_none());
    }
}
