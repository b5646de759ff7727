pub mod commands;
pub mod foreground;
pub mod host;

use std::fmt;
use std::path::PathBuf;

use crate::error::LaunchError;

pub use foreground::{run_foreground, ForegroundJob};
pub use host::{CommandSpec, Host, SystemHost};

/// A script the user asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub path: PathBuf,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
            Platform::Other => std::env::consts::OS,
        }
    }
}

/// One tier of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    NewConsole,
    TerminalApp,
    DesktopTerminal,
    TmuxWindow,
    TmuxSession,
    Foreground,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::NewConsole => "new console",
            Strategy::TerminalApp => "Terminal.app",
            Strategy::DesktopTerminal => "desktop terminal",
            Strategy::TmuxWindow => "tmux window",
            Strategy::TmuxSession => "tmux session",
            Strategy::Foreground => "foreground",
        };
        f.write_str(s)
    }
}

const WINDOWS_CHAIN: &[Strategy] = &[Strategy::NewConsole, Strategy::Foreground];
const MACOS_CHAIN: &[Strategy] = &[
    Strategy::TerminalApp,
    Strategy::TmuxWindow,
    Strategy::TmuxSession,
    Strategy::Foreground,
];
const DESKTOP_CHAIN: &[Strategy] = &[
    Strategy::DesktopTerminal,
    Strategy::TmuxWindow,
    Strategy::TmuxSession,
    Strategy::Foreground,
];
const IN_TERMINAL_CHAIN: &[Strategy] = &[
    Strategy::TmuxWindow,
    Strategy::TmuxSession,
    Strategy::Foreground,
];

/// Ordered tiers to try on `platform`.
pub fn strategies(platform: Platform, desktop: bool) -> &'static [Strategy] {
    match (platform, desktop) {
        (Platform::Windows, _) => WINDOWS_CHAIN,
        (Platform::MacOs, _) => MACOS_CHAIN,
        (Platform::Linux, true) => DESKTOP_CHAIN,
        (Platform::Linux, false) | (Platform::Other, _) => IN_TERMINAL_CHAIN,
    }
}

/// A display server or desktop session is present.
pub fn has_desktop<H: Host + ?Sized>(host: &H) -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY", "DESKTOP_SESSION"]
        .iter()
        .any(|key| host.env(key).is_some())
        || host
            .env("XDG_SESSION_TYPE")
            .is_some_and(|t| !t.eq_ignore_ascii_case("tty"))
}

/// What a tier turns into once it knows it applies.
enum Prepared {
    Spawn(CommandSpec),
    SpawnThenAttach { setup: CommandSpec, session: String },
    Foreground(ForegroundJob),
}

#[derive(Debug)]
pub enum Outcome {
    /// Running on its own; nothing left for the caller to do.
    Detached { strategy: Strategy },
    /// Needs the caller's terminal before it can run.
    Foreground { strategy: Strategy, job: ForegroundJob },
}

pub struct Launcher<H: Host> {
    host: H,
    platform: Platform,
    terminal: Option<String>,
}

impl<H: Host> Launcher<H> {
    pub fn new(host: H, platform: Platform, terminal: Option<String>) -> Self {
        Launcher {
            host,
            platform,
            terminal,
        }
    }

    pub fn chain(&self) -> &'static [Strategy] {
        let desktop = self.platform == Platform::Linux && has_desktop(&self.host);
        strategies(self.platform, desktop)
    }

    /// Walk the chain until one tier starts the script.
    ///
    /// Spawn failures fall through to the next tier. Only when every tier
    /// failed is the last error returned.
    pub fn launch(&self, req: &LaunchRequest) -> Result<Outcome, LaunchError> {
        self.run_chain(self.chain(), req)
    }

    fn run_chain(&self, chain: &[Strategy], req: &LaunchRequest) -> Result<Outcome, LaunchError> {
        let mut last_err = None;

        for &strategy in chain {
            let Some(prepared) = self.prepare(strategy, req) else {
                tracing::debug!(%strategy, "launch tier not available");
                continue;
            };
            match prepared {
                Prepared::Spawn(cmd) => match self.host.spawn_detached(&cmd) {
                    Ok(()) => {
                        tracing::info!(%strategy, script = %req.display_name, "launched");
                        return Ok(Outcome::Detached { strategy });
                    }
                    Err(e) => {
                        tracing::warn!(%strategy, error = %e, command = %cmd, "launch tier failed");
                        last_err = Some(LaunchError::Spawn {
                            strategy,
                            source: e,
                        });
                    }
                },
                Prepared::SpawnThenAttach { setup, session } => match self.host.run(&setup) {
                    Ok(true) => {
                        tracing::info!(%strategy, %session, "tmux session created");
                        let job = ForegroundJob::Attach {
                            command: commands::tmux_attach(&session),
                            session,
                        };
                        return Ok(Outcome::Foreground { strategy, job });
                    }
                    Ok(false) => {
                        tracing::warn!(%strategy, command = %setup, "tmux refused new session");
                    }
                    Err(e) => {
                        tracing::warn!(%strategy, error = %e, "launch tier failed");
                        last_err = Some(LaunchError::Spawn {
                            strategy,
                            source: e,
                        });
                    }
                },
                Prepared::Foreground(job) => {
                    tracing::info!(%strategy, script = %req.display_name, "running in foreground");
                    return Ok(Outcome::Foreground { strategy, job });
                }
            }
        }

        Err(last_err.unwrap_or(LaunchError::NoStrategy))
    }

    fn terminal_candidates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        if let Some(t) = self.terminal.as_deref().filter(|t| !t.is_empty()) {
            names.push(t);
        }
        for (name, _) in commands::TERMINAL_EMULATORS.iter() {
            if !names.contains(name) {
                names.push(*name);
            }
        }
        names
    }

    fn prepare(&self, strategy: Strategy, req: &LaunchRequest) -> Option<Prepared> {
        let path = req.path.as_path();
        let name = req.display_name.as_str();
        match strategy {
            Strategy::NewConsole => Some(Prepared::Spawn(commands::windows_console(path, name))),
            Strategy::TerminalApp => {
                self.host.find_executable("osascript")?;
                Some(Prepared::Spawn(commands::macos_terminal(path, name)))
            }
            Strategy::DesktopTerminal => {
                let terminal = self
                    .terminal_candidates()
                    .into_iter()
                    .find(|t| self.host.find_executable(t).is_some())?;
                Some(Prepared::Spawn(commands::desktop_terminal(
                    self.platform,
                    terminal,
                    path,
                    name,
                )))
            }
            Strategy::TmuxWindow => {
                self.host.env("TMUX")?;
                self.host.find_executable("tmux")?;
                Some(Prepared::Spawn(commands::tmux_window(self.platform, path, name)))
            }
            Strategy::TmuxSession => {
                self.host.find_executable("tmux")?;
                let session = commands::session_name(name, chrono::Local::now().time());
                let setup = commands::tmux_new_session(self.platform, &session, path, name);
                Some(Prepared::SpawnThenAttach { setup, session })
            }
            Strategy::Foreground => Some(Prepared::Foreground(ForegroundJob::Script {
                display_name: name.to_string(),
                path: req.path.clone(),
                command: commands::direct(self.platform, path, name),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::io;

    #[derive(Default)]
    struct FakeHost {
        env: HashMap<String, String>,
        executables: HashSet<String>,
        failing: HashSet<String>,
        lookups: RefCell<Vec<String>>,
        spawned: RefCell<Vec<CommandSpec>>,
        ran: RefCell<Vec<CommandSpec>>,
    }

    impl FakeHost {
        fn with_env(mut self, key: &str, value: &str) -> Self {
            self.env.insert(key.into(), value.into());
            self
        }

        fn with_exe(mut self, name: &str) -> Self {
            self.executables.insert(name.into());
            self
        }

        fn failing(mut self, program: &str) -> Self {
            self.failing.insert(program.into());
            self
        }
    }

    impl Host for FakeHost {
        fn env(&self, key: &str) -> Option<String> {
            self.env.get(key).filter(|v| !v.is_empty()).cloned()
        }

        fn find_executable(&self, name: &str) -> Option<PathBuf> {
            self.lookups.borrow_mut().push(name.to_string());
            self.executables
                .contains(name)
                .then(|| PathBuf::from("/usr/bin").join(name))
        }

        fn spawn_detached(&self, cmd: &CommandSpec) -> io::Result<()> {
            self.spawned.borrow_mut().push(cmd.clone());
            if self.failing.contains(&cmd.program) {
                Err(io::Error::new(io::ErrorKind::NotFound, "spawn refused"))
            } else {
                Ok(())
            }
        }

        fn run(&self, cmd: &CommandSpec) -> io::Result<bool> {
            self.ran.borrow_mut().push(cmd.clone());
            Ok(!self.failing.contains(&cmd.program))
        }
    }

    fn request(name: &str) -> LaunchRequest {
        LaunchRequest {
            path: PathBuf::from("/scripts").join(name),
            display_name: name.to_string(),
        }
    }

    fn linux(host: FakeHost) -> Launcher<FakeHost> {
        Launcher::new(host, Platform::Linux, None)
    }

    #[test]
    fn chains_per_platform() {
        assert_eq!(strategies(Platform::Windows, false), WINDOWS_CHAIN);
        assert_eq!(strategies(Platform::MacOs, false)[0], Strategy::TerminalApp);
        assert_eq!(strategies(Platform::Linux, true)[0], Strategy::DesktopTerminal);
        assert_eq!(strategies(Platform::Linux, false)[0], Strategy::TmuxWindow);
        assert_eq!(strategies(Platform::Other, true), IN_TERMINAL_CHAIN);
        for platform in [Platform::Windows, Platform::MacOs, Platform::Linux, Platform::Other] {
            for desktop in [true, false] {
                assert_eq!(strategies(platform, desktop).last(), Some(&Strategy::Foreground));
            }
        }
    }

    #[test]
    fn desktop_markers() {
        assert!(!has_desktop(&FakeHost::default()));
        assert!(has_desktop(&FakeHost::default().with_env("DISPLAY", ":0")));
        assert!(has_desktop(&FakeHost::default().with_env("WAYLAND_DISPLAY", "wayland-0")));
        assert!(has_desktop(&FakeHost::default().with_env("DESKTOP_SESSION", "gnome")));
        assert!(has_desktop(&FakeHost::default().with_env("XDG_SESSION_TYPE", "x11")));
        assert!(!has_desktop(&FakeHost::default().with_env("XDG_SESSION_TYPE", "tty")));
        assert!(!has_desktop(&FakeHost::default().with_env("DISPLAY", "")));
    }

    #[test]
    fn headless_linux_never_probes_gui_terminals() {
        let launcher = linux(FakeHost::default().with_exe("gnome-terminal").with_exe("xterm"));
        let outcome = launcher.launch(&request("a.sh")).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Foreground {
                strategy: Strategy::Foreground,
                job: ForegroundJob::Script { .. }
            }
        ));
        let lookups = launcher.host.lookups.borrow();
        for (emulator, _) in commands::TERMINAL_EMULATORS.iter() {
            assert!(!lookups.iter().any(|l| l == emulator), "probed {}", emulator);
        }
        assert!(launcher.host.spawned.borrow().is_empty());
    }

    #[test]
    fn desktop_uses_first_available_emulator() {
        let host = FakeHost::default()
            .with_env("DISPLAY", ":0")
            .with_exe("konsole")
            .with_exe("xterm");
        let launcher = linux(host);
        let outcome = launcher.launch(&request("a.sh")).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Detached {
                strategy: Strategy::DesktopTerminal
            }
        ));
        let spawned = launcher.host.spawned.borrow();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].program, "konsole");
        assert_eq!(spawned[0].args[..4], ["-e", "bash", "-l", "-c"]);
    }

    #[test]
    fn configured_terminal_is_probed_first() {
        let host = FakeHost::default()
            .with_env("WAYLAND_DISPLAY", "wayland-0")
            .with_exe("wezterm")
            .with_exe("gnome-terminal");
        let launcher = Launcher::new(host, Platform::Linux, Some("wezterm".into()));
        launcher.launch(&request("a.sh")).unwrap();

        let spawned = launcher.host.spawned.borrow();
        assert_eq!(spawned[0].program, "wezterm");
        assert_eq!(spawned[0].args[..2], ["start", "--"]);
    }

    #[test]
    fn missing_emulator_falls_back_to_tmux_window() {
        let host = FakeHost::default()
            .with_env("DISPLAY", ":0")
            .with_env("TMUX", "/tmp/tmux-1000/default,1,0")
            .with_exe("tmux");
        let launcher = linux(host);
        let outcome = launcher.launch(&request("a.sh")).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Detached {
                strategy: Strategy::TmuxWindow
            }
        ));
        assert_eq!(launcher.host.spawned.borrow()[0].args[0], "new-window");
    }

    #[test]
    fn failed_spawn_falls_through() {
        let host = FakeHost::default()
            .with_env("DISPLAY", ":0")
            .with_exe("xterm")
            .failing("xterm");
        let launcher = linux(host);
        let outcome = launcher.launch(&request("a.sh")).unwrap();

        assert!(matches!(
            outcome,
            Outcome::Foreground {
                strategy: Strategy::Foreground,
                ..
            }
        ));
        assert_eq!(launcher.host.spawned.borrow().len(), 1);
    }

    #[test]
    fn tmux_session_hands_attach_to_caller() {
        let launcher = linux(FakeHost::default().with_exe("tmux"));
        let outcome = launcher.launch(&request("my tool.sh")).unwrap();

        let (command, session) = match outcome {
            Outcome::Foreground {
                strategy: Strategy::TmuxSession,
                job: ForegroundJob::Attach { command, session },
            } => (command, session),
            other => panic!("expected tmux attach, got {:?}", other),
        };
        assert!(session.starts_with("pwr-my-tool-sh-"));
        assert_eq!(command.args, vec!["attach-session", "-t", session.as_str()]);

        let ran = launcher.host.ran.borrow();
        assert_eq!(ran.len(), 1);
        assert_eq!(ran[0].args[..4], ["new-session", "-d", "-s", session.as_str()]);
    }

    #[test]
    fn refused_tmux_session_runs_in_foreground() {
        let launcher = linux(FakeHost::default().with_exe("tmux").failing("tmux"));
        let outcome = launcher.launch(&request("a.sh")).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Foreground {
                strategy: Strategy::Foreground,
                ..
            }
        ));
    }

    #[test]
    fn windows_opens_console() {
        let launcher = Launcher::new(FakeHost::default(), Platform::Windows, None);
        let outcome = launcher.launch(&request("setup.ps1")).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Detached {
                strategy: Strategy::NewConsole
            }
        ));
        assert_eq!(launcher.host.spawned.borrow()[0].args[2], "powershell");
    }

    #[test]
    fn macos_uses_terminal_app() {
        let launcher = Launcher::new(
            FakeHost::default().with_exe("osascript"),
            Platform::MacOs,
            None,
        );
        let outcome = launcher.launch(&request("a.sh")).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Detached {
                strategy: Strategy::TerminalApp
            }
        ));
    }

    #[test]
    fn exhausted_chain_reports_last_error() {
        let host = FakeHost::default()
            .with_env("DISPLAY", ":0")
            .with_exe("xterm")
            .failing("xterm");
        let launcher = linux(host);
        let err = launcher
            .run_chain(&[Strategy::DesktopTerminal], &request("a.sh"))
            .unwrap_err();
        assert!(matches!(
            err,
            LaunchError::Spawn {
                strategy: Strategy::DesktopTerminal,
                ..
            }
        ));

        let err = launcher.run_chain(&[], &request("a.sh")).unwrap_err();
        assert!(matches!(err, LaunchError::NoStrategy));
    }
}
