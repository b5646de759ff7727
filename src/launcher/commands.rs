use std::path::Path;

use chrono::NaiveTime;

use super::host::CommandSpec;
use super::Platform;

/// Known emulators and the flags that precede the command they should run.
pub const TERMINAL_EMULATORS: [(&str, &[&str]); 7] = [
    ("gnome-terminal", &["--"]),
    ("konsole", &["-e"]),
    ("xfce4-terminal", &["-x"]),
    ("alacritty", &["-e"]),
    ("kitty", &[]),
    ("x-terminal-emulator", &["-e"]),
    ("xterm", &["-e"]),
];

const EXTRA_EMULATORS: [(&str, &[&str]); 3] = [
    ("wezterm", &["start", "--"]),
    ("foot", &[]),
    ("tilix", &["-e"]),
];

/// Exec flags for an emulator name, `-e` when unknown.
pub fn exec_flags(terminal: &str) -> &'static [&'static str] {
    TERMINAL_EMULATORS
        .iter()
        .chain(EXTRA_EMULATORS.iter())
        .find(|(name, _)| *name == terminal)
        .map(|(_, flags)| *flags)
        .unwrap_or(&["-e"])
}

/// POSIX single-quoting: `it's` becomes `'it'\''s'`.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn powershell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', "\\\"")
}

pub fn is_powershell(display_name: &str) -> bool {
    display_name.to_ascii_lowercase().ends_with(".ps1")
}

pub fn interpreter(platform: Platform, display_name: &str) -> &'static str {
    match (platform, is_powershell(display_name)) {
        (Platform::Windows, true) => "powershell",
        (_, true) => "pwsh",
        (_, false) => "bash",
    }
}

/// `<interpreter> '<path>'` as a shell fragment.
fn run_fragment(platform: Platform, path: &Path, display_name: &str) -> String {
    format!(
        "{} {}",
        interpreter(platform, display_name),
        shell_quote(&path.to_string_lossy())
    )
}

pub fn windows_console(path: &Path, display_name: &str) -> CommandSpec {
    let path = path.to_string_lossy();
    if is_powershell(display_name) {
        let script = format!(
            "Clear-Host; & {}; Write-Host ''; Read-Host 'Press Enter to exit'",
            powershell_quote(&path)
        );
        CommandSpec::new(
            "cmd",
            ["/C", "start", "powershell", "-NoExit", "-Command", script.as_str()],
        )
    } else {
        // Outer quotes keep `&&` away from the first cmd; the second strips them.
        let script = format!("\"cls && bash -l \"{}\" & pause\"", path);
        CommandSpec::new("cmd", ["/C", "start", "cmd", "/K"]).with_raw_arg(script)
    }
}

pub fn macos_terminal(path: &Path, display_name: &str) -> CommandSpec {
    let inner = format!(
        "clear; {}; echo; read -n 1 -s -r -p 'Press any key to exit...'",
        run_fragment(Platform::MacOs, path, display_name)
    );
    let script = format!(
        "tell application \"Terminal\"\n    do script \"{}\"\n    activate\nend tell",
        applescript_escape(&inner)
    );
    CommandSpec::new("osascript", ["-e", script.as_str()])
}

pub fn desktop_terminal(
    platform: Platform,
    terminal: &str,
    path: &Path,
    display_name: &str,
) -> CommandSpec {
    let inner = format!(
        "clear; {}; echo; read -p 'Press Enter to exit'",
        run_fragment(platform, path, display_name)
    );
    let mut args: Vec<String> = exec_flags(terminal).iter().map(|s| s.to_string()).collect();
    args.extend(["bash".to_string(), "-l".to_string(), "-c".to_string(), inner]);
    CommandSpec::new(terminal, args)
}

/// Print the script before it runs: `bat`, then Debian's `batcat`, then `cat`.
fn listing(path: &Path) -> String {
    let quoted = shell_quote(&path.to_string_lossy());
    format!(
        "if command -v bat >/dev/null 2>&1; then bat --style=numbers --color=always {q}; \
         elif command -v batcat >/dev/null 2>&1; then batcat --style=numbers --color=always {q}; \
         else cat {q}; fi",
        q = quoted
    )
}

fn tmux_body(
    platform: Platform,
    path: &Path,
    display_name: &str,
    hint: Option<&str>,
    close_prompt: &str,
) -> String {
    let hint = hint.map(|h| format!("echo {}; ", shell_quote(h))).unwrap_or_default();
    format!(
        "clear; echo {}; {}{}; echo; {}; echo; read -p {}",
        shell_quote(&format!("Running: {}", display_name)),
        hint,
        listing(path),
        run_fragment(platform, path, display_name),
        shell_quote(close_prompt)
    )
}

pub fn tmux_window(platform: Platform, path: &Path, display_name: &str) -> CommandSpec {
    let body = tmux_body(platform, path, display_name, None, "Press Enter to close this window...");
    CommandSpec::new("tmux", ["new-window", "-n", display_name, "bash", "-c", body.as_str()])
}

/// `pwr-<name>-<HHMMSS>` with every non-alphanumeric character turned into `-`.
pub fn session_name(display_name: &str, at: NaiveTime) -> String {
    let sanitized: String = display_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("pwr-{}-{}", sanitized, at.format("%H%M%S"))
}

pub fn tmux_new_session(
    platform: Platform,
    session: &str,
    path: &Path,
    display_name: &str,
) -> CommandSpec {
    let body = tmux_body(
        platform,
        path,
        display_name,
        Some("Use Ctrl+B then D to detach, or exit to close"),
        "Press Enter to close this session...",
    );
    CommandSpec::new("tmux", ["new-session", "-d", "-s", session, "bash", "-c", body.as_str()])
}

pub fn tmux_attach(session: &str) -> CommandSpec {
    CommandSpec::new("tmux", ["attach-session", "-t", session])
}

pub fn direct(platform: Platform, path: &Path, display_name: &str) -> CommandSpec {
    let path = path.to_string_lossy().to_string();
    if is_powershell(display_name) {
        CommandSpec::new(interpreter(platform, display_name), ["-File".to_string(), path])
    } else {
        CommandSpec::new("bash", [path])
    }
}
