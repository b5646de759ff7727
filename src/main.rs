mod app;
mod config;
mod data;
mod error;
mod event;
mod launcher;
mod logging;
mod model;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self as ct_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{Action, ActiveTab, App, Effect, Focus};
use crate::config::UserConfig;
use crate::data::repository::{self, DEFAULT_REPO_URL};
use crate::event::{AppEvent, MirrorResult};
use crate::launcher::{run_foreground, LaunchRequest, Launcher, Outcome, Platform, SystemHost};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[derive(Parser)]
#[command(
    name = "pwr",
    version,
    about = "Terminal script browser: browse, search by tag and run scripts from a scriptbin",
    after_help = KEYS_HELP,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Browse this directory instead of the mirrored repository (no sync)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Skip the startup sync and use the existing checkout
    #[arg(long)]
    no_sync: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change the script repository
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
}

#[derive(Subcommand)]
enum RepoAction {
    /// Print the configured repository and its checkout path
    Show,
    /// Use a custom repository (must end in .git)
    Set { url: String },
    /// Go back to the default repository
    Reset,
}

const KEYS_HELP: &str = "\
TUI KEYBINDINGS:
  Tab / Shift+Tab    Cycle tabs (1-3 jump)
  j/k  Up/Down       Move selection / scroll preview
  Enter              Run script / open directory
  Right / Left       Open directory / go to parent (also Backspace)
  /                  Search tags (space separated, all must match)
  Esc                Leave search, then clear the filter
  v                  Toggle tree / all scripts
  F5                 Reload and clear cached previews
  ?                  Toggle help overlay
  q / Ctrl+C         Quit

Set PWR_LOG=debug for verbose logs.";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(&config::log_dir());

    let config_path = config::config_path();
    let user_config = config::load_user_config(&config_path);

    match cli.command {
        Some(Command::Repo { action }) => repo_command(action, user_config, &config_path),
        None => {
            let root = prepare_root(cli.root, cli.no_sync, &user_config)?;
            run_tui(root, user_config)
        }
    }
}

fn repo_command(action: RepoAction, cfg: UserConfig, config_path: &Path) -> Result<()> {
    let home = config::dirs_base();
    match action {
        RepoAction::Show => {
            println!("Repository: {}", cfg.repo_url());
            println!("Default:    {}", DEFAULT_REPO_URL);
            println!("Checkout:   {}", cfg.checkout_dir(&home).display());
            println!("Config:     {}", config_path.display());
            Ok(())
        }
        RepoAction::Set { url } => {
            let url = url.trim();
            repository::validate_repo_url(url)
                .with_context(|| format!("invalid repository URL '{}'", url))?;
            let cfg = cfg.with_repo_url(Some(url));
            config::save_user_config(config_path, &cfg)?;
            println!("Repository set to {}", cfg.repo_url());
            println!("Checkout:   {}", cfg.checkout_dir(&home).display());
            Ok(())
        }
        RepoAction::Reset => {
            let cfg = cfg.with_repo_url(None);
            config::save_user_config(config_path, &cfg)?;
            println!("Repository reset to {}", DEFAULT_REPO_URL);
            Ok(())
        }
    }
}

/// Directory the browser starts in, mirroring the repository first unless
/// told not to.
fn prepare_root(root: Option<PathBuf>, no_sync: bool, cfg: &UserConfig) -> Result<PathBuf> {
    if let Some(dir) = root {
        if !dir.is_dir() {
            bail!("{} is not a directory", dir.display());
        }
        return Ok(dir);
    }

    let checkout = cfg.checkout_dir(&config::dirs_base());
    if no_sync {
        if !checkout.is_dir() {
            bail!(
                "no local checkout at {}; run once without --no-sync",
                checkout.display()
            );
        }
        return Ok(checkout);
    }

    println!("Syncing {} ...", cfg.repo_url());
    match repository::mirror(cfg.repo_url(), &checkout) {
        Ok(()) => Ok(checkout),
        Err(e) if checkout.is_dir() => {
            tracing::warn!(error = %format!("{:#}", e), "startup sync failed, using existing checkout");
            eprintln!("warning: sync failed ({:#}); using existing checkout", e);
            Ok(checkout)
        }
        Err(e) => Err(e.context(format!("could not mirror {}", cfg.repo_url()))),
    }
}

fn run_tui(root: PathBuf, user_config: UserConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, root, user_config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{:#}", e), "exiting with error");
        eprintln!("Error: {:#}", e);
    }
    tracing::info!("pwr exiting");
    result
}

fn run_app(terminal: &mut Tui, root: PathBuf, user_config: UserConfig) -> Result<()> {
    let tick_rate = Duration::from_millis(user_config.tick_rate());
    let launcher = Launcher::new(
        SystemHost,
        Platform::current(),
        user_config.terminal().map(str::to_string),
    );
    tracing::info!(
        root = %root.display(),
        platform = Platform::current().name(),
        chain = ?launcher.chain(),
        "browser started"
    );

    let mut app = App::new(root, config::dirs_base(), user_config);
    let (tx, rx) = mpsc::channel::<AppEvent>();

    let mut dirty = true;
    let mut last_tick = Instant::now();

    loop {
        // Draw only when dirty
        if dirty {
            terminal.draw(|f| ui::draw(f, &app))?;
            dirty = false;
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if ct_event::poll(timeout)? {
            match ct_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = key_to_action(&app, key) {
                        let (next, effects) = app.update(action);
                        app = run_effects(terminal, next, effects, &launcher, &tx)?;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        // Background results
        while let Ok(evt) = rx.try_recv() {
            let action = match evt {
                AppEvent::RepositoryMirrored(result) => Action::MirrorFinished(result),
            };
            let (next, effects) = app.update(action);
            app = run_effects(terminal, next, effects, &launcher, &tx)?;
            dirty = true;
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn run_effects(
    terminal: &mut Tui,
    mut app: App,
    effects: Vec<Effect>,
    launcher: &Launcher<SystemHost>,
    tx: &mpsc::Sender<AppEvent>,
) -> Result<App> {
    for effect in effects {
        match effect {
            Effect::Launch(req) => {
                let report = launch(terminal, launcher, &req);
                let (next, _) = app.update(Action::LaunchReport(report));
                app = next;
            }
            Effect::SaveConfig(cfg) => {
                if let Err(e) = config::save_user_config(&config::config_path(), &cfg) {
                    tracing::warn!(error = %format!("{:#}", e), "could not save config");
                }
            }
            Effect::Mirror { url, dest } => spawn_mirror(url, dest, tx.clone()),
        }
    }
    Ok(app)
}

/// Start the script and describe what happened for the preview pane.
fn launch(terminal: &mut Tui, launcher: &Launcher<SystemHost>, req: &LaunchRequest) -> String {
    match launcher.launch(req) {
        Ok(Outcome::Detached { strategy }) => {
            format!("Launched {} ({})", req.display_name, strategy)
        }
        Ok(Outcome::Foreground { strategy, job }) => {
            let done = format!("{} ({})", job.describe(), strategy);
            run_suspended(terminal, &req.display_name, done, || run_foreground(&job))
        }
        Err(e) => {
            tracing::warn!(error = %e, script = %req.display_name, "launch failed");
            format!("Failed to launch {}: {}", req.display_name, e)
        }
    }
}

/// The terminal modes the browser holds while it draws.
trait Screen {
    fn suspend(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
}

impl Screen for Tui {
    fn suspend(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.backend_mut(), LeaveAlternateScreen)?;
        self.show_cursor()?;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(self.backend_mut(), EnterAlternateScreen)?;
        self.clear()?;
        Ok(())
    }
}

/// Hand the terminal to `run` and take it back afterwards.
///
/// Terminal errors on either side are logged and folded into the returned
/// report; the browser keeps going. A failed hand-over skips the run.
fn run_suspended<S: Screen, E: std::fmt::Display>(
    screen: &mut S,
    name: &str,
    done: String,
    run: impl FnOnce() -> std::result::Result<(), E>,
) -> String {
    if let Err(e) = screen.suspend() {
        tracing::warn!(error = %format!("{:#}", e), script = %name, "could not release terminal");
        let restore = restore_screen(screen);
        return format!("Could not hand the terminal to {}: {:#}{}", name, e, restore);
    }
    let result = run();
    let restore = restore_screen(screen);
    match result {
        Ok(()) => format!("{}{}", done, restore),
        Err(e) => {
            tracing::warn!(error = %e, script = %name, "foreground run failed");
            format!("Failed to run {}: {}{}", name, e, restore)
        }
    }
}

/// Re-enter the UI, retrying once. Empty on success, else a note for the report.
fn restore_screen<S: Screen>(screen: &mut S) -> String {
    let Err(first) = screen.resume() else {
        return String::new();
    };
    tracing::warn!(error = %format!("{:#}", first), "could not restore terminal, retrying");
    match screen.resume() {
        Ok(()) => String::new(),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "terminal restore failed");
            format!(" (terminal restore failed: {:#})", e)
        }
    }
}

fn spawn_mirror(url: String, dest: PathBuf, tx: mpsc::Sender<AppEvent>) {
    std::thread::spawn(move || {
        let result = repository::mirror(&url, &dest).map_err(|e| format!("{:#}", e));
        if let Err(ref e) = result {
            tracing::warn!(%url, error = %e, "repository mirror failed");
        }
        let _ = tx.send(AppEvent::RepositoryMirrored(MirrorResult { url, dest, result }));
    });
}

/// Map a key press to an action for the current state. `None` means ignore.
fn key_to_action(app: &App, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    // Help overlay swallows everything but its own toggles
    if app.show_help {
        return match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }

    // URL editor gets raw input
    if app.active_tab == ActiveTab::Options && app.options.editor.is_some() {
        return match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Activate),
            _ => Some(Action::EditorInput(key.into())),
        };
    }

    if app.active_tab == ActiveTab::Scripts && app.focus == Focus::Search {
        return match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::ConfirmSearch),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(c) if !ctrl => Some(Action::SearchInput(c)),
            _ => None,
        };
    }

    let on_scripts = app.active_tab == ActiveTab::Scripts;
    match key.code {
        KeyCode::Char('h') if ctrl => Some(Action::FocusList),
        KeyCode::Char('l') if ctrl => Some(Action::FocusPreview),
        KeyCode::Left if ctrl => Some(Action::FocusList),
        KeyCode::Right if ctrl => Some(Action::FocusPreview),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Tab => Some(Action::NextTab),
        KeyCode::BackTab => Some(Action::PrevTab),
        KeyCode::Char(c @ '1'..='3') => {
            let idx = (c as usize) - ('1' as usize);
            ActiveTab::ALL.get(idx).map(|t| Action::SelectTab(*t))
        }
        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::Top),
        KeyCode::End | KeyCode::Char('G') => Some(Action::Bottom),
        KeyCode::Enter => Some(Action::Activate),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Right if on_scripts => Some(Action::Descend),
        KeyCode::Left | KeyCode::Backspace if on_scripts => Some(Action::Ascend),
        KeyCode::Right => Some(Action::FocusPreview),
        KeyCode::Left => Some(Action::FocusList),
        KeyCode::Char('/') if on_scripts => Some(Action::StartSearch),
        KeyCode::Char('v') if on_scripts => Some(Action::ToggleViewMode),
        KeyCode::F(5) => Some(Action::Refresh),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.sh"), "echo a\n").unwrap();
        let app = App::new(
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
            UserConfig::default(),
        );
        (dir, app)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Screen whose calls fail while their counters are non-zero.
    #[derive(Default)]
    struct FlakyScreen {
        suspend_failures: usize,
        resume_failures: usize,
        resumes: usize,
    }

    impl Screen for FlakyScreen {
        fn suspend(&mut self) -> Result<()> {
            if self.suspend_failures > 0 {
                self.suspend_failures -= 1;
                bail!("not a tty");
            }
            Ok(())
        }

        fn resume(&mut self) -> Result<()> {
            self.resumes += 1;
            if self.resume_failures > 0 {
                self.resume_failures -= 1;
                bail!("raw mode unavailable");
            }
            Ok(())
        }
    }

    #[test]
    fn foreground_run_reports_normally() {
        let mut screen = FlakyScreen::default();
        let report =
            run_suspended(&mut screen, "a.sh", "Ran a.sh (direct)".into(), || anyhow::Ok(()));
        assert_eq!(report, "Ran a.sh (direct)");
        assert_eq!(screen.resumes, 1);
    }

    #[test]
    fn failed_release_skips_the_run_and_restores() {
        let mut screen = FlakyScreen { suspend_failures: 1, ..Default::default() };
        let mut ran = false;
        let report = run_suspended(&mut screen, "a.sh", "done".into(), || {
            ran = true;
            anyhow::Ok(())
        });
        assert!(!ran);
        assert_eq!(report, "Could not hand the terminal to a.sh: not a tty");
        assert_eq!(screen.resumes, 1);
    }

    #[test]
    fn restore_failures_are_reported_not_fatal() {
        let mut screen = FlakyScreen { resume_failures: 1, ..Default::default() };
        let report = run_suspended(&mut screen, "a.sh", "done".into(), || anyhow::Ok(()));
        assert_eq!(report, "done");
        assert_eq!(screen.resumes, 2);

        let mut screen = FlakyScreen { resume_failures: 2, ..Default::default() };
        let report = run_suspended(&mut screen, "a.sh", "done".into(), || -> Result<()> {
            bail!("exit 3")
        });
        assert_eq!(
            report,
            "Failed to run a.sh: exit 3 (terminal restore failed: raw mode unavailable)"
        );
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn list_keys() {
        let (_dir, app) = app();
        assert!(matches!(key_to_action(&app, press(KeyCode::Char('j'))), Some(Action::MoveDown)));
        assert!(matches!(key_to_action(&app, press(KeyCode::Backspace)), Some(Action::Ascend)));
        assert!(matches!(key_to_action(&app, press(KeyCode::Right)), Some(Action::Descend)));
        assert!(matches!(key_to_action(&app, press(KeyCode::F(5))), Some(Action::Refresh)));
        assert!(matches!(key_to_action(&app, ctrl('l')), Some(Action::FocusPreview)));
        assert!(matches!(
            key_to_action(&app, press(KeyCode::Char('3'))),
            Some(Action::SelectTab(ActiveTab::About))
        ));
        assert!(key_to_action(&app, press(KeyCode::Char('9'))).is_none());
    }

    #[test]
    fn search_focus_captures_letters() {
        let (_dir, app) = app();
        let (app, _) = app.update(Action::StartSearch);
        assert!(matches!(
            key_to_action(&app, press(KeyCode::Char('q'))),
            Some(Action::SearchInput('q'))
        ));
        assert!(matches!(key_to_action(&app, press(KeyCode::Enter)), Some(Action::ConfirmSearch)));
        assert!(matches!(key_to_action(&app, ctrl('c')), Some(Action::Quit)));
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let (_dir, app) = app();
        let (app, _) = app.update(Action::ToggleHelp);
        assert!(key_to_action(&app, press(KeyCode::Char('j'))).is_none());
        assert!(matches!(key_to_action(&app, press(KeyCode::Esc)), Some(Action::Cancel)));
    }

    #[test]
    fn options_arrows_switch_panes() {
        let (_dir, app) = app();
        let (app, _) = app.update(Action::SelectTab(ActiveTab::Options));
        assert!(matches!(key_to_action(&app, press(KeyCode::Right)), Some(Action::FocusPreview)));
        assert!(matches!(key_to_action(&app, press(KeyCode::Left)), Some(Action::FocusList)));
        assert!(key_to_action(&app, press(KeyCode::Char('/'))).is_none());
    }

    #[test]
    fn root_flag_requires_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = UserConfig::default();
        let root = prepare_root(Some(dir.path().to_path_buf()), false, &cfg).unwrap();
        assert_eq!(root, dir.path());
        assert!(prepare_root(Some(dir.path().join("missing")), false, &cfg).is_err());
    }

    #[test]
    fn cli_parses_repo_subcommands() {
        let cli = Cli::try_parse_from(["pwr", "repo", "set", "https://example.com/x.git"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Repo { action: RepoAction::Set { ref url } }) if url == "https://example.com/x.git"
        ));
        let cli = Cli::try_parse_from(["pwr", "--no-sync"]).unwrap();
        assert!(cli.no_sync);
        assert!(cli.command.is_none());
    }
}
