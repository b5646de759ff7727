use std::path::PathBuf;

use chrono::{DateTime, Local};
use tui_textarea::{Input, TextArea};

use crate::config::UserConfig;
use crate::data::catalog::{self, ViewMode};
use crate::data::repository;
use crate::data::search;
use crate::data::cache::ContentCache;
use crate::data::highlight::HighlightedLine;
use crate::event::MirrorResult;
use crate::launcher::LaunchRequest;
use crate::model::entry::Entry;
use crate::model::panel::{OptionItem, OptionsCategory, PanelItem};
use crate::ui::theme::{self, PALETTES};

/// Lines moved by Page Up / Page Down.
pub const PAGE_STEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    Scripts,
    Options,
    About,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 3] = [ActiveTab::Scripts, ActiveTab::Options, ActiveTab::About];

    pub fn title(self) -> &'static str {
        match self {
            ActiveTab::Scripts => "Scripts",
            ActiveTab::Options => "Options",
            ActiveTab::About => "About",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Preview,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsPane {
    Categories,
    Items,
}

/// Where to return to when ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentNav {
    pub path: PathBuf,
    pub index: usize,
}

/// What the right-hand pane of the Scripts tab shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// Cached contents of the selected script.
    Script { path: PathBuf },
    Directory { name: String },
    /// Nothing visible in the list.
    Empty,
    /// Status text that replaces the preview until the selection moves.
    Message(String),
}

/// Discrete user or system inputs fed to [`App::update`].
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    NextTab,
    PrevTab,
    SelectTab(ActiveTab),
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Ascend,
    Descend,
    Activate,
    FocusList,
    FocusPreview,
    StartSearch,
    SearchInput(char),
    SearchBackspace,
    ConfirmSearch,
    Cancel,
    ToggleViewMode,
    Refresh,
    ToggleHelp,
    EditorInput(Input),
    /// Result of a launch, shown in the preview pane.
    LaunchReport(String),
    MirrorFinished(MirrorResult),
}

/// Side effects requested by a transition, executed by the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Launch(LaunchRequest),
    SaveConfig(UserConfig),
    Mirror { url: String, dest: PathBuf },
}

pub struct OptionsState {
    pub pane: OptionsPane,
    pub category_index: usize,
    pub item_index: usize,
    /// Shown once a category was opened with Enter.
    pub open_category: Option<OptionsCategory>,
    pub editor: Option<TextArea<'static>>,
    pub editor_error: Option<String>,
    pub status: Option<String>,
    pub mirroring: bool,
}

impl OptionsState {
    fn new() -> Self {
        OptionsState {
            pane: OptionsPane::Categories,
            category_index: 0,
            item_index: 0,
            open_category: None,
            editor: None,
            editor_error: None,
            status: None,
            mirroring: false,
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub active_tab: ActiveTab,
    pub show_help: bool,

    // Config
    pub config: UserConfig,
    pub home: PathBuf,
    pub theme_index: usize,

    // Navigation
    pub root: PathBuf,
    pub current_dir: PathBuf,
    pub parents: Vec<ParentNav>,
    pub view_mode: ViewMode,
    pub focus: Focus,

    // Catalog: every entry of the current read, and the positions that pass the filter
    pub catalog: Vec<Entry>,
    pub visible: Vec<usize>,
    pub selected: usize,

    // Search
    pub search_input: String,
    pub search_tokens: Vec<String>,

    // Preview
    pub preview: Preview,
    pub preview_scroll: usize,
    pub cache: ContentCache,

    pub options: OptionsState,
    pub last_sync: Option<DateTime<Local>>,
}

impl App {
    pub fn new(root: PathBuf, home: PathBuf, config: UserConfig) -> Self {
        let theme_index = theme::palette_index(config.theme());
        let mut app = App {
            should_quit: false,
            active_tab: ActiveTab::Scripts,
            show_help: false,
            config,
            home,
            theme_index,
            current_dir: root.clone(),
            root,
            parents: Vec::new(),
            view_mode: ViewMode::Tree,
            focus: Focus::List,
            catalog: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            search_input: String::new(),
            search_tokens: Vec::new(),
            preview: Preview::Empty,
            preview_scroll: 0,
            cache: ContentCache::new(),
            options: OptionsState::new(),
            last_sync: None,
        };
        app.reload_catalog();
        app.selected = 0;
        app.sync_preview();
        app
    }

    /// Consume the current state and produce the next one plus its effects.
    pub fn update(mut self, action: Action) -> (App, Vec<Effect>) {
        let mut effects = Vec::new();
        self.apply(action, &mut effects);
        (self, effects)
    }

    fn apply(&mut self, action: Action, effects: &mut Vec<Effect>) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::NextTab => {
                let next = (self.active_tab.position() + 1) % ActiveTab::ALL.len();
                self.switch_to_tab(ActiveTab::ALL[next]);
            }
            Action::PrevTab => {
                let len = ActiveTab::ALL.len();
                let prev = (self.active_tab.position() + len - 1) % len;
                self.switch_to_tab(ActiveTab::ALL[prev]);
            }
            Action::SelectTab(tab) => self.switch_to_tab(tab),
            Action::MoveUp => self.move_by(-1),
            Action::MoveDown => self.move_by(1),
            Action::PageUp => self.move_by(-(PAGE_STEP as isize)),
            Action::PageDown => self.move_by(PAGE_STEP as isize),
            Action::Top => self.jump(false),
            Action::Bottom => self.jump(true),
            Action::Ascend => {
                if self.active_tab == ActiveTab::Scripts {
                    self.ascend();
                }
            }
            Action::Descend => {
                if self.active_tab == ActiveTab::Scripts && self.focus == Focus::List {
                    if let Some(entry) = self.selected_entry().filter(|e| e.is_directory()) {
                        let path = entry.path.clone();
                        self.descend(path);
                    }
                }
            }
            Action::Activate => self.activate(effects),
            Action::FocusList => match self.active_tab {
                ActiveTab::Scripts => self.focus = Focus::List,
                ActiveTab::Options => self.options.pane = OptionsPane::Categories,
                ActiveTab::About => {}
            },
            Action::FocusPreview => match self.active_tab {
                ActiveTab::Scripts => self.focus = Focus::Preview,
                ActiveTab::Options => {
                    if self.options.open_category.is_some() {
                        self.options.pane = OptionsPane::Items;
                    }
                }
                ActiveTab::About => {}
            },
            Action::StartSearch => {
                if self.active_tab == ActiveTab::Scripts {
                    self.focus = Focus::Search;
                }
            }
            Action::SearchInput(c) => {
                if self.focus == Focus::Search {
                    self.search_input.push(c);
                    self.on_search_changed();
                }
            }
            Action::SearchBackspace => {
                if self.focus == Focus::Search && self.search_input.pop().is_some() {
                    self.on_search_changed();
                }
            }
            Action::ConfirmSearch => {
                if self.focus == Focus::Search {
                    self.focus = Focus::List;
                }
            }
            Action::Cancel => self.cancel(),
            Action::ToggleViewMode => {
                if self.active_tab == ActiveTab::Scripts {
                    self.view_mode = self.view_mode.toggled();
                    tracing::debug!(mode = self.view_mode.label(), "view mode toggled");
                    self.reload_catalog();
                    self.selected = 0;
                    self.sync_preview();
                }
            }
            Action::Refresh => {
                self.cache.clear();
                self.reload_catalog();
                self.clamp_selection();
                self.sync_preview();
            }
            Action::EditorInput(input) => {
                if let Some(editor) = self.options.editor.as_mut() {
                    editor.input(input);
                    self.options.editor_error = None;
                }
            }
            Action::LaunchReport(msg) => self.preview = Preview::Message(msg),
            Action::MirrorFinished(result) => self.on_mirror_finished(result),
        }
    }

    // --- Queries ---

    pub fn visible_entries(&self) -> impl Iterator<Item = &Entry> {
        self.visible.iter().filter_map(|&i| self.catalog.get(i))
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.catalog.get(i))
    }

    /// Items of the Scripts list in display order.
    pub fn script_items(&self) -> Vec<PanelItem<'_>> {
        self.visible_entries()
            .filter_map(PanelItem::from_entry)
            .collect()
    }

    pub fn option_categories(&self) -> Vec<PanelItem<'static>> {
        OptionsCategory::ALL
            .iter()
            .map(|c| PanelItem::Category(*c))
            .collect()
    }

    pub fn option_items(&self) -> Vec<PanelItem<'static>> {
        match self.options.open_category {
            None => Vec::new(),
            Some(OptionsCategory::ColorSchemes) => PALETTES
                .iter()
                .enumerate()
                .map(|(index, p)| PanelItem::Option(OptionItem::Theme { index, name: p.name }))
                .collect(),
            Some(OptionsCategory::Repository) => [
                OptionItem::SetCustomRepository,
                OptionItem::ResetRepository,
                OptionItem::CurrentRepository,
            ]
            .into_iter()
            .map(PanelItem::Option)
            .collect(),
        }
    }

    pub fn palette(&self) -> &'static theme::Palette {
        theme::palette_at(self.theme_index)
    }

    /// Cached text for the script preview, if any.
    pub fn preview_text(&self) -> Option<&str> {
        match &self.preview {
            Preview::Script { path } => self.cache.get(path),
            _ => None,
        }
    }

    pub fn preview_highlighted(&self) -> Option<&[HighlightedLine]> {
        match &self.preview {
            Preview::Script { path } => self.cache.highlighted(path),
            _ => None,
        }
    }

    pub fn checkout_dir(&self) -> PathBuf {
        self.config.checkout_dir(&self.home)
    }

    /// Path of the current directory relative to the root, for the title bar.
    pub fn location_label(&self) -> String {
        match self.view_mode {
            ViewMode::RecursiveFlat => "all scripts".to_string(),
            ViewMode::Tree => match self.current_dir.strip_prefix(&self.root) {
                Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
                Ok(rel) => format!("/{}", rel.to_string_lossy().replace('\\', "/")),
                Err(_) => self.current_dir.display().to_string(),
            },
        }
    }

    // --- Catalog ---

    fn reload_catalog(&mut self) {
        self.catalog = catalog::load(self.view_mode, &self.current_dir, &self.root);
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        self.visible = search::filter_indices(&self.catalog, &self.search_tokens);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    fn clear_search(&mut self) {
        self.search_input.clear();
        self.search_tokens.clear();
    }

    fn on_search_changed(&mut self) {
        self.search_tokens = search::tokenize(&self.search_input);
        self.apply_filter();
        self.selected = 0;
        self.sync_preview();
    }

    fn sync_preview(&mut self) {
        self.preview_scroll = 0;
        let target = self
            .selected_entry()
            .map(|e| (e.is_directory(), e.path.clone(), e.display_name.clone()));
        self.preview = match target {
            None => Preview::Empty,
            Some((true, _, name)) => Preview::Directory { name },
            Some((false, path, _)) => {
                self.cache.get_or_load(&path);
                Preview::Script { path }
            }
        };
    }

    // --- Navigation ---

    fn switch_to_tab(&mut self, tab: ActiveTab) {
        self.active_tab = tab;
        self.focus = Focus::List;
        self.options.pane = OptionsPane::Categories;
    }

    fn descend(&mut self, path: PathBuf) {
        if self.view_mode != ViewMode::Tree {
            return;
        }
        let index = self.visible.get(self.selected).copied().unwrap_or(0);
        self.parents.push(ParentNav {
            path: std::mem::replace(&mut self.current_dir, path),
            index,
        });
        self.clear_search();
        self.reload_catalog();
        self.selected = 0;
        self.sync_preview();
    }

    fn ascend(&mut self) {
        if self.view_mode != ViewMode::Tree {
            return;
        }
        let Some(parent) = self.parents.pop() else {
            return;
        };
        self.current_dir = parent.path;
        self.clear_search();
        self.reload_catalog();
        self.selected = parent.index;
        self.clamp_selection();
        self.sync_preview();
    }

    fn move_by(&mut self, delta: isize) {
        match self.active_tab {
            ActiveTab::Scripts => match self.focus {
                Focus::List => {
                    let next = step(self.selected, delta, self.visible.len());
                    if next != self.selected {
                        self.selected = next;
                        self.sync_preview();
                    }
                }
                Focus::Preview => {
                    let lines = self.preview_text().map(|t| t.lines().count()).unwrap_or(0);
                    self.preview_scroll = step(self.preview_scroll, delta, lines);
                }
                Focus::Search => {}
            },
            ActiveTab::Options => {
                if self.options.editor.is_some() {
                    return;
                }
                match self.options.pane {
                    OptionsPane::Categories => {
                        self.options.category_index = step(
                            self.options.category_index,
                            delta,
                            OptionsCategory::ALL.len(),
                        );
                    }
                    OptionsPane::Items => {
                        let len = self.option_items().len();
                        self.options.item_index = step(self.options.item_index, delta, len);
                    }
                }
            }
            ActiveTab::About => {}
        }
    }

    fn jump(&mut self, to_end: bool) {
        let far = if to_end { isize::MAX } else { isize::MIN };
        self.move_by(far);
    }

    fn activate(&mut self, effects: &mut Vec<Effect>) {
        match self.active_tab {
            ActiveTab::Scripts => {
                if self.focus != Focus::List {
                    return;
                }
                enum Target {
                    Enter(PathBuf),
                    Launch(LaunchRequest),
                }
                let target = match self.script_items().get(self.selected) {
                    Some(PanelItem::Directory(entry)) => Target::Enter(entry.path.clone()),
                    Some(PanelItem::Script(entry)) => Target::Launch(LaunchRequest {
                        path: entry.path.clone(),
                        display_name: entry.display_name.clone(),
                    }),
                    Some(PanelItem::Option(_)) | Some(PanelItem::Category(_)) | None => return,
                };
                match target {
                    Target::Launch(req) => {
                        self.preview =
                            Preview::Message(format!("Launching {}...", req.display_name));
                        effects.push(Effect::Launch(req));
                    }
                    Target::Enter(dir) => self.descend(dir),
                }
            }
            ActiveTab::Options => self.activate_option(effects),
            ActiveTab::About => {}
        }
    }

    fn activate_option(&mut self, effects: &mut Vec<Effect>) {
        if self.options.editor.is_some() {
            self.submit_repo_url(effects);
            return;
        }
        let item = match self.options.pane {
            OptionsPane::Categories => self.option_categories().get(self.options.category_index).copied(),
            OptionsPane::Items => self.option_items().get(self.options.item_index).copied(),
        };
        match item {
            Some(PanelItem::Category(category)) => {
                self.options.open_category = Some(category);
                self.options.item_index = match category {
                    OptionsCategory::ColorSchemes => self.theme_index,
                    OptionsCategory::Repository => 0,
                };
                self.options.pane = OptionsPane::Items;
            }
            Some(PanelItem::Option(OptionItem::Theme { index, name })) => {
                self.theme_index = index;
                self.config = std::mem::take(&mut self.config).with_theme(name);
                self.options.status = Some(format!("Theme set to {}", name));
                effects.push(Effect::SaveConfig(self.config.clone()));
            }
            Some(PanelItem::Option(OptionItem::SetCustomRepository)) => {
                let mut editor = TextArea::default();
                if let Some(url) = self.config.repo_url.as_deref() {
                    editor.insert_str(url);
                }
                editor.set_placeholder_text("https://github.com/username/repo.git");
                self.options.editor = Some(editor);
                self.options.editor_error = None;
            }
            Some(PanelItem::Option(OptionItem::ResetRepository)) => {
                self.config = std::mem::take(&mut self.config).with_repo_url(None);
                effects.push(Effect::SaveConfig(self.config.clone()));
                self.request_mirror(effects);
            }
            Some(PanelItem::Option(OptionItem::CurrentRepository)) => {
                self.options.status = Some(format!("Using {}", self.config.repo_url()));
            }
            Some(PanelItem::Directory(_)) | Some(PanelItem::Script(_)) | None => {}
        }
    }

    fn submit_repo_url(&mut self, effects: &mut Vec<Effect>) {
        let url = self
            .options
            .editor
            .as_ref()
            .map(|e| e.lines().join(""))
            .unwrap_or_default();
        let url = url.trim().to_string();
        if let Err(e) = repository::validate_repo_url(&url) {
            self.options.editor_error = Some(e.to_string());
            return;
        }
        self.options.editor = None;
        self.options.editor_error = None;
        self.config = std::mem::take(&mut self.config).with_repo_url(Some(&url));
        effects.push(Effect::SaveConfig(self.config.clone()));
        self.request_mirror(effects);
    }

    fn request_mirror(&mut self, effects: &mut Vec<Effect>) {
        if self.options.mirroring {
            self.options.status = Some("A repository update is already running".to_string());
            return;
        }
        let url = self.config.repo_url().to_string();
        let dest = self.checkout_dir();
        self.options.mirroring = true;
        self.options.status = Some(format!("Cloning {}...", url));
        effects.push(Effect::Mirror { url, dest });
    }

    fn on_mirror_finished(&mut self, result: MirrorResult) {
        self.options.mirroring = false;
        match result.result {
            Ok(()) => {
                self.root = result.dest.clone();
                self.current_dir = result.dest;
                self.parents.clear();
                self.cache.clear();
                self.reload_catalog();
                self.selected = 0;
                self.sync_preview();
                self.last_sync = Some(Local::now());
                self.options.status = Some(format!("Repository updated: {}", result.url));
            }
            Err(e) => {
                self.options.status = Some(format!("Repository update failed: {}", e));
            }
        }
    }

    fn cancel(&mut self) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        match self.active_tab {
            ActiveTab::Scripts => {
                if self.focus == Focus::Search {
                    self.focus = Focus::List;
                } else {
                    self.clear_search();
                    self.reload_catalog();
                    self.selected = 0;
                    self.sync_preview();
                }
            }
            ActiveTab::Options => {
                if self.options.editor.take().is_some() {
                    self.options.editor_error = None;
                } else {
                    self.options.pane = OptionsPane::Categories;
                }
            }
            ActiveTab::About => {}
        }
    }
}

/// Move `current` by `delta` inside `0..len`, clamping at both ends.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len - 1;
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs()).min(max)
    } else {
        current.saturating_add(delta as usize).min(max)
    }
}
