use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::{about_view, help_overlay, options_view, scripts_view, tabs, theme};
use crate::app::{ActiveTab, App, Focus, OptionsPane};

pub fn draw_layout(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(3),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    tabs::draw_tab_bar(f, chunks[0], app);
    draw_content(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);

    // Help overlay (on top of everything)
    if app.show_help {
        help_overlay::draw_help(f, f.area(), app.palette());
    }
}

fn draw_content(f: &mut Frame, area: Rect, app: &App) {
    match app.active_tab {
        ActiveTab::Scripts => scripts_view::draw_scripts(f, area, app),
        ActiveTab::Options => options_view::draw_options(f, area, app),
        ActiveTab::About => about_view::draw_about(f, area, app),
    }
}

fn hint_text(app: &App) -> Vec<(&'static str, &'static str)> {
    let mut hints: Vec<(&str, &str)> = match app.active_tab {
        ActiveTab::Scripts => match app.focus {
            Focus::List => vec![
                ("j/k", "nav"),
                ("Enter", "run/open"),
                ("Bksp", "up"),
                ("/", "search"),
                ("v", "view"),
            ],
            Focus::Preview => vec![("j/k", "scroll"), ("^H", "list")],
            Focus::Search => vec![("Enter", "keep"), ("Esc", "back")],
        },
        ActiveTab::Options => {
            if app.options.editor.is_some() {
                vec![("Enter", "save"), ("Esc", "cancel")]
            } else {
                match app.options.pane {
                    OptionsPane::Categories => vec![("j/k", "nav"), ("Enter", "open")],
                    OptionsPane::Items => {
                        vec![("j/k", "nav"), ("Enter", "select"), ("Esc", "back")]
                    }
                }
            }
        }
        ActiveTab::About => vec![("Tab", "next")],
    };
    hints.push(("?", "help"));
    hints.push(("q", "quit"));
    hints
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let mut left_spans: Vec<Span> = Vec::new();

    if app.active_tab == ActiveTab::Scripts {
        left_spans.push(Span::styled(
            format!(" {} ", app.view_mode.label().to_uppercase()),
            palette.tab_active(),
        ));
        left_spans.push(Span::styled(
            format!(" {} ", app.location_label()),
            theme::STATUS_BAR,
        ));
        if !app.search_tokens.is_empty() || app.focus == Focus::Search {
            let cursor = if app.focus == Focus::Search { "_" } else { "" };
            left_spans.push(Span::styled(
                format!(" /{}{} ", app.search_input, cursor),
                theme::SEARCH_INPUT.bg(ratatui::style::Color::DarkGray),
            ));
        }
    }

    if app.options.mirroring {
        left_spans.push(Span::styled(" SYNCING ", theme::MESSAGE.bg(palette.secondary)));
    }

    // Build right-aligned hint spans
    let hints = hint_text(app);
    let mut hint_spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            hint_spans.push(Span::styled("  ", theme::STATUS_BAR));
        }
        hint_spans.push(Span::styled(*key, theme::HINT_KEY));
        hint_spans.push(Span::styled(":", theme::HINT_DESC));
        hint_spans.push(Span::styled(*desc, theme::HINT_DESC));
    }
    hint_spans.push(Span::styled(" ", theme::STATUS_BAR));

    let left_width: usize = left_spans.iter().map(|s| s.width()).sum();
    let hint_width: usize = hint_spans.iter().map(|s| s.width()).sum();
    let total = area.width as usize;
    let gap = total.saturating_sub(left_width + hint_width);

    let mut spans = left_spans;
    spans.push(Span::styled(" ".repeat(gap), theme::STATUS_BAR));
    spans.extend(hint_spans);

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
