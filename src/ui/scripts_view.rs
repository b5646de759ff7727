use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;
use super::util::{fit_width, truncate_chars};
use crate::app::{App, Focus, Preview};
use crate::data::catalog::ViewMode;
use crate::data::highlight::HighlightedLine;
use crate::model::panel::PanelItem;
use crate::model::tags::ScriptTags;

pub fn draw_scripts(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_list(f, chunks[0], app);
    draw_preview(f, chunks[1], app);
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let border_style = if app.focus == Focus::Preview {
        palette.border_inactive()
    } else {
        palette.border_active()
    };

    let items = app.script_items();
    let scripts = app.visible_entries().filter(|e| e.is_script()).count();
    let title = format!(" {} [{} scripts] ", app.location_label(), scripts);
    let block = Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if items.is_empty() {
        let msg = if app.search_tokens.is_empty() {
            "No scripts here."
        } else {
            "Nothing matches the current search."
        };
        let p = Paragraph::new(msg).style(theme::EMPTY_STATE).block(block);
        f.render_widget(p, area);
        return;
    }

    let max_name = area.width.saturating_sub(6) as usize;
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let name = fit_width(item.label(), max_name);
            let span = match item {
                PanelItem::Directory(_) => Span::styled(name, palette.directory()),
                PanelItem::Script(_) | PanelItem::Option(_) | PanelItem::Category(_) => {
                    Span::styled(name, theme::LIST_NORMAL)
                }
            };
            ListItem::new(Line::from(vec![Span::raw(" "), span]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected));

    let list = List::new(list_items)
        .block(block)
        .highlight_style(palette.list_selected());

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_preview(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let border_style = if app.focus == Focus::Preview {
        palette.border_active()
    } else {
        palette.border_inactive()
    };

    let title = match app.selected_entry() {
        Some(entry) => format!(" {} ", truncate_chars(&entry.display_name, 40)),
        None => " Preview ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<Line> = match &app.preview {
        Preview::Empty => {
            let msg = empty_message(!app.search_tokens.is_empty(), app.view_mode);
            vec![Line::from(Span::styled(msg, theme::EMPTY_STATE))]
        }
        Preview::Message(msg) => vec![Line::from(Span::styled(msg.as_str(), theme::MESSAGE))],
        Preview::Directory { name } => vec![
            Line::from(Span::styled(format!("Directory: {}", name), palette.directory())),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or Right to open this directory.",
                theme::EMPTY_STATE,
            )),
        ],
        Preview::Script { .. } => {
            let mut lines = Vec::new();
            if let Some(tags) = app.selected_entry().and_then(|e| e.tags.as_ref()) {
                lines.extend(tag_lines(tags, palette));
                lines.push(Line::from(Span::styled(
                    "─".repeat(area.width.saturating_sub(2) as usize),
                    palette.muted(),
                )));
            }
            let text = app.preview_text().unwrap_or_default();
            lines.extend(body_lines(text, app.preview_highlighted(), app.preview_scroll));
            lines
        }
    };

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn empty_message(searching: bool, mode: ViewMode) -> &'static str {
    match (searching, mode) {
        (true, ViewMode::Tree) => "No scripts found matching your search criteria.",
        (true, ViewMode::RecursiveFlat) => {
            "No scripts found matching your search criteria in any directory."
        }
        (false, ViewMode::Tree) => "No scripts in this directory.",
        (false, ViewMode::RecursiveFlat) => "No scripts found in any directory.",
    }
}

/// Line-numbered script body from `scroll` on, coloured when highlighting is available.
fn body_lines<'a>(
    text: &'a str,
    highlighted: Option<&'a [HighlightedLine]>,
    scroll: usize,
) -> Vec<Line<'a>> {
    let width = text.lines().count().to_string().len();
    let number = |i: usize| {
        Span::styled(format!("{:>width$} ", i + 1, width = width), theme::PREVIEW_LINE_NUMBER)
    };
    match highlighted {
        Some(hl) => hl
            .iter()
            .enumerate()
            .skip(scroll)
            .map(|(i, line)| {
                let mut spans = vec![number(i)];
                spans.extend(line.spans.iter().map(|span| {
                    let (r, g, b) = span.color;
                    Span::styled(span.text.as_str(), Style::new().fg(Color::Rgb(r, g, b)))
                }));
                Line::from(spans)
            })
            .collect(),
        None => text
            .lines()
            .enumerate()
            .skip(scroll)
            .map(|(i, line)| Line::from(vec![number(i), Span::styled(line, theme::PREVIEW_TEXT)]))
            .collect(),
    }
}

/// One line per tag category: `Category: value, value`.
fn tag_lines<'a>(tags: &'a ScriptTags, palette: &theme::Palette) -> Vec<Line<'a>> {
    tags.categories()
        .into_iter()
        .map(|category| {
            Line::from(vec![
                Span::styled(format!("{}: ", capitalize(category)), palette.tag_category()),
                Span::styled(tags.values_for(category).join(", "), theme::PREVIEW_TEXT),
            ])
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
