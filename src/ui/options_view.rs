use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;
use super::util::centered_rect;
use crate::app::{App, OptionsPane};
use crate::data::repository::DEFAULT_REPO_URL;
use crate::model::panel::{OptionItem, PanelItem};

pub fn draw_options(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    draw_categories(f, chunks[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(8)])
        .split(chunks[1]);
    draw_items(f, right[0], app);
    draw_details(f, right[1], app);

    if app.options.editor.is_some() {
        draw_editor(f, area, app);
    }
}

fn draw_categories(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let is_active = app.options.pane == OptionsPane::Categories;
    let border_style = if is_active {
        palette.border_active()
    } else {
        palette.border_inactive()
    };

    let block = Block::default()
        .title(Span::styled(" Options ", palette.title()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let items: Vec<ListItem> = app
        .option_categories()
        .iter()
        .map(|c| ListItem::new(format!(" {}", c.label())))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.options.category_index));

    let list = List::new(items)
        .block(block)
        .highlight_style(palette.list_selected());
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_items(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let is_active = app.options.pane == OptionsPane::Items;
    let border_style = if is_active {
        palette.border_active()
    } else {
        palette.border_inactive()
    };

    let title = match app.options.open_category {
        Some(c) => format!(" {} ", c.title()),
        None => " Select a category ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, palette.title()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let items = app.option_items();
    if items.is_empty() {
        let p = Paragraph::new("Press Enter on a category to see its options.")
            .style(theme::EMPTY_STATE)
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let marker = match item {
                PanelItem::Option(OptionItem::Theme { index, .. }) if *index == app.theme_index => {
                    "* "
                }
                _ => "  ",
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, palette.tag_category()),
                Span::raw(item.label()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if is_active {
        state.select(Some(app.options.item_index));
    }

    let list = List::new(list_items)
        .block(block)
        .highlight_style(palette.list_selected());
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_details(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border_inactive());

    let label = |text: &'static str| Span::styled(text, palette.tag_category());
    let last_sync = app
        .last_sync
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "not this session".to_string());

    let marker = if app.config.is_default_repo() {
        " (default)"
    } else {
        " (custom)"
    };
    let mut lines = vec![
        Line::from(vec![
            label("Repository: "),
            Span::raw(app.config.repo_url()),
            Span::styled(marker, palette.muted()),
        ]),
        Line::from(vec![label("Default:    "), Span::raw(DEFAULT_REPO_URL)]),
        Line::from(vec![
            label("Checkout:   "),
            Span::raw(app.checkout_dir().display().to_string()),
        ]),
        Line::from(vec![label("Last sync:  "), Span::raw(last_sync)]),
    ];
    if let Some(status) = &app.options.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(status.as_str(), theme::MESSAGE)));
    }

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn draw_editor(f: &mut Frame, area: Rect, app: &App) {
    let Some(editor) = app.options.editor.as_ref() else {
        return;
    };
    let palette = app.palette();
    let popup = centered_rect(area, 70, 6);
    f.render_widget(Clear, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(popup);

    let mut editor = editor.clone();
    editor.set_block(
        Block::default()
            .title(Span::styled(" Custom repository URL ", palette.title()))
            .borders(Borders::ALL)
            .border_style(theme::EDIT_BORDER),
    );
    editor.set_cursor_line_style(ratatui::style::Style::default());
    f.render_widget(&editor, chunks[0]);

    let hint = match &app.options.editor_error {
        Some(err) => Line::from(Span::styled(format!(" {}", err), theme::ERROR)),
        None => Line::from(Span::styled(
            " Enter to save and clone, Esc to cancel",
            palette.muted(),
        )),
    };
    f.render_widget(Paragraph::new(hint).block(Block::default()), chunks[1]);
}
