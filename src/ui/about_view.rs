use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::theme;
use crate::app::App;
use crate::config;
use crate::data::tags::tag_index;
use crate::ui::util::fit_width;

pub fn draw_about(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();
    let block = Block::default()
        .title(Span::styled(" About ", palette.title()))
        .borders(Borders::ALL)
        .border_style(palette.border_active());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  pwr {}", env!("CARGO_PKG_VERSION")),
            palette.title(),
        )),
        Line::from(Span::styled(
            format!("  {}", env!("CARGO_PKG_DESCRIPTION")),
            theme::PREVIEW_TEXT,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Browse a scriptbin, filter scripts by their tags, and run them",
            palette.muted(),
        )),
        Line::from(Span::styled(
            "  in a new terminal window or tmux session.",
            palette.muted(),
        )),
        Line::from(""),
        row("Root", app.root.display().to_string(), palette),
        row("Config", config::config_path().display().to_string(), palette),
        row("Logs", config::log_dir().display().to_string(), palette),
        row("Theme", app.palette().name.to_string(), palette),
        row("Cached", format!("{} previews", app.cache.len()), palette),
        Line::from(""),
    ];

    // Tags available in the current listing, as search hints
    let index = tag_index(&app.catalog);
    if !index.is_empty() {
        lines.push(Line::from(Span::styled("  Tags in view", palette.title())));
        let width = area.width.saturating_sub(16) as usize;
        for (category, values) in &index {
            lines.push(row(category, fit_width(&values.join(" "), width), palette));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "  Press ? for key bindings.",
        theme::EMPTY_STATE,
    )));

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn row<'a>(key: &str, value: String, palette: &theme::Palette) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:10}", key), palette.tag_category()),
        Span::styled(value, theme::PREVIEW_TEXT),
    ])
}
