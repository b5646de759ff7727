use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::theme::{self, Palette};
use super::util::centered_rect;

const BINDINGS: [(&str, &str); 17] = [
    ("Tab / Shift+Tab", "Cycle tabs"),
    ("1-3", "Jump to tab by number"),
    ("j/k or Up/Down", "Move selection / scroll preview"),
    ("PgUp / PgDn", "Move by a page"),
    ("g / G", "Jump to top / bottom"),
    ("Enter", "Run script / open directory / select option"),
    ("Right", "Open directory"),
    ("Left / Backspace", "Go to parent directory"),
    ("Ctrl+Left / Ctrl+H", "Focus list"),
    ("Ctrl+Right / Ctrl+L", "Focus preview"),
    ("/", "Search tags"),
    ("Enter (search)", "Keep filter, back to list"),
    ("Esc", "Leave search / clear filter / close"),
    ("v", "Toggle tree / all scripts"),
    ("F5", "Reload directory and previews"),
    ("?", "Toggle this help"),
    ("q / Ctrl+C", "Quit"),
];

pub fn draw_help(f: &mut Frame, area: Rect, palette: &Palette) {
    let popup_area = centered_rect(area, 62, BINDINGS.len() as u16 + 4);

    // Clear background
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(" Keybindings", palette.title())),
        Line::from(""),
    ];

    for (key, desc) in &BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:22}", key), theme::HELP_KEY),
            Span::styled(*desc, theme::HELP_DESC),
        ]));
    }

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(palette.border_active());

    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, popup_area);
}
