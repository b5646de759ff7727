use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::theme;
use crate::app::{ActiveTab, App};

pub fn draw_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let palette = app.palette();

    let mut spans = Vec::new();
    for (i, tab) in ActiveTab::ALL.iter().enumerate() {
        let label = format!("{}:{}", i + 1, tab.title());
        let style = if *tab == app.active_tab {
            palette.tab_active()
        } else {
            palette.tab_inactive()
        };
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw(" "));
    }

    // Version on the right
    let version = format!("pwr v{}", env!("CARGO_PKG_VERSION"));
    let tabs_width: usize = spans.iter().map(|s| s.width()).sum();
    let total_used = tabs_width + version.len();
    let pad = (area.width as usize).saturating_sub(total_used);
    if pad > 0 {
        spans.push(Span::raw(" ".repeat(pad)));
    }
    spans.push(Span::styled(version, theme::STATUS_BAR));

    let line = Line::from(spans);
    f.render_widget(Paragraph::new(line), area);
}
