use ratatui::style::{Color, Modifier, Style};

/// A selectable color scheme. Colors are xterm-256 indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub dim: Color,
}

const fn palette(name: &'static str, primary: u8, secondary: u8, accent: u8) -> Palette {
    Palette {
        name,
        primary: Color::Indexed(primary),
        secondary: Color::Indexed(secondary),
        accent: Color::Indexed(accent),
        dim: Color::Indexed(244),
    }
}

pub const PALETTES: [Palette; 6] = [
    palette("Ocean Breeze", 39, 33, 45),
    palette("Rocket Pink", 205, 93, 198),
    palette("Forest Night", 46, 34, 82),
    palette("Sunset Glow", 208, 196, 226),
    palette("Purple Haze", 135, 93, 171),
    palette("Arctic Frost", 51, 39, 87),
];

/// Index of the palette called `name`, first palette when unknown.
pub fn palette_index(name: &str) -> usize {
    PALETTES.iter().position(|p| p.name == name).unwrap_or(0)
}

pub fn palette_at(index: usize) -> &'static Palette {
    &PALETTES[index.min(PALETTES.len() - 1)]
}

impl Palette {
    pub fn tab_active(&self) -> Style {
        Style::new()
            .fg(Color::Black)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive(&self) -> Style {
        Style::new().fg(self.primary).bg(Color::DarkGray)
    }

    pub fn border_active(&self) -> Style {
        Style::new().fg(self.primary)
    }

    pub fn border_inactive(&self) -> Style {
        Style::new().fg(self.dim)
    }

    pub fn list_selected(&self) -> Style {
        Style::new()
            .fg(Color::Black)
            .bg(self.secondary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn directory(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::new().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn tag_category(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::new().fg(self.dim)
    }
}

// Status bar
pub const STATUS_BAR: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

pub const LIST_NORMAL: Style = Style::new().fg(Color::White);

// Help overlay
pub const HELP_KEY: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const HELP_DESC: Style = Style::new().fg(Color::White);

// Footer hints
pub const HINT_KEY: Style = Style::new().fg(Color::Yellow).bg(Color::DarkGray);
pub const HINT_DESC: Style = Style::new().fg(Color::Gray).bg(Color::DarkGray);

// Empty state
pub const EMPTY_STATE: Style = Style::new().fg(Color::DarkGray);

// Preview
pub const PREVIEW_TEXT: Style = Style::new().fg(Color::White);
pub const PREVIEW_LINE_NUMBER: Style = Style::new().fg(Color::DarkGray);
pub const MESSAGE: Style = Style::new().fg(Color::Yellow);
pub const ERROR: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);

// Search box
pub const SEARCH_INPUT: Style = Style::new().fg(Color::Yellow);
pub const EDIT_BORDER: Style = Style::new().fg(Color::Yellow);
