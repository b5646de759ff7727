use crate::model::entry::{Entry, EntryKind};

/// Left-hand groups of the Options tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsCategory {
    ColorSchemes,
    Repository,
}

impl OptionsCategory {
    pub const ALL: [OptionsCategory; 2] = [OptionsCategory::ColorSchemes, OptionsCategory::Repository];

    pub fn title(self) -> &'static str {
        match self {
            OptionsCategory::ColorSchemes => "Color Schemes",
            OptionsCategory::Repository => "Repository",
        }
    }
}

/// Right-hand entries of the Options tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionItem {
    Theme { index: usize, name: &'static str },
    SetCustomRepository,
    ResetRepository,
    CurrentRepository,
}

impl OptionItem {
    pub fn label(&self) -> &'static str {
        match self {
            OptionItem::Theme { name, .. } => name,
            OptionItem::SetCustomRepository => "Set Custom Repository",
            OptionItem::ResetRepository => "Reset to Default",
            OptionItem::CurrentRepository => "Current Repository",
        }
    }
}

/// Anything that can sit in one of the list panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelItem<'a> {
    Directory(&'a Entry),
    Script(&'a Entry),
    Option(OptionItem),
    Category(OptionsCategory),
}

impl<'a> PanelItem<'a> {
    /// `None` for ignored entries, which never reach a panel.
    pub fn from_entry(entry: &'a Entry) -> Option<Self> {
        match entry.kind {
            EntryKind::Directory => Some(PanelItem::Directory(entry)),
            EntryKind::Script => Some(PanelItem::Script(entry)),
            EntryKind::Ignored => None,
        }
    }

    pub fn label(&self) -> &'a str {
        match self {
            PanelItem::Directory(e) | PanelItem::Script(e) => &e.display_name,
            PanelItem::Option(item) => item.label(),
            PanelItem::Category(c) => c.title(),
        }
    }
}
