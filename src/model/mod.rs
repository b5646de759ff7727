pub mod entry;
pub mod panel;
pub mod tags;
