use std::path::PathBuf;

/// Messages from background threads to the app loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Background repository mirror finished.
    RepositoryMirrored(MirrorResult),
}

#[derive(Debug, Clone)]
pub struct MirrorResult {
    pub url: String,
    pub dest: PathBuf,
    /// `Err` carries the git error text.
    pub result: Result<(), String>,
}
