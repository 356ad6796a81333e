//! Loading-state machine shared by every data-backed screen.

/// Render state of a screen's data region.
///
/// `Failed` keeps only the user-facing text: by the time a failure reaches
/// the render layer the error has already been classified and logged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScreenState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> ScreenState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading)
    }

    /// The loaded payload, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            ScreenState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// The failure text, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            ScreenState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
