use std::path::PathBuf;

/// Discrete navigation requests. Commands are advisory: the carousel
/// ignores any command whose preconditions do not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCommand {
    Next,
    Previous,
    ToggleShow,
}

#[derive(Debug, Clone)]
pub struct LoadPicture {
    pub seq: usize,
    pub path: PathBuf,
}

/// Emitted by the loader when a file is skipped because it cannot be decoded.
#[derive(Debug)]
pub struct InvalidPicture(pub PathBuf);

/// Which of the navigation commands currently have their preconditions met.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub can_next: bool,
    pub can_previous: bool,
    pub can_show: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Slide(Direction),
    /// `opening` is true when zooming into the selected picture.
    Zoom { opening: bool },
}

/// Published once per finished session, from the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    Completed {
        kind: SessionKind,
        navigation: NavigationState,
    },
    /// Published when picture arrivals change what navigation is possible.
    NavigationChanged(NavigationState),
}

/// Payload delivered to curve parameter subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChange {
    pub name: &'static str,
    pub old: f64,
    pub new: f64,
}
