//! Enumerations for TUI state management.

/// Which screen the chart viewer is showing.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Chart,
    Help,
}

/// Which project's tasks feed the chart.
#[derive(Clone, PartialEq, Debug)]
pub enum ProjectScope {
    All,
    Project(String),
}

impl ProjectScope {
    pub fn as_filter(&self) -> Option<&str> {
        match self {
            ProjectScope::All => None,
            ProjectScope::Project(p) => Some(p.as_str()),
        }
    }

    /// Get a human-readable display name for this scope.
    pub fn display_name(&self) -> String {
        match self {
            ProjectScope::All => "All projects".to_string(),
            ProjectScope::Project(p) => p.clone(),
        }
    }
}
