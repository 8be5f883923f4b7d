use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceState {
    #[default]
    Inactive,
    Starting,
    Running,
    Stopping,
    Error,
}

impl ServiceState {
    /// Whether a start may be attempted from this state. A failed service is
    /// as eligible as one that never ran.
    pub fn is_startable(self) -> bool {
        matches!(self, ServiceState::Inactive | ServiceState::Error)
    }

    /// Indicator colour used by inspection listings
    pub fn indicator_color(self) -> Color {
        match self {
            ServiceState::Inactive => Color::Grey,
            ServiceState::Starting => Color::Yellow,
            ServiceState::Running => Color::Green,
            ServiceState::Stopping => Color::Rgb {
                r: 255,
                g: 128,
                b: 0,
            },
            ServiceState::Error => Color::Red,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceState::Inactive => "inactive",
            ServiceState::Starting => "starting",
            ServiceState::Running => "running",
            ServiceState::Stopping => "stopping",
            ServiceState::Error => "error",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_inactive() {
        assert_eq!(ServiceState::default(), ServiceState::Inactive);
    }

    #[test]
    fn test_startable_states() {
        assert!(ServiceState::Inactive.is_startable());
        assert!(ServiceState::Error.is_startable());
        assert!(!ServiceState::Starting.is_startable());
        assert!(!ServiceState::Running.is_startable());
        assert!(!ServiceState::Stopping.is_startable());
    }

    #[test]
    fn test_indicator_colors() {
        assert_eq!(ServiceState::Running.indicator_color(), Color::Green);
        assert_eq!(ServiceState::Error.indicator_color(), Color::Red);
        assert_eq!(ServiceState::Inactive.indicator_color(), Color::Grey);
    }
}
