//! Presenter bindings selectable from configuration

use crate::impl_binding_conversions;

/// The alert back-end used for a run. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenterKind {
    /// AppleScript dialog driven through `osascript` (macOS).
    MacosOsascript,
    /// Writes the alert to the log only; useful for dry runs.
    Log,
}

impl_binding_conversions!(PresenterKind {
    MacosOsascript => "macos_osascript",
    Log => "log",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_bindings() {
        assert_eq!("macos_osascript".parse::<PresenterKind>().unwrap(), PresenterKind::MacosOsascript);
        assert_eq!("log".parse::<PresenterKind>().unwrap(), PresenterKind::Log);
    }

    #[test]
    fn unknown_binding_lists_choices() {
        let err = "nonsense".parse::<PresenterKind>().unwrap_err();
        assert_eq!(err.available, vec!["macos_osascript", "log"]);
        assert!(err.to_string().contains("no such PresenterKind"));
    }
}
