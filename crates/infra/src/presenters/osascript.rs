//! AppleScript dialog presenter with timeout handling.
//!
//! Renders a dialog with Join / Calendar / Skip buttons that gives up after
//! the alert's visibility, then runs it through `osascript`. The process is
//! waited on with `wait-timeout` on a blocking thread and killed if it
//! outlives the dialog by more than [`PROCESS_GRACE`].

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use meetbell_core::Presenter;
use meetbell_domain::{Alert, MeetbellError, PresenterKind, Result as DomainResult};
use wait_timeout::ChildExt;

/// Extra time `osascript` gets beyond the dialog's own give-up timer.
pub const PROCESS_GRACE: Duration = Duration::from_secs(10);

/// Shows alerts as a macOS dialog.
#[derive(Debug, Clone)]
pub struct OsascriptPresenter {
    program: PathBuf,
}

impl Default for OsascriptPresenter {
    fn default() -> Self {
        Self { program: PathBuf::from("osascript") }
    }
}

impl OsascriptPresenter {
    /// Presenter that launches `osascript` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different interpreter binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl Presenter for OsascriptPresenter {
    async fn present(&self, alert: &Alert) -> DomainResult<()> {
        let script = render_dialog(alert)?;
        let timeout = alert.visibility.saturating_add(PROCESS_GRACE);
        let program = self.program.clone();

        tokio::task::spawn_blocking(move || execute_applescript(&program, &script, timeout))
            .await
            .map_err(|e| MeetbellError::Internal(format!("osascript task failed: {e}")))?
            .map(|_| ())
    }

    fn kind(&self) -> PresenterKind {
        PresenterKind::MacosOsascript
    }
}

/// Build the dialog script for `alert`.
///
/// The calendar button is left out when there is no calendar link.
///
/// # Errors
/// Returns `MeetbellError::Render` when a field would break out of an
/// AppleScript string literal.
pub fn render_dialog(alert: &Alert) -> DomainResult<String> {
    literal("title", &alert.title)?;
    literal("join link", &alert.join_link)?;
    literal("calendar link", &alert.calendar_link)?;
    if let Some(browser) = &alert.browser {
        literal("browser", browser)?;
    }

    let with_calendar = !alert.calendar_link.is_empty();
    let buttons = if with_calendar {
        r#"{"Join", "Calendar", "Skip"}"#
    } else {
        r#"{"Join", "Skip"}"#
    };

    let mut script = format!(
        "display dialog (\"{}\") buttons {buttons} default button \"Join\" giving up after {}\n",
        alert.title,
        alert.visibility.as_secs().max(1)
    );
    script.push_str("if button returned of result = \"Join\" then\n");
    script.push_str(&open_location(&alert.join_link, alert.browser.as_deref()));
    if with_calendar {
        script.push_str("else if button returned of result = \"Calendar\" then\n");
        script.push_str(&open_location(&alert.calendar_link, alert.browser.as_deref()));
    }
    script.push_str("end if\n");
    Ok(script)
}

fn open_location(link: &str, browser: Option<&str>) -> String {
    match browser {
        Some(browser) => format!(
            "  tell application \"{browser}\"\n    activate\n    open location \"{link}\"\n  end tell\n"
        ),
        None => format!("  open location \"{link}\"\n"),
    }
}

fn literal(field: &str, value: &str) -> DomainResult<()> {
    match value.chars().find(|c| matches!(c, '"' | '\\') || c.is_control()) {
        Some(bad) => Err(MeetbellError::Render(format!(
            "{field} contains {bad:?}, which cannot appear in a dialog"
        ))),
        None => Ok(()),
    }
}

/// Execute an AppleScript with a timeout.
///
/// # Returns
/// * `Ok(String)` - Trimmed stdout output if successful
/// * `Err(MeetbellError::Platform)` - If execution fails, times out, or
///   returns non-zero exit
pub fn execute_applescript(
    program: &std::path::Path,
    script: &str,
    timeout: Duration,
) -> DomainResult<String> {
    tracing::debug!(
        script_preview = %script.chars().take(100).collect::<String>(),
        timeout_secs = timeout.as_secs(),
        "Executing AppleScript with timeout"
    );

    let mut child = Command::new(program)
        .arg("-e")
        .arg(script)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| MeetbellError::Platform(format!("cannot spawn {}: {e}", program.display())))?;

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "AppleScript execution timed out, killing process"
            );
            let _ = child.kill();
            let _ = child.wait();
            return Err(MeetbellError::Platform(format!(
                "AppleScript execution timed out after {}s",
                timeout.as_secs()
            )));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to wait for osascript");
            return Err(MeetbellError::Platform(format!("cannot wait for osascript: {e}")));
        }
    };

    let output = child
        .wait_with_output()
        .map_err(|e| MeetbellError::Platform(format!("cannot collect osascript output: {e}")))?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            exit_code = status.code(),
            stderr = %stderr.trim(),
            "AppleScript returned non-zero exit code"
        );
        return Err(MeetbellError::Platform(format!(
            "AppleScript failed with exit code {:?}: {}",
            status.code(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert() -> Alert {
        Alert {
            title: "Standup".into(),
            join_link: "https://meet.google.com/abc".into(),
            calendar_link: "https://calendar.google.com/event?eid=1".into(),
            visibility: Duration::from_secs(120),
            browser: None,
        }
    }

    #[test]
    fn renders_three_button_dialog() {
        let script = render_dialog(&alert()).unwrap();
        assert!(script.starts_with(
            r#"display dialog ("Standup") buttons {"Join", "Calendar", "Skip"} default button "Join" giving up after 120"#
        ));
        assert!(script.contains(r#"open location "https://meet.google.com/abc""#));
        assert!(script.contains(r#"open location "https://calendar.google.com/event?eid=1""#));
        assert!(!script.contains("tell application"));
        assert!(script.ends_with("end if\n"));
    }

    #[test]
    fn browser_is_activated_when_configured() {
        let alert = Alert { browser: Some("Google Chrome".into()), ..alert() };
        let script = render_dialog(&alert).unwrap();
        assert_eq!(script.matches(r#"tell application "Google Chrome""#).count(), 2);
        assert_eq!(script.matches("activate").count(), 2);
    }

    #[test]
    fn calendar_button_dropped_without_link() {
        let alert = Alert { calendar_link: String::new(), ..alert() };
        let script = render_dialog(&alert).unwrap();
        assert!(script.contains(r#"buttons {"Join", "Skip"}"#));
        assert!(!script.contains("Calendar"));
    }

    #[test]
    fn quotes_are_rejected() {
        let alert = Alert { join_link: "https://x\" & do shell script \"rm".into(), ..alert() };
        let err = render_dialog(&alert).unwrap_err();
        assert!(matches!(err, MeetbellError::Render(ref msg) if msg.contains("join link")));
    }

    #[test]
    fn control_characters_are_rejected() {
        let alert = Alert { title: "Stand\nup".into(), ..alert() };
        assert!(matches!(render_dialog(&alert), Err(MeetbellError::Render(_))));
    }

    #[tokio::test]
    async fn missing_interpreter_is_platform_error() {
        let presenter = OsascriptPresenter::new().with_program("/nonexistent/osascript");
        let err = presenter.present(&alert()).await.unwrap_err();
        assert!(matches!(err, MeetbellError::Platform(_)));
    }

    #[tokio::test]
    async fn render_failure_skips_execution() {
        let presenter = OsascriptPresenter::new().with_program("/nonexistent/osascript");
        let alert = Alert { title: "a\\b".into(), ..alert() };
        assert!(matches!(presenter.present(&alert).await, Err(MeetbellError::Render(_))));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn executes_simple_script() {
        let out = execute_applescript(
            std::path::Path::new("osascript"),
            r#"return "hello world""#,
            Duration::from_secs(5),
        );
        assert_eq!(out.unwrap(), "hello world");
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn times_out_long_scripts() {
        let result =
            execute_applescript(std::path::Path::new("osascript"), "delay 10", Duration::from_millis(100));
        assert!(matches!(result, Err(MeetbellError::Platform(ref msg)) if msg.contains("timed out")));
    }
}
