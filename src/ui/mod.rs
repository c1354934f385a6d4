//! Terminal front end
//!
//! Renders the workspace as plain text. The layout follows the active tab:
//! the editor tab shows the block list, outline, document settings, and the
//! selected block; the preview tab shows the overlays and preview pages.

pub mod block_list;
pub mod outline;
pub mod preview;
pub mod properties;

pub use block_list::*;
pub use outline::*;
pub use preview::*;
pub use properties::*;

use crate::i18n::{localized_text, theme_text_key, workspace_tab_text_key, LocalizationDictionary, UiTextKey};
use crate::notification::NotificationCenter;
use crate::state::{AppWorkspaceState, UiLanguageCode, WorkspaceTab};
use crate::store::WorkspaceSubscriber;
use std::fmt::Write as _;
use std::io::Write;
use std::time::Instant;

/// Render the title line, tabs, language, and theme
pub fn render_top_bar(out: &mut String, dictionary: &LocalizationDictionary, state: &AppWorkspaceState) {
    let language = state.active_ui_language_code;
    let text = |key| localized_text(dictionary, language, key);

    let _ = writeln!(out, "{} - {}", text(UiTextKey::AppTitle), text(UiTextKey::ProjectName));

    let tabs: Vec<String> = [WorkspaceTab::Editor, WorkspaceTab::Preview]
        .into_iter()
        .map(|tab| {
            let label = text(workspace_tab_text_key(tab));
            if tab == state.active_workspace_tab {
                format!("[{}]", label)
            } else {
                format!(" {} ", label)
            }
        })
        .collect();
    let _ = writeln!(out, "{}: {}", text(UiTextKey::WorkspaceTabsLabel), tabs.join(" "));

    let languages: Vec<String> = UiLanguageCode::ALL
        .into_iter()
        .map(|code| {
            let label = code.as_str().to_uppercase();
            if code == language {
                format!("[{}]", label)
            } else {
                label
            }
        })
        .collect();
    let _ = writeln!(
        out,
        "{}: {}  {}: {}",
        text(UiTextKey::LanguageLabel),
        languages.join(" "),
        text(UiTextKey::ThemeLabel),
        text(theme_text_key(state.active_theme_mode))
    );
}

/// Render visible notifications, one per line
pub fn render_notifications(out: &mut String, notifications: &NotificationCenter, now: Instant) {
    for notification in notifications.visible(now) {
        let _ = writeln!(out, "* {}", notification.message);
    }
}

/// Render the whole workspace for the active tab
pub fn render_workspace(dictionary: &LocalizationDictionary, state: &AppWorkspaceState) -> String {
    let mut out = String::new();
    render_top_bar(&mut out, dictionary, state);
    out.push('\n');

    match state.active_workspace_tab {
        WorkspaceTab::Editor => {
            render_block_list(&mut out, dictionary, state);
            out.push('\n');
            render_outline(&mut out, dictionary, state);
            out.push('\n');
            let _ = writeln!(
                out,
                "{}",
                localized_text(dictionary, state.active_ui_language_code, UiTextKey::PropertiesTitle)
            );
            render_document_settings(&mut out, dictionary, state);
            render_selected_block(&mut out, dictionary, state);
        }
        WorkspaceTab::Preview => {
            render_document_settings(&mut out, dictionary, state);
            out.push('\n');
            render_preview(&mut out, dictionary, state);
        }
    }

    out
}

/// Subscriber that prints the workspace every time it changes
pub struct TerminalView<W: Write> {
    writer: W,
    dictionary: &'static LocalizationDictionary,
    renders: usize,
}

impl<W: Write> TerminalView<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            dictionary: LocalizationDictionary::builtin(),
            renders: 0,
        }
    }

    /// Number of times the view has rendered
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Render `state` to the writer
    pub fn render(&mut self, state: &AppWorkspaceState) {
        let output = render_workspace(self.dictionary, state);
        if let Err(e) = self.writer.write_all(output.as_bytes()).and_then(|_| self.writer.flush()) {
            log::warn!("Failed to render workspace: {}", e);
            return;
        }
        self.renders += 1;
    }
}

impl<W: Write> WorkspaceSubscriber for TerminalView<W> {
    fn on_state_changed(&mut self, state: &AppWorkspaceState) {
        self.render(state);
    }
}
