//! Layout preview
//!
//! Placeholder pages with the currently visible guide overlays.

use crate::config::PREVIEW_PAGE_COUNT;
use crate::i18n::{localized_text, overlay_text_key, LocalizationDictionary, UiTextKey};
use crate::state::{AppWorkspaceState, OverlayKind};
use std::fmt::Write;

/// Render the preview pages and the overlay toggles
pub fn render_preview(out: &mut String, dictionary: &LocalizationDictionary, state: &AppWorkspaceState) {
    let language = state.active_ui_language_code;
    let text = |key| localized_text(dictionary, language, key);
    let overlays = &state.preview_overlay_visibility;

    let _ = writeln!(out, "{}", text(UiTextKey::PreviewOverlaysTitle));
    for kind in OverlayKind::ALL {
        let mark = if overlays.is_visible(kind) { 'x' } else { ' ' };
        let _ = writeln!(out, "  [{}] {} ({})", mark, text(overlay_text_key(kind)), kind.as_str());
    }

    let visible: Vec<&str> = overlays
        .visible_overlays()
        .into_iter()
        .map(|kind| text(overlay_text_key(kind)))
        .collect();

    for page in 1..=PREVIEW_PAGE_COUNT {
        let _ = writeln!(out, "{} {}", text(UiTextKey::PreviewPageLabel), page);
        let _ = writeln!(
            out,
            "  {}: {}",
            text(UiTextKey::PreviewPlaceholderTitle),
            text(UiTextKey::PreviewPlaceholderBody)
        );
        if !visible.is_empty() {
            let _ = writeln!(out, "  {}: {}", text(UiTextKey::PreviewOverlaysTitle), visible.join(", "));
        }
    }
}
