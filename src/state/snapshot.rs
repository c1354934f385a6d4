//! Restoring workspace state from a stored snapshot
//!
//! Stored data is treated as untrusted. Each field is taken from the snapshot
//! only when it is structurally valid, otherwise the fallback value wins. The
//! gutter width is always recomputed.

use super::{
    coerce_answer_line_count, AppWorkspaceState, BlockId, DocumentSettings, PreviewOverlayVisibility, ThemeMode,
    TrimSizePreset, UiLanguageCode, WorkbookBlock, WorkspaceTab,
};
use crate::error::{SnapshotError, SnapshotResult};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Parse a stored JSON payload and merge it over `fallback`
pub fn restore_from_json(fallback: &AppWorkspaceState, payload: &str) -> SnapshotResult<AppWorkspaceState> {
    let stored: Value = serde_json::from_str(payload).map_err(SnapshotError::Json)?;
    merge_workspace_state(fallback, &stored)
}

/// Merge a decoded snapshot over `fallback`
pub fn merge_workspace_state(fallback: &AppWorkspaceState, stored: &Value) -> SnapshotResult<AppWorkspaceState> {
    let stored = stored.as_object().ok_or(SnapshotError::NotAnObject)?;

    let workbook_blocks = merge_blocks(fallback, stored.get("workbookBlocks"))?;

    let selected_workbook_block_id = stored
        .get("selectedWorkbookBlockId")
        .and_then(Value::as_str)
        .map(BlockId::from)
        .filter(|block_id| workbook_blocks.iter().any(|block| block.block_id() == block_id))
        .or_else(|| workbook_blocks.first().map(|block| block.block_id().clone()));

    let active_ui_language_code = match stored.get("activeUiLanguageCode").and_then(Value::as_str) {
        Some("ru") => UiLanguageCode::Ru,
        Some("fr") => UiLanguageCode::Fr,
        _ => UiLanguageCode::En,
    };

    let active_theme_mode = match stored.get("activeThemeMode").and_then(Value::as_str) {
        Some("dark") => ThemeMode::Dark,
        _ => ThemeMode::Light,
    };

    let active_workspace_tab = match stored.get("activeWorkspaceTab").and_then(Value::as_str) {
        Some("preview") => WorkspaceTab::Preview,
        _ => WorkspaceTab::Editor,
    };

    Ok(AppWorkspaceState {
        active_ui_language_code,
        active_theme_mode,
        document_settings: merge_document_settings(
            &fallback.document_settings,
            stored.get("documentSettings").and_then(Value::as_object),
        ),
        workbook_blocks,
        selected_workbook_block_id,
        preview_overlay_visibility: merge_overlay_visibility(
            &fallback.preview_overlay_visibility,
            stored.get("previewOverlayVisibility").and_then(Value::as_object),
        ),
        active_workspace_tab,
    })
}

/// Stored blocks replace the fallback wholesale when non-empty
fn merge_blocks(fallback: &AppWorkspaceState, stored: Option<&Value>) -> SnapshotResult<Vec<WorkbookBlock>> {
    let stored = match stored {
        None | Some(Value::Null) => return Ok(fallback.workbook_blocks.clone()),
        Some(Value::Array(items)) if items.is_empty() => return Ok(fallback.workbook_blocks.clone()),
        Some(value) => value,
    };

    let mut stored = stored.clone();
    normalize_answer_line_counts(&mut stored);
    let blocks: Vec<WorkbookBlock> = serde_json::from_value(stored).map_err(SnapshotError::InvalidBlocks)?;

    let mut seen = HashSet::new();
    for block in &blocks {
        if !seen.insert(block.block_id()) {
            return Err(SnapshotError::DuplicateBlockId(block.block_id().to_string()));
        }
    }

    Ok(blocks)
}

/// Clamp stored answer line counts to at least one line
fn normalize_answer_line_counts(stored: &mut Value) {
    let Some(items) = stored.as_array_mut() else {
        return;
    };
    for item in items.iter_mut().filter_map(Value::as_object_mut) {
        if item.get("blockType").and_then(Value::as_str) != Some("answerLines") {
            continue;
        }
        if let Some(count) = item.get_mut("answerLineCount") {
            *count = Value::from(coerce_answer_line_count(count));
        }
    }
}

fn merge_document_settings(fallback: &DocumentSettings, stored: Option<&Map<String, Value>>) -> DocumentSettings {
    let Some(stored) = stored else {
        return fallback.clone();
    };

    let trim_size_preset = stored
        .get("trimSizePresetId")
        .and_then(Value::as_str)
        .and_then(|id| id.parse::<TrimSizePreset>().ok())
        .unwrap_or(fallback.trim_size_preset());

    let is_bleed_enabled = stored
        .get("isBleedEnabled")
        .and_then(Value::as_bool)
        .unwrap_or(fallback.is_bleed_enabled());

    let estimated_page_count = stored
        .get("estimatedPageCount")
        .and_then(page_count_value)
        .unwrap_or(fallback.estimated_page_count());

    DocumentSettings::new(trim_size_preset, is_bleed_enabled, estimated_page_count)
}

fn page_count_value(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
}

fn merge_overlay_visibility(
    fallback: &PreviewOverlayVisibility,
    stored: Option<&Map<String, Value>>,
) -> PreviewOverlayVisibility {
    let Some(stored) = stored else {
        return *fallback;
    };
    let flag = |key: &str, fallback: bool| stored.get(key).and_then(Value::as_bool).unwrap_or(fallback);

    PreviewOverlayVisibility {
        is_safe_area_visible: flag("isSafeAreaVisible", fallback.is_safe_area_visible),
        is_bleed_visible: flag("isBleedVisible", fallback.is_bleed_visible),
        is_margins_visible: flag("isMarginsVisible", fallback.is_margins_visible),
        is_gutter_visible: flag("isGutterVisible", fallback.is_gutter_visible),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BlockIdAllocator, BlockType};
    use serde_json::json;

    fn fallback() -> AppWorkspaceState {
        AppWorkspaceState::initial(&mut BlockIdAllocator::new())
    }

    #[test]
    fn test_round_trip_preserves_state() {
        let mut state = fallback();
        state.active_ui_language_code = UiLanguageCode::Fr;
        state.active_theme_mode = ThemeMode::Dark;
        state.active_workspace_tab = WorkspaceTab::Preview;
        state.selected_workbook_block_id = Some(BlockId::from("block_3"));
        state.document_settings = DocumentSettings::new(TrimSizePreset::Trim85x11, true, 200);
        state.preview_overlay_visibility.is_bleed_visible = true;

        let payload = serde_json::to_string(&state).unwrap();
        let restored = restore_from_json(&fallback(), &payload).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_unknown_enumerations_fall_back() {
        let stored = json!({
            "activeUiLanguageCode": "de",
            "activeThemeMode": "solarized",
            "activeWorkspaceTab": "settings",
            "documentSettings": { "trimSizePresetId": "bogus", "estimatedPageCount": 300 }
        });

        let restored = merge_workspace_state(&fallback(), &stored).unwrap();
        assert_eq!(restored.active_ui_language_code, UiLanguageCode::En);
        assert_eq!(restored.active_theme_mode, ThemeMode::Light);
        assert_eq!(restored.active_workspace_tab, WorkspaceTab::Editor);
        assert_eq!(restored.document_settings.trim_size_preset(), TrimSizePreset::Trim6x9);
        assert_eq!(restored.document_settings.estimated_page_count(), 300);
        assert_eq!(restored.document_settings.gutter_width_millimeters(), 9.0);
    }

    #[test]
    fn test_stored_gutter_never_trusted() {
        let stored = json!({
            "documentSettings": {
                "trimSizePresetId": "trim_5x8",
                "isBleedEnabled": false,
                "estimatedPageCount": 10,
                "calculatedGutterWidthMillimeters": 42.0
            }
        });
        let restored = merge_workspace_state(&fallback(), &stored).unwrap();
        assert_eq!(restored.document_settings.gutter_width_millimeters(), 2.5);
    }

    #[test]
    fn test_empty_blocks_keep_defaults() {
        let stored = json!({ "workbookBlocks": [], "selectedWorkbookBlockId": "block_9" });
        let restored = merge_workspace_state(&fallback(), &stored).unwrap();
        assert_eq!(restored.workbook_blocks, fallback().workbook_blocks);
        assert_eq!(restored.selected_workbook_block_id, Some(BlockId::from("block_1")));
    }

    #[test]
    fn test_selection_must_name_a_restored_block() {
        let stored = json!({
            "workbookBlocks": [
                { "blockId": "block_20", "blockType": "heading", "headingText": "Intro" },
                { "blockId": "block_21", "blockType": "pageBreak", "pageBreakNote": "" }
            ],
            "selectedWorkbookBlockId": "block_1"
        });
        let restored = merge_workspace_state(&fallback(), &stored).unwrap();
        assert_eq!(restored.workbook_blocks.len(), 2);
        assert_eq!(restored.workbook_blocks[1].block_type(), BlockType::PageBreak);
        assert_eq!(restored.selected_workbook_block_id, Some(BlockId::from("block_20")));
    }

    #[test]
    fn test_stored_answer_line_counts_clamped() {
        let stored = json!({
            "workbookBlocks": [
                { "blockId": "block_1", "blockType": "answerLines", "answerLinesPromptText": "a", "answerLineCount": 0 },
                { "blockId": "block_2", "blockType": "answerLines", "answerLinesPromptText": "b", "answerLineCount": -4 },
                { "blockId": "block_3", "blockType": "answerLines", "answerLinesPromptText": "c", "answerLineCount": 2.5 },
                { "blockId": "block_4", "blockType": "answerLines", "answerLinesPromptText": "d", "answerLineCount": 8 }
            ]
        });
        let restored = merge_workspace_state(&fallback(), &stored).unwrap();

        let counts: Vec<u64> = restored
            .workbook_blocks
            .iter()
            .map(|block| serde_json::to_value(block).unwrap()["answerLineCount"].as_u64().unwrap())
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 8]);
    }

    #[test]
    fn test_overlay_flags_merged_key_by_key() {
        let stored = json!({
            "previewOverlayVisibility": { "isGutterVisible": false, "isBleedVisible": "yes" }
        });
        let restored = merge_workspace_state(&fallback(), &stored).unwrap();
        let overlays = restored.preview_overlay_visibility;
        assert!(!overlays.is_gutter_visible);
        assert!(!overlays.is_bleed_visible);
        assert!(overlays.is_safe_area_visible);
        assert!(overlays.is_margins_visible);
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        assert!(matches!(restore_from_json(&fallback(), "{not json"), Err(SnapshotError::Json(_))));
        assert!(matches!(restore_from_json(&fallback(), "[1, 2]"), Err(SnapshotError::NotAnObject)));

        let stored = json!({ "workbookBlocks": [{ "blockId": "block_1", "blockType": "video" }] });
        assert!(matches!(
            merge_workspace_state(&fallback(), &stored),
            Err(SnapshotError::InvalidBlocks(_))
        ));

        let stored = json!({
            "workbookBlocks": [
                { "blockId": "block_1", "blockType": "heading", "headingText": "A" },
                { "blockId": "block_1", "blockType": "heading", "headingText": "B" }
            ]
        });
        assert!(matches!(
            merge_workspace_state(&fallback(), &stored),
            Err(SnapshotError::DuplicateBlockId(_))
        ));
    }
}
