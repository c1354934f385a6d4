//! Block list component
//!
//! One row per block in document order: the localized kind label, a short
//! preview of the block's text, and which move buttons are usable.

use crate::i18n::{block_type_text_key, localized_text, LocalizationDictionary, UiTextKey};
use crate::state::{AppWorkspaceState, BlockId};
use std::fmt::Write;

/// Display data for one row of the block list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockListEntry {
    pub block_id: BlockId,
    pub label: String,
    pub preview_text: String,
    pub is_selected: bool,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

/// Build the rows of the block list
pub fn block_list_entries(dictionary: &LocalizationDictionary, state: &AppWorkspaceState) -> Vec<BlockListEntry> {
    let language = state.active_ui_language_code;
    let last_index = state.workbook_blocks.len().saturating_sub(1);

    state
        .workbook_blocks
        .iter()
        .enumerate()
        .map(|(index, block)| BlockListEntry {
            block_id: block.block_id().clone(),
            label: localized_text(dictionary, language, block_type_text_key(block.block_type())).to_string(),
            preview_text: block.preview_text().to_string(),
            is_selected: state.selected_workbook_block_id.as_ref() == Some(block.block_id()),
            can_move_up: index > 0,
            can_move_down: index < last_index,
        })
        .collect()
}

/// Render the block list section
pub fn render_block_list(out: &mut String, dictionary: &LocalizationDictionary, state: &AppWorkspaceState) {
    let language = state.active_ui_language_code;
    let _ = writeln!(out, "{}", localized_text(dictionary, language, UiTextKey::EditorBlocksTitle));

    for entry in block_list_entries(dictionary, state) {
        let marker = if entry.is_selected { '>' } else { ' ' };
        let up = if entry.can_move_up { '↑' } else { ' ' };
        let down = if entry.can_move_down { '↓' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {}{} [{}] {}: {}",
            marker, up, down, entry.block_id, entry.label, entry.preview_text
        );
    }
}
