//! Outline component
//!
//! Lists chapter start blocks by title so a chapter can be jumped to.

use crate::i18n::{localized_text, LocalizationDictionary, UiTextKey};
use crate::state::{AppWorkspaceState, BlockId};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub block_id: BlockId,
    pub chapter_title_text: String,
}

pub fn outline_entries(state: &AppWorkspaceState) -> Vec<OutlineEntry> {
    state
        .chapter_blocks()
        .map(|block| OutlineEntry {
            block_id: block.block_id().clone(),
            chapter_title_text: block.preview_text().to_string(),
        })
        .collect()
}

/// Render the outline section, or the empty-outline text when there are no chapters
pub fn render_outline(out: &mut String, dictionary: &LocalizationDictionary, state: &AppWorkspaceState) {
    let language = state.active_ui_language_code;
    let _ = writeln!(out, "{}", localized_text(dictionary, language, UiTextKey::SidebarOutlineTitle));

    let entries = outline_entries(state);
    if entries.is_empty() {
        let _ = writeln!(out, "  {}", localized_text(dictionary, language, UiTextKey::OutlineEmpty));
        return;
    }

    for entry in entries {
        let _ = writeln!(out, "  [{}] {}", entry.block_id, entry.chapter_title_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BlockIdAllocator, BlockType, UiLanguageCode, WorkbookBlock};

    #[test]
    fn test_outline_lists_chapters_in_order() {
        let mut ids = BlockIdAllocator::new();
        let mut state = AppWorkspaceState::initial(&mut ids);
        state
            .workbook_blocks
            .push(WorkbookBlock::new(ids.allocate().unwrap(), BlockType::ChapterStart));

        let entries = outline_entries(&state);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].block_id, BlockId::from("block_1"));
        assert_eq!(entries[1].block_id, BlockId::from("block_6"));
        assert_eq!(entries[1].chapter_title_text, "New chapter");
    }

    #[test]
    fn test_empty_outline_text() {
        let mut state = AppWorkspaceState::initial(&mut BlockIdAllocator::new());
        state
            .workbook_blocks
            .retain(|block| block.block_type() != BlockType::ChapterStart);
        state.active_ui_language_code = UiLanguageCode::Ru;

        let mut out = String::new();
        render_outline(&mut out, LocalizationDictionary::builtin(), &state);
        assert_eq!(out, "Оглавление\n  Пока нет глав\n");
    }
}
