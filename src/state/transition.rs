//! Workspace state transitions
//!
//! `update` is the single place where workspace messages become new states.
//! It never mutates the current state; it returns a replacement.

use super::{AppWorkspaceState, BlockId, BlockIdAllocator, MoveDirection, WorkbookBlock};
use crate::error::BlockFieldResult;
use crate::message::WorkspaceMessage;

/// Outcome of applying a message
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A new state to publish (it may equal the old one, e.g. a boundary move)
    Applied(AppWorkspaceState),

    /// Nothing to publish
    Skipped,
}

/// Apply `message` to `state`
///
/// New block ids come from `block_ids`. Field patches that do not match the
/// selected block's kind are rejected and leave everything untouched.
pub fn update(
    state: &AppWorkspaceState,
    block_ids: &mut BlockIdAllocator,
    message: WorkspaceMessage,
) -> BlockFieldResult<Transition> {
    let next = match message {
        WorkspaceMessage::SetLanguage(code) => AppWorkspaceState {
            active_ui_language_code: code,
            ..state.clone()
        },
        WorkspaceMessage::SetTheme(mode) => AppWorkspaceState {
            active_theme_mode: mode,
            ..state.clone()
        },
        WorkspaceMessage::SetTab(tab) => AppWorkspaceState {
            active_workspace_tab: tab,
            ..state.clone()
        },
        WorkspaceMessage::AddBlock(block_type) => {
            let Some(block_id) = block_ids.allocate() else {
                log::warn!("Block id counter exhausted, not adding {:?}", block_type);
                return Ok(Transition::Skipped);
            };
            let block = WorkbookBlock::new(block_id, block_type);
            let selected = block.block_id().clone();
            let mut workbook_blocks = state.workbook_blocks.clone();
            workbook_blocks.push(block);
            AppWorkspaceState {
                workbook_blocks,
                selected_workbook_block_id: Some(selected),
                ..state.clone()
            }
        }
        WorkspaceMessage::SelectBlock(block_id) => AppWorkspaceState {
            selected_workbook_block_id: Some(block_id),
            ..state.clone()
        },
        WorkspaceMessage::MoveBlock { block_id, direction } => AppWorkspaceState {
            workbook_blocks: reorder_workbook_block(&state.workbook_blocks, &block_id, direction),
            ..state.clone()
        },
        WorkspaceMessage::DragBlock { source, target } => AppWorkspaceState {
            workbook_blocks: reorder_workbook_blocks_by_drag(&state.workbook_blocks, &source, &target),
            ..state.clone()
        },
        WorkspaceMessage::UpdateDocumentSettings(patch) => AppWorkspaceState {
            document_settings: state.document_settings.with_patch(&patch),
            ..state.clone()
        },
        WorkspaceMessage::UpdateOverlays(patch) => AppWorkspaceState {
            preview_overlay_visibility: state.preview_overlay_visibility.with_patch(&patch),
            ..state.clone()
        },
        WorkspaceMessage::UpdateSelectedBlock(patch) => {
            let Some(selected) = state.selected_block() else {
                return Ok(Transition::Skipped);
            };
            let updated = selected.with_patch(&patch)?;
            let workbook_blocks = state
                .workbook_blocks
                .iter()
                .map(|block| {
                    if block.block_id() == updated.block_id() {
                        updated.clone()
                    } else {
                        block.clone()
                    }
                })
                .collect();
            AppWorkspaceState {
                workbook_blocks,
                ..state.clone()
            }
        }
    };

    Ok(Transition::Applied(next))
}

/// Swap the block `block_id` with its neighbor in `direction`
///
/// Unknown ids and moves past either end return the sequence unchanged.
pub fn reorder_workbook_block(
    blocks: &[WorkbookBlock],
    block_id: &BlockId,
    direction: MoveDirection,
) -> Vec<WorkbookBlock> {
    let mut reordered = blocks.to_vec();
    let Some(index) = blocks.iter().position(|block| block.block_id() == block_id) else {
        return reordered;
    };

    let swap_index = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => Some(index + 1).filter(|i| *i < blocks.len()),
    };
    if let Some(swap_index) = swap_index {
        reordered.swap(index, swap_index);
    }
    reordered
}

/// Move `source` so it lands in front of `target`
///
/// When the source sits before the target, removing it shifts the target one
/// slot left, so the insert index is adjusted down by one.
pub fn reorder_workbook_blocks_by_drag(
    blocks: &[WorkbookBlock],
    source: &BlockId,
    target: &BlockId,
) -> Vec<WorkbookBlock> {
    let mut reordered = blocks.to_vec();
    if source == target {
        return reordered;
    }

    let source_index = blocks.iter().position(|block| block.block_id() == source);
    let target_index = blocks.iter().position(|block| block.block_id() == target);
    let (Some(source_index), Some(target_index)) = (source_index, target_index) else {
        return reordered;
    };

    let moved = reordered.remove(source_index);
    let insert_index = if source_index < target_index {
        target_index - 1
    } else {
        target_index
    };
    reordered.insert(insert_index, moved);
    reordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BlockFieldPatch, BlockType, DocumentSettingsPatch, TrimSizePreset};
    use std::collections::BTreeSet;

    fn initial() -> (AppWorkspaceState, BlockIdAllocator) {
        let mut ids = BlockIdAllocator::new();
        let state = AppWorkspaceState::initial(&mut ids);
        (state, ids)
    }

    fn applied(transition: Transition) -> AppWorkspaceState {
        match transition {
            Transition::Applied(state) => state,
            Transition::Skipped => panic!("expected a new state"),
        }
    }

    fn kinds(state: &AppWorkspaceState) -> Vec<BlockType> {
        state.workbook_blocks.iter().map(|b| b.block_type()).collect()
    }

    fn ids_of(blocks: &[WorkbookBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.block_id().as_str()).collect()
    }

    fn id_set(blocks: &[WorkbookBlock]) -> BTreeSet<&str> {
        blocks.iter().map(|b| b.block_id().as_str()).collect()
    }

    #[test]
    fn test_add_block_appends_and_selects() {
        let (state, mut ids) = initial();
        for block_type in BlockType::ALL {
            let next = applied(update(&state, &mut ids, WorkspaceMessage::AddBlock(block_type)).unwrap());
            let added = next.workbook_blocks.last().unwrap();
            assert_eq!(added.block_type(), block_type);
            assert!(state.block(added.block_id()).is_none());
            assert_eq!(next.selected_workbook_block_id.as_ref(), Some(added.block_id()));
            assert_eq!(next.workbook_blocks.len(), state.workbook_blocks.len() + 1);
        }
    }

    #[test]
    fn test_move_heading_up() {
        let (state, mut ids) = initial();
        let message = WorkspaceMessage::MoveBlock {
            block_id: BlockId::from("block_2"),
            direction: MoveDirection::Up,
        };
        let next = applied(update(&state, &mut ids, message).unwrap());
        assert_eq!(
            kinds(&next),
            vec![
                BlockType::Heading,
                BlockType::ChapterStart,
                BlockType::Paragraph,
                BlockType::Checklist,
                BlockType::AnswerLines,
            ]
        );
    }

    #[test]
    fn test_move_at_boundaries_is_noop() {
        let (state, _) = initial();
        let first = BlockId::from("block_1");
        let last = BlockId::from("block_5");

        assert_eq!(
            reorder_workbook_block(&state.workbook_blocks, &first, MoveDirection::Up),
            state.workbook_blocks
        );
        assert_eq!(
            reorder_workbook_block(&state.workbook_blocks, &last, MoveDirection::Down),
            state.workbook_blocks
        );
        assert_eq!(
            reorder_workbook_block(&state.workbook_blocks, &BlockId::from("missing"), MoveDirection::Down),
            state.workbook_blocks
        );
    }

    #[test]
    fn test_move_down_swaps_neighbors() {
        let (state, _) = initial();
        let moved = reorder_workbook_block(&state.workbook_blocks, &BlockId::from("block_3"), MoveDirection::Down);
        assert_eq!(ids_of(&moved), vec!["block_1", "block_2", "block_4", "block_3", "block_5"]);
    }

    #[test]
    fn test_drag_forward_lands_before_targets_neighbor() {
        let (state, _) = initial();
        let moved = reorder_workbook_blocks_by_drag(
            &state.workbook_blocks,
            &BlockId::from("block_1"),
            &BlockId::from("block_4"),
        );
        assert_eq!(ids_of(&moved), vec!["block_2", "block_3", "block_1", "block_4", "block_5"]);
    }

    #[test]
    fn test_drag_backward_lands_before_target() {
        let (state, _) = initial();
        let moved = reorder_workbook_blocks_by_drag(
            &state.workbook_blocks,
            &BlockId::from("block_5"),
            &BlockId::from("block_2"),
        );
        assert_eq!(ids_of(&moved), vec!["block_1", "block_5", "block_2", "block_3", "block_4"]);
    }

    #[test]
    fn test_drag_noops() {
        let (state, _) = initial();
        let same = BlockId::from("block_3");
        assert_eq!(
            reorder_workbook_blocks_by_drag(&state.workbook_blocks, &same, &same),
            state.workbook_blocks
        );
        assert_eq!(
            reorder_workbook_blocks_by_drag(&state.workbook_blocks, &BlockId::from("ghost"), &same),
            state.workbook_blocks
        );
        assert_eq!(
            reorder_workbook_blocks_by_drag(&state.workbook_blocks, &same, &BlockId::from("ghost")),
            state.workbook_blocks
        );
    }

    #[test]
    fn test_reorders_keep_the_same_blocks() {
        let (state, _) = initial();
        let blocks = &state.workbook_blocks;
        let before = id_set(blocks);

        for block in blocks {
            for direction in [MoveDirection::Up, MoveDirection::Down] {
                let moved = reorder_workbook_block(blocks, block.block_id(), direction);
                assert_eq!(moved.len(), blocks.len());
                assert_eq!(id_set(&moved), before);
            }
            for target in blocks {
                let moved = reorder_workbook_blocks_by_drag(blocks, block.block_id(), target.block_id());
                assert_eq!(moved.len(), blocks.len());
                assert_eq!(id_set(&moved), before);
            }
        }
    }

    #[test]
    fn test_settings_update_recomputes_gutter() {
        let (state, mut ids) = initial();
        let patch = DocumentSettingsPatch::new()
            .trim_size(TrimSizePreset::Trim85x11)
            .bleed(true)
            .page_count(200);
        let next = applied(update(&state, &mut ids, WorkspaceMessage::UpdateDocumentSettings(patch)).unwrap());
        assert_eq!(next.document_settings.gutter_width_millimeters(), 7.5);
    }

    #[test]
    fn test_update_selected_block_without_selection_skips() {
        let (mut state, mut ids) = initial();
        state.selected_workbook_block_id = None;
        let patch = BlockFieldPatch::empty(BlockType::Heading);
        let transition = update(&state, &mut ids, WorkspaceMessage::UpdateSelectedBlock(patch)).unwrap();
        assert_eq!(transition, Transition::Skipped);
    }

    #[test]
    fn test_update_selected_block_touches_only_selection() {
        let (state, mut ids) = initial();
        let patch = BlockFieldPatch::ChapterStart {
            chapter_title_text: Some("Budgeting Basics".to_string()),
            chapter_subtitle_text: None,
        };
        let next = applied(update(&state, &mut ids, WorkspaceMessage::UpdateSelectedBlock(patch)).unwrap());
        assert_eq!(next.workbook_blocks[0].preview_text(), "Budgeting Basics");
        assert_eq!(next.workbook_blocks[1..], state.workbook_blocks[1..]);
    }

    #[test]
    fn test_update_selected_block_rejects_other_kind() {
        let (state, mut ids) = initial();
        let patch = BlockFieldPatch::Paragraph {
            paragraph_text: Some("text".to_string()),
        };
        assert!(update(&state, &mut ids, WorkspaceMessage::UpdateSelectedBlock(patch)).is_err());
    }
}
