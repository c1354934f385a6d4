//! Workspace message types
//!
//! Every change to the workspace is described by one of these messages and
//! applied by [`crate::state::update`]. Front ends translate their input
//! events into messages instead of touching state directly.

use crate::state::{
    BlockFieldPatch, BlockId, BlockType, DocumentSettingsPatch, MoveDirection,
    OverlayVisibilityPatch, ThemeMode, UiLanguageCode, WorkspaceTab,
};

/// Main workspace message enum
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceMessage {
    /// Switch the UI language
    SetLanguage(UiLanguageCode),

    /// Switch the color theme
    SetTheme(ThemeMode),

    /// Bring the editor or preview pane to the front
    SetTab(WorkspaceTab),

    /// Append a new block with default fields and select it
    AddBlock(BlockType),

    /// Point the selection at a block id (not checked against the sequence)
    SelectBlock(BlockId),

    /// Swap a block with its neighbor
    MoveBlock {
        block_id: BlockId,
        direction: MoveDirection,
    },

    /// Drop `source` in front of `target`
    DragBlock { source: BlockId, target: BlockId },

    /// Merge layout settings
    UpdateDocumentSettings(DocumentSettingsPatch),

    /// Merge preview overlay flags
    UpdateOverlays(OverlayVisibilityPatch),

    /// Merge fields into the selected block
    UpdateSelectedBlock(BlockFieldPatch),
}

impl WorkspaceMessage {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            WorkspaceMessage::SetLanguage(_) => "set-language",
            WorkspaceMessage::SetTheme(_) => "set-theme",
            WorkspaceMessage::SetTab(_) => "set-tab",
            WorkspaceMessage::AddBlock(_) => "add-block",
            WorkspaceMessage::SelectBlock(_) => "select-block",
            WorkspaceMessage::MoveBlock { .. } => "move-block",
            WorkspaceMessage::DragBlock { .. } => "drag-block",
            WorkspaceMessage::UpdateDocumentSettings(_) => "update-document-settings",
            WorkspaceMessage::UpdateOverlays(_) => "update-overlays",
            WorkspaceMessage::UpdateSelectedBlock(_) => "update-selected-block",
        }
    }
}
