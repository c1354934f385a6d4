//! Root workspace state
//!
//! Holds the whole editor state: the block sequence, layout settings, the
//! selection pointer, overlay flags, and UI preferences. This is also the
//! exact shape written to storage.

use super::{BlockId, BlockIdAllocator, BlockType, DocumentSettings, PreviewOverlayVisibility, WorkbookBlock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of the editor UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UiLanguageCode {
    #[default]
    En,
    Ru,
    Fr,
}

impl UiLanguageCode {
    pub const ALL: [UiLanguageCode; 3] = [UiLanguageCode::En, UiLanguageCode::Ru, UiLanguageCode::Fr];

    pub fn as_str(&self) -> &'static str {
        match self {
            UiLanguageCode::En => "en",
            UiLanguageCode::Ru => "ru",
            UiLanguageCode::Fr => "fr",
        }
    }
}

impl fmt::Display for UiLanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiLanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UiLanguageCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unsupported language: {}", s))
    }
}

/// Color theme of the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(format!("unknown theme: {}", s)),
        }
    }
}

/// Which workspace pane is in front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceTab {
    #[default]
    Editor,
    Preview,
}

impl FromStr for WorkspaceTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(WorkspaceTab::Editor),
            "preview" => Ok(WorkspaceTab::Preview),
            _ => Err(format!("unknown workspace tab: {}", s)),
        }
    }
}

/// Direction for stepwise block reordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            _ => Err(format!("unknown direction: {}", s)),
        }
    }
}

/// Kinds of the blocks a new workbook starts with
pub const DEFAULT_BLOCK_TYPES: [BlockType; 5] = [
    BlockType::ChapterStart,
    BlockType::Heading,
    BlockType::Paragraph,
    BlockType::Checklist,
    BlockType::AnswerLines,
];

/// Root workspace state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppWorkspaceState {
    pub active_ui_language_code: UiLanguageCode,
    pub active_theme_mode: ThemeMode,
    pub document_settings: DocumentSettings,
    /// Display and export order
    pub workbook_blocks: Vec<WorkbookBlock>,
    pub selected_workbook_block_id: Option<BlockId>,
    pub preview_overlay_visibility: PreviewOverlayVisibility,
    pub active_workspace_tab: WorkspaceTab,
}

impl AppWorkspaceState {
    /// Built-in starting state; block ids are drawn from `block_ids`
    pub fn initial(block_ids: &mut BlockIdAllocator) -> Self {
        let workbook_blocks: Vec<WorkbookBlock> = DEFAULT_BLOCK_TYPES
            .into_iter()
            .filter_map(|block_type| block_ids.allocate().map(|block_id| WorkbookBlock::new(block_id, block_type)))
            .collect();
        let selected_workbook_block_id = workbook_blocks.first().map(|block| block.block_id().clone());

        Self {
            active_ui_language_code: UiLanguageCode::default(),
            active_theme_mode: ThemeMode::default(),
            document_settings: DocumentSettings::default(),
            workbook_blocks,
            selected_workbook_block_id,
            preview_overlay_visibility: PreviewOverlayVisibility::default(),
            active_workspace_tab: WorkspaceTab::default(),
        }
    }

    pub fn block(&self, block_id: &BlockId) -> Option<&WorkbookBlock> {
        self.workbook_blocks
            .iter()
            .find(|block| block.block_id() == block_id)
    }

    /// The selected block, if the selection points at a live block
    pub fn selected_block(&self) -> Option<&WorkbookBlock> {
        self.selected_workbook_block_id
            .as_ref()
            .and_then(|block_id| self.block(block_id))
    }

    /// All block ids in order
    pub fn block_ids(&self) -> Vec<&BlockId> {
        self.workbook_blocks.iter().map(|block| block.block_id()).collect()
    }

    /// Chapter start blocks, in order
    pub fn chapter_blocks(&self) -> impl Iterator<Item = &WorkbookBlock> {
        self.workbook_blocks
            .iter()
            .filter(|block| block.block_type() == BlockType::ChapterStart)
    }
}
