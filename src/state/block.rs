//! Workbook blocks
//!
//! A block is one unit of workbook content with a fixed kind and kind-specific
//! fields. The id and the kind are fixed when the block is created; only the
//! kind's own fields can change afterwards, through a [`BlockFieldPatch`].

use crate::error::{BlockFieldError, BlockFieldResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Prefix of every generated block id
pub const BLOCK_ID_PREFIX: &str = "block_";

/// Unique identifier of a block within a workbook
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a generated id (`block_<n>`)
    pub fn numeric_suffix(&self) -> Option<u64> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"^block_(\d+)$").ok())
            .as_ref()?;

        pattern
            .captures(&self.0)
            .and_then(|captures| captures.get(1))
            .and_then(|suffix| suffix.as_str().parse().ok())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Allocates block ids from a counter that never goes backwards
///
/// Once `block_18446744073709551615` has been handed out or restored the
/// counter is exhausted and no further ids are allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIdAllocator {
    next: Option<u64>,
}

impl BlockIdAllocator {
    /// Create an allocator whose first id is `block_1`
    pub fn new() -> Self {
        Self { next: Some(1) }
    }

    /// Hand out the next id, `None` when the counter is exhausted
    pub fn allocate(&mut self) -> Option<BlockId> {
        let current = self.next?;
        self.next = current.checked_add(1);
        Some(BlockId(format!("{}{}", BLOCK_ID_PREFIX, current)))
    }

    /// Counter value the next allocation will use
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    /// Move the counter past every generated id in `blocks`
    ///
    /// Ids that do not look like `block_<n>` are ignored. With no generated
    /// ids at all the counter restarts at 1.
    pub fn synchronize(&mut self, blocks: &[WorkbookBlock]) {
        let highest = blocks
            .iter()
            .filter_map(|block| block.block_id().numeric_suffix())
            .max()
            .unwrap_or(0);
        self.next = highest.checked_add(1);
    }

    /// Move the counter past every generated id in `blocks`, never backwards
    pub fn advance_past(&mut self, blocks: &[WorkbookBlock]) {
        let Some(current) = self.next else {
            return;
        };
        let mut synced = Self::new();
        synced.synchronize(blocks);
        self.next = synced.next.map(|next| next.max(current));
    }
}

impl Default for BlockIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of a workbook block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Paragraph,
    Heading,
    SectionBreak,
    PageBreak,
    ChapterStart,
    Checklist,
    AnswerLines,
    CalloutBox,
    Image,
}

impl BlockType {
    /// Every block kind, in palette order
    pub const ALL: [BlockType; 9] = [
        BlockType::Paragraph,
        BlockType::Heading,
        BlockType::SectionBreak,
        BlockType::PageBreak,
        BlockType::ChapterStart,
        BlockType::Checklist,
        BlockType::AnswerLines,
        BlockType::CalloutBox,
        BlockType::Image,
    ];

    /// Wire name of the kind (the `blockType` tag)
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::SectionBreak => "sectionBreak",
            BlockType::PageBreak => "pageBreak",
            BlockType::ChapterStart => "chapterStart",
            BlockType::Checklist => "checklist",
            BlockType::AnswerLines => "answerLines",
            BlockType::CalloutBox => "calloutBox",
            BlockType::Image => "image",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|block_type| block_type.as_str() == s)
            .ok_or_else(|| format!("unknown block type: {}", s))
    }
}

/// Visual style of a section break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectionBreakStyle {
    #[default]
    Line,
    Space,
    Ornament,
}

impl SectionBreakStyle {
    pub const ALL: [SectionBreakStyle; 3] = [
        SectionBreakStyle::Line,
        SectionBreakStyle::Space,
        SectionBreakStyle::Ornament,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionBreakStyle::Line => "line",
            SectionBreakStyle::Space => "space",
            SectionBreakStyle::Ornament => "ornament",
        }
    }
}

impl FromStr for SectionBreakStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionBreakStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| format!("unknown section break style: {}", s))
    }
}

/// Kind-specific fields of a block, tagged by `blockType` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType", rename_all = "camelCase")]
pub enum BlockContent {
    #[serde(rename_all = "camelCase")]
    Paragraph { paragraph_text: String },

    #[serde(rename_all = "camelCase")]
    Heading { heading_text: String },

    #[serde(rename_all = "camelCase")]
    SectionBreak { section_break_style_id: SectionBreakStyle },

    #[serde(rename_all = "camelCase")]
    PageBreak { page_break_note: String },

    #[serde(rename_all = "camelCase")]
    ChapterStart {
        chapter_title_text: String,
        chapter_subtitle_text: String,
    },

    #[serde(rename_all = "camelCase")]
    Checklist {
        checklist_title_text: String,
        checklist_items: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    AnswerLines {
        answer_lines_prompt_text: String,
        answer_line_count: u32,
    },

    #[serde(rename_all = "camelCase")]
    CalloutBox {
        callout_title_text: String,
        callout_body_text: String,
    },

    #[serde(rename_all = "camelCase")]
    Image {
        image_asset_id: String,
        image_caption_text: String,
    },
}

impl BlockContent {
    /// Field values a freshly added block of `block_type` starts with
    pub fn defaults_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Paragraph => BlockContent::Paragraph {
                paragraph_text: "New paragraph text".to_string(),
            },
            BlockType::Heading => BlockContent::Heading {
                heading_text: "New heading".to_string(),
            },
            BlockType::SectionBreak => BlockContent::SectionBreak {
                section_break_style_id: SectionBreakStyle::Line,
            },
            BlockType::PageBreak => BlockContent::PageBreak {
                page_break_note: "New page break".to_string(),
            },
            BlockType::ChapterStart => BlockContent::ChapterStart {
                chapter_title_text: "New chapter".to_string(),
                chapter_subtitle_text: "Chapter subtitle".to_string(),
            },
            BlockType::Checklist => BlockContent::Checklist {
                checklist_title_text: "Checklist title".to_string(),
                checklist_items: vec!["First item".to_string(), "Second item".to_string()],
            },
            BlockType::AnswerLines => BlockContent::AnswerLines {
                answer_lines_prompt_text: "Prompt text".to_string(),
                answer_line_count: 5,
            },
            BlockType::CalloutBox => BlockContent::CalloutBox {
                callout_title_text: "Callout title".to_string(),
                callout_body_text: "Callout body text".to_string(),
            },
            BlockType::Image => BlockContent::Image {
                image_asset_id: "image_001".to_string(),
                image_caption_text: "Image caption".to_string(),
            },
        }
    }

    /// Kind of this content
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Paragraph { .. } => BlockType::Paragraph,
            BlockContent::Heading { .. } => BlockType::Heading,
            BlockContent::SectionBreak { .. } => BlockType::SectionBreak,
            BlockContent::PageBreak { .. } => BlockType::PageBreak,
            BlockContent::ChapterStart { .. } => BlockType::ChapterStart,
            BlockContent::Checklist { .. } => BlockType::Checklist,
            BlockContent::AnswerLines { .. } => BlockType::AnswerLines,
            BlockContent::CalloutBox { .. } => BlockType::CalloutBox,
            BlockContent::Image { .. } => BlockType::Image,
        }
    }
}

/// A single block in the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookBlock {
    #[serde(rename = "blockId")]
    block_id: BlockId,

    #[serde(flatten)]
    content: BlockContent,
}

impl WorkbookBlock {
    /// Create a block of `block_type` with its default field values
    pub fn new(block_id: BlockId, block_type: BlockType) -> Self {
        Self {
            block_id,
            content: BlockContent::defaults_for(block_type),
        }
    }

    /// Create a block from explicit content
    pub fn with_content(block_id: BlockId, content: BlockContent) -> Self {
        Self { block_id, content }
    }

    pub fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }

    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    /// One-line summary shown in block lists
    pub fn preview_text(&self) -> &str {
        match &self.content {
            BlockContent::Paragraph { paragraph_text } => paragraph_text,
            BlockContent::Heading { heading_text } => heading_text,
            BlockContent::SectionBreak {
                section_break_style_id,
            } => section_break_style_id.as_str(),
            BlockContent::PageBreak { page_break_note } => page_break_note,
            BlockContent::ChapterStart {
                chapter_title_text, ..
            } => chapter_title_text,
            BlockContent::Checklist {
                checklist_title_text,
                ..
            } => checklist_title_text,
            BlockContent::AnswerLines {
                answer_lines_prompt_text,
                ..
            } => answer_lines_prompt_text,
            BlockContent::CalloutBox {
                callout_title_text, ..
            } => callout_title_text,
            BlockContent::Image {
                image_caption_text, ..
            } => image_caption_text,
        }
    }

    /// Return a copy of this block with `patch` merged into its fields
    ///
    /// The id and kind are carried over unchanged. A patch built for a
    /// different kind is rejected.
    pub fn with_patch(&self, patch: &BlockFieldPatch) -> BlockFieldResult<Self> {
        let mismatch = || BlockFieldError::KindMismatch {
            block_id: self.block_id.to_string(),
            patch: patch.block_type(),
            found: self.block_type(),
        };

        let mut content = self.content.clone();
        match (&mut content, patch) {
            (
                BlockContent::Paragraph { paragraph_text },
                BlockFieldPatch::Paragraph {
                    paragraph_text: new_text,
                },
            ) => merge(paragraph_text, new_text),
            (
                BlockContent::Heading { heading_text },
                BlockFieldPatch::Heading {
                    heading_text: new_text,
                },
            ) => merge(heading_text, new_text),
            (
                BlockContent::SectionBreak {
                    section_break_style_id,
                },
                BlockFieldPatch::SectionBreak {
                    section_break_style_id: new_style,
                },
            ) => {
                if let Some(style) = new_style {
                    *section_break_style_id = *style;
                }
            }
            (
                BlockContent::PageBreak { page_break_note },
                BlockFieldPatch::PageBreak {
                    page_break_note: new_note,
                },
            ) => merge(page_break_note, new_note),
            (
                BlockContent::ChapterStart {
                    chapter_title_text,
                    chapter_subtitle_text,
                },
                BlockFieldPatch::ChapterStart {
                    chapter_title_text: new_title,
                    chapter_subtitle_text: new_subtitle,
                },
            ) => {
                merge(chapter_title_text, new_title);
                merge(chapter_subtitle_text, new_subtitle);
            }
            (
                BlockContent::Checklist {
                    checklist_title_text,
                    checklist_items,
                },
                BlockFieldPatch::Checklist {
                    checklist_title_text: new_title,
                    checklist_items: new_items,
                },
            ) => {
                merge(checklist_title_text, new_title);
                merge(checklist_items, new_items);
            }
            (
                BlockContent::AnswerLines {
                    answer_lines_prompt_text,
                    answer_line_count,
                },
                BlockFieldPatch::AnswerLines {
                    answer_lines_prompt_text: new_prompt,
                    answer_line_count: new_count,
                },
            ) => {
                merge(answer_lines_prompt_text, new_prompt);
                if let Some(count) = new_count {
                    // line count stays positive
                    *answer_line_count = (*count).max(1);
                }
            }
            (
                BlockContent::CalloutBox {
                    callout_title_text,
                    callout_body_text,
                },
                BlockFieldPatch::CalloutBox {
                    callout_title_text: new_title,
                    callout_body_text: new_body,
                },
            ) => {
                merge(callout_title_text, new_title);
                merge(callout_body_text, new_body);
            }
            (
                BlockContent::Image {
                    image_asset_id,
                    image_caption_text,
                },
                BlockFieldPatch::Image {
                    image_asset_id: new_asset,
                    image_caption_text: new_caption,
                },
            ) => {
                merge(image_asset_id, new_asset);
                merge(image_caption_text, new_caption);
            }
            _ => return Err(mismatch()),
        }

        Ok(Self {
            block_id: self.block_id.clone(),
            content,
        })
    }
}

fn merge<T: Clone>(field: &mut T, update: &Option<T>) {
    if let Some(value) = update {
        *field = value.clone();
    }
}

/// Partial update of one block kind's fields
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockFieldPatch {
    Paragraph {
        paragraph_text: Option<String>,
    },
    Heading {
        heading_text: Option<String>,
    },
    SectionBreak {
        section_break_style_id: Option<SectionBreakStyle>,
    },
    PageBreak {
        page_break_note: Option<String>,
    },
    ChapterStart {
        chapter_title_text: Option<String>,
        chapter_subtitle_text: Option<String>,
    },
    Checklist {
        checklist_title_text: Option<String>,
        checklist_items: Option<Vec<String>>,
    },
    AnswerLines {
        answer_lines_prompt_text: Option<String>,
        answer_line_count: Option<u32>,
    },
    CalloutBox {
        callout_title_text: Option<String>,
        callout_body_text: Option<String>,
    },
    Image {
        image_asset_id: Option<String>,
        image_caption_text: Option<String>,
    },
}

impl BlockFieldPatch {
    /// Patch for `block_type` that changes nothing
    pub fn empty(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Paragraph => BlockFieldPatch::Paragraph {
                paragraph_text: None,
            },
            BlockType::Heading => BlockFieldPatch::Heading { heading_text: None },
            BlockType::SectionBreak => BlockFieldPatch::SectionBreak {
                section_break_style_id: None,
            },
            BlockType::PageBreak => BlockFieldPatch::PageBreak {
                page_break_note: None,
            },
            BlockType::ChapterStart => BlockFieldPatch::ChapterStart {
                chapter_title_text: None,
                chapter_subtitle_text: None,
            },
            BlockType::Checklist => BlockFieldPatch::Checklist {
                checklist_title_text: None,
                checklist_items: None,
            },
            BlockType::AnswerLines => BlockFieldPatch::AnswerLines {
                answer_lines_prompt_text: None,
                answer_line_count: None,
            },
            BlockType::CalloutBox => BlockFieldPatch::CalloutBox {
                callout_title_text: None,
                callout_body_text: None,
            },
            BlockType::Image => BlockFieldPatch::Image {
                image_asset_id: None,
                image_caption_text: None,
            },
        }
    }

    /// Kind of block this patch applies to
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockFieldPatch::Paragraph { .. } => BlockType::Paragraph,
            BlockFieldPatch::Heading { .. } => BlockType::Heading,
            BlockFieldPatch::SectionBreak { .. } => BlockType::SectionBreak,
            BlockFieldPatch::PageBreak { .. } => BlockType::PageBreak,
            BlockFieldPatch::ChapterStart { .. } => BlockType::ChapterStart,
            BlockFieldPatch::Checklist { .. } => BlockType::Checklist,
            BlockFieldPatch::AnswerLines { .. } => BlockType::AnswerLines,
            BlockFieldPatch::CalloutBox { .. } => BlockType::CalloutBox,
            BlockFieldPatch::Image { .. } => BlockType::Image,
        }
    }

    /// Build a patch from loosely typed form values keyed by wire field name
    ///
    /// Keys must belong to `block_type`. Form-style values are accepted:
    /// checklist items may be a newline separated string (blank lines are
    /// dropped) and a line count that is not a positive number becomes 1.
    pub fn from_field_map(block_type: BlockType, fields: &Map<String, Value>) -> BlockFieldResult<Self> {
        let mut patch = Self::empty(block_type);
        for (key, value) in fields {
            patch.set_field(key, value)?;
        }
        Ok(patch)
    }

    /// Build a single-field patch from raw text input
    pub fn from_field_text(block_type: BlockType, field: &str, raw: &str) -> BlockFieldResult<Self> {
        let mut patch = Self::empty(block_type);
        patch.set_field(field, &Value::String(raw.to_string()))?;
        Ok(patch)
    }

    fn set_field(&mut self, key: &str, value: &Value) -> BlockFieldResult<()> {
        if key == "blockId" || key == "blockType" {
            return Err(BlockFieldError::ImmutableField {
                field: key.to_string(),
            });
        }

        let block_type = self.block_type();
        match (self, key) {
            (BlockFieldPatch::Paragraph { paragraph_text }, "paragraphText") => {
                *paragraph_text = Some(text_value(key, value)?);
            }
            (BlockFieldPatch::Heading { heading_text }, "headingText") => {
                *heading_text = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::SectionBreak {
                    section_break_style_id,
                },
                "sectionBreakStyleId",
            ) => {
                let raw = text_value(key, value)?;
                let style = raw
                    .parse()
                    .map_err(|reason| BlockFieldError::InvalidValue {
                        field: key.to_string(),
                        reason,
                    })?;
                *section_break_style_id = Some(style);
            }
            (BlockFieldPatch::PageBreak { page_break_note }, "pageBreakNote") => {
                *page_break_note = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::ChapterStart {
                    chapter_title_text, ..
                },
                "chapterTitleText",
            ) => {
                *chapter_title_text = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::ChapterStart {
                    chapter_subtitle_text,
                    ..
                },
                "chapterSubtitleText",
            ) => {
                *chapter_subtitle_text = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::Checklist {
                    checklist_title_text,
                    ..
                },
                "checklistTitleText",
            ) => {
                *checklist_title_text = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::Checklist {
                    checklist_items, ..
                },
                "checklistItems",
            ) => {
                *checklist_items = Some(checklist_items_value(key, value)?);
            }
            (
                BlockFieldPatch::AnswerLines {
                    answer_lines_prompt_text,
                    ..
                },
                "answerLinesPromptText",
            ) => {
                *answer_lines_prompt_text = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::AnswerLines {
                    answer_line_count, ..
                },
                "answerLineCount",
            ) => {
                *answer_line_count = Some(coerce_answer_line_count(value));
            }
            (
                BlockFieldPatch::CalloutBox {
                    callout_title_text, ..
                },
                "calloutTitleText",
            ) => {
                *callout_title_text = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::CalloutBox {
                    callout_body_text, ..
                },
                "calloutBodyText",
            ) => {
                *callout_body_text = Some(text_value(key, value)?);
            }
            (BlockFieldPatch::Image { image_asset_id, .. }, "imageAssetId") => {
                *image_asset_id = Some(text_value(key, value)?);
            }
            (
                BlockFieldPatch::Image {
                    image_caption_text, ..
                },
                "imageCaptionText",
            ) => {
                *image_caption_text = Some(text_value(key, value)?);
            }
            _ => {
                return Err(BlockFieldError::UnknownField {
                    block_type,
                    field: key.to_string(),
                })
            }
        }
        Ok(())
    }
}

fn text_value(field: &str, value: &Value) -> BlockFieldResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BlockFieldError::InvalidValue {
            field: field.to_string(),
            reason: "expected text".to_string(),
        })
}

fn checklist_items_value(field: &str, value: &Value) -> BlockFieldResult<Vec<String>> {
    match value {
        Value::String(text) => Ok(split_checklist_items(text)),
        Value::Array(items) => items.iter().map(|item| text_value(field, item)).collect(),
        _ => Err(BlockFieldError::InvalidValue {
            field: field.to_string(),
            reason: "expected a list of items".to_string(),
        }),
    }
}

/// Split multi-line form input into checklist items, dropping blank lines
pub fn split_checklist_items(text: &str) -> Vec<String> {
    text.split('\n')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerce a form value into a positive line count; anything unusable becomes 1
pub fn coerce_answer_line_count(value: &Value) -> u32 {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n >= 1.0 => n.min(u32::MAX as f64) as u32,
        _ => 1,
    }
}
