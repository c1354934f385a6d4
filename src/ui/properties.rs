//! Properties panel
//!
//! Document settings plus the editable fields of the selected block.

use crate::i18n::{
    block_type_text_key, localized_text, section_break_style_text_key, trim_size_text_key,
    LocalizationDictionary, UiTextKey,
};
use crate::state::{AppWorkspaceState, BlockContent, UiLanguageCode, WorkbookBlock};
use std::fmt::Write;

/// One labeled field of the selected block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyField {
    /// Field name accepted by field updates
    pub field: &'static str,
    pub label: String,
    pub value: String,
}

/// Labeled fields of `block`, in form order
pub fn block_property_fields(
    dictionary: &LocalizationDictionary,
    language: UiLanguageCode,
    block: &WorkbookBlock,
) -> Vec<PropertyField> {
    let field = |field: &'static str, key: UiTextKey, value: String| PropertyField {
        field,
        label: localized_text(dictionary, language, key).to_string(),
        value,
    };

    match block.content() {
        BlockContent::Heading { heading_text } => {
            vec![field("headingText", UiTextKey::BlockFieldHeadingText, heading_text.clone())]
        }
        BlockContent::Paragraph { paragraph_text } => {
            vec![field("paragraphText", UiTextKey::BlockFieldParagraphText, paragraph_text.clone())]
        }
        BlockContent::ChapterStart {
            chapter_title_text,
            chapter_subtitle_text,
        } => vec![
            field("chapterTitleText", UiTextKey::BlockFieldChapterTitle, chapter_title_text.clone()),
            field("chapterSubtitleText", UiTextKey::BlockFieldChapterSubtitle, chapter_subtitle_text.clone()),
        ],
        BlockContent::Checklist {
            checklist_title_text,
            checklist_items,
        } => vec![
            field("checklistTitleText", UiTextKey::BlockFieldChecklistTitle, checklist_title_text.clone()),
            field("checklistItems", UiTextKey::BlockFieldChecklistItems, checklist_items.join("\n")),
        ],
        BlockContent::AnswerLines {
            answer_lines_prompt_text,
            answer_line_count,
        } => vec![
            field(
                "answerLinesPromptText",
                UiTextKey::BlockFieldAnswerLinesPrompt,
                answer_lines_prompt_text.clone(),
            ),
            field("answerLineCount", UiTextKey::BlockFieldAnswerLineCount, answer_line_count.to_string()),
        ],
        BlockContent::CalloutBox {
            callout_title_text,
            callout_body_text,
        } => vec![
            field("calloutTitleText", UiTextKey::BlockFieldCalloutTitle, callout_title_text.clone()),
            field("calloutBodyText", UiTextKey::BlockFieldCalloutBody, callout_body_text.clone()),
        ],
        BlockContent::Image {
            image_asset_id,
            image_caption_text,
        } => vec![
            field("imageAssetId", UiTextKey::BlockFieldImageAssetId, image_asset_id.clone()),
            field("imageCaptionText", UiTextKey::BlockFieldImageCaption, image_caption_text.clone()),
        ],
        BlockContent::SectionBreak {
            section_break_style_id,
        } => vec![field(
            "sectionBreakStyleId",
            UiTextKey::BlockFieldSectionBreakStyle,
            format!(
                "{} ({})",
                localized_text(dictionary, language, section_break_style_text_key(*section_break_style_id)),
                section_break_style_id.as_str()
            ),
        )],
        BlockContent::PageBreak { page_break_note } => {
            vec![field("pageBreakNote", UiTextKey::BlockFieldPageBreakNote, page_break_note.clone())]
        }
    }
}

/// Render the document settings section
pub fn render_document_settings(out: &mut String, dictionary: &LocalizationDictionary, state: &AppWorkspaceState) {
    let language = state.active_ui_language_code;
    let text = |key| localized_text(dictionary, language, key);
    let settings = &state.document_settings;

    let _ = writeln!(out, "{}", text(UiTextKey::DocumentSettingsTitle));
    let _ = writeln!(
        out,
        "  {}: {} ({})",
        text(UiTextKey::TrimSizeLabel),
        text(trim_size_text_key(settings.trim_size_preset())),
        settings.trim_size_preset()
    );
    let _ = writeln!(
        out,
        "  {}: {}",
        text(UiTextKey::BleedToggleLabel),
        if settings.is_bleed_enabled() { "on" } else { "off" }
    );
    let _ = writeln!(out, "  {}: {}", text(UiTextKey::PageCountLabel), settings.estimated_page_count());
    let _ = writeln!(
        out,
        "  {}: {:.1}",
        text(UiTextKey::GutterWidthLabel),
        settings.gutter_width_millimeters()
    );
}

/// Render the selected block section, or the "nothing selected" text
pub fn render_selected_block(out: &mut String, dictionary: &LocalizationDictionary, state: &AppWorkspaceState) {
    let language = state.active_ui_language_code;
    let _ = writeln!(out, "{}", localized_text(dictionary, language, UiTextKey::SelectedBlockTitle));

    let Some(block) = state.selected_block() else {
        let _ = writeln!(out, "  {}", localized_text(dictionary, language, UiTextKey::NoBlockSelected));
        return;
    };

    let _ = writeln!(
        out,
        "  [{}] {}",
        block.block_id(),
        localized_text(dictionary, language, block_type_text_key(block.block_type()))
    );
    for property in block_property_fields(dictionary, language, block) {
        let mut lines = property.value.lines();
        let first = lines.next().unwrap_or("");
        let _ = writeln!(out, "  {} ({}): {}", property.label, property.field, first);
        for line in lines {
            let _ = writeln!(out, "    {}", line);
        }
    }
}
