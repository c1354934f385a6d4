//! Internationalization (i18n) module for Workbook Publisher
//!
//! UI strings live in `i18n/dictionaries.json`, one table per language,
//! embedded into the binary at build time. Lookups fall back to English and
//! then to the key name, so a missing translation never breaks rendering.

use crate::state::{BlockType, OverlayKind, SectionBreakStyle, ThemeMode, TrimSizePreset, UiLanguageCode, WorkspaceTab};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

const BUILTIN_DICTIONARIES: &str = include_str!("../i18n/dictionaries.json");

macro_rules! ui_text_keys {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Identifier of a localized UI string
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum UiTextKey {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl UiTextKey {
            pub const ALL: &'static [UiTextKey] = &[$(UiTextKey::$variant),*];

            /// Key name as used in the dictionary tables
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(UiTextKey::$variant => $name,)*
                }
            }
        }
    };
}

ui_text_keys! {
    AppTitle => "appTitle",
    ProjectName => "projectName",
    TabEditor => "tabEditor",
    TabPreview => "tabPreview",
    ButtonExportPdf => "buttonExportPdf",
    ToastExportPlaceholder => "toastExportPlaceholder",
    LanguageLabel => "languageLabel",
    ThemeLabel => "themeLabel",
    ThemeLight => "themeLight",
    ThemeDark => "themeDark",
    WorkspaceTabsLabel => "workspaceTabsLabel",
    SidebarBlocksTitle => "sidebarBlocksTitle",
    SidebarOutlineTitle => "sidebarOutlineTitle",
    OutlineEmpty => "outlineEmpty",
    EditorBlocksTitle => "editorBlocksTitle",
    PropertiesTitle => "propertiesTitle",
    DocumentSettingsTitle => "documentSettingsTitle",
    TrimSizeLabel => "trimSizeLabel",
    TrimPreset6x9 => "trimPreset6x9",
    TrimPreset85x11 => "trimPreset85x11",
    TrimPreset5x8 => "trimPreset5x8",
    BleedToggleLabel => "bleedToggleLabel",
    PageCountLabel => "pageCountLabel",
    GutterWidthLabel => "gutterWidthLabel",
    SelectedBlockTitle => "selectedBlockTitle",
    NoBlockSelected => "noBlockSelected",
    BlockTypeParagraph => "blockTypeParagraph",
    BlockTypeHeading => "blockTypeHeading",
    BlockTypeSectionBreak => "blockTypeSectionBreak",
    BlockTypePageBreak => "blockTypePageBreak",
    BlockTypeChapterStart => "blockTypeChapterStart",
    BlockTypeChecklist => "blockTypeChecklist",
    BlockTypeAnswerLines => "blockTypeAnswerLines",
    BlockTypeCalloutBox => "blockTypeCalloutBox",
    BlockTypeImage => "blockTypeImage",
    BlockAddLabel => "blockAddLabel",
    BlockMoveUpLabel => "blockMoveUpLabel",
    BlockMoveDownLabel => "blockMoveDownLabel",
    PreviewOverlaysTitle => "previewOverlaysTitle",
    OverlaySafeArea => "overlaySafeArea",
    OverlayBleed => "overlayBleed",
    OverlayMargins => "overlayMargins",
    OverlayGutter => "overlayGutter",
    PreviewPlaceholderTitle => "previewPlaceholderTitle",
    BlockFieldHeadingText => "blockFieldHeadingText",
    BlockFieldParagraphText => "blockFieldParagraphText",
    BlockFieldChapterTitle => "blockFieldChapterTitle",
    BlockFieldChapterSubtitle => "blockFieldChapterSubtitle",
    BlockFieldChecklistTitle => "blockFieldChecklistTitle",
    BlockFieldChecklistItems => "blockFieldChecklistItems",
    BlockFieldAnswerLinesPrompt => "blockFieldAnswerLinesPrompt",
    BlockFieldAnswerLineCount => "blockFieldAnswerLineCount",
    BlockFieldCalloutTitle => "blockFieldCalloutTitle",
    BlockFieldCalloutBody => "blockFieldCalloutBody",
    BlockFieldImageAssetId => "blockFieldImageAssetId",
    BlockFieldImageCaption => "blockFieldImageCaption",
    BlockFieldSectionBreakStyle => "blockFieldSectionBreakStyle",
    BlockFieldPageBreakNote => "blockFieldPageBreakNote",
    PreviewPageLabel => "previewPageLabel",
    PreviewPlaceholderBody => "previewPlaceholderBody",
    SectionBreakStyleLine => "sectionBreakStyleLine",
    SectionBreakStyleSpace => "sectionBreakStyleSpace",
    SectionBreakStyleOrnament => "sectionBreakStyleOrnament",
}

/// Per-language tables of UI strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizationDictionary {
    tables: HashMap<UiLanguageCode, HashMap<UiTextKey, String>>,
}

impl LocalizationDictionary {
    /// Parse dictionary tables from JSON shaped `{ "<lang>": { "<key>": "<text>" } }`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Dictionary shipped with the application
    pub fn builtin() -> &'static LocalizationDictionary {
        static BUILTIN: OnceLock<LocalizationDictionary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Self::from_json(BUILTIN_DICTIONARIES).unwrap_or_else(|e| {
                log::error!("Built-in dictionaries are malformed: {}", e);
                Self::default()
            })
        })
    }

    /// Text for `key` in `language`, without any fallback
    pub fn get(&self, language: UiLanguageCode, key: UiTextKey) -> Option<&str> {
        self.tables
            .get(&language)
            .and_then(|table| table.get(&key))
            .map(String::as_str)
    }

    /// Keys that `language` has no text for
    pub fn missing_keys(&self, language: UiLanguageCode) -> Vec<UiTextKey> {
        UiTextKey::ALL
            .iter()
            .copied()
            .filter(|key| self.get(language, *key).is_none())
            .collect()
    }
}

/// Look up `key` for `language`, falling back to English and then to the key name
pub fn localized_text(dictionary: &LocalizationDictionary, language: UiLanguageCode, key: UiTextKey) -> &str {
    dictionary
        .get(language, key)
        .or_else(|| dictionary.get(UiLanguageCode::En, key))
        .unwrap_or_else(|| key.as_str())
}

/// Label key for a block kind
pub fn block_type_text_key(block_type: BlockType) -> UiTextKey {
    match block_type {
        BlockType::Paragraph => UiTextKey::BlockTypeParagraph,
        BlockType::Heading => UiTextKey::BlockTypeHeading,
        BlockType::SectionBreak => UiTextKey::BlockTypeSectionBreak,
        BlockType::PageBreak => UiTextKey::BlockTypePageBreak,
        BlockType::ChapterStart => UiTextKey::BlockTypeChapterStart,
        BlockType::Checklist => UiTextKey::BlockTypeChecklist,
        BlockType::AnswerLines => UiTextKey::BlockTypeAnswerLines,
        BlockType::CalloutBox => UiTextKey::BlockTypeCalloutBox,
        BlockType::Image => UiTextKey::BlockTypeImage,
    }
}

pub fn section_break_style_text_key(style: SectionBreakStyle) -> UiTextKey {
    match style {
        SectionBreakStyle::Line => UiTextKey::SectionBreakStyleLine,
        SectionBreakStyle::Space => UiTextKey::SectionBreakStyleSpace,
        SectionBreakStyle::Ornament => UiTextKey::SectionBreakStyleOrnament,
    }
}

pub fn trim_size_text_key(preset: TrimSizePreset) -> UiTextKey {
    match preset {
        TrimSizePreset::Trim6x9 => UiTextKey::TrimPreset6x9,
        TrimSizePreset::Trim85x11 => UiTextKey::TrimPreset85x11,
        TrimSizePreset::Trim5x8 => UiTextKey::TrimPreset5x8,
    }
}

pub fn overlay_text_key(kind: OverlayKind) -> UiTextKey {
    match kind {
        OverlayKind::SafeArea => UiTextKey::OverlaySafeArea,
        OverlayKind::Bleed => UiTextKey::OverlayBleed,
        OverlayKind::Margins => UiTextKey::OverlayMargins,
        OverlayKind::Gutter => UiTextKey::OverlayGutter,
    }
}

pub fn theme_text_key(mode: ThemeMode) -> UiTextKey {
    match mode {
        ThemeMode::Light => UiTextKey::ThemeLight,
        ThemeMode::Dark => UiTextKey::ThemeDark,
    }
}

pub fn workspace_tab_text_key(tab: WorkspaceTab) -> UiTextKey {
    match tab {
        WorkspaceTab::Editor => UiTextKey::TabEditor,
        WorkspaceTab::Preview => UiTextKey::TabPreview,
    }
}

/// Log which languages the built-in dictionary covers
pub fn init() {
    let dictionary = LocalizationDictionary::builtin();
    for language in UiLanguageCode::ALL {
        let missing = dictionary.missing_keys(language);
        if missing.is_empty() {
            log::debug!("Loaded {} UI strings for {}", UiTextKey::ALL.len(), language);
        } else {
            log::warn!("{} UI strings missing for {}", missing.len(), language);
        }
    }
}

/// Look up a UI string in the built-in dictionary
///
/// `fl!(language, Key)` expands to a `localized_text` call for `UiTextKey::Key`.
#[macro_export]
macro_rules! fl {
    ($language:expr, $key:ident) => {
        $crate::i18n::localized_text(
            $crate::i18n::LocalizationDictionary::builtin(),
            $language,
            $crate::i18n::UiTextKey::$key,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_key_in_every_language() {
        let dictionary = LocalizationDictionary::builtin();
        for language in UiLanguageCode::ALL {
            assert!(
                dictionary.missing_keys(language).is_empty(),
                "missing keys for {}",
                language
            );
        }
    }

    #[test]
    fn test_lookup_per_language() {
        let dictionary = LocalizationDictionary::builtin();
        assert_eq!(localized_text(dictionary, UiLanguageCode::En, UiTextKey::TabEditor), "Editor");
        assert_eq!(localized_text(dictionary, UiLanguageCode::Ru, UiTextKey::TabEditor), "Редактор");
        assert_eq!(localized_text(dictionary, UiLanguageCode::Fr, UiTextKey::TabEditor), "Éditeur");
        assert_eq!(fl!(UiLanguageCode::Fr, OutlineEmpty), "Aucun chapitre pour le moment");
    }

    #[test]
    fn test_fallback_to_english_then_key() {
        let dictionary = LocalizationDictionary::from_json(
            r#"{ "en": { "appTitle": "Workbook Publisher" }, "fr": {} }"#,
        )
        .unwrap();
        assert_eq!(
            localized_text(&dictionary, UiLanguageCode::Fr, UiTextKey::AppTitle),
            "Workbook Publisher"
        );
        assert_eq!(
            localized_text(&dictionary, UiLanguageCode::Ru, UiTextKey::OutlineEmpty),
            "outlineEmpty"
        );
    }

    #[test]
    fn test_block_type_labels() {
        assert_eq!(block_type_text_key(BlockType::CalloutBox), UiTextKey::BlockTypeCalloutBox);
        assert_eq!(fl!(UiLanguageCode::En, BlockTypeAnswerLines), "Answer Lines");
        assert_eq!(
            localized_text(
                LocalizationDictionary::builtin(),
                UiLanguageCode::Ru,
                section_break_style_text_key(SectionBreakStyle::Ornament)
            ),
            "Орнамент"
        );
    }

    #[test]
    fn test_key_names_match_serialized_form() {
        for key in UiTextKey::ALL {
            assert_eq!(serde_json::to_value(key).unwrap(), key.as_str());
        }
    }
}
