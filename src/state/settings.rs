//! Document layout settings and preview overlays
//!
//! The gutter width is derived from trim size, bleed, and page count. It is
//! recomputed whenever settings are built or patched and never read back from
//! serialized data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default estimated page count for a new workbook
pub const DEFAULT_PAGE_COUNT: u32 = 120;

/// Physical page size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TrimSizePreset {
    #[default]
    #[serde(rename = "trim_6x9")]
    Trim6x9,
    #[serde(rename = "trim_85x11")]
    Trim85x11,
    #[serde(rename = "trim_5x8")]
    Trim5x8,
}

impl TrimSizePreset {
    pub const ALL: [TrimSizePreset; 3] = [
        TrimSizePreset::Trim6x9,
        TrimSizePreset::Trim85x11,
        TrimSizePreset::Trim5x8,
    ];

    /// Preset id as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            TrimSizePreset::Trim6x9 => "trim_6x9",
            TrimSizePreset::Trim85x11 => "trim_85x11",
            TrimSizePreset::Trim5x8 => "trim_5x8",
        }
    }

    /// Gutter width in millimeters before page count and bleed adjustments
    pub fn gutter_base_millimeters(&self) -> f64 {
        match self {
            TrimSizePreset::Trim6x9 => 6.0,
            TrimSizePreset::Trim85x11 => 7.0,
            TrimSizePreset::Trim5x8 => 5.0,
        }
    }
}

impl fmt::Display for TrimSizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrimSizePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrimSizePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or_else(|| format!("unknown trim size preset: {}", s))
    }
}

/// Gutter width in millimeters, rounded to one decimal place
///
/// `base(trim) * clamp(pages / 200, 0.5, 2.5) + (bleed ? 0.5 : 0)`
pub fn calculate_gutter_width_millimeters(
    estimated_page_count: u32,
    is_bleed_enabled: bool,
    trim_size_preset: TrimSizePreset,
) -> f64 {
    let base = trim_size_preset.gutter_base_millimeters();
    let multiplier = (f64::from(estimated_page_count) / 200.0).clamp(0.5, 2.5);
    let bleed_adjustment = if is_bleed_enabled { 0.5 } else { 0.0 };
    round_to_tenth(base * multiplier + bleed_adjustment)
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Coerce a page count typed into a form; unusable input becomes 0
pub fn coerce_page_count(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// Page layout settings of the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentSettingsRecord")]
pub struct DocumentSettings {
    trim_size_preset_id: TrimSizePreset,
    is_bleed_enabled: bool,
    estimated_page_count: u32,
    calculated_gutter_width_millimeters: f64,
}

/// Stored form of [`DocumentSettings`]; any stored gutter width is ignored
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentSettingsRecord {
    trim_size_preset_id: TrimSizePreset,
    is_bleed_enabled: bool,
    estimated_page_count: u32,
}

impl From<DocumentSettingsRecord> for DocumentSettings {
    fn from(record: DocumentSettingsRecord) -> Self {
        DocumentSettings::new(
            record.trim_size_preset_id,
            record.is_bleed_enabled,
            record.estimated_page_count,
        )
    }
}

impl DocumentSettings {
    pub fn new(trim_size_preset: TrimSizePreset, is_bleed_enabled: bool, estimated_page_count: u32) -> Self {
        Self {
            trim_size_preset_id: trim_size_preset,
            is_bleed_enabled,
            estimated_page_count,
            calculated_gutter_width_millimeters: calculate_gutter_width_millimeters(
                estimated_page_count,
                is_bleed_enabled,
                trim_size_preset,
            ),
        }
    }

    pub fn trim_size_preset(&self) -> TrimSizePreset {
        self.trim_size_preset_id
    }

    pub fn is_bleed_enabled(&self) -> bool {
        self.is_bleed_enabled
    }

    pub fn estimated_page_count(&self) -> u32 {
        self.estimated_page_count
    }

    pub fn gutter_width_millimeters(&self) -> f64 {
        self.calculated_gutter_width_millimeters
    }

    /// Settings with `patch` merged in and the gutter recomputed
    pub fn with_patch(&self, patch: &DocumentSettingsPatch) -> Self {
        Self::new(
            patch.trim_size_preset_id.unwrap_or(self.trim_size_preset_id),
            patch.is_bleed_enabled.unwrap_or(self.is_bleed_enabled),
            patch.estimated_page_count.unwrap_or(self.estimated_page_count),
        )
    }
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self::new(TrimSizePreset::default(), false, DEFAULT_PAGE_COUNT)
    }
}

/// Partial update of document settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentSettingsPatch {
    pub trim_size_preset_id: Option<TrimSizePreset>,
    pub is_bleed_enabled: Option<bool>,
    pub estimated_page_count: Option<u32>,
}

impl DocumentSettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trim_size(mut self, preset: TrimSizePreset) -> Self {
        self.trim_size_preset_id = Some(preset);
        self
    }

    pub fn bleed(mut self, enabled: bool) -> Self {
        self.is_bleed_enabled = Some(enabled);
        self
    }

    pub fn page_count(mut self, pages: u32) -> Self {
        self.estimated_page_count = Some(pages);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.trim_size_preset_id.is_none()
            && self.is_bleed_enabled.is_none()
            && self.estimated_page_count.is_none()
    }
}

/// Guide layers drawn over preview pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    SafeArea,
    Bleed,
    Margins,
    Gutter,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 4] = [
        OverlayKind::SafeArea,
        OverlayKind::Bleed,
        OverlayKind::Margins,
        OverlayKind::Gutter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::SafeArea => "safeArea",
            OverlayKind::Bleed => "bleed",
            OverlayKind::Margins => "margins",
            OverlayKind::Gutter => "gutter",
        }
    }
}

impl FromStr for OverlayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OverlayKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown overlay: {}", s))
    }
}

/// Visibility of each preview overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewOverlayVisibility {
    pub is_safe_area_visible: bool,
    pub is_bleed_visible: bool,
    pub is_margins_visible: bool,
    pub is_gutter_visible: bool,
}

impl Default for PreviewOverlayVisibility {
    fn default() -> Self {
        Self {
            is_safe_area_visible: true,
            is_bleed_visible: false,
            is_margins_visible: true,
            is_gutter_visible: true,
        }
    }
}

impl PreviewOverlayVisibility {
    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        match kind {
            OverlayKind::SafeArea => self.is_safe_area_visible,
            OverlayKind::Bleed => self.is_bleed_visible,
            OverlayKind::Margins => self.is_margins_visible,
            OverlayKind::Gutter => self.is_gutter_visible,
        }
    }

    /// Overlays currently switched on, in display order
    pub fn visible_overlays(&self) -> Vec<OverlayKind> {
        OverlayKind::ALL
            .into_iter()
            .filter(|kind| self.is_visible(*kind))
            .collect()
    }

    pub fn with_patch(&self, patch: &OverlayVisibilityPatch) -> Self {
        Self {
            is_safe_area_visible: patch.is_safe_area_visible.unwrap_or(self.is_safe_area_visible),
            is_bleed_visible: patch.is_bleed_visible.unwrap_or(self.is_bleed_visible),
            is_margins_visible: patch.is_margins_visible.unwrap_or(self.is_margins_visible),
            is_gutter_visible: patch.is_gutter_visible.unwrap_or(self.is_gutter_visible),
        }
    }
}

/// Partial update of overlay visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayVisibilityPatch {
    pub is_safe_area_visible: Option<bool>,
    pub is_bleed_visible: Option<bool>,
    pub is_margins_visible: Option<bool>,
    pub is_gutter_visible: Option<bool>,
}

impl OverlayVisibilityPatch {
    /// Patch touching a single overlay
    pub fn single(kind: OverlayKind, visible: bool) -> Self {
        let mut patch = Self::default();
        match kind {
            OverlayKind::SafeArea => patch.is_safe_area_visible = Some(visible),
            OverlayKind::Bleed => patch.is_bleed_visible = Some(visible),
            OverlayKind::Margins => patch.is_margins_visible = Some(visible),
            OverlayKind::Gutter => patch.is_gutter_visible = Some(visible),
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gutter_reference_values() {
        assert_eq!(calculate_gutter_width_millimeters(120, false, TrimSizePreset::Trim6x9), 3.6);
        assert_eq!(calculate_gutter_width_millimeters(200, true, TrimSizePreset::Trim85x11), 7.5);
        assert_eq!(calculate_gutter_width_millimeters(10, false, TrimSizePreset::Trim5x8), 2.5);
    }

    #[test]
    fn test_gutter_multiplier_clamped_high() {
        // 900 / 200 = 4.5, clamped to 2.5
        assert_eq!(calculate_gutter_width_millimeters(900, false, TrimSizePreset::Trim6x9), 15.0);
        assert_eq!(calculate_gutter_width_millimeters(900, true, TrimSizePreset::Trim5x8), 13.0);
    }

    #[test]
    fn test_gutter_rounds_to_one_decimal() {
        // 5 * 0.75 = 3.75
        assert_eq!(calculate_gutter_width_millimeters(150, false, TrimSizePreset::Trim5x8), 3.8);
        // 0 pages clamps to 0.5
        assert_eq!(calculate_gutter_width_millimeters(0, true, TrimSizePreset::Trim6x9), 3.5);
    }

    #[test]
    fn test_patch_recomputes_gutter() {
        let settings = DocumentSettings::default();
        assert_eq!(settings.gutter_width_millimeters(), 3.6);

        let updated = settings.with_patch(&DocumentSettingsPatch::new().bleed(true).page_count(200));
        assert_eq!(updated.trim_size_preset(), TrimSizePreset::Trim6x9);
        assert_eq!(updated.gutter_width_millimeters(), 6.5);
    }

    #[test]
    fn test_stored_gutter_is_ignored() {
        let json = r#"{
            "trimSizePresetId": "trim_85x11",
            "isBleedEnabled": true,
            "estimatedPageCount": 200,
            "calculatedGutterWidthMillimeters": 99.9
        }"#;
        let settings: DocumentSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.gutter_width_millimeters(), 7.5);
    }

    #[test]
    fn test_coerce_page_count() {
        assert_eq!(coerce_page_count("240"), 240);
        assert_eq!(coerce_page_count("abc"), 0);
        assert_eq!(coerce_page_count("-3"), 0);
        assert_eq!(coerce_page_count("12.7"), 12);
    }

    #[test]
    fn test_overlay_patch() {
        let overlays = PreviewOverlayVisibility::default();
        let updated = overlays.with_patch(&OverlayVisibilityPatch::single(OverlayKind::Bleed, true));
        assert!(updated.is_bleed_visible);
        assert_eq!(updated.visible_overlays().len(), 4);

        let hidden = updated.with_patch(&OverlayVisibilityPatch::single(OverlayKind::SafeArea, false));
        assert_eq!(
            hidden.visible_overlays(),
            vec![OverlayKind::Bleed, OverlayKind::Margins, OverlayKind::Gutter]
        );
    }
}
