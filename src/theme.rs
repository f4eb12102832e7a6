//! Muted base map so the heatmap tiles stand out.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Styler {
    Color(&'static str),
    Visibility(&'static str),
    Lightness(i32),
    Saturation(i32),
    Weight(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<&'static str>,
    pub stylers: &'static [Styler],
}

const fn rule(
    feature_type: Option<&'static str>,
    element_type: Option<&'static str>,
    stylers: &'static [Styler],
) -> StyleRule {
    StyleRule {
        feature_type,
        element_type,
        stylers,
    }
}

pub const HEATMAP_THEME_NAME: &str = "heatmap-muted";

pub static HEATMAP_STYLE: &[StyleRule] = &[
    rule(None, Some("geometry"), &[Styler::Color("#f5f5f5")]),
    rule(None, Some("labels.icon"), &[Styler::Visibility("off")]),
    rule(None, Some("labels.text.fill"), &[Styler::Color("#616161")]),
    rule(None, Some("labels.text.stroke"), &[Styler::Color("#f5f5f5")]),
    rule(
        Some("administrative.land_parcel"),
        Some("labels"),
        &[Styler::Visibility("off")],
    ),
    rule(Some("poi"), None, &[Styler::Visibility("off")]),
    rule(
        Some("road"),
        Some("geometry"),
        &[Styler::Color("#ffffff"), Styler::Weight(0.5)],
    ),
    rule(
        Some("road.highway"),
        Some("geometry"),
        &[Styler::Color("#dadada")],
    ),
    rule(Some("transit"), None, &[Styler::Visibility("off")]),
    rule(
        Some("water"),
        Some("geometry"),
        &[Styler::Color("#c9c9c9"), Styler::Lightness(10)],
    ),
    rule(
        Some("landscape.natural"),
        Some("geometry"),
        &[Styler::Saturation(-100)],
    ),
];
