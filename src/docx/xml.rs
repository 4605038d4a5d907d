//! Attribute helpers and unit conversions shared by the DOCX reader and
//! writer.
//!
//! WordprocessingML stores page geometry and indents in twips (twentieths of
//! a point), font sizes in half-points, and line spacing in 240ths of a
//! line. The model uses centimeters and points; conversions round-trip
//! exactly for integer source values.

use quick_xml::events::BytesStart;

use crate::model::Alignment;

/// Twips per centimeter (1440 twips per inch / 2.54).
pub(crate) const TWIPS_PER_CM: f64 = 1440.0 / 2.54;

/// Extract an attribute value by key.
pub(crate) fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract an attribute value by key and parse as i64.
#[inline]
pub(crate) fn get_attr_i64(e: &BytesStart, key: &[u8]) -> Option<i64> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

/// Extract an attribute value by key and parse as f64.
#[inline]
pub(crate) fn get_attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    get_attr(e, key).and_then(|s| s.parse().ok())
}

/// Check if the w:val attribute explicitly disables a toggle property.
pub(crate) fn val_is_off(e: &BytesStart) -> bool {
    matches!(get_attr(e, b"w:val").as_deref(), Some("0") | Some("false") | Some("none"))
}

/// Round to 2 decimal places.
#[inline]
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[inline]
pub(crate) fn twips_to_cm(twips: f64) -> f64 {
    twips / TWIPS_PER_CM
}

#[inline]
pub(crate) fn cm_to_twips(cm: f64) -> i64 {
    (cm * TWIPS_PER_CM).round() as i64
}

#[inline]
pub(crate) fn twips_to_pt(twips: f64) -> f64 {
    twips / 20.0
}

#[inline]
pub(crate) fn pt_to_twips(pt: f64) -> i64 {
    (pt * 20.0).round() as i64
}

#[inline]
pub(crate) fn half_points_to_pt(half: f64) -> f64 {
    half / 2.0
}

#[inline]
pub(crate) fn pt_to_half_points(pt: f64) -> i64 {
    (pt * 2.0).round() as i64
}

/// Line spacing multiple for the "auto" rule: w:line is in 240ths of a line.
#[inline]
pub(crate) fn line_units_to_multiple(line: f64) -> f64 {
    line / 240.0
}

#[inline]
pub(crate) fn multiple_to_line_units(multiple: f64) -> i64 {
    (multiple * 240.0).round() as i64
}

/// Map a w:jc value to an alignment.
pub(crate) fn alignment_from_jc(val: &str) -> Alignment {
    match val {
        "both" | "distribute" => Alignment::Justify,
        "left" | "start" => Alignment::Left,
        "center" => Alignment::Center,
        "right" | "end" => Alignment::Right,
        _ => Alignment::Unset,
    }
}

/// Map an alignment back to its w:jc value; `None` for unset.
pub(crate) fn jc_from_alignment(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::Justify => Some("both"),
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
        Alignment::Unset => None,
    }
}
