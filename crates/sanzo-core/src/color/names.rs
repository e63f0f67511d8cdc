//! Named colors accepted at the validation gate
//!
//! CSS basic keywords plus the interior palette names the advisor UI uses.
//! Lookup is case-insensitive.

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#FFFFFF"),
    ("red", "#FF0000"),
    ("green", "#008000"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("cyan", "#00FFFF"),
    ("magenta", "#FF00FF"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("silver", "#C0C0C0"),
    ("maroon", "#800000"),
    ("olive", "#808000"),
    ("lime", "#00FF00"),
    ("aqua", "#00FFFF"),
    ("teal", "#008080"),
    ("navy", "#000080"),
    ("fuchsia", "#FF00FF"),
    ("purple", "#800080"),
    ("orange", "#FFA500"),
    ("brown", "#A52A2A"),
    ("pink", "#FFC0CB"),
    ("beige", "#F5F5DC"),
    ("ivory", "#FFFFF0"),
    ("cream", "#FFFDD0"),
    ("taupe", "#483C32"),
    ("charcoal", "#36454F"),
    ("sage", "#9CAF88"),
    ("terracotta", "#E2725B"),
    ("mustard", "#FFDB58"),
    ("coral", "#FF7F50"),
    ("salmon", "#FA8072"),
    ("gold", "#FFD700"),
    ("khaki", "#F0E68C"),
    ("lavender", "#E6E6FA"),
    ("indigo", "#4B0082"),
    ("turquoise", "#40E0D0"),
    ("crimson", "#DC143C"),
    ("burgundy", "#800020"),
    ("forestgreen", "#228B22"),
    ("slategray", "#708090"),
    ("steelblue", "#4682B4"),
];

/// Resolve a color name to its hex value
pub fn lookup(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|&(_, hex)| hex)
}
