use serde::Serialize;

/// A color selectable in the drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrushColor {
    /// Lowercase `#rrggbb`.
    pub hex: &'static str,
    pub name: &'static str,
}

const BRUSH_COLORS: [BrushColor; 10] = [
    BrushColor { hex: "#f44336", name: "red" },
    BrushColor { hex: "#ff5800", name: "orange" },
    BrushColor { hex: "#faab09", name: "yellow" },
    BrushColor { hex: "#008744", name: "green" },
    BrushColor { hex: "#0057e7", name: "blue" },
    BrushColor { hex: "#a200ff", name: "purple" },
    BrushColor { hex: "#ff00c1", name: "pink" },
    BrushColor { hex: "#ffffff", name: "white" },
    BrushColor { hex: "#646765", name: "grey" },
    BrushColor { hex: "#000000", name: "black" },
];

/// The fixed brush palette shared by the drawing page and the color extractor.
pub struct BrushPalette;

impl BrushPalette {
    pub fn entries() -> &'static [BrushColor] {
        &BRUSH_COLORS
    }

    /// Name of the brush color with the given `#rrggbb` code (case-insensitive).
    pub fn name_for(hex: &str) -> Option<&'static str> {
        BRUSH_COLORS
            .iter()
            .find(|c| c.hex.eq_ignore_ascii_case(hex))
            .map(|c| c.name)
    }
}
