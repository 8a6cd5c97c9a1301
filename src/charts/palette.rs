//! Pastel series colours, assigned by series index.

use egui::Color32;

pub const PASTEL_PALETTE: [Color32; 10] = [
    Color32::from_rgb(160, 216, 179), // #A0D8B3 mint
    Color32::from_rgb(174, 217, 224), // #AED9E0 sky
    Color32::from_rgb(255, 181, 232), // #FFB5E8 pink
    Color32::from_rgb(255, 218, 193), // #FFDAC1 peach
    Color32::from_rgb(203, 170, 203), // #CBAACB mauve
    Color32::from_rgb(246, 223, 235), // #F6DFEB blush
    Color32::from_rgb(199, 206, 234), // #C7CEEA periwinkle
    Color32::from_rgb(224, 187, 228), // #E0BBE4 lilac
    Color32::from_rgb(181, 234, 215), // #B5EAD7 seafoam
    Color32::from_rgb(255, 171, 171), // #FFABAB salmon
];

/// Fitted trend line colour (#003366).
pub const TREND_COLOR: Color32 = Color32::from_rgb(0, 51, 102);

/// Colour for the series at `index`, cycling through the palette.
pub fn color(index: usize) -> Color32 {
    PASTEL_PALETTE[index % PASTEL_PALETTE.len()]
}
