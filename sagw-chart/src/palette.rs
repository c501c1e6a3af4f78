use plotters::style::RGBColor;

/// The ten colours of the "bright" qualitative palette.
pub const BRIGHT: [RGBColor; 10] = [
    RGBColor(0x02, 0x3e, 0xff),
    RGBColor(0xff, 0x7c, 0x00),
    RGBColor(0x1a, 0xc9, 0x38),
    RGBColor(0xe8, 0x00, 0x0b),
    RGBColor(0x8b, 0x2b, 0xe2),
    RGBColor(0x9f, 0x48, 0x00),
    RGBColor(0xf1, 0x4c, 0xc1),
    RGBColor(0xa3, 0xa3, 0xa3),
    RGBColor(0xff, 0xc4, 0x00),
    RGBColor(0x00, 0xd7, 0xff),
];

/// `number_of_colors` colours from the bright palette, cycling once it is
/// exhausted.
pub fn bright_palette(number_of_colors: usize) -> Vec<RGBColor> {
    BRIGHT.iter().copied().cycle().take(number_of_colors).collect()
}

/// "#rrggbb"
pub fn to_hex(colour: &RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", colour.0, colour.1, colour.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        let colours = bright_palette(12);
        assert_eq!(colours.len(), 12);
        assert_eq!(colours[10], colours[0]);
        assert_eq!(colours[11], colours[1]);
        assert!(bright_palette(0).is_empty());
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(to_hex(&BRIGHT[0]), "#023eff");
        assert_eq!(to_hex(&BRIGHT[9]), "#00d7ff");
    }
}
