//! Profile colors

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const INK: Rgb = Rgb::new(0x1F, 0x29, 0x37);
    pub const MUTED: Rgb = Rgb::new(0x9C, 0xA3, 0xAF);
    pub const INDIGO: Rgb = Rgb::new(0x4F, 0x46, 0xE5);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Blend towards `other`; `t` = 0.0 keeps self, 1.0 gives other
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#4F46E5"), Some(Rgb::new(0x4F, 0x46, 0xE5)));
        assert_eq!(Rgb::from_hex("10b981"), Some(Rgb::new(0x10, 0xB9, 0x81)));
        assert_eq!(Rgb::from_hex("#FFF"), None);
        assert_eq!(Rgb::from_hex("#GGGGGG"), None);
        // Multi-byte input must not panic on slicing
        assert_eq!(Rgb::from_hex("#ééé"), None);
    }

    #[test]
    fn test_mix_and_display() {
        let black = Rgb::new(0, 0, 0);
        assert_eq!(black.mix(Rgb::WHITE, 0.0), black);
        assert_eq!(black.mix(Rgb::WHITE, 1.0), Rgb::WHITE);
        assert_eq!(black.mix(Rgb::WHITE, 0.5).to_string(), "#808080");
    }
}
