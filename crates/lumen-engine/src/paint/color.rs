/// Straight-alpha RGBA color.
///
/// Components are nominally in `[0, 1]` but are never clamped: whatever is
/// stored here reaches the backend unchanged (WebGL clamps clear colors itself,
/// the canvas 2D context clamps CSS color values).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Opaque color from sRGB bytes.
    #[inline]
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parses `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        // `from_str_radix` alone would accept a leading `+`.
        let is_hex = digits.bytes().all(|b| b.is_ascii_hexdigit());
        if !is_hex || (digits.len() != 6 && digits.len() != 8) {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let (r, g, b) = (byte(0)?, byte(2)?, byte(4)?);
        let a = if digits.len() == 8 { byte(6)? } else { 255 };

        Some(Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ))
    }

    /// CSS `rgba()` form for the browser 2D context.
    ///
    /// Only the text is clamped to CSS ranges (`0..=255` for color channels,
    /// `0..=1` for alpha); the stored components are left as they are.
    pub fn to_css(self) -> String {
        let channel = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        let alpha = if self.a.is_nan() { 0.0 } else { self.a.clamp(0.0, 1.0) };
        format!(
            "rgba({}, {}, {}, {})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            alpha
        )
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_parses_grid_grey() {
        let c = Color::from_hex("#333333").unwrap();
        assert_eq!(c, Color::from_rgb_u8(0x33, 0x33, 0x33));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn from_hex_reads_alpha_byte() {
        let c = Color::from_hex("ff000080").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#zzzzzz").is_none());
        assert!(Color::from_hex("").is_none());
    }

    #[test]
    fn from_hex_rejects_signs() {
        assert!(Color::from_hex("#+f+f+f").is_none());
        assert!(Color::from_hex("+fffff").is_none());
        assert!(Color::from_hex("#-1ffff").is_none());
    }

    #[test]
    fn out_of_range_components_are_kept() {
        let c = Color::new(1.5, -0.25, 0.0, 2.0);
        assert_eq!(c.to_array(), [1.5, -0.25, 0.0, 2.0]);
    }

    #[test]
    fn to_css_clamps_only_the_textual_form() {
        assert_eq!(Color::new(1.5, 0.0, 0.2, 1.0).to_css(), "rgba(255, 0, 51, 1)");
    }

    #[test]
    fn to_css_clamps_alpha_like_the_channels() {
        let c = Color::new(-0.5, 0.0, 0.0, 2.0);
        assert_eq!(c.to_css(), "rgba(0, 0, 0, 1)");
        assert_eq!(Color::new(0.0, 0.0, 0.0, -1.0).to_css(), "rgba(0, 0, 0, 0)");
        assert_eq!(Color::new(0.0, 0.0, 0.0, 0.5).to_css(), "rgba(0, 0, 0, 0.5)");
        assert_eq!(c.a, 2.0);
    }
}
