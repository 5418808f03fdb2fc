/// 8-bit sRGB color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    InvalidHex(String),
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorError::InvalidHex(raw) => write!(f, "invalid hex color: {raw:?}"),
        }
    }
}

impl std::error::Error for ColorError {}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(raw: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(raw.to_string());
        let digits = raw.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba_f32(self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }
}

/// Per-channel linear interpolation, rounded to the nearest integer.
///
/// `lerp(a, b, 0.0) == a` and `lerp(a, b, 1.0) == b`.
pub fn lerp(a: Rgb, b: Rgb, ratio: f64) -> Rgb {
    let mix = |x: u8, y: u8| {
        let v = x as f64 + (y as f64 - x as f64) * ratio;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Golden-angle approximation used to spread palette hues.
pub const GOLDEN_ANGLE_DEG: f64 = 137.508;

/// HSL color: hue in degrees, saturation and lightness in percent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// The `i`-th palette color. Depends only on `i`.
    pub fn palette_entry(i: usize) -> Self {
        let i = i as f64;
        let hue = i * GOLDEN_ANGLE_DEG;
        let lightness = ((i + 50.0) * GOLDEN_ANGLE_DEG) % 30.0 + 20.0;
        Self::new(hue, 100.0, lightness)
    }

    pub fn to_rgb(self) -> Rgb {
        let h = self.hue.rem_euclid(360.0) / 360.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Rgb::new(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let channel = |t: f64| {
            let t = t.rem_euclid(1.0);
            let v = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
    }

    pub fn to_css(self) -> String {
        format!("hsl({},{}%,{}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Deterministic palette of `count` visually distinct colors.
///
/// Entry `i` is the same for every `count > i`.
pub fn palette(count: usize) -> Vec<Hsl> {
    (0..count).map(Hsl::palette_entry).collect()
}
