//! Colors and the spectral palettes used by stars and meteors.

use super::rng::Rng;

/// RGBA color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGB u8 values (0-255) with full opacity.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Same color with the given alpha (clamped).
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: clamp_unit(a), ..self }
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Component-wise interpolation.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = clamp_unit(t);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Clamp all components into range, mapping NaN to zero.
    pub fn sanitized(self) -> Self {
        Self {
            r: clamp_unit(self.r),
            g: clamp_unit(self.g),
            b: clamp_unit(self.b),
            a: clamp_unit(self.a),
        }
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Deep night background.
    pub const NIGHT: Self = Self::rgb(0.012, 0.016, 0.043);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Clamp into [0, 1]; NaN becomes 0.
#[inline]
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Stellar spectral classes, hottest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SpectralClass {
    O = 0,
    B,
    A,
    F,
    G,
    K,
    M,
}

impl SpectralClass {
    pub const ALL: [SpectralClass; 7] = [
        Self::O, Self::B, Self::A, Self::F, Self::G, Self::K, Self::M,
    ];

    /// Relative frequency among visible stars (white/blue-white dominate).
    const WEIGHTS: [f32; 7] = [0.03, 0.12, 0.25, 0.22, 0.18, 0.13, 0.07];

    pub fn random(rng: &mut Rng) -> Self {
        Self::ALL[rng.weighted(&Self::WEIGHTS)]
    }

    pub fn color(self) -> Color {
        match self {
            Self::O => Color::rgb8(155, 176, 255),
            Self::B => Color::rgb8(170, 191, 255),
            Self::A => Color::rgb8(202, 215, 255),
            Self::F => Color::rgb8(248, 247, 255),
            Self::G => Color::rgb8(255, 244, 234),
            Self::K => Color::rgb8(255, 210, 161),
            Self::M => Color::rgb8(255, 204, 111),
        }
    }
}

/// Head → mid → tail colors of a meteor trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteorPalette {
    pub head: Color,
    pub mid: Color,
    pub tail: Color,
}

impl MeteorPalette {
    /// Sodium-dominated, warm.
    pub const SODIUM: Self = Self {
        head: Color::rgb(1.0, 0.97, 0.88),
        mid: Color::rgb(1.0, 0.78, 0.42),
        tail: Color::rgb(0.85, 0.42, 0.18),
    };
    /// Magnesium, blue-green.
    pub const MAGNESIUM: Self = Self {
        head: Color::rgb(0.92, 1.0, 0.96),
        mid: Color::rgb(0.55, 0.95, 0.78),
        tail: Color::rgb(0.2, 0.6, 0.55),
    };
    /// Iron, yellow-white.
    pub const IRON: Self = Self {
        head: Color::rgb(1.0, 1.0, 0.95),
        mid: Color::rgb(1.0, 0.92, 0.6),
        tail: Color::rgb(0.7, 0.55, 0.3),
    };
    /// Calcium, violet.
    pub const CALCIUM: Self = Self {
        head: Color::rgb(0.97, 0.94, 1.0),
        mid: Color::rgb(0.78, 0.66, 1.0),
        tail: Color::rgb(0.42, 0.3, 0.78),
    };
    /// Plain white-blue.
    pub const SILICATE: Self = Self {
        head: Color::rgb(1.0, 1.0, 1.0),
        mid: Color::rgb(0.78, 0.86, 1.0),
        tail: Color::rgb(0.4, 0.5, 0.8),
    };

    pub const ALL: [MeteorPalette; 5] = [
        Self::SODIUM, Self::MAGNESIUM, Self::IRON, Self::CALCIUM, Self::SILICATE,
    ];

    const WEIGHTS: [f32; 5] = [0.25, 0.2, 0.2, 0.1, 0.25];

    pub fn random(rng: &mut Rng) -> Self {
        Self::ALL[rng.weighted(&Self::WEIGHTS)]
    }

    /// Color at `t` along the trail: 0 = head, 1 = tail.
    pub fn at(&self, t: f32) -> Color {
        let t = clamp_unit(t);
        if t < 0.5 {
            self.head.lerp(self.mid, t * 2.0)
        } else {
            self.mid.lerp(self.tail, (t - 0.5) * 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectral_random_is_valid() {
        let mut rng = Rng::new(42);
        for _ in 0..100 {
            let class = SpectralClass::random(&mut rng);
            assert!(SpectralClass::ALL.contains(&class));
        }
    }

    #[test]
    fn palette_endpoints_match_head_and_tail() {
        let p = MeteorPalette::SODIUM;
        assert_eq!(p.at(0.0), p.head);
        assert_eq!(p.at(1.0), p.tail);
        assert_eq!(p.at(0.5), p.mid);
    }

    #[test]
    fn sanitized_clamps_and_drops_nan() {
        let c = Color::new(f32::NAN, 2.0, -1.0, 0.5).sanitized();
        assert_eq!(c, Color::new(0.0, 1.0, 0.0, 0.5));
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(3.0).a, 1.0);
        assert_eq!(Color::WHITE.with_alpha(-1.0).a, 0.0);
    }
}
