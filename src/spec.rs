use crate::error::{NeonError, NeonResult};

/// How the source footage is fitted to the output frame before any text is
/// drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    /// Blurred cover layer behind the aspect-fit footage, centered.
    Blurred,
    /// Plain scale-to-cover and crop.
    CroppedOnly,
}

/// Which of the glow recipes to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlowStyle {
    Shadow,
    CleanSplit,
    MultiLayer { layers: u8 },
    Blend,
    EnhancedShadow,
}

pub const DEFAULT_MULTI_LAYERS: u8 = 4;

impl GlowStyle {
    /// Parse a style selector name. `layers` only applies to the multi-layer
    /// style and defaults to 4 there.
    pub fn parse(name: &str, layers: Option<u8>) -> NeonResult<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "shadow" => Ok(Self::Shadow),
            "clean-split" | "clean" => Ok(Self::CleanSplit),
            "multi-layer" | "multi" => Ok(Self::MultiLayer {
                layers: layers.unwrap_or(DEFAULT_MULTI_LAYERS),
            }),
            "blend" => Ok(Self::Blend),
            "enhanced" | "enhanced-shadow" => Ok(Self::EnhancedShadow),
            other => Err(NeonError::config(format!(
                "unknown glow style '{other}', expected one of: shadow, clean-split, multi-layer, blend, enhanced"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Shadow => "shadow",
            Self::CleanSplit => "clean-split",
            Self::MultiLayer { .. } => "multi-layer",
            Self::Blend => "blend",
            Self::EnhancedShadow => "enhanced-shadow",
        }
    }
}

/// One validated, immutable render request. Construction goes through
/// [`EffectSpec::validate`] before any graph work starts.
#[derive(Debug, Clone)]
pub struct EffectSpec {
    /// Caption text; may contain explicit `\n` line-break markers.
    pub text: String,
    /// Color name, resolved against the injected palette.
    pub color: String,
    /// Horizontal anchor in [0, 1] fractional canvas coordinates.
    pub x: f64,
    /// Vertical anchor in [0, 1] fractional canvas coordinates.
    pub y: f64,
    /// Optional positive pixel override for the estimated font size.
    pub font_size: Option<u32>,
    pub background: BackgroundMode,
    pub style: GlowStyle,
}

impl EffectSpec {
    pub fn validate(&self) -> NeonResult<()> {
        if self.text.trim().is_empty() {
            return Err(NeonError::config("caption text cannot be empty"));
        }
        for (label, value) in [("x", self.x), ("y", self.y)] {
            if !value.is_finite() || value < 0.0 || value > 1.0 {
                return Err(NeonError::config(format!(
                    "{label} must be between 0 and 1, got {value}"
                )));
            }
        }
        if self.font_size == Some(0) {
            return Err(NeonError::config("font size override must be positive"));
        }
        if let GlowStyle::MultiLayer { layers } = self.style {
            if layers < 2 || layers > 8 {
                return Err(NeonError::config(format!(
                    "multi-layer glow requires between 2 and 8 layers, got {layers}"
                )));
            }
        }
        Ok(())
    }
}
