use crate::error::{NeonError, NeonResult};
use crate::palette::ColorRole;
use crate::spec::GlowStyle;

/// Where a layer's text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMode {
    /// Drawn on a transparent canvas, optionally blurred, then overlaid onto
    /// the running composite.
    Canvas,
    /// Drawn on the running composite itself. With a blur sigma this consumes
    /// the composite twice (drawtext input and overlay bottom); the splitter
    /// pass makes that fan-out explicit.
    Composite,
}

/// One entry in a style's layer stack, bottom-to-top. The last entry of every
/// stack is the sharp core.
#[derive(Debug, Clone, Copy)]
pub struct GlowLayer {
    pub alpha: f64,
    pub sigma: f64,
    pub role: ColorRole,
    /// Pixel offset added to the position expressions; (0, 0) for true-glow
    /// layers.
    pub offset: (i32, i32),
    pub mode: LayerMode,
}

impl GlowLayer {
    const fn canvas(alpha: f64, sigma: f64, role: ColorRole) -> Self {
        Self {
            alpha,
            sigma,
            role,
            offset: (0, 0),
            mode: LayerMode::Canvas,
        }
    }

    const fn composite(alpha: f64, sigma: f64, role: ColorRole) -> Self {
        Self {
            alpha,
            sigma,
            role,
            offset: (0, 0),
            mode: LayerMode::Composite,
        }
    }

    const fn core() -> Self {
        Self::composite(1.0, 0.0, ColorRole::Core)
    }

    pub fn is_core(&self) -> bool {
        self.alpha == 1.0 && self.sigma == 0.0
    }
}

/// The resolved layer stack for one glow style. Adding a style means adding a
/// table here; the graph builder has no per-style branching.
#[derive(Debug, Clone)]
pub struct StylePlan {
    pub name: &'static str,
    pub layers: Vec<GlowLayer>,
}

impl StylePlan {
    /// Table preconditions checked before any graph work: a non-empty stack
    /// whose last entry is the sharp core, with all parameters in range.
    pub fn validate(&self) -> NeonResult<()> {
        let Some(last) = self.layers.last() else {
            return Err(NeonError::config(format!(
                "style '{}' has an empty layer stack",
                self.name
            )));
        };
        if !last.is_core() || last.offset != (0, 0) {
            return Err(NeonError::config(format!(
                "style '{}' must end with the sharp core layer",
                self.name
            )));
        }
        for (index, layer) in self.layers.iter().enumerate() {
            if !layer.alpha.is_finite() || layer.alpha < 0.0 || layer.alpha > 1.0 {
                return Err(NeonError::config(format!(
                    "style '{}' layer {index} alpha {} out of [0, 1]",
                    self.name, layer.alpha
                )));
            }
            if !layer.sigma.is_finite() || layer.sigma < 0.0 {
                return Err(NeonError::config(format!(
                    "style '{}' layer {index} blur sigma {} must be non-negative",
                    self.name, layer.sigma
                )));
            }
        }
        Ok(())
    }
}

/// Resolve a glow style selector to its layer stack.
pub fn plan_for(style: GlowStyle) -> StylePlan {
    match style {
        // Zero-offset colored silhouette under the core; two drawtext passes.
        GlowStyle::Shadow => StylePlan {
            name: "shadow",
            layers: vec![
                GlowLayer::composite(0.5, 0.0, ColorRole::Glow),
                GlowLayer::core(),
            ],
        },
        // One semi-transparent canvas layer, blurred wide, then the core.
        GlowStyle::CleanSplit => StylePlan {
            name: "clean-split",
            layers: vec![
                GlowLayer::canvas(0.5, 15.0, ColorRole::Glow),
                GlowLayer::core(),
            ],
        },
        GlowStyle::MultiLayer { layers } => multi_layer_plan(layers),
        // Blurred glow composited against the live base, a fixed-offset drop
        // shadow, then the core.
        GlowStyle::Blend => StylePlan {
            name: "blend",
            layers: vec![
                GlowLayer::composite(0.4, 5.0, ColorRole::Glow),
                GlowLayer {
                    alpha: 0.6,
                    sigma: 0.0,
                    role: ColorRole::Shadow,
                    offset: (4, 4),
                    mode: LayerMode::Composite,
                },
                GlowLayer::core(),
            ],
        },
        // Five chained shadow passes at rising opacity, no overlays at all.
        GlowStyle::EnhancedShadow => StylePlan {
            name: "enhanced-shadow",
            layers: vec![
                GlowLayer::composite(0.3, 0.0, ColorRole::Glow),
                GlowLayer::composite(0.45, 0.0, ColorRole::Glow),
                GlowLayer::composite(0.6, 0.0, ColorRole::Bright),
                GlowLayer::composite(0.75, 0.0, ColorRole::Bright),
                GlowLayer::composite(0.9, 0.0, ColorRole::Bright),
                GlowLayer::core(),
            ],
        },
    }
}

/// Derive the multi-layer stack: `count` layers total including the core,
/// sigma halving from 15 outward-in, alpha rising from 0.15, outer half glow
/// and inner half bright.
fn multi_layer_plan(count: u8) -> StylePlan {
    let glow_count = count.max(2) as usize - 1;
    let mut layers = Vec::with_capacity(glow_count + 1);
    let alpha_step = if glow_count > 1 {
        (0.65 - 0.15) / (glow_count - 1) as f64
    } else {
        0.0
    };
    for index in 0..glow_count {
        let role = if index < glow_count.div_ceil(2) {
            ColorRole::Glow
        } else {
            ColorRole::Bright
        };
        let alpha = ((0.15 + alpha_step * index as f64) * 100.0).round() / 100.0;
        layers.push(GlowLayer::canvas(
            alpha,
            15.0 / f64::powi(2.0, index as i32),
            role,
        ));
    }
    // The core rides its own canvas too, so every layer overlays uniformly.
    layers.push(GlowLayer::canvas(1.0, 0.0, ColorRole::Core));
    StylePlan {
        name: "multi-layer",
        layers,
    }
}

#[cfg(test)]
mod tests {
    use super::{plan_for, GlowLayer, LayerMode, StylePlan};
    use crate::palette::ColorRole;
    use crate::spec::GlowStyle;

    const ALL_STYLES: [GlowStyle; 5] = [
        GlowStyle::Shadow,
        GlowStyle::CleanSplit,
        GlowStyle::MultiLayer { layers: 4 },
        GlowStyle::Blend,
        GlowStyle::EnhancedShadow,
    ];

    #[test]
    fn every_builtin_table_validates() {
        for style in ALL_STYLES {
            plan_for(style).validate().expect("table should validate");
        }
    }

    #[test]
    fn every_stack_ends_with_the_sharp_core() {
        for style in ALL_STYLES {
            let plan = plan_for(style);
            let last = plan.layers.last().expect("stack should be non-empty");
            assert!(last.is_core(), "style {} core must be last", plan.name);
        }
    }

    #[test]
    fn multi_layer_sigma_decreases_and_alpha_increases() {
        let plan = plan_for(GlowStyle::MultiLayer { layers: 4 });
        assert_eq!(plan.layers.len(), 4);
        for pair in plan.layers.windows(2) {
            assert!(pair[0].sigma > pair[1].sigma);
            assert!(pair[0].alpha < pair[1].alpha);
        }
    }

    #[test]
    fn multi_layer_respects_requested_count() {
        for count in 2..=8u8 {
            let plan = plan_for(GlowStyle::MultiLayer { layers: count });
            assert_eq!(plan.layers.len(), count as usize);
            plan.validate().expect("derived table should validate");
        }
    }

    #[test]
    fn enhanced_shadow_uses_no_canvas_layers() {
        let plan = plan_for(GlowStyle::EnhancedShadow);
        assert_eq!(plan.layers.len(), 6);
        assert!(plan
            .layers
            .iter()
            .all(|layer| layer.mode == LayerMode::Composite && layer.sigma == 0.0));
    }

    #[test]
    fn core_missing_is_rejected() {
        let plan = StylePlan {
            name: "broken",
            layers: vec![GlowLayer {
                alpha: 0.5,
                sigma: 3.0,
                role: ColorRole::Glow,
                offset: (0, 0),
                mode: LayerMode::Canvas,
            }],
        };
        let error = plan.validate().expect_err("missing core should fail");
        assert!(error.to_string().contains("sharp core"));
    }

    #[test]
    fn out_of_range_alpha_is_rejected() {
        let mut plan = plan_for(GlowStyle::Shadow);
        plan.layers[0].alpha = 1.3;
        assert!(plan.validate().is_err());
    }
}
