use crate::error::{NeonError, NeonResult};

pub const DEFAULT_COLOR: &str = "white";

/// The four color roles a glow layer can draw with. Single-hex palettes map
/// every luminous role to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Core,
    Bright,
    Glow,
    Shadow,
}

/// Resolved colors for one palette entry, `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSet {
    pub core: &'static str,
    pub bright: &'static str,
    pub glow: &'static str,
    pub shadow: &'static str,
}

impl ColorSet {
    const fn uniform(hex: &'static str) -> Self {
        Self {
            core: hex,
            bright: hex,
            glow: hex,
            shadow: "#000000",
        }
    }

    pub fn role(&self, role: ColorRole) -> &'static str {
        match role {
            ColorRole::Core => self.core,
            ColorRole::Bright => self.bright,
            ColorRole::Glow => self.glow,
            ColorRole::Shadow => self.shadow,
        }
    }
}

// Intense electric palette, tuned for maximum glow on dark footage.
const ELECTRIC: [(&str, ColorSet); 12] = [
    ("white", ColorSet::uniform("#FFFFFF")),
    ("red", ColorSet::uniform("#FF0033")),
    ("blue", ColorSet::uniform("#0099FF")),
    ("yellow", ColorSet::uniform("#FFFF00")),
    ("green", ColorSet::uniform("#00FF33")),
    ("purple", ColorSet::uniform("#FF00FF")),
    ("orange", ColorSet::uniform("#FF6600")),
    ("cyan", ColorSet::uniform("#00FFFF")),
    ("pink", ColorSet::uniform("#FF0099")),
    ("lime", ColorSet::uniform("#66FF00")),
    ("magenta", ColorSet::uniform("#FF0066")),
    ("aqua", ColorSet::uniform("#00FF99")),
];

// Studio palette with distinct core/bright/glow/shadow roles per name.
const STUDIO: [(&str, ColorSet); 7] = [
    (
        "white",
        ColorSet {
            core: "#FFFFFF",
            bright: "#FFFFFF",
            glow: "#FFFFFF",
            shadow: "#000000",
        },
    ),
    (
        "red",
        ColorSet {
            core: "#FFAAAA",
            bright: "#FF4444",
            glow: "#FF0000",
            shadow: "#220000",
        },
    ),
    (
        "blue",
        ColorSet {
            core: "#AACCFF",
            bright: "#4477FF",
            glow: "#0044FF",
            shadow: "#000022",
        },
    ),
    (
        "yellow",
        ColorSet {
            core: "#FFFFCC",
            bright: "#FFEE44",
            glow: "#FFDD00",
            shadow: "#222200",
        },
    ),
    (
        "green",
        ColorSet {
            core: "#AAFFAA",
            bright: "#44FF44",
            glow: "#00DD00",
            shadow: "#002200",
        },
    ),
    (
        "purple",
        ColorSet {
            core: "#FFAAFF",
            bright: "#FF44FF",
            glow: "#DD00DD",
            shadow: "#220022",
        },
    ),
    (
        "orange",
        ColorSet {
            core: "#FFDDAA",
            bright: "#FF9944",
            glow: "#FF7700",
            shadow: "#221100",
        },
    ),
];

/// A named color table injected into spec resolution. Swapping palettes is a
/// data change; nothing in the compiler hardcodes color values.
#[derive(Debug, Clone)]
pub struct Palette {
    name: &'static str,
    entries: &'static [(&'static str, ColorSet)],
}

/// Outcome of a palette lookup. `fallback` carries the requested name when the
/// lookup missed and the default entry was substituted.
#[derive(Debug, Clone)]
pub struct ResolvedColor {
    pub set: ColorSet,
    pub fallback: Option<String>,
}

impl Palette {
    pub fn electric() -> Self {
        Self {
            name: "electric",
            entries: &ELECTRIC,
        }
    }

    pub fn studio() -> Self {
        Self {
            name: "studio",
            entries: &STUDIO,
        }
    }

    pub fn by_name(name: &str) -> NeonResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "electric" => Ok(Self::electric()),
            "studio" => Ok(Self::studio()),
            other => Err(NeonError::config(format!(
                "unknown palette '{other}', expected one of: electric, studio"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, ColorSet)> + '_ {
        self.entries.iter().copied()
    }

    /// Look up a color by name, case-insensitively. A miss resolves to the
    /// default entry and reports the requested name so the caller can warn or
    /// reject; it is never silent.
    pub fn resolve(&self, requested: &str) -> ResolvedColor {
        let wanted = requested.to_ascii_lowercase();
        for (name, set) in self.entries {
            if *name == wanted {
                return ResolvedColor {
                    set: *set,
                    fallback: None,
                };
            }
        }

        let default = self
            .entries
            .iter()
            .find(|(name, _)| *name == DEFAULT_COLOR)
            .map(|(_, set)| *set)
            .unwrap_or_else(|| ColorSet::uniform("#FFFFFF"));
        ResolvedColor {
            set: default,
            fallback: Some(wanted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorRole, Palette, DEFAULT_COLOR};

    #[test]
    fn electric_lookup_is_case_insensitive() {
        let palette = Palette::electric();
        let resolved = palette.resolve("RED");
        assert!(resolved.fallback.is_none());
        assert_eq!(resolved.set.core, "#FF0033");
        assert_eq!(resolved.set.glow, "#FF0033");
    }

    #[test]
    fn studio_roles_differ() {
        let palette = Palette::studio();
        let resolved = palette.resolve("blue");
        assert!(resolved.fallback.is_none());
        assert_eq!(resolved.set.role(ColorRole::Core), "#AACCFF");
        assert_eq!(resolved.set.role(ColorRole::Glow), "#0044FF");
        assert_eq!(resolved.set.role(ColorRole::Shadow), "#000022");
    }

    #[test]
    fn unknown_color_falls_back_to_white_and_reports() {
        let palette = Palette::electric();
        let resolved = palette.resolve("chartreuse");
        assert_eq!(resolved.fallback.as_deref(), Some("chartreuse"));
        assert_eq!(resolved.set.core, "#FFFFFF");
    }

    #[test]
    fn both_palettes_contain_the_default_color() {
        for palette in [Palette::electric(), Palette::studio()] {
            assert!(
                palette.names().any(|name| name == DEFAULT_COLOR),
                "palette {} should define '{}'",
                palette.name(),
                DEFAULT_COLOR
            );
        }
    }

    #[test]
    fn by_name_rejects_unknown_palette() {
        assert!(Palette::by_name("pastel").is_err());
        assert_eq!(Palette::by_name("STUDIO").expect("should parse").name(), "studio");
    }
}
