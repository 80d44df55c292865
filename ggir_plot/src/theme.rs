// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme resolution with structural fallback.
//!
//! The IR carries an optional nested theme tree (plain JSON). Lookup walks
//! the user tree per path segment; a user element wholly replaces the
//! built-in one (no field-level merging). A concrete path like `axis.text.x`
//! falls back to its generic form `axis.text` before consulting the built-in
//! defaults, which mirror theme_gray with sizes pre-converted to pixels.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ggir_schema::{JsonValue, PaddingIr};

/// A resolved theme element.
///
/// Field values are optional: a user element only overrides what it names,
/// and call sites supply their own terminal defaults, so an absent field
/// never blocks rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum ThemeElement {
    /// Explicitly suppressed ("element_blank").
    Blank,
    /// Stroked line decoration.
    Line(LineElement),
    /// Filled rectangle decoration.
    Rect(RectElement),
    /// Text styling.
    Text(TextElement),
}

/// Line element fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineElement {
    /// Stroke color string (resolved with `convert_color` at draw time).
    pub colour: Option<String>,
    /// Stroke width in px.
    pub linewidth: Option<f64>,
    /// Linetype name or hex pattern.
    pub linetype: Option<String>,
}

/// Rect element fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectElement {
    /// Fill color string.
    pub fill: Option<String>,
    /// Border color string.
    pub colour: Option<String>,
    /// Border width in px.
    pub linewidth: Option<f64>,
}

/// Text element fields. Sizes are pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextElement {
    /// Text color string.
    pub colour: Option<String>,
    /// Font size in px.
    pub size: Option<f64>,
    /// "plain", "bold", "italic".
    pub face: Option<String>,
    /// Font family.
    pub family: Option<String>,
    /// Rotation in degrees.
    pub angle: Option<f64>,
}

impl TextElement {
    /// Font size with a caller-supplied default.
    pub fn size_or(&self, default: f64) -> f64 {
        self.size.unwrap_or(default)
    }

    /// Whether the face resolves to bold.
    pub fn is_bold(&self) -> bool {
        self.face.as_deref() == Some("bold")
    }
}

/// Uniform edge insets in px.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Left inset.
    pub left: f64,
}

impl Margins {
    /// Same inset on all four edges.
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// A theme resolved once per render. Immutable thereafter.
#[derive(Clone, Debug, Default)]
pub struct Theme {
    user: Option<JsonValue>,
}

impl Theme {
    /// Wraps the IR's raw theme tree, which may be absent.
    pub fn new(user: Option<JsonValue>) -> Self {
        // Non-object trees carry no lookups; drop them up front.
        let user = user.filter(JsonValue::is_object);
        Self { user }
    }

    /// Resolves a dotted path to a theme element.
    ///
    /// Tiers: user value at the exact path, user value at the generic path
    /// (trailing `.x`/`.y` stripped), user value at the producer's alias for
    /// the path, built-in default at the exact path, built-in default at the
    /// generic path.
    pub fn get(&self, path: &str) -> Option<ThemeElement> {
        if let Some(v) = self.lookup_user(path) {
            return parse_element(v, default_element(path).as_ref());
        }
        let generic = generic_path(path);
        if let Some(generic) = &generic {
            if let Some(v) = self.lookup_user(generic) {
                return parse_element(v, default_element(generic).as_ref());
            }
        }
        if let Some(alias) = alias_path(path) {
            if let Some(v) = self.lookup_user(alias) {
                return parse_element(v, default_element(path).as_ref());
            }
        }
        default_element(path).or_else(|| generic.as_deref().and_then(default_element))
    }

    /// Line element at `path`, `None` when blank or absent.
    pub fn line(&self, path: &str) -> Option<LineElement> {
        match self.get(path)? {
            ThemeElement::Line(l) => Some(l),
            _ => None,
        }
    }

    /// Rect element at `path`, `None` when blank or absent.
    pub fn rect(&self, path: &str) -> Option<RectElement> {
        match self.get(path)? {
            ThemeElement::Rect(r) => Some(r),
            _ => None,
        }
    }

    /// Text element at `path`, `None` when blank or absent.
    pub fn text(&self, path: &str) -> Option<TextElement> {
        match self.get(path)? {
            ThemeElement::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The plot margin, from the user theme's `plot.margin` else the
    /// theme_gray default of 7.3 px per side.
    pub fn plot_margin(&self) -> Margins {
        if let Some(v) = self.lookup_user("plot.margin") {
            if let Some(m) = parse_margins(v) {
                return m;
            }
        }
        Margins::uniform(7.3)
    }

    /// Outer padding for the simple single-panel path: the plot margin plus
    /// fixed per-edge allowances for axes and titles, overridable by an
    /// explicit IR `padding`, with a constant terminal fallback.
    pub fn padding(&self, ir_padding: Option<&PaddingIr>) -> Margins {
        if self.lookup_user("plot.margin").is_some() {
            let m = self.plot_margin();
            return Margins {
                top: m.top + 30.0,
                right: m.right + 20.0,
                bottom: m.bottom + 40.0,
                left: m.left + 50.0,
            };
        }
        if let Some(p) = ir_padding {
            return Margins {
                top: p.top,
                right: p.right,
                bottom: p.bottom,
                left: p.left,
            };
        }
        Margins {
            top: 40.0,
            right: 20.0,
            bottom: 50.0,
            left: 60.0,
        }
    }

    fn lookup_user(&self, path: &str) -> Option<&JsonValue> {
        let mut node = self.user.as_ref()?;
        for segment in path.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }
}

/// Producer themes spell the gridline keys without the `panel.` prefix.
fn alias_path(path: &str) -> Option<&'static str> {
    match path {
        "panel.grid.major" => Some("grid.major"),
        "panel.grid.minor" => Some("grid.minor"),
        _ => None,
    }
}

/// Strips a trailing `.x`/`.y` axis qualifier.
fn generic_path(path: &str) -> Option<String> {
    let (head, tail) = path.rsplit_once('.')?;
    matches!(tail, "x" | "y").then(|| head.to_string())
}

/// The element kind expected at a path, used to classify user JSON that
/// lacks a `type` tag.
#[derive(Clone, Copy, Debug)]
enum ElementKind {
    Line,
    Rect,
    Text,
}

fn parse_element(v: &JsonValue, hint: Option<&ThemeElement>) -> Option<ThemeElement> {
    let obj = v.as_object()?;
    let tag = obj.get("type").and_then(JsonValue::as_str);
    if tag == Some("blank") {
        return Some(ThemeElement::Blank);
    }
    let kind = match tag {
        Some("line") => ElementKind::Line,
        Some("rect") => ElementKind::Rect,
        Some("text") => ElementKind::Text,
        _ => match hint {
            Some(ThemeElement::Line(_)) => ElementKind::Line,
            Some(ThemeElement::Rect(_)) => ElementKind::Rect,
            Some(ThemeElement::Text(_)) => ElementKind::Text,
            // Classify by fields: fill means rect, font fields mean text.
            _ => {
                if obj.contains_key("fill") {
                    ElementKind::Rect
                } else if obj.contains_key("size")
                    || obj.contains_key("face")
                    || obj.contains_key("family")
                {
                    ElementKind::Text
                } else {
                    ElementKind::Line
                }
            }
        },
    };
    let color_of = |key: &str| {
        obj.get(key)
            .or_else(|| obj.get(if key == "colour" { "color" } else { key }))
            .and_then(JsonValue::as_str)
            .map(ToString::to_string)
    };
    let num_of = |key: &str| obj.get(key).and_then(JsonValue::as_f64);
    Some(match kind {
        ElementKind::Line => ThemeElement::Line(LineElement {
            colour: color_of("colour"),
            linewidth: num_of("linewidth"),
            linetype: obj
                .get("linetype")
                .and_then(JsonValue::as_str)
                .map(ToString::to_string),
        }),
        ElementKind::Rect => ThemeElement::Rect(RectElement {
            fill: color_of("fill"),
            colour: color_of("colour"),
            linewidth: num_of("linewidth"),
        }),
        ElementKind::Text => ThemeElement::Text(TextElement {
            colour: color_of("colour"),
            size: num_of("size"),
            face: obj
                .get("face")
                .and_then(JsonValue::as_str)
                .map(ToString::to_string),
            family: obj
                .get("family")
                .and_then(JsonValue::as_str)
                .map(ToString::to_string),
            angle: num_of("angle"),
        }),
    })
}

fn parse_margins(v: &JsonValue) -> Option<Margins> {
    let obj = v.as_object()?;
    let edge = |long: &str, short: &str| {
        obj.get(long)
            .or_else(|| obj.get(short))
            .and_then(JsonValue::as_f64)
    };
    Some(Margins {
        top: edge("top", "t")?,
        right: edge("right", "r")?,
        bottom: edge("bottom", "b")?,
        left: edge("left", "l")?,
    })
}

fn line(colour: &str, linewidth: f64) -> ThemeElement {
    ThemeElement::Line(LineElement {
        colour: Some(colour.to_string()),
        linewidth: Some(linewidth),
        linetype: None,
    })
}

fn rect(fill: &str) -> ThemeElement {
    ThemeElement::Rect(RectElement {
        fill: Some(fill.to_string()),
        colour: None,
        linewidth: None,
    })
}

fn text(colour: &str, size: f64) -> ThemeElement {
    ThemeElement::Text(TextElement {
        colour: Some(colour.to_string()),
        size: Some(size),
        face: None,
        family: None,
        angle: None,
    })
}

/// Built-in defaults matching theme_gray, sizes in px.
fn default_element(path: &str) -> Option<ThemeElement> {
    Some(match path {
        "panel.background" => rect("#EBEBEB"),
        "plot.background" => rect("#FFFFFF"),
        "panel.grid.major" => line("#FFFFFF", 1.89),
        "panel.grid.minor" => line("#FFFFFF", 0.945),
        "axis.line" => ThemeElement::Blank,
        "axis.ticks" => line("#333333", 1.89),
        "axis.text" => text("#4D4D4D", 8.8),
        "axis.title" => text("#000000", 11.0),
        "text.title" => text("#000000", 13.2),
        "text.subtitle" => text("#000000", 11.0),
        "text.caption" => text("#4D4D4D", 8.8),
        "legend.key" => ThemeElement::Rect(RectElement {
            fill: Some("#FFFFFF".to_string()),
            colour: Some("grey80".to_string()),
            linewidth: Some(0.5),
        }),
        "legend.text" => text("#000000", 8.8),
        "legend.title" => ThemeElement::Text(TextElement {
            colour: Some("#000000".to_string()),
            size: Some(11.0),
            face: Some("bold".to_string()),
            family: None,
            angle: None,
        }),
        "strip.background" => rect("#D9D9D9"),
        "strip.text" => text("#1A1A1A", 8.8),
        _ => return None,
    })
}

/// Decides whether an element should be drawn: present and not blank.
pub fn is_drawn(element: Option<&ThemeElement>) -> bool {
    !matches!(element, None | Some(ThemeElement::Blank))
}

/// Collects the dash pattern for a line element's linetype, if any.
pub fn line_dash(element: &LineElement) -> ggir_core::DashPattern {
    element
        .linetype
        .as_deref()
        .map(crate::units::linetype_dash)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn theme(json: &str) -> Theme {
        Theme::new(Some(serde_json::from_str(json).unwrap()))
    }

    #[test]
    fn defaults_resolve_without_user_theme() {
        let t = Theme::new(None);
        let panel = t.rect("panel.background").unwrap();
        assert_eq!(panel.fill.as_deref(), Some("#EBEBEB"));
        let grid = t.line("panel.grid.major").unwrap();
        assert_eq!(grid.linewidth, Some(1.89));
        assert_eq!(t.get("axis.line"), Some(ThemeElement::Blank));
    }

    #[test]
    fn concrete_path_falls_back_to_generic() {
        let t = theme(r#"{"axis":{"text":{"colour":"red","size":10}}}"#);
        let x_text = t.text("axis.text.x").unwrap();
        assert_eq!(x_text.colour.as_deref(), Some("red"));
        assert_eq!(x_text.size, Some(10.0));
    }

    #[test]
    fn concrete_path_wins_over_generic() {
        let t = theme(
            r#"{"axis":{"text":{"size":10},"text.x":{"size":12}}}"#,
        );
        // Dotted keys inside the user tree are not nested; the walk sees
        // axis -> text -> x, so this resolves through the generic element.
        assert_eq!(t.text("axis.text.x").unwrap().size, Some(10.0));

        let t = theme(r#"{"axis":{"text":{"size":10,"x":{"size":12}}}}"#);
        assert_eq!(t.text("axis.text.x").unwrap().size, Some(12.0));
        assert_eq!(t.text("axis.text.y").unwrap().size, Some(10.0));
    }

    #[test]
    fn user_element_wholly_replaces_default() {
        let t = theme(r##"{"panel":{"background":{"fill":"#222222"}}}"##);
        let panel = t.rect("panel.background").unwrap();
        assert_eq!(panel.fill.as_deref(), Some("#222222"));
        // No merge: the default's absence of a border stays absent.
        assert_eq!(panel.colour, None);
    }

    #[test]
    fn blank_suppresses_drawing() {
        let t = theme(r#"{"panel":{"grid":{"major":{"type":"blank"}}}}"#);
        assert_eq!(t.get("panel.grid.major"), Some(ThemeElement::Blank));
        assert!(!is_drawn(t.get("panel.grid.major").as_ref()));
        assert!(is_drawn(t.get("panel.background").as_ref()));
    }

    #[test]
    fn plot_margin_and_padding_chain() {
        let t = Theme::new(None);
        assert_eq!(t.plot_margin(), Margins::uniform(7.3));
        // No user margin: IR padding wins.
        let ir = PaddingIr {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        assert_eq!(t.padding(Some(&ir)).left, 4.0);
        // Neither: terminal constants.
        assert_eq!(t.padding(None).left, 60.0);

        let t = theme(r#"{"plot":{"margin":{"t":5,"r":5,"b":5,"l":5}}}"#);
        let pad = t.padding(None);
        assert_eq!(pad.top, 35.0);
        assert_eq!(pad.left, 55.0);
    }

    #[test]
    fn producer_grid_keys_resolve_through_alias() {
        let t = theme(r##"{"grid":{"major":{"colour":"#112233","linewidth":2.0}}}"##);
        let grid = t.line("panel.grid.major").unwrap();
        assert_eq!(grid.colour.as_deref(), Some("#112233"));
        assert_eq!(grid.linewidth, Some(2.0));
        // Minor stays on its default.
        assert_eq!(t.line("panel.grid.minor").unwrap().linewidth, Some(0.945));
    }

    #[test]
    fn untagged_user_elements_classify_by_fields() {
        let t = theme(r#"{"strip":{"background":{"fill":"pink"}}}"#);
        assert!(matches!(
            t.get("strip.background"),
            Some(ThemeElement::Rect(_))
        ));
        let t = theme(r#"{"custom":{"thing":{"size":9}}}"#);
        assert!(matches!(t.get("custom.thing"), Some(ThemeElement::Text(_))));
    }
}
