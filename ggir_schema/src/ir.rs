// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart IR tree.
//!
//! Every field that can be absent in the JSON has a default here; an absent
//! optional key degrades to a documented default downstream rather than
//! failing deserialization.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

use crate::frame::Frame;
use crate::value::DataValue;
use crate::JsonValue;

/// One complete declarative chart description.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChartIr {
    /// Declared pixel width; the container size wins when absent.
    pub width: Option<f64>,
    /// Declared pixel height.
    pub height: Option<f64>,
    /// Plot title.
    pub title: Option<String>,
    /// Plot subtitle.
    pub subtitle: Option<String>,
    /// Plot caption (bottom).
    pub caption: Option<String>,
    /// Free-form nested theme tree; resolved downstream against defaults.
    pub theme: Option<JsonValue>,
    /// Explicit padding override, used when the theme has no plot margin.
    pub padding: Option<PaddingIr>,
    /// Coordinate-system options.
    pub coord: CoordDesc,
    /// Positional and color scale descriptors.
    pub scales: ScalesIr,
    /// Axis metadata per physical axis.
    pub axes: AxesIr,
    /// Legend placement.
    pub legend: LegendIr,
    /// Legend/colorbar guides.
    pub guides: Vec<GuideDesc>,
    /// Facet specification, when the chart is multi-panel.
    pub facets: Option<FacetDesc>,
    /// Data layers, drawn in order.
    pub layers: Vec<LayerIr>,
    /// Per-facet panel descriptors.
    pub panels: Vec<PanelDesc>,
}

/// Explicit padding `{top, right, bottom, left}` in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaddingIr {
    /// Top padding.
    pub top: f64,
    /// Right padding.
    pub right: f64,
    /// Bottom padding.
    pub bottom: f64,
    /// Left padding.
    pub left: f64,
}

/// Cartesian coordinate options.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoordDesc {
    /// Swap the axes: the x aesthetic drives the vertical pixel axis.
    pub flip: bool,
    /// Fixed aspect ratio (`coord_fixed`): panel height/width must equal
    /// `ratio * (y data range / x data range)`.
    pub ratio: Option<f64>,
    /// Coordinate-system tag from the producer ("cartesian", "flip", ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// The positional and color scales of a chart.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScalesIr {
    /// Horizontal (pre-flip) scale.
    pub x: Option<ScaleDesc>,
    /// Vertical (pre-flip) scale.
    pub y: Option<ScaleDesc>,
    /// Color/fill scale.
    pub color: Option<ColorScaleDesc>,
}

/// Declarative description of one positional scale.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScaleDesc {
    /// Scale kind tag ("continuous", "band", "point", "quantize", ...).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Domain transform ("identity", "log-10", "sqrt", "date", "time",
    /// "pow", "symlog", ...). Takes precedence over `kind` when present
    /// and not "identity".
    pub transform: Option<String>,
    /// Domain values (numbers, strings, or timestamps).
    pub domain: Vec<DataValue>,
    /// Output values for quantize/quantile/threshold kinds.
    pub range: Option<Vec<DataValue>>,
    /// Log base.
    pub base: Option<f64>,
    /// Power exponent.
    pub exponent: Option<f64>,
    /// Symlog linearization constant.
    pub constant: Option<f64>,
    /// Single band padding (inner and outer).
    pub padding: Option<f64>,
    /// Inner band padding.
    #[serde(rename = "paddingInner", alias = "padding_inner")]
    pub padding_inner: Option<f64>,
    /// Outer band padding.
    #[serde(rename = "paddingOuter", alias = "padding_outer")]
    pub padding_outer: Option<f64>,
    /// Band alignment in `[0, 1]`.
    pub align: Option<f64>,
    /// Major break positions supplied by the producer; gridlines and ticks
    /// use these verbatim so they match the producer's own break algorithm.
    pub breaks: Option<Vec<DataValue>>,
    /// Minor break positions.
    pub minor_breaks: Option<Vec<DataValue>>,
    /// Break labels paired with `breaks`.
    pub labels: Option<Vec<String>>,
    /// Temporal format pattern (producer-side strftime-ish).
    pub format: Option<String>,
    /// Temporal display timezone.
    pub timezone: Option<String>,
}

/// Declarative description of the color scale.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ColorScaleDesc {
    /// "continuous" or "discrete".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Domain values.
    pub domain: Vec<DataValue>,
    /// Optional explicit palette.
    pub range: Option<Vec<String>>,
}

/// Axis metadata for all four physical axes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AxesIr {
    /// Bottom axis (left under flip).
    pub x: Option<AxisDesc>,
    /// Left axis (bottom under flip).
    pub y: Option<AxisDesc>,
    /// Secondary top axis.
    pub x2: Option<AxisDesc>,
    /// Secondary right axis.
    pub y2: Option<AxisDesc>,
}

/// Metadata for one axis.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AxisDesc {
    /// Axis title.
    pub title: Option<String>,
    /// Tick label rotation in degrees.
    pub label_angle: Option<f64>,
}

/// Legend placement.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LegendIr {
    /// "right", "left", "top", "bottom", or "none".
    pub position: String,
}

impl Default for LegendIr {
    fn default() -> Self {
        Self {
            position: String::from("right"),
        }
    }
}

/// A legend or colorbar guide.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GuideDesc {
    /// "legend" (discrete keys) or "colorbar" (continuous gradient).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Guide title.
    pub title: Option<String>,
    /// Key entries, in display order.
    pub keys: Vec<GuideKey>,
    /// Which aesthetics this guide documents ("colour", "fill", "size",
    /// "shape").
    pub aesthetics: Vec<String>,
    /// Per-guide position override; "none" hides the guide.
    pub position: Option<String>,
    /// Explicit gradient colors for colorbars.
    pub colors: Option<Vec<String>>,
}

/// One legend key entry.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GuideKey {
    /// Display label.
    pub label: Option<String>,
    /// Data value the key stands for (used by colorbar tick placement).
    pub value: Option<DataValue>,
    /// Stroke color swatch.
    pub colour: Option<String>,
    /// Fill color swatch.
    pub fill: Option<String>,
    /// Point size in mm for size guides.
    pub size: Option<f64>,
    /// Point shape code for shape guides.
    pub shape: Option<f64>,
}

/// Facet specification.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FacetDesc {
    /// "wrap" or "grid".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Grid rows.
    pub nrow: Option<u32>,
    /// Grid columns.
    pub ncol: Option<u32>,
    /// Panel-to-cell assignment.
    pub layout: Vec<FacetCell>,
    /// Per-panel strip labels (facet_wrap).
    pub strips: Vec<StripIr>,
    /// Shared per-row strip labels (facet_grid, right edge, rotated).
    pub row_strips: Vec<StripIr>,
    /// Shared per-column strip labels (facet_grid, top edge).
    pub col_strips: Vec<StripIr>,
    /// Scale freedom: "fixed", "free", "free_x", "free_y".
    pub scales: Option<String>,
    /// Inter-panel spacing in px.
    pub spacing: Option<f64>,
}

/// One cell of a facet layout: which grid position a panel occupies.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FacetCell {
    /// Panel id, matching the `PANEL` column in layer data.
    #[serde(rename = "PANEL", alias = "panel")]
    pub panel: DataValue,
    /// 1-based grid row.
    #[serde(rename = "ROW", alias = "row")]
    pub row: u32,
    /// 1-based grid column.
    #[serde(rename = "COL", alias = "col")]
    pub col: u32,
}

/// One facet strip label. Wrap strips carry a panel id; grid strips carry a
/// row or column index instead.
#[derive(Clone, Debug, Default)]
pub struct StripIr {
    /// Display label.
    pub label: String,
    /// Panel id (facet_wrap strips).
    pub panel: Option<DataValue>,
    /// 1-based row (facet_grid row strips).
    pub row: Option<u32>,
    /// 1-based column (facet_grid column strips).
    pub col: Option<u32>,
}

impl<'de> Deserialize<'de> for StripIr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            // Bare label strings appear in older IR payloads.
            Label(String),
            Full {
                #[serde(default)]
                label: String,
                #[serde(rename = "PANEL", alias = "panel", default)]
                panel: Option<DataValue>,
                #[serde(rename = "ROW", alias = "row", default)]
                row: Option<u32>,
                #[serde(rename = "COL", alias = "col", default)]
                col: Option<u32>,
            },
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Label(label) => Self {
                label,
                panel: None,
                row: None,
                col: None,
            },
            Raw::Full {
                label,
                panel,
                row,
                col,
            } => Self {
                label,
                panel,
                row,
                col,
            },
        })
    }
}

/// One facet panel's ranges and breaks.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PanelDesc {
    /// Panel id; layer rows carry a matching `PANEL` column.
    #[serde(rename = "PANEL", alias = "panel")]
    pub panel: DataValue,
    /// Panel-local x domain (free scales).
    pub x_range: Option<Vec<DataValue>>,
    /// Panel-local y domain.
    pub y_range: Option<Vec<DataValue>>,
    /// Panel-local x breaks.
    pub x_breaks: Option<Vec<DataValue>>,
    /// Panel-local y breaks.
    pub y_breaks: Option<Vec<DataValue>>,
}

/// One data layer.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayerIr {
    /// Geometry kind tag ("point", "bar", "boxplot", ...).
    pub geom: String,
    /// Layer data, row- or column-oriented; normalized on deserialize.
    pub data: Frame,
    /// Aesthetic mapping: semantic role to column name.
    pub aes: BTreeMap<String, String>,
    /// Constant fallbacks for visual properties with no aesthetic mapping.
    pub params: BTreeMap<String, DataValue>,
}

impl LayerIr {
    /// The column name mapped to an aesthetic role, if any.
    pub fn aes_col(&self, role: &str) -> Option<&str> {
        self.aes.get(role).map(String::as_str)
    }

    /// A row cell through the aesthetic mapping: `aes[role]` names the
    /// column, absent mappings read as null.
    pub fn aes_value<'a>(&'a self, row: usize, role: &str) -> Option<&'a DataValue> {
        let col = self.aes_col(role)?;
        self.data.get(row, col)
    }

    /// A row cell by direct column name (for stat columns like `ymin` that
    /// are not aesthetic-mapped).
    pub fn column_value<'a>(&'a self, row: usize, col: &str) -> Option<&'a DataValue> {
        self.data.get(row, col)
    }

    /// A row cell preferring the aesthetic mapping, falling back to a
    /// same-named direct column (how stat columns behave upstream).
    pub fn value<'a>(&'a self, row: usize, role: &str) -> Option<&'a DataValue> {
        match self.aes_col(role) {
            Some(col) => self.data.get(row, col),
            None => self.data.get(row, role),
        }
    }

    /// A layer parameter as a float.
    pub fn param_f64(&self, name: &str) -> Option<f64> {
        self.params.get(name).and_then(DataValue::as_f64)
    }

    /// A layer parameter as a string.
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(DataValue::as_str)
    }
}
