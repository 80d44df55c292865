// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart demos for `ggir_widget`.
//!
//! Renders a handful of sample payloads to standalone SVG files. Run with
//! `RUST_LOG=debug` for the render trace.

use serde_json::json;

use ggir_widget::Widget;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let demos = [
        ("scatter", scatter_demo()),
        ("bar_facets", faceted_bar_demo()),
        ("boxplot_flipped", flipped_boxplot_demo()),
        ("line_temporal", temporal_line_demo()),
    ];

    for (name, payload) in demos {
        let mut widget = Widget::new(640.0, 420.0);
        widget.render_json(payload);
        let path = format!("ggir_demo_{name}.svg");
        std::fs::write(&path, widget.svg()).expect("write demo svg");
        println!("wrote {path}");
    }
}

fn scatter_demo() -> serde_json::Value {
    json!({
        "title": "Fuel economy",
        "scales": {
            "x": {"domain": [1.0, 7.0]},
            "y": {"domain": [10.0, 45.0]},
            "color": {"type": "discrete", "domain": ["compact", "midsize", "suv", "2seater"]}
        },
        "axes": {
            "x": {"title": "displacement"},
            "y": {"title": "hwy mpg"}
        },
        "layers": [{
            "geom": "point",
            "aes": {"x": "displ", "y": "hwy", "color": "class"},
            "data": [
                {"displ": 1.8, "hwy": 29, "class": "compact"},
                {"displ": 2.0, "hwy": 31, "class": "compact"},
                {"displ": 2.8, "hwy": 26, "class": "midsize"},
                {"displ": 3.1, "hwy": 27, "class": "midsize"},
                {"displ": 4.2, "hwy": 23, "class": "suv"},
                {"displ": 5.3, "hwy": 20, "class": "suv"},
                {"displ": 5.7, "hwy": 26, "class": "2seater"},
                {"displ": 6.2, "hwy": 25, "class": "2seater"}
            ]
        }]
    })
}

fn faceted_bar_demo() -> serde_json::Value {
    json!({
        "title": "Quarterly revenue",
        "scales": {
            "x": {"type": "band", "domain": ["Q1", "Q2", "Q3", "Q4"]},
            "y": {"domain": [0.0, 60.0]}
        },
        "facets": {
            "type": "wrap",
            "nrow": 1,
            "ncol": 2,
            "layout": [
                {"PANEL": 1, "ROW": 1, "COL": 1},
                {"PANEL": 2, "ROW": 1, "COL": 2}
            ],
            "strips": [
                {"PANEL": 1, "label": "east"},
                {"PANEL": 2, "label": "west"}
            ]
        },
        "layers": [{
            "geom": "col",
            "aes": {"x": "quarter", "y": "revenue"},
            "data": [
                {"quarter": "Q1", "revenue": 31, "PANEL": 1},
                {"quarter": "Q2", "revenue": 38, "PANEL": 1},
                {"quarter": "Q3", "revenue": 44, "PANEL": 1},
                {"quarter": "Q4", "revenue": 52, "PANEL": 1},
                {"quarter": "Q1", "revenue": 22, "PANEL": 2},
                {"quarter": "Q2", "revenue": 28, "PANEL": 2},
                {"quarter": "Q3", "revenue": 30, "PANEL": 2},
                {"quarter": "Q4", "revenue": 41, "PANEL": 2}
            ]
        }]
    })
}

fn flipped_boxplot_demo() -> serde_json::Value {
    json!({
        "title": "Latency by service",
        "coord": {"flip": true},
        "scales": {
            "x": {"type": "band", "domain": ["auth", "search"]},
            "y": {"domain": [0.0, 120.0]}
        },
        "axes": {
            "y": {"title": "latency (ms)"}
        },
        "layers": [{
            "geom": "boxplot",
            "aes": {"x": "service"},
            "data": [
                {
                    "service": "auth",
                    "ymin": 12, "lower": 14, "middle": 17, "upper": 21, "ymax": 24,
                    "outliers": [95]
                },
                {
                    "service": "search",
                    "ymin": 40, "lower": 47, "middle": 51, "upper": 58, "ymax": 62
                }
            ]
        }]
    })
}

fn temporal_line_demo() -> serde_json::Value {
    // Millisecond timestamps for 2025-01-01 through 2025-05-01.
    json!({
        "title": "Signups",
        "scales": {
            "x": {"type": "time", "domain": [1735689600000.0, 1746057600000.0]},
            "y": {"domain": [0.0, 500.0]}
        },
        "layers": [{
            "geom": "line",
            "aes": {"x": "day", "y": "count"},
            "data": [
                {"day": 1735689600000.0, "count": 120},
                {"day": 1738368000000.0, "count": 180},
                {"day": 1740787200000.0, "count": 260},
                {"day": 1743465600000.0, "count": 310},
                {"day": 1746057600000.0, "count": 430}
            ]
        }]
    })
}
