use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spacing and routing constants for one engine instance. Every field has an
/// engine default; hosts override individual values through `load_config` or
/// by mutating the struct directly before a pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Vertical distance between consecutive layers.
    pub layer_spacing: f32,
    /// Horizontal gap between siblings within a layer.
    pub sibling_spacing: f32,
    /// Length of the free run a boundary arrow keeps before its node edge.
    pub stand_off_distance: f32,
    /// Vertical deltas below this route as a single straight segment.
    pub same_axis_threshold: f32,
    /// Gap between the top/bottom rail and the extreme node edge.
    pub rail_margin: f32,
    /// Downward shift applied to the source anchor of node-to-node flow.
    pub connect_anchor_offset: f32,
    /// Vertical slack before a connector counts as a back-edge.
    pub back_edge_margin: f32,
    /// Clearance between the lowest node and the back-edge bypass rail.
    pub back_edge_clearance: f32,
    /// Perpendicular offset of a label anchor from its segment midpoint.
    pub label_offset: f32,
    /// Horizontal baseline each layer is centered on.
    pub base_x: f32,
    /// Top of the first layer.
    pub base_y: f32,
    /// Distance an external anchor keeps from its partner node.
    pub external_anchor_reach: f32,
    /// Padding added to the layout's reported extent.
    pub canvas_margin: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layer_spacing: 160.0,
            sibling_spacing: 80.0,
            stand_off_distance: 80.0,
            same_axis_threshold: 10.0,
            rail_margin: 60.0,
            connect_anchor_offset: 18.0,
            back_edge_margin: 50.0,
            back_edge_clearance: 70.0,
            label_offset: 12.0,
            base_x: 350.0,
            base_y: 120.0,
            external_anchor_reach: 80.0,
            canvas_margin: 100.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layer_spacing: Option<f32>,
    sibling_spacing: Option<f32>,
    stand_off_distance: Option<f32>,
    same_axis_threshold: Option<f32>,
    rail_margin: Option<f32>,
    connect_anchor_offset: Option<f32>,
    back_edge_margin: Option<f32>,
    back_edge_clearance: Option<f32>,
    label_offset: Option<f32>,
    base_x: Option<f32>,
    base_y: Option<f32>,
    external_anchor_reach: Option<f32>,
    canvas_margin: Option<f32>,
}

fn apply_overrides(config: &mut EngineConfig, parsed: ConfigFile) {
    if let Some(v) = parsed.layer_spacing {
        config.layer_spacing = v;
    }
    if let Some(v) = parsed.sibling_spacing {
        config.sibling_spacing = v;
    }
    if let Some(v) = parsed.stand_off_distance {
        config.stand_off_distance = v;
    }
    if let Some(v) = parsed.same_axis_threshold {
        config.same_axis_threshold = v;
    }
    if let Some(v) = parsed.rail_margin {
        config.rail_margin = v;
    }
    if let Some(v) = parsed.connect_anchor_offset {
        config.connect_anchor_offset = v;
    }
    if let Some(v) = parsed.back_edge_margin {
        config.back_edge_margin = v;
    }
    if let Some(v) = parsed.back_edge_clearance {
        config.back_edge_clearance = v;
    }
    if let Some(v) = parsed.label_offset {
        config.label_offset = v;
    }
    if let Some(v) = parsed.base_x {
        config.base_x = v;
    }
    if let Some(v) = parsed.base_y {
        config.base_y = v;
    }
    if let Some(v) = parsed.external_anchor_reach {
        config.external_anchor_reach = v;
    }
    if let Some(v) = parsed.canvas_margin {
        config.canvas_margin = v;
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_overrides(&mut config, parsed);
    Ok(config)
}
