use mindmap_layout::config::LayoutConfig;
use mindmap_layout::ir::ContentDocument;
use mindmap_layout::layout::{LayoutStrategy, compute_layout};
use mindmap_layout::layout_dump::LayoutDump;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MindmapLayoutOptions {
    strategy: Option<LayoutStrategy>,
    /// Partial config; missing keys keep their defaults.
    config: Option<LayoutConfig>,
}

fn layout_json(tree_json: &str, options: MindmapLayoutOptions) -> Result<String, String> {
    let document = ContentDocument::from_json(tree_json).map_err(|error| error.to_string())?;
    let config = options.config.unwrap_or_default();
    let strategy = options.strategy.unwrap_or_default();
    let layout = compute_layout(&document.root, &document.cross_links, strategy, &config)
        .map_err(|error| error.to_string())?;
    serde_json::to_string(&LayoutDump::from_layout(&layout)).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_mindmap_json(tree_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<MindmapLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        MindmapLayoutOptions::default()
    };

    layout_json(tree_json, options).map_err(|error| JsValue::from_str(&error))
}
