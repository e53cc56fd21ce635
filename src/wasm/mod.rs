//! WASM bindings for the pager

use crate::controller::PassOutcome;
use crate::editing::TreeCaret;
use crate::{Pager, PagerConfig};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed pager wrapper
#[wasm_bindgen]
pub struct WasmPager {
    pager: Pager,
}

#[wasm_bindgen]
impl WasmPager {
    /// Create a pager with the default page (A4, 1" margins)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            pager: Pager::default(),
        }
    }

    /// Create a pager from a JSON config
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<WasmPager, JsError> {
        let config = PagerConfig::from_json(config_json)?;
        Ok(Self {
            pager: Pager::new(config)?,
        })
    }

    /// Replace the document; returns the outcome as JSON
    pub fn load(&mut self, markup: &str) -> Result<String, JsError> {
        let outcome = self.pager.load(markup)?;
        Ok(outcome_json(&outcome))
    }

    /// Replace one block (flat page order) with new markup
    #[wasm_bindgen(js_name = replaceBlock)]
    pub fn replace_block(&mut self, index: usize, markup: &str) -> Result<bool, JsError> {
        Ok(self.pager.replace_block(index, markup, current_timestamp())?)
    }

    #[wasm_bindgen(js_name = insertBlock)]
    pub fn insert_block(&mut self, index: usize, markup: &str) -> Result<bool, JsError> {
        Ok(self.pager.insert_block(index, markup, current_timestamp())?)
    }

    #[wasm_bindgen(js_name = removeBlock)]
    pub fn remove_block(&mut self, index: usize) -> bool {
        self.pager.remove_block(index, current_timestamp())
    }

    /// Notify that the host mutated content it owns
    #[wasm_bindgen(js_name = notifyMutation)]
    pub fn notify_mutation(&mut self) {
        self.pager
            .dispatch(crate::PagerEvent::Mutation { at_ms: current_timestamp() });
    }

    /// Run a pass if the debounce expired; returns the outcome JSON or an empty string
    pub fn tick(&mut self) -> String {
        self.pager
            .tick(current_timestamp())
            .map(|outcome| outcome_json(&outcome))
            .unwrap_or_default()
    }

    /// Re-paginate immediately
    pub fn flush(&mut self) -> String {
        outcome_json(&self.pager.flush())
    }

    /// The host painted the last committed partition
    pub fn painted(&mut self) {
        self.pager.painted();
    }

    /// Set the caret from JSON `{"blockIndex", "path", "offset"}`
    #[wasm_bindgen(js_name = setCaret)]
    pub fn set_caret(&mut self, caret_json: &str) -> Result<(), JsError> {
        let info: CaretInfo = serde_json::from_str(caret_json)?;
        self.pager.set_caret(Some(TreeCaret::new(
            info.block_index,
            info.path.into_iter().collect(),
            info.offset,
        )));
        Ok(())
    }

    /// Current caret as JSON, or an empty string
    #[wasm_bindgen(js_name = getCaret)]
    pub fn get_caret(&self) -> String {
        self.pager
            .caret()
            .map(|caret| {
                let info = CaretInfo {
                    block_index: caret.block_index,
                    path: caret.path.to_vec(),
                    offset: caret.offset,
                };
                serde_json::to_string(&info).unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.pager.page_count()
    }

    /// Full pagination report (JSON)
    #[wasm_bindgen(js_name = getReport)]
    pub fn get_report(&self) -> String {
        serde_json::to_string(&self.pager.report()).unwrap_or_default()
    }

    /// Serialized blocks of the last pass (JSON array)
    #[wasm_bindgen(js_name = getCachedMarkup)]
    pub fn get_cached_markup(&self) -> String {
        serde_json::to_string(self.pager.cached_markup()).unwrap_or_default()
    }

    /// Document with split fragments merged (JSON array)
    #[wasm_bindgen(js_name = getDocumentMarkup)]
    pub fn get_document_markup(&self) -> String {
        serde_json::to_string(&self.pager.document_markup()).unwrap_or_default()
    }

    /// Get layout constraints (JSON)
    #[wasm_bindgen(js_name = getLayoutConstraints)]
    pub fn get_layout_constraints(&self) -> String {
        let c = self.pager.config().constraints();
        let constraints = LayoutConstraintsJS {
            page_width: c.page_width,
            page_height: c.page_height,
            margin_top: c.margin_top,
            margin_bottom: c.margin_bottom,
            margin_left: c.margin_left,
            margin_right: c.margin_right,
            content_width: c.content_width(),
            content_height: c.content_height(),
        };
        serde_json::to_string(&constraints).unwrap_or_default()
    }
}

impl Default for WasmPager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recombine serialized fragments (JSON array in, JSON array out)
#[wasm_bindgen(js_name = recombineMarkup)]
pub fn recombine_markup(fragments_json: &str) -> Result<String, JsError> {
    let fragments: Vec<String> = serde_json::from_str(fragments_json)?;
    Ok(serde_json::to_string(&crate::split::recombine_markup(&fragments))?)
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretInfo {
    pub block_index: usize,
    #[serde(default)]
    pub path: Vec<usize>,
    pub offset: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeInfo {
    pub committed: bool,
    pub page_count: usize,
    pub cursor_block: Option<usize>,
    pub cursor_offset: Option<usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConstraintsJS {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub content_width: f32,
    pub content_height: f32,
}

fn outcome_json(outcome: &PassOutcome) -> String {
    let cursor = match outcome {
        PassOutcome::Committed { cursor, .. } => *cursor,
        PassOutcome::Unchanged { .. } => None,
    };
    let info = OutcomeInfo {
        committed: outcome.is_committed(),
        page_count: outcome.page_count(),
        cursor_block: cursor.map(|c| c.block_index),
        cursor_offset: cursor.map(|c| c.text_offset),
    };
    serde_json::to_string(&info).unwrap_or_default()
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
