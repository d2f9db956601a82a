//! Browser host for lumen.
//!
//! Implements the engine's host contracts on top of the DOM (`document`
//! element lookup, canvas 2D and WebGL2 contexts, window `resize` events,
//! `requestAnimationFrame`) and exposes two page entry points to JavaScript:
//!
//! - [`ProjectionPage`]: the rotating point cloud over a grid (canvas 2D)
//! - [`ShapesPage`]: flat-colored rectangles and triangles (WebGL2)
//!
//! Everything here is wasm-only; on other targets the crate is empty.

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
mod pages;

#[cfg(target_arch = "wasm32")]
pub use host::{AnimationFrames, WebCanvas, WebContext2d, WebHost};
#[cfg(target_arch = "wasm32")]
pub use pages::{ProjectionPage, ShapesPage};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

/// Changes the console log level (`"error"`, `"warn"`, `"info"`, `"debug"`,
/// `"trace"` or `"off"`).
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsError> {
    let filter = level
        .parse::<log::LevelFilter>()
        .map_err(|e| JsError::new(&format!("invalid log level `{level}`: {e}")))?;
    log::set_max_level(filter);
    Ok(())
}
