//! Roomfolio WASM Web Runtime
//!
//! Renders a 3D room in the browser using WebGPU and binds it to the page:
//! scroll position drives the room's layout, the pointer tilts it, and a
//! theme toggle switches its lighting. Everything except the browser glue in
//! `web` builds and tests natively.

pub mod app;
pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod events;
pub mod input;
pub mod model;
pub mod preloader;
pub mod resources;
pub mod sizes;
pub mod surface;
pub mod theme;
pub mod time;
pub mod timeline;
pub mod transform;
pub mod world;

#[cfg(target_arch = "wasm32")]
mod draco;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(test)]
mod testing;

pub use app::{Experience, ExperienceStatus, UpdateStage, UPDATE_ORDER};
pub use config::SiteConfig;
pub use error::ExperienceError;
pub use model::RoomModel;
pub use surface::RenderSurface;

#[cfg(target_arch = "wasm32")]
pub use web::{create_app, WebExperience};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point — called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Trace).expect("Failed to init logger");
    // Narrowed to the configured level in `create_app`.
    log::set_max_level(log::LevelFilter::Info);
    log::info!("Roomfolio Web Runtime initialized");
}
