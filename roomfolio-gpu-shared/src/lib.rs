//! GPU-facing data shared by the Roomfolio runtime and its WebGPU backend.
//!
//! Nothing in here talks to a device: these are the plain payloads the scene
//! produces each frame and the backend consumes.

pub mod frame;
pub mod math;
pub mod shaders;
pub mod uniforms;
