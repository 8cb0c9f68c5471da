/// Embedded WGSL shader source for the room pipeline.
/// Entry points: `vs_main`, `fs_main`.
pub const ROOM_SHADER: &str = include_str!("../shaders/room.wgsl");
