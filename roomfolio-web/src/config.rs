use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExperienceError;
use crate::resources::{AssetKind, AssetSource};

/// Site configuration, read from `site.toml` by the CLI and handed to
/// the runtime as a string by the page. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Id of the canvas element the scene is drawn into.
    pub canvas_id: String,
    /// Viewport width (CSS px) at which the desktop variant starts.
    pub breakpoint: u32,
    pub max_pixel_ratio: f32,
    pub log_level: String,
    /// Directory (relative to the site root) the assets are served from.
    pub public_dir: String,
    /// Runtime crate directory, relative to the site root, built by `rfcli build`.
    pub runtime_crate: String,
    /// Model decompression resources, relative to `public_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder_path: Option<String>,
    pub theme_toggle_selector: String,
    pub error_selector: String,
    pub assets: Vec<AssetSource>,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
}

/// Names tying the loaded model to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub room_asset: String,
    pub video_asset: String,
    /// Node whose surface shows the video.
    pub screen_node: String,
    /// Loader cube shown during the intro.
    pub cube_node: String,
    /// Nodes that pop in one after another at the end of the intro.
    pub intro_nodes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Height of the orthographic frustum in world units.
    pub frustum: f32,
    pub fov_degrees: f32,
    pub perspective_position: [f32; 3],
    pub orthographic_position: [f32; 3],
    pub orthographic_pitch_degrees: f32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            canvas_id: "experience-canvas".into(),
            breakpoint: 968,
            max_pixel_ratio: 2.0,
            log_level: "info".into(),
            public_dir: "public".into(),
            runtime_crate: "roomfolio-web".into(),
            decoder_path: None,
            theme_toggle_selector: "[data-theme-toggle]".into(),
            error_selector: "[data-experience-error]".into(),
            assets: vec![
                AssetSource {
                    name: "room".into(),
                    kind: AssetKind::Model,
                    path: "models/room.glb".into(),
                },
                AssetSource {
                    name: "screen".into(),
                    kind: AssetKind::VideoTexture,
                    path: "textures/screen.mp4".into(),
                },
            ],
            scene: SceneConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            room_asset: "room".into(),
            video_asset: "screen".into(),
            screen_node: "Screen".into(),
            cube_node: "Cube".into(),
            intro_nodes: [
                "Desks",
                "Shelves",
                "Computer",
                "Chair",
                "Aquarium",
                "Clock",
                "Lamp",
                "Flowers",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frustum: 5.0,
            fov_degrees: 35.0,
            perspective_position: [29.0, 14.0, 12.0],
            orthographic_position: [0.0, 5.65, 10.0],
            orthographic_pitch_degrees: -30.0,
        }
    }
}

impl SiteConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ExperienceError> {
        let config: SiteConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ExperienceError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ExperienceError> {
        if self.breakpoint == 0 {
            return Err(ExperienceError::Config("breakpoint must be positive".into()));
        }
        if !(self.max_pixel_ratio >= 1.0) {
            return Err(ExperienceError::Config(
                "max_pixel_ratio must be at least 1".into(),
            ));
        }
        if self.camera.frustum <= 0.0 {
            return Err(ExperienceError::Config("camera.frustum must be positive".into()));
        }

        let mut seen = HashSet::new();
        for asset in &self.assets {
            if !seen.insert(asset.name.as_str()) {
                return Err(ExperienceError::Config(format!(
                    "asset `{}` is declared twice",
                    asset.name
                )));
            }
        }

        self.expect_asset(&self.scene.room_asset, AssetKind::Model)?;
        self.expect_asset(&self.scene.video_asset, AssetKind::VideoTexture)?;
        Ok(())
    }

    fn expect_asset(&self, name: &str, kind: AssetKind) -> Result<(), ExperienceError> {
        match self.asset(name) {
            Some(a) if a.kind == kind => Ok(()),
            Some(a) => Err(ExperienceError::Config(format!(
                "asset `{name}` must be a {}, found {}",
                kind.label(),
                a.kind.label()
            ))),
            None => Err(ExperienceError::Config(format!(
                "scene refers to undeclared asset `{name}`"
            ))),
        }
    }

    pub fn asset(&self, name: &str) -> Option<&AssetSource> {
        self.assets.iter().find(|a| a.name == name)
    }

    /// Configured log level, `Info` when unparseable.
    pub fn log_level(&self) -> log::Level {
        log::Level::from_str(&self.log_level).unwrap_or(log::Level::Info)
    }
}
