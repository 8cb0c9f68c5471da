use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ExperienceError;
use crate::events::ExperienceEvent;
use crate::model::RoomModel;

/// Declared type of a manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Model,
    VideoTexture,
}

impl AssetKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::VideoTexture => "video-texture",
        }
    }
}

/// One manifest entry; `path` is relative to the public directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSource {
    pub name: String,
    pub kind: AssetKind,
    pub path: String,
}

/// Intrinsic size of a loaded video. The frames stay with the `<video>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
}

/// A loaded resource.
#[derive(Debug)]
pub enum Asset {
    Model(RoomModel),
    Video(VideoInfo),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Model(_) => AssetKind::Model,
            Self::Video(_) => AssetKind::VideoTexture,
        }
    }
}

/// Logical name to loaded resource. Filled while loading, read-only afterwards.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, Asset>,
}

impl AssetRegistry {
    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    pub fn model(&self, name: &str) -> Option<&RoomModel> {
        match self.assets.get(name) {
            Some(Asset::Model(m)) => Some(m),
            _ => None,
        }
    }

    pub fn video(&self, name: &str) -> Option<VideoInfo> {
        match self.assets.get(name) {
            Some(Asset::Video(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { loaded: usize, total: usize },
    Ready,
    Failed(ExperienceError),
}

/// Asset loader bookkeeping. The actual fetching happens in the browser glue,
/// which reports each completion here.
pub struct Resources {
    manifest: Vec<AssetSource>,
    registry: AssetRegistry,
    state: LoadState,
}

impl Resources {
    pub fn new(manifest: Vec<AssetSource>) -> Self {
        Self {
            manifest,
            registry: AssetRegistry::default(),
            state: LoadState::Idle,
        }
    }

    pub fn manifest(&self) -> &[AssetSource] {
        &self.manifest
    }

    /// Begin loading. An empty manifest is ready immediately.
    pub fn start(&mut self) -> Option<ExperienceEvent> {
        if self.state != LoadState::Idle {
            return None;
        }
        if self.manifest.is_empty() {
            self.state = LoadState::Ready;
            log::info!("No assets declared");
            return Some(ExperienceEvent::AssetsReady);
        }
        log::info!("Loading {} assets", self.manifest.len());
        self.state = LoadState::Loading {
            loaded: 0,
            total: self.manifest.len(),
        };
        None
    }

    /// Record a finished asset. Yields `AssetsReady` when it was the last one.
    pub fn asset_loaded(&mut self, name: &str, asset: Asset) -> Option<ExperienceEvent> {
        let (loaded, total) = match self.state {
            LoadState::Loading { loaded, total } => (loaded, total),
            _ => {
                log::warn!("Asset `{name}` arrived outside of loading, ignored");
                return None;
            }
        };
        let Some(source) = self.manifest.iter().find(|s| s.name == name) else {
            log::warn!("Asset `{name}` is not in the manifest, ignored");
            return None;
        };
        if source.kind != asset.kind() {
            return self.fail(ExperienceError::asset(
                name,
                format!("expected a {}, got a {}", source.kind.label(), asset.kind().label()),
            ));
        }
        if self.registry.assets.contains_key(name) {
            log::warn!("Asset `{name}` loaded twice, ignored");
            return None;
        }

        self.registry.assets.insert(name.to_string(), asset);
        let loaded = loaded + 1;
        log::debug!("Loaded asset `{name}` ({loaded}/{total})");
        if loaded == total {
            self.state = LoadState::Ready;
            log::info!("All {total} assets ready");
            Some(ExperienceEvent::AssetsReady)
        } else {
            self.state = LoadState::Loading { loaded, total };
            None
        }
    }

    /// Record a failed asset. Yields `AssetsFailed` once; readiness is never reached after.
    pub fn asset_failed(&mut self, name: &str, reason: &str) -> Option<ExperienceEvent> {
        match self.state {
            LoadState::Loading { .. } => {}
            _ => {
                log::warn!("Failure of `{name}` reported outside of loading: {reason}");
                return None;
            }
        }
        if !self.manifest.iter().any(|s| s.name == name) {
            log::warn!("Failure of unknown asset `{name}` ignored: {reason}");
            return None;
        }
        self.fail(ExperienceError::asset(name, reason))
    }

    fn fail(&mut self, error: ExperienceError) -> Option<ExperienceEvent> {
        log::error!("{error}");
        self.state = LoadState::Failed(error.clone());
        Some(ExperienceEvent::AssetsFailed(error))
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Fraction of the manifest loaded so far.
    pub fn progress(&self) -> f32 {
        match self.state {
            LoadState::Idle | LoadState::Failed(_) => 0.0,
            LoadState::Loading { loaded, total } => loaded as f32 / total as f32,
            LoadState::Ready => 1.0,
        }
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }
}
