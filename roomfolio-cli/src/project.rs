use std::path::{Path, PathBuf};

use roomfolio_web::SiteConfig;

/// File marking the root of a site.
pub const SITE_FILE: &str = "site.toml";

/// The resolved site context.
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// Directory holding site.toml
    pub site_root: PathBuf,
    pub config: SiteConfig,
}

impl SiteContext {
    /// Directory the assets are served from.
    pub fn public_dir(&self) -> PathBuf {
        self.site_root.join(&self.config.public_dir)
    }

    pub fn asset_path(&self, relative: &str) -> PathBuf {
        self.public_dir().join(relative)
    }

    /// Runtime crate that `rfcli build` compiles.
    pub fn runtime_crate_dir(&self) -> PathBuf {
        self.site_root.join(&self.config.runtime_crate)
    }

    /// Where wasm-pack puts the bundle.
    pub fn pkg_dir(&self) -> PathBuf {
        self.site_root.join("pkg")
    }
}

/// Detect the site from the current directory, walking up.
pub fn detect_site() -> anyhow::Result<SiteContext> {
    detect_site_from(&std::env::current_dir()?)
}

/// Detect the site starting from a specific directory, walking up.
pub fn detect_site_from(start: &Path) -> anyhow::Result<SiteContext> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(SITE_FILE);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = SiteConfig::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("{}: {e}", config_path.display()))?;
            log::debug!("Site root: {}", dir.display());
            return Ok(SiteContext {
                site_root: dir,
                config,
            });
        }
        if !dir.pop() {
            anyhow::bail!(
                "Could not find a Roomfolio site.\n\
                 Run `rfcli` from within a directory containing {SITE_FILE}.\n\
                 To create a new site: rfcli init <site-name>"
            );
        }
    }
}
