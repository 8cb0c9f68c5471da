use roomfolio_web::resources::AssetKind;
use roomfolio_web::model::DRACO_DECODER_SCRIPT;
use roomfolio_web::RoomModel;

use crate::project::SiteContext;

pub fn run(ctx: &SiteContext) -> anyhow::Result<()> {
    println!("Checking site at {}", ctx.site_root.display());
    let problems = check_site(ctx);
    if problems.is_empty() {
        println!("All {} assets look good.", ctx.config.assets.len());
        return Ok(());
    }
    for problem in &problems {
        println!("  ✗ {problem}");
    }
    anyhow::bail!("{} problem(s) found", problems.len())
}

/// Everything that would stop the site from loading.
pub fn check_site(ctx: &SiteContext) -> Vec<String> {
    let mut problems = Vec::new();

    for asset in &ctx.config.assets {
        let path = ctx.asset_path(&asset.path);
        if !path.is_file() {
            problems.push(format!(
                "{} `{}` is missing: {}",
                asset.kind.label(),
                asset.name,
                path.display()
            ));
            continue;
        }
        if asset.kind == AssetKind::Model && asset.name == ctx.config.scene.room_asset {
            if let Err(problem) = check_room(ctx, &path) {
                problems.push(problem);
            }
        }
    }

    if let Some(decoder) = &ctx.config.decoder_path {
        let script = ctx.asset_path(decoder).join(DRACO_DECODER_SCRIPT);
        if !script.is_file() {
            problems.push(format!("decoder script is missing: {}", script.display()));
        }
    }

    problems
}

fn check_room(ctx: &SiteContext, path: &std::path::Path) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let compressed =
        RoomModel::requires_draco(&bytes).map_err(|e| format!("{}: {e}", path.display()))?;
    if compressed {
        // Decoded in the browser; only the decoder has to be present.
        if ctx.config.decoder_path.is_none() {
            return Err(format!(
                "{}: model is Draco-compressed but `decoder_path` is not set",
                path.display()
            ));
        }
        log::info!("{}: Draco-compressed, node names checked in the browser", path.display());
        return Ok(());
    }
    let model = RoomModel::from_glb(&bytes).map_err(|e| format!("{}: {e}", path.display()))?;

    let scene = &ctx.config.scene;
    for required in [&scene.screen_node, &scene.cube_node] {
        if model.find_node(required).is_none() {
            return Err(format!(
                "{}: model has no node named `{required}`",
                path.display()
            ));
        }
    }
    for name in &scene.intro_nodes {
        if model.find_node(name).is_none() {
            log::warn!("Intro node `{name}` not found; it will be skipped");
        }
    }
    log::info!(
        "{}: {} nodes, {} meshes",
        path.display(),
        model.nodes.len(),
        model.meshes.len()
    );
    Ok(())
}
