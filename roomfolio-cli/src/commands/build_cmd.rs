use std::path::Path;

use crate::project::SiteContext;
use crate::tools::{self, ToolStatus};

const WASM_PACK: &str = "wasm-pack";

pub async fn run(release: bool, ctx: &SiteContext) -> anyhow::Result<()> {
    let wasm_pack = match tools::detect(WASM_PACK).await {
        ToolStatus::Found { version, path } => {
            log::debug!("Using {version} at {}", path.display());
            path
        }
        ToolStatus::NotFound => anyhow::bail!(
            "{WASM_PACK} was not found on PATH.\n\
             Install it with: cargo install wasm-pack"
        ),
    };

    let cwd = ctx.runtime_crate_dir();
    if !cwd.join("Cargo.toml").exists() {
        anyhow::bail!(
            "No runtime crate at {} (set `runtime_crate` in site.toml)",
            cwd.display()
        );
    }

    let out_dir = ctx.pkg_dir();
    let args = build_args(release, &out_dir);
    println!(
        "Building {} bundle from {} into {}...",
        if release { "release" } else { "dev" },
        cwd.display(),
        out_dir.display()
    );

    let status = tokio::process::Command::new(wasm_pack)
        .args(&args)
        .current_dir(&cwd)
        .stdin(std::process::Stdio::inherit())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .status()
        .await?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    println!("Bundle written to {}", out_dir.display());
    Ok(())
}

fn build_args(release: bool, out_dir: &Path) -> Vec<String> {
    vec![
        "build".into(),
        "--target".into(),
        "web".into(),
        if release { "--release" } else { "--dev" }.into(),
        "--out-dir".into(),
        out_dir.display().to_string(),
    ]
}
