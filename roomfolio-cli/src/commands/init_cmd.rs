use std::path::Path;

use roomfolio_web::SiteConfig;

use crate::project::SITE_FILE;

pub fn run(name: &str) -> anyhow::Result<()> {
    let root = Path::new(name);
    scaffold(root)?;
    println!("Created site `{name}`.");
    println!("Next steps:");
    println!("  1. Put your model at {name}/public/models/room.glb");
    println!("  2. Put the screen video at {name}/public/textures/screen.mp4");
    println!("  3. cd {name} && rfcli check && rfcli build");
    Ok(())
}

/// Lay out a fresh site with the default configuration.
pub fn scaffold(root: &Path) -> anyhow::Result<()> {
    if root.exists() {
        anyhow::bail!("{} already exists", root.display());
    }

    let config = SiteConfig::default();
    let public = root.join(&config.public_dir);
    std::fs::create_dir_all(public.join("models"))?;
    std::fs::create_dir_all(public.join("textures"))?;

    std::fs::write(root.join(SITE_FILE), config.to_toml_string()?)?;
    std::fs::write(root.join("index.html"), index_html(&config))?;
    log::debug!("Scaffolded {}", root.display());
    Ok(())
}

fn index_html(config: &SiteConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Portfolio</title>
  <style>
    #{canvas} {{ position: fixed; inset: 0; width: 100vw; height: 100vh; }}
    [data-scroll-section] {{ position: relative; min-height: 100vh; }}
    body:not([data-experience-state="error"]) [data-experience-error] {{ display: none; }}
  </style>
</head>
<body>
  <canvas id="{canvas}"></canvas>
  <button data-theme-toggle type="button">Toggle theme</button>
  <p data-experience-error></p>
  <main>
    <section data-scroll-section="first-move"></section>
    <section data-scroll-section="second-move"></section>
    <section data-scroll-section="third-move"></section>
  </main>
  <script type="module">
    import init, {{ create_app }} from "./pkg/roomfolio_web.js";
    await init();
    const config = await fetch("./{site_file}").then((r) => r.text());
    window.experience = await create_app(config);
  </script>
</body>
</html>
"#,
        canvas = config.canvas_id,
        site_file = SITE_FILE,
    )
}
