use std::env;

use viewframe::config::{ChromeConfig, RendererConfig};
use viewframe::frame::{Preset, Viewframes};
use viewframe::render::{ChromeEmbedder, EmbeddedContext, Renderer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let link = env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    let mut frames = Viewframes::new();
    frames.add_preset(Preset::MobileTabletDesktop, &link)?;

    let embedder = ChromeEmbedder::launch(&ChromeConfig::default()).await?;
    let renderer = Renderer::new(embedder, RendererConfig::default());

    let rendered = renderer.render_all(&frames).await;
    for frame in &rendered {
        println!("{} {}", frame.frame().name, frame.label());
        match frame.context() {
            Ok(context) => {
                let reported = context.reported_viewport().await?;
                println!(
                    "  reports {}x{} (screen {}x{})",
                    reported.inner_width,
                    reported.inner_height,
                    reported.screen_width,
                    reported.screen_height
                );
                println!("  {}", frame.iframe_html());
            }
            Err(err) => println!("  {err}"),
        }
    }

    for frame in rendered {
        frame.close().await?;
    }
    renderer.into_embedder().close().await?;
    Ok(())
}
