//! Example: Query a camera's name and save a still image.

use dahua_cam::{CamConfig, DahuaCam};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = CamConfig::builder()
        .hostname("192.168.1.108")
        .port(80)
        .username("admin")
        .password("admin123")
        .build();

    let cam = DahuaCam::new(config)?;

    println!("Querying camera...");
    let name = cam.name().await?;
    println!("  Name: {}", name);

    let image = cam.snapshot(0).await?;
    if image.is_empty() {
        println!("  Camera returned an empty snapshot");
        return Ok(());
    }

    let file = format!("{}.jpg", name.replace(char::is_whitespace, "_"));
    std::fs::write(&file, &image)?;
    println!("  Saved {} bytes to {}", image.len(), file);

    Ok(())
}
