//! Example: Subscribe to alarm events and print them as they arrive.

use dahua_cam::{CamConfig, CamEvent, DahuaCam};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => CamConfig::from_file(path)?,
        None => CamConfig::builder()
            .hostname("192.168.1.108")
            .username("admin")
            .password("admin123")
            .build(),
    };

    let cam = DahuaCam::new(config)?;
    let mut events = cam.subscribe();
    cam.listen_for_events(None)?;

    println!("Listening for camera events (Ctrl+C to stop)...\n");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(CamEvent::Alarm(alarm)) => {
                        let marker = if alarm.is_start() { "+" } else if alarm.is_stop() { "-" } else { "*" };
                        println!("  {} {} (index {})", marker, alarm.code, alarm.index);
                    }
                    Ok(CamEvent::Connected) => println!("Connected"),
                    Ok(CamEvent::Disconnected) => println!("Disconnected, will retry"),
                    Ok(CamEvent::Error(e)) => println!("Stream error: {}", e),
                    Err(RecvError::Lagged(n)) => println!("Missed {} events", n),
                    Err(e) => {
                        println!("Event channel error: {}", e);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping...");
                break;
            }
        }
    }

    cam.stop_listening().await;
    Ok(())
}
