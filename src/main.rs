use liepajas_afisa::liepajniekiem::api::LiepajniekiemAPI;
use liepajas_afisa::config::env_loader::load_config;
use liepajas_afisa::tracing::setup_tracing;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let loki = setup_tracing().await;
    let config = load_config();

    info!("Loading events for {} from {}", config.events_date, config.site_url);

    let exit_code = match LiepajniekiemAPI::default()
        .get_events(&config.site_url, config.events_date)
        .await
    {
        Ok(events) if config.output_json => match print_json(&events) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("Failed serializing events: {}", err);
                ExitCode::FAILURE
            }
        },
        Ok(events) => {
            if events.is_empty() {
                info!("No events on {}", config.events_date);
            }

            events.iter().for_each(|(category, events)| {
                info!("{} ({})", category, events.len());
                events.iter().for_each(|event| info!("  {}", event));
            });
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code: &'static str = err.code().into();

            error!(
                "Failed loading events [{}]: {}",
                code,
                err.detail().unwrap_or_else(|| err.to_string())
            );
            ExitCode::FAILURE
        }
    };

    if let Some((controller, handle)) = loki {
        controller.shutdown().await;
        if let Err(err) = handle.await {
            error!("Loki background task failed: {}", err);
        }
    }

    exit_code
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(value)?;

    println!("{}", json);

    Ok(())
}
