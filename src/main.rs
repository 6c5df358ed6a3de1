use anyhow::Context as _;
use sdm_meter_telemetry::config::{CONFIG_ENV, DEFAULT_CONFIG_PATH};
use sdm_meter_telemetry::{
    ChannelPublisher, Clock, Config, MeterRegistry, MonotonicClock, PollCoordinator, SdmMeter,
    SerialRegisterBus,
};
use std::env;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let config = Config::load(&config_path)
        .with_context(|| format!("loading meter configuration from {config_path}"))?;

    info!(
        "starting SDM meter telemetry on {} at {} baud with {} meter(s)",
        config.port,
        config.baud_rate,
        config.meters.len()
    );

    let mut bus = SerialRegisterBus::new(&config.port, config.baud_rate);

    let mut registry = MeterRegistry::new();
    for meter in &config.meters {
        registry.register(Box::new(SdmMeter::new(
            meter.name.clone(),
            meter.model,
            meter.address,
        )));
    }

    // Telemetry leaves the tick loop through a bounded channel; this drain
    // task is the stand-in broker link.
    let (telemetry_tx, mut telemetry_rx) = mpsc::channel::<String>(128);
    tokio::spawn(async move {
        while let Some(message) = telemetry_rx.recv().await {
            info!(target: "telemetry", "{message}");
        }
    });
    let mut sink = ChannelPublisher::new(telemetry_tx);

    let clock = MonotonicClock::new();
    let mut coordinator = PollCoordinator::new(registry, clock.clone());

    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_interval_ms));
    loop {
        ticker.tick().await;
        // Stand-in for the externally maintained session counter. Seconds
        // since start never decrease, so no session boundary fires unless a
        // session controller supplies its own counter here.
        let elapsed = clock.now_millis() / 1000;
        coordinator.tick(elapsed, &mut bus, &mut sink).await;
    }
}
