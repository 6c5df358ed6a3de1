//! The per-tick entry point driving every registered meter.

use crate::clock::Clock;
use crate::measurement::MeasurementKind;
use crate::meter_registry::MeterRegistry;
use crate::register_bus::RegisterBus;
use crate::telemetry::{data_point_message, new_session_message, Publish};
use tracing::debug;

/// Runs one polling cycle per external tick: advances every registered
/// meter by one scheduling step, detects session boundaries on the external
/// elapsed counter, and publishes every field refreshed this cycle.
pub struct PollCoordinator<C: Clock> {
    registry: MeterRegistry,
    clock: C,
    // Elapsed-counter reading saved from the previous tick
    last_elapsed: u64,
}

impl<C: Clock> PollCoordinator<C> {
    pub fn new(registry: MeterRegistry, clock: C) -> Self {
        Self {
            registry,
            clock,
            last_elapsed: 0,
        }
    }

    pub fn registry(&self) -> &MeterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MeterRegistry {
        &mut self.registry
    }

    /// Runs one polling cycle.
    ///
    /// `elapsed` is the externally maintained session counter; only its
    /// ordering matters. A reading smaller than the previous tick's means
    /// the counter was reset and a new session has begun.
    pub async fn tick(&mut self, elapsed: u64, bus: &mut dyn RegisterBus, sink: &mut dyn Publish) {
        let new_session = elapsed < self.last_elapsed;
        self.last_elapsed = elapsed;

        let tick_start = self.clock.now_millis();
        for meter in self.registry.iter_mut() {
            if new_session {
                // Close out the old session before the baseline moves
                sink.publish(&new_session_message(meter.name(), meter.session_energy()));
                meter.start_session();
            }

            if meter.poll(bus, self.clock.now_millis()).await {
                debug!("meter {} updated", meter.name());
                for kind in MeasurementKind::ALL {
                    let point = meter.data(kind);
                    if point.updated_since(tick_start) {
                        sink.publish(&data_point_message(meter.name(), kind, point));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy_meter::{EnergyMeter, MeterCore};
    use crate::register_bus::BusError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;

    struct FakeClock(Arc<AtomicU64>);

    impl Clock for FakeClock {
        fn now_millis(&self) -> u64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    struct NullBus;

    #[async_trait]
    impl RegisterBus for NullBus {
        async fn read_value(&mut self, _register: u16, _device: u8) -> Result<f32, BusError> {
            Err(BusError::Transport("no bus in this test".to_owned()))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        messages: Vec<String>,
    }

    impl Publish for CollectingSink {
        fn publish(&mut self, message: &str) {
            self.messages.push(message.to_owned());
        }
    }

    /// Meter double whose poll writes a fixed value into one kind while the
    /// `active` switch is on.
    struct StubMeter {
        core: MeterCore,
        kind: MeasurementKind,
        value: f32,
        active: Arc<AtomicBool>,
    }

    impl StubMeter {
        fn boxed(name: &str, kind: MeasurementKind, value: f32) -> Box<dyn EnergyMeter> {
            Self::switched(name, kind, value, Arc::new(AtomicBool::new(true)))
        }

        fn switched(
            name: &str,
            kind: MeasurementKind,
            value: f32,
            active: Arc<AtomicBool>,
        ) -> Box<dyn EnergyMeter> {
            Box::new(Self {
                core: MeterCore::new(name),
                kind,
                value,
                active,
            })
        }
    }

    #[async_trait]
    impl EnergyMeter for StubMeter {
        fn core(&self) -> &MeterCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut MeterCore {
            &mut self.core
        }

        async fn poll(&mut self, _bus: &mut dyn RegisterBus, now_millis: u64) -> bool {
            if !self.active.load(Ordering::Relaxed) {
                return false;
            }
            let point = self.core.data_mut(self.kind);
            point.set_value(0, self.value);
            point.mark_updated(now_millis);
            true
        }
    }

    fn coordinator_with(
        meters: Vec<Box<dyn EnergyMeter>>,
        now: Arc<AtomicU64>,
    ) -> PollCoordinator<FakeClock> {
        let mut registry = MeterRegistry::new();
        for meter in meters {
            registry.register(meter);
        }
        PollCoordinator::new(registry, FakeClock(now))
    }

    #[tokio::test]
    async fn test_tick_publishes_fields_refreshed_this_cycle() {
        let now = Arc::new(AtomicU64::new(100));
        let mut coordinator = coordinator_with(
            vec![StubMeter::boxed("garage", MeasurementKind::Power, 1500.0)],
            now,
        );
        let mut sink = CollectingSink::default();

        coordinator.tick(1, &mut NullBus, &mut sink).await;

        assert_eq!(
            sink.messages,
            vec!["energymeters/garage/power:1500.00 NaN NaN NaN"]
        );
    }

    #[tokio::test]
    async fn test_tick_skips_fields_refreshed_in_earlier_cycles() {
        let now = Arc::new(AtomicU64::new(100));
        let active = Arc::new(AtomicBool::new(true));
        let mut coordinator = coordinator_with(
            vec![StubMeter::switched(
                "garage",
                MeasurementKind::Power,
                1500.0,
                Arc::clone(&active),
            )],
            Arc::clone(&now),
        );
        let mut sink = CollectingSink::default();

        coordinator.tick(1, &mut NullBus, &mut sink).await;
        assert_eq!(sink.messages.len(), 1);

        // Ticks where the meter reports no change: the power field's old
        // timestamp must not trigger a republish
        active.store(false, Ordering::Relaxed);
        now.store(5_000, Ordering::Relaxed);
        coordinator.tick(2, &mut NullBus, &mut sink).await;
        coordinator.tick(3, &mut NullBus, &mut sink).await;

        assert_eq!(sink.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_session_boundary_fires_once_per_counter_reset() {
        let now = Arc::new(AtomicU64::new(0));
        let mut coordinator = coordinator_with(
            vec![StubMeter::boxed("garage", MeasurementKind::Voltage, 230.0)],
            now,
        );

        let mut session_messages = Vec::new();
        for elapsed in [100, 105, 110, 3, 8] {
            let mut sink = CollectingSink::default();
            coordinator.tick(elapsed, &mut NullBus, &mut sink).await;
            session_messages.extend(
                sink.messages
                    .into_iter()
                    .filter(|message| message.contains("newsession")),
            );
        }

        assert_eq!(
            session_messages,
            vec!["energymeters/garage/newsession:0.00"]
        );
    }

    #[tokio::test]
    async fn test_meters_are_serviced_in_registration_order() {
        let now = Arc::new(AtomicU64::new(10));
        let mut coordinator = coordinator_with(
            vec![
                StubMeter::boxed("first", MeasurementKind::Voltage, 230.0),
                StubMeter::boxed("second", MeasurementKind::Voltage, 231.0),
            ],
            now,
        );
        let mut sink = CollectingSink::default();

        coordinator.tick(1, &mut NullBus, &mut sink).await;

        assert_eq!(sink.messages.len(), 2);
        assert!(sink.messages[0].starts_with("energymeters/first/"));
        assert!(sink.messages[1].starts_with("energymeters/second/"));
    }
}
