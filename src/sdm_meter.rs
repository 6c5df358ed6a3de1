//! Round-robin polling driver for Eastron SDM meters.

use crate::energy_meter::{EnergyMeter, MeterCore};
use crate::measurement::MeasurementKind;
use crate::register_bus::RegisterBus;
use crate::sdm_registers::{registers_for, SdmModel, EMPTY_REGISTER};
use async_trait::async_trait;
use tracing::debug;

/// Minimum delay between refreshes of the same field.
pub const REFRESH_INTERVAL_MS: u64 = 30_000;

/// One SDM meter on the shared bus.
///
/// Each `poll` services exactly one measurement kind, bounding the bus
/// traffic per tick no matter how many meters are registered.
pub struct SdmMeter {
    core: MeterCore,
    model: SdmModel,
    bus_address: u8,
    // Field to be serviced by the next poll
    next_kind: MeasurementKind,
}

impl SdmMeter {
    pub fn new(name: impl Into<String>, model: SdmModel, bus_address: u8) -> Self {
        Self {
            core: MeterCore::new(name),
            model,
            bus_address,
            next_kind: MeasurementKind::ALL[0],
        }
    }

    pub fn model(&self) -> SdmModel {
        self.model
    }

    pub fn bus_address(&self) -> u8 {
        self.bus_address
    }

    /// Refreshes one field from the bus, honoring the per-field refresh
    /// interval. Returns whether any slot was written.
    async fn poll_field(
        &mut self,
        field: MeasurementKind,
        bus: &mut dyn RegisterBus,
        now_millis: u64,
    ) -> bool {
        if let Some(last) = self.core.data(field).last_updated() {
            if now_millis.saturating_sub(last) < REFRESH_INTERVAL_MS {
                // Still fresh; the cursor moves on regardless
                return false;
            }
        }

        debug!(
            "meter {}@{}: refreshing {field}",
            self.core.name(),
            self.bus_address
        );
        let mut updated = false;
        for (slot, &register) in registers_for(self.model, field).iter().enumerate() {
            if register == EMPTY_REGISTER {
                continue;
            }
            match bus.read_value(register, self.bus_address).await {
                Ok(value) => {
                    self.core.data_mut(field).set_value(slot, value);
                    updated = true;
                }
                Err(err) => {
                    // Slot keeps its previous value; the next eligible
                    // rotation retries
                    debug!(
                        "meter {}@{}: read of register {register:#06x} failed: {err}",
                        self.core.name(),
                        self.bus_address
                    );
                }
            }
        }
        if updated {
            self.core.data_mut(field).mark_updated(now_millis);
        }
        updated
    }
}

#[async_trait]
impl EnergyMeter for SdmMeter {
    fn core(&self) -> &MeterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut MeterCore {
        &mut self.core
    }

    async fn poll(&mut self, bus: &mut dyn RegisterBus, now_millis: u64) -> bool {
        let field = self.next_kind;
        // Next poll services the next field, wrapping after the last
        self.next_kind = field.next();
        self.poll_field(field, bus, now_millis).await
    }
}
