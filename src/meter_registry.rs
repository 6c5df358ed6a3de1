//! Fixed-capacity registry owning every registered meter.

use crate::energy_meter::EnergyMeter;
use tracing::{debug, warn};

/// Hard ceiling on simultaneously registered meters.
pub const MAX_METERS: usize = 10;

/// Slot array owning the meters. Slots fill left to right in registration
/// order and are never vacated; external callers address meters by their
/// stable slot index.
pub struct MeterRegistry {
    slots: [Option<Box<dyn EnergyMeter>>; MAX_METERS],
}

impl MeterRegistry {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Registers a meter in the first free slot. Re-registering a name is a
    /// no-op; with every slot taken the meter is dropped.
    pub fn register(&mut self, meter: Box<dyn EnergyMeter>) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            match slot {
                Some(existing) if existing.name() == meter.name() => {
                    debug!("meter {} already registered at slot {index}", meter.name());
                    return;
                }
                Some(_) => continue,
                None => {
                    debug!("registering meter {} at slot {index}", meter.name());
                    *slot = Some(meter);
                    return;
                }
            }
        }
        warn!(
            "unable to register meter {}, no slots available",
            meter.name()
        );
    }

    /// Bounds-checked slot lookup.
    pub fn get(&self, index: usize) -> Option<&dyn EnergyMeter> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Occupied slots in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn EnergyMeter>> {
        self.slots.iter_mut().flatten()
    }
}

impl Default for MeterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
