use crate::data_point::DataPoint;
use crate::measurement::MeasurementKind;
use crate::register_bus::RegisterBus;
use async_trait::async_trait;

/// State shared by every meter family: identity, the data-point table and
/// the session-energy baseline.
#[derive(Debug)]
pub struct MeterCore {
    name: String,
    points: [DataPoint; MeasurementKind::COUNT],
    // Import energy total captured at session start, NaN until then.
    session_start_energy: f32,
}

impl MeterCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: std::array::from_fn(|_| DataPoint::new()),
            session_start_energy: f32::NAN,
        }
    }

    /// Stable identity, also the telemetry topic segment for this meter.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self, kind: MeasurementKind) -> &DataPoint {
        &self.points[kind.index()]
    }

    pub fn data_mut(&mut self, kind: MeasurementKind) -> &mut DataPoint {
        &mut self.points[kind.index()]
    }

    /// Captures the session baseline from the current import energy total.
    pub fn start_session(&mut self) {
        self.session_start_energy = self.data(MeasurementKind::Energy).total();
    }

    /// Energy accumulated since the last `start_session`. Reports 0.0 before
    /// the first baseline capture; never a NaN.
    pub fn session_energy(&self) -> f32 {
        if self.session_start_energy.is_nan() {
            // We don't know the count at session start
            return 0.0;
        }
        self.data(MeasurementKind::Energy).total() - self.session_start_energy
    }
}

/// A meter on the field bus. Each device family supplies its own polling
/// step; everything else is shared through [`MeterCore`].
#[async_trait]
pub trait EnergyMeter: Send {
    fn core(&self) -> &MeterCore;

    fn core_mut(&mut self) -> &mut MeterCore;

    /// Advances the measurement state by one scheduling step and reports
    /// whether any value was written.
    async fn poll(&mut self, bus: &mut dyn RegisterBus, now_millis: u64) -> bool;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn data(&self, kind: MeasurementKind) -> &DataPoint {
        self.core().data(kind)
    }

    fn start_session(&mut self) {
        self.core_mut().start_session();
    }

    fn session_energy(&self) -> f32 {
        self.core().session_energy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_core_has_empty_data_points() {
        let core = MeterCore::new("garage");
        assert_eq!(core.name(), "garage");
        for kind in MeasurementKind::ALL {
            assert_eq!(core.data(kind).last_updated(), None);
            assert!(core.data(kind).total().is_nan());
        }
    }

    #[test]
    fn test_session_energy_is_zero_without_baseline() {
        let mut core = MeterCore::new("garage");
        assert_eq!(core.session_energy(), 0.0);

        // A baseline captured while the energy total is still unread keeps
        // the session at zero instead of leaking NaN
        core.start_session();
        assert_eq!(core.session_energy(), 0.0);
    }

    #[test]
    fn test_session_energy_tracks_import_total() {
        let mut core = MeterCore::new("garage");
        core.data_mut(MeasurementKind::Energy).set_value(0, 1200.0);
        core.start_session();
        assert_eq!(core.session_energy(), 0.0);

        core.data_mut(MeasurementKind::Energy).set_value(0, 1207.5);
        assert!((core.session_energy() - 7.5).abs() < 1e-3);
    }

    #[test]
    fn test_start_session_resets_the_baseline() {
        let mut core = MeterCore::new("garage");
        core.data_mut(MeasurementKind::Energy).set_value(0, 100.0);
        core.start_session();
        core.data_mut(MeasurementKind::Energy).set_value(0, 150.0);
        assert_eq!(core.session_energy(), 50.0);

        core.start_session();
        assert_eq!(core.session_energy(), 0.0);
    }
}
