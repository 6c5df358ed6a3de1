//! SDM Energy Meter Telemetry Library
//!
//! This library polls Eastron SDM energy meters over a shared Modbus RTU bus,
//! keeps the latest per-phase value of every measurement kind in memory, and
//! publishes one telemetry message per field refreshed during a poll cycle.

pub mod clock;
pub mod config;
pub mod data_point;
pub mod energy_meter;
pub mod measurement;
pub mod meter_registry;
pub mod poll_coordinator;
pub mod register_bus;
pub mod sdm_meter;
pub mod sdm_registers;
pub mod telemetry;

// Re-export commonly used types for easier access
pub use clock::{Clock, MonotonicClock};
pub use config::{Config, MeterConfig};
pub use data_point::DataPoint;
pub use energy_meter::{EnergyMeter, MeterCore};
pub use measurement::MeasurementKind;
pub use meter_registry::{MeterRegistry, MAX_METERS};
pub use poll_coordinator::PollCoordinator;
pub use register_bus::{BusError, RegisterBus, SerialRegisterBus};
pub use sdm_meter::{SdmMeter, REFRESH_INTERVAL_MS};
pub use sdm_registers::SdmModel;
pub use telemetry::{ChannelPublisher, Publish};
