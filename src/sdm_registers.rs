//! Input-register layout of the Eastron SDM meter family.
//!
//! Every measured quantity is an IEEE-754 float spanning two input registers;
//! the addresses below are the base register of each value.

use crate::measurement::MeasurementKind;
use serde::Deserialize;

/// Marks a register-map slot the device does not provide.
pub const EMPTY_REGISTER: u16 = 0xffff;

// Single-phase models (SDM120/220/230) share one layout.
const VOLTAGE: u16 = 0x0000;
const CURRENT: u16 = 0x0006;
const ACTIVE_POWER: u16 = 0x000c;
const APPARENT_POWER: u16 = 0x0012;
const REACTIVE_POWER: u16 = 0x0018;
const POWER_FACTOR: u16 = 0x001e;
const IMPORT_ACTIVE_ENERGY: u16 = 0x0048;
const EXPORT_ACTIVE_ENERGY: u16 = 0x004a;
const IMPORT_REACTIVE_ENERGY: u16 = 0x004c;
const EXPORT_REACTIVE_ENERGY: u16 = 0x004e;

// SDM630 phase 1 base registers; phases 2 and 3 follow at +2 and +4.
const SDM630_VOLTAGE_P1: u16 = 0x0000;
const SDM630_CURRENT_P1: u16 = 0x0006;
const SDM630_POWER_P1: u16 = 0x000c;
const SDM630_APPARENT_POWER_P1: u16 = 0x0012;
const SDM630_REACTIVE_POWER_P1: u16 = 0x0018;
const SDM630_POWER_FACTOR_P1: u16 = 0x001e;
// SDM630 system totals.
const SDM630_VOLTAGE_AVERAGE: u16 = 0x002a;
const SDM630_CURRENT_SUM: u16 = 0x0030;
const SDM630_POWER_TOTAL: u16 = 0x0034;
const SDM630_APPARENT_POWER_TOTAL: u16 = 0x0038;
const SDM630_REACTIVE_POWER_TOTAL: u16 = 0x003c;
const SDM630_POWER_FACTOR_TOTAL: u16 = 0x003e;

/// The supported Eastron SDM models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdmModel {
    Sdm120,
    Sdm220,
    Sdm230,
    Sdm630,
}

/// Register addresses feeding the four data-point slots for one kind,
/// aligned `{total, phase A, phase B, phase C}`.
///
/// Single-phase models map the total slot only, so their phase slots stay
/// empty and no register is ever read twice for one field. The `Energy` row
/// repurposes the slots as `{import active, export active, import reactive,
/// export reactive}`.
pub fn registers_for(model: SdmModel, kind: MeasurementKind) -> [u16; 4] {
    use MeasurementKind::*;
    const E: u16 = EMPTY_REGISTER;

    match model {
        SdmModel::Sdm120 => match kind {
            Voltage => [VOLTAGE, E, E, E],
            Current => [CURRENT, E, E, E],
            Power => [ACTIVE_POWER, E, E, E],
            ApparentPower => [APPARENT_POWER, E, E, E],
            ReactivePower => [REACTIVE_POWER, E, E, E],
            PowerFactor => [POWER_FACTOR, E, E, E],
            // The SDM120 only counts active energy
            Energy => [IMPORT_ACTIVE_ENERGY, EXPORT_ACTIVE_ENERGY, E, E],
        },
        SdmModel::Sdm220 | SdmModel::Sdm230 => match kind {
            Voltage => [VOLTAGE, E, E, E],
            Current => [CURRENT, E, E, E],
            Power => [ACTIVE_POWER, E, E, E],
            ApparentPower => [APPARENT_POWER, E, E, E],
            ReactivePower => [REACTIVE_POWER, E, E, E],
            PowerFactor => [POWER_FACTOR, E, E, E],
            Energy => [
                IMPORT_ACTIVE_ENERGY,
                EXPORT_ACTIVE_ENERGY,
                IMPORT_REACTIVE_ENERGY,
                EXPORT_REACTIVE_ENERGY,
            ],
        },
        SdmModel::Sdm630 => match kind {
            Voltage => [
                SDM630_VOLTAGE_AVERAGE,
                SDM630_VOLTAGE_P1,
                SDM630_VOLTAGE_P1 + 2,
                SDM630_VOLTAGE_P1 + 4,
            ],
            Current => [
                SDM630_CURRENT_SUM,
                SDM630_CURRENT_P1,
                SDM630_CURRENT_P1 + 2,
                SDM630_CURRENT_P1 + 4,
            ],
            Power => [
                SDM630_POWER_TOTAL,
                SDM630_POWER_P1,
                SDM630_POWER_P1 + 2,
                SDM630_POWER_P1 + 4,
            ],
            ApparentPower => [
                SDM630_APPARENT_POWER_TOTAL,
                SDM630_APPARENT_POWER_P1,
                SDM630_APPARENT_POWER_P1 + 2,
                SDM630_APPARENT_POWER_P1 + 4,
            ],
            ReactivePower => [
                SDM630_REACTIVE_POWER_TOTAL,
                SDM630_REACTIVE_POWER_P1,
                SDM630_REACTIVE_POWER_P1 + 2,
                SDM630_REACTIVE_POWER_P1 + 4,
            ],
            PowerFactor => [
                SDM630_POWER_FACTOR_TOTAL,
                SDM630_POWER_FACTOR_P1,
                SDM630_POWER_FACTOR_P1 + 2,
                SDM630_POWER_FACTOR_P1 + 4,
            ],
            Energy => [
                IMPORT_ACTIVE_ENERGY,
                EXPORT_ACTIVE_ENERGY,
                IMPORT_REACTIVE_ENERGY,
                EXPORT_REACTIVE_ENERGY,
            ],
        },
    }
}
