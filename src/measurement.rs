use std::fmt;

/// One category of electrical quantity tracked per meter.
///
/// The ordinal doubles as the index into a meter's data-point table, and the
/// declaration order is the round-robin service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    Voltage,
    Current,
    Power,
    ApparentPower,
    ReactivePower,
    PowerFactor,
    Energy,
}

impl MeasurementKind {
    /// Every kind, in round-robin service order.
    pub const ALL: [MeasurementKind; 7] = [
        MeasurementKind::Voltage,
        MeasurementKind::Current,
        MeasurementKind::Power,
        MeasurementKind::ApparentPower,
        MeasurementKind::ReactivePower,
        MeasurementKind::PowerFactor,
        MeasurementKind::Energy,
    ];

    /// Size of a meter's data-point table.
    pub const COUNT: usize = Self::ALL.len();

    /// Index of this kind in a data-point table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Topic segment used when publishing this kind.
    pub fn name(self) -> &'static str {
        match self {
            MeasurementKind::Voltage => "voltage",
            MeasurementKind::Current => "current",
            MeasurementKind::Power => "power",
            MeasurementKind::ApparentPower => "apparent_power",
            MeasurementKind::ReactivePower => "reactive_power",
            MeasurementKind::PowerFactor => "power_factor",
            MeasurementKind::Energy => "energy",
        }
    }

    /// Cyclic successor, wrapping to the first kind after the last.
    pub fn next(self) -> MeasurementKind {
        Self::ALL[(self as usize + 1) % Self::COUNT]
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
