//! Network kinds: the energy grid and its simplified fluid sibling share the
//! same coverage/aggregation skeleton and differ only in their facility types
//! and distribution strategy.

use std::fmt::Debug;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::distribution::{DistributionStrategy, PriorityRationing, ReservoirBuffered};

/// Runtime tag carried by events and records so collaborators can tell the
/// networks apart without knowing the marker type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum NetworkLabel {
    Energy,
    Fluid,
}

impl NetworkLabel {
    pub fn name(self) -> &'static str {
        match self {
            NetworkLabel::Energy => "energy",
            NetworkLabel::Fluid => "fluid",
        }
    }
}

/// Facility type of a producer.
pub trait SourceType: Copy + Debug + PartialEq + Eq + Send + Sync + 'static {
    fn name(self) -> &'static str;
    /// Whether an online producer of this type feeds the pollution subsystem.
    fn contaminates(self) -> bool;
    /// Stable byte used by the persisted record layout.
    fn code(self) -> u8;
    fn from_code(code: u8) -> Option<Self>;
}

/// Compile-time marker selecting one utility network.
pub trait NetworkKind: Copy + Debug + Default + PartialEq + Eq + Send + Sync + 'static {
    type Source: SourceType;
    type Strategy: DistributionStrategy;
    const LABEL: NetworkLabel;
}

// ---------------------------------------------------------------------------
// Energy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Energy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum PowerSource {
    Coal,
    Gas,
    Oil,
    Nuclear,
    Solar,
    Wind,
    Hydro,
    Geothermal,
}

impl SourceType for PowerSource {
    fn name(self) -> &'static str {
        match self {
            PowerSource::Coal => "Coal Power Plant",
            PowerSource::Gas => "Gas Power Plant",
            PowerSource::Oil => "Oil Power Plant",
            PowerSource::Nuclear => "Nuclear Plant",
            PowerSource::Solar => "Solar Farm",
            PowerSource::Wind => "Wind Turbine",
            PowerSource::Hydro => "Hydroelectric Dam",
            PowerSource::Geothermal => "Geothermal Plant",
        }
    }

    fn contaminates(self) -> bool {
        matches!(self, PowerSource::Coal | PowerSource::Gas | PowerSource::Oil)
    }

    fn code(self) -> u8 {
        match self {
            PowerSource::Coal => 0,
            PowerSource::Gas => 1,
            PowerSource::Oil => 2,
            PowerSource::Nuclear => 3,
            PowerSource::Solar => 4,
            PowerSource::Wind => 5,
            PowerSource::Hydro => 6,
            PowerSource::Geothermal => 7,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => PowerSource::Coal,
            1 => PowerSource::Gas,
            2 => PowerSource::Oil,
            3 => PowerSource::Nuclear,
            4 => PowerSource::Solar,
            5 => PowerSource::Wind,
            6 => PowerSource::Hydro,
            7 => PowerSource::Geothermal,
            _ => return None,
        })
    }
}

impl NetworkKind for Energy {
    type Source = PowerSource;
    type Strategy = PriorityRationing;
    const LABEL: NetworkLabel = NetworkLabel::Energy;
}

// ---------------------------------------------------------------------------
// Fluid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fluid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum FluidSource {
    WaterTower,
    PumpingStation,
    TreatmentPlant,
    Well,
}

impl SourceType for FluidSource {
    fn name(self) -> &'static str {
        match self {
            FluidSource::WaterTower => "Water Tower",
            FluidSource::PumpingStation => "Pumping Station",
            FluidSource::TreatmentPlant => "Water Treatment",
            FluidSource::Well => "Well",
        }
    }

    fn contaminates(self) -> bool {
        false
    }

    fn code(self) -> u8 {
        match self {
            FluidSource::WaterTower => 0,
            FluidSource::PumpingStation => 1,
            FluidSource::TreatmentPlant => 2,
            FluidSource::Well => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => FluidSource::WaterTower,
            1 => FluidSource::PumpingStation,
            2 => FluidSource::TreatmentPlant,
            3 => FluidSource::Well,
            _ => return None,
        })
    }
}

impl NetworkKind for Fluid {
    type Source = FluidSource;
    type Strategy = ReservoirBuffered;
    const LABEL: NetworkLabel = NetworkLabel::Fluid;
}
