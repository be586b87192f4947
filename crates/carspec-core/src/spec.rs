//! The canonical vehicle specification record.
//!
//! Slots are declared once in the `slot_groups!` table below, which generates the
//! per-group structs, the flat [`Slot`] identifier enum and the accessors that
//! connect the two. Every slot is an `Option<String>`: absent means "not found
//! on the page", which is distinct from an empty string.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label → value map exactly as scraped (after whitespace cleanup).
pub type RawSpecifications = BTreeMap<String, String>;

macro_rules! slot_groups {
    ($(
        $(#[$gmeta:meta])*
        $group:ident: $Group:ident {
            $( $(#[$smeta:meta])* $slot:ident => $Variant:ident, )*
        }
    )*) => {
        $(
            $(#[$gmeta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
            pub struct $Group {
                $(
                    $(#[$smeta])*
                    #[serde(default, skip_serializing_if = "Option::is_none")]
                    pub $slot: Option<String>,
                )*
            }
        )*

        /// Every typed slot of a [`CanonicalSpec`], grouped as in the persisted form.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct SpecSlots {
            $(
                #[serde(flatten)]
                pub $group: $Group,
            )*
        }

        /// Identifier of one canonical slot.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Slot {
            $($( $Variant, )*)*
        }

        impl Slot {
            /// All slots in declaration order.
            pub const ALL: &'static [Slot] = &[$($( Slot::$Variant, )*)*];

            /// Field name in the persisted form.
            pub fn name(&self) -> &'static str {
                match self {
                    $($( Slot::$Variant => stringify!($slot), )*)*
                }
            }
        }

        impl SpecSlots {
            pub fn get(&self, slot: Slot) -> Option<&str> {
                match slot {
                    $($( Slot::$Variant => self.$group.$slot.as_deref(), )*)*
                }
            }

            pub fn get_mut(&mut self, slot: Slot) -> &mut Option<String> {
                match slot {
                    $($( Slot::$Variant => &mut self.$group.$slot, )*)*
                }
            }
        }
    };
}

slot_groups! {
    /// Engine identity, displacement, power and torque.
    engine: EngineSpec {
        engine_type => EngineType,
        engine_code => EngineCode,
        cylinders => Cylinders,
        configuration => Configuration,
        aspiration => Aspiration,
        fuel_system => FuelSystem,
        displacement => Displacement,
        /// Liter figure pulled out of `displacement`, without unit.
        displacement_liters => DisplacementLiters,
        power_kw => PowerKw,
        power_hp => PowerHp,
        power_ps => PowerPs,
        torque_nm => TorqueNm,
        torque_lbft => TorqueLbft,
    }

    drivetrain: DrivetrainSpec {
        transmission => Transmission,
        /// "Automatic" or "Manual".
        transmission_type => TransmissionType,
        gears => Gears,
        drive_type => DriveType,
    }

    performance: PerformanceSpec {
        acceleration_0_60_mph => Acceleration0To60Mph,
        acceleration_0_100_kmh => Acceleration0To100Kmh,
        acceleration_0_200_kmh => Acceleration0To200Kmh,
        top_speed_kmh => TopSpeedKmh,
        top_speed_mph => TopSpeedMph,
        quarter_mile_time => QuarterMileTime,
    }

    /// Fuel, consumption and emissions.
    consumption: ConsumptionSpec {
        fuel_consumption_urban_l => ConsumptionUrbanL,
        fuel_consumption_extra_urban_l => ConsumptionExtraUrbanL,
        fuel_consumption_combined_l => ConsumptionCombinedL,
        fuel_consumption_urban_mpg => ConsumptionUrbanMpg,
        fuel_consumption_extra_urban_mpg => ConsumptionExtraUrbanMpg,
        fuel_consumption_combined_mpg => ConsumptionCombinedMpg,
        fuel_type => FuelType,
        fuel_tank_capacity => FuelTankCapacity,
        co2_emissions => Co2Emissions,
    }

    /// Dimensions, mass and load.
    dimensions: DimensionsSpec {
        length => Length,
        width => Width,
        height => Height,
        wheelbase => Wheelbase,
        front_track => FrontTrack,
        rear_track => RearTrack,
        curb_weight => CurbWeight,
        gross_weight => GrossWeight,
        max_load => MaxLoad,
        trunk_space => TrunkSpace,
    }

    body: BodySpec {
        body_type => BodyType,
        doors => Doors,
        seats => Seats,
    }

    /// Suspension, brakes, tires and wheels.
    chassis: ChassisSpec {
        front_suspension => FrontSuspension,
        rear_suspension => RearSuspension,
        front_brakes => FrontBrakes,
        rear_brakes => RearBrakes,
        tire_size_front => TireSizeFront,
        tire_size_rear => TireSizeRear,
        wheel_size_front => WheelSizeFront,
        wheel_size_rear => WheelSizeRear,
    }

    lineage: LineageSpec {
        production_period => ProductionPeriod,
        platform => Platform,
        generation => Generation,
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl Serialize for Slot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl SpecSlots {
    /// Populated slots in declaration order.
    pub fn populated(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        Slot::ALL
            .iter()
            .filter_map(move |&slot| self.get(slot).map(|v| (slot, v)))
    }

    pub fn populated_count(&self) -> usize {
        self.populated().count()
    }
}

/// One label/value row harvested from a source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub label: String,
    pub value: String,
}

impl RawEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl<L: Into<String>, V: Into<String>> From<(L, V)> for RawEntry {
    fn from((label, value): (L, V)) -> Self {
        Self::new(label, value)
    }
}

/// The output record for one vehicle page.
///
/// Identity fields are always set. Built once by the extraction engine and not
/// mutated afterwards; re-parsing a page produces a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSpec {
    pub brand: String,
    pub model: String,
    pub year: u16,
    /// Display heading of the page, e.g. "2019 BMW 320i (aut. 8)".
    pub version: String,
    pub source_url: String,
    /// Numeric catalogue id from the resource identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_id: Option<String>,
    #[serde(flatten)]
    pub slots: SpecSlots,
    #[serde(default)]
    pub raw_specifications: RawSpecifications,
}

impl CanonicalSpec {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots.get(slot)
    }
}
