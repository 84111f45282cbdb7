//! # gridcase-core: Power Network Case Model
//!
//! Provides the input data structure for power-flow and optimal-power-flow
//! solvers: a [`Case`] owning ordered collections of [`Bus`], [`Branch`] and
//! [`Generator`] elements together with the system base power.
//!
//! ## Design Philosophy
//!
//! The case is a passive, build-then-freeze container:
//! - **Loaders** append elements in any order (a branch may be appended
//!   before the buses it connects)
//! - **Solvers** read the case through topology queries and never mutate it
//! - **References** between elements are [`BusId`] values, resolved through
//!   [`Case::find_bus`], never pointers
//!
//! Referential integrity is checked lazily by the queries that need it and
//! eagerly by [`Case::validate`].
//!
//! ## Quick Start
//!
//! ```rust
//! use gridcase_core::*;
//!
//! let mut case = Case::with_name("test_case");
//! case.base_mva = 100.0;
//!
//! case.add_bus(Bus::new(BusId::new(1), "bus1"));
//! case.add_bus(Bus::new(BusId::new(2), "bus2"));
//! case.add_branch(Branch::new(
//!     BranchId::new(1),
//!     "line1",
//!     BusId::new(1),
//!     BusId::new(2),
//! ));
//! case.add_generator(Generator::new(GenId::new(1), "gen1", BusId::new(1)));
//!
//! assert_eq!(case.connected_buses().len(), 2);
//! let lines: Vec<&str> = case
//!     .branches_of(BusId::new(1))?
//!     .map(|branch| branch.name())
//!     .collect();
//! assert_eq!(lines, ["line1"]);
//! assert!(case.validate().is_empty());
//! # Ok::<(), CaseError>(())
//! ```
//!
//! ## Modules
//!
//! - [`case`] - The aggregate root and its queries
//! - [`diagnostics`] - Warning/error collection for the validation pass
//! - [`config`] - Validation policy loaded from TOML
//! - [`graph_utils`] - Island detection and graph statistics (petgraph)
//! - [`units`] - Typed physical quantities

use serde::{Deserialize, Serialize};

pub mod case;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod named;
pub mod units;

pub use case::{BusMode, Case, CaseStats, SlackModel};
pub use config::ValidationConfig;
pub use diagnostics::{Category, DiagnosticIssue, Diagnostics, Severity};
pub use error::{CaseError, CaseResult};
pub use graph_utils::{find_islands, graph_stats, GraphStats, IslandAnalysis, IslandSummary};
pub use named::{Named, DEFAULT_NAME};
pub use units::{Degrees, Kilovolts, Megavars, MegavoltAmperes, Megawatts, PerUnit, Radians};

use named::{default_name, impl_named};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenId(usize);

macro_rules! id_type {
    ($($type:ident),+) => {
        $(
            impl $type {
                #[inline]
                pub const fn new(value: usize) -> Self {
                    $type(value)
                }
                #[inline]
                pub const fn value(&self) -> usize {
                    self.0
                }
            }

            impl std::fmt::Display for $type {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<usize> for $type {
                fn from(value: usize) -> Self {
                    $type(value)
                }
            }
        )+
    };
}

id_type!(BusId, BranchId, GenId);

/// The closed set of element kinds a case owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Bus,
    Branch,
    Generator,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ElementKind::Bus => "bus",
            ElementKind::Branch => "branch",
            ElementKind::Generator => "generator",
        })
    }
}

/// Bus type as declared by the loader. Solvers decide what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BusType {
    /// Load bus: P and Q specified
    #[default]
    Pq,
    /// Generator bus: P and |V| specified
    Pv,
    /// Reference (slack/swing) bus
    Ref,
    /// Out of service
    Isolated,
}

// Basic component structs
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub bus_type: BusType,
    /// Base voltage in kilovolts
    pub base_kv: Kilovolts,
    /// Voltage magnitude in per-unit (initial guess or solved value)
    pub voltage_pu: PerUnit,
    /// Voltage angle in radians
    pub angle_rad: Radians,
    pub vmin_pu: Option<PerUnit>,
    pub vmax_pu: Option<PerUnit>,
    /// Real power demand at this bus
    pub demand_mw: Megawatts,
    /// Reactive power demand at this bus
    pub demand_mvar: Megavars,
    /// Shunt conductance, MW consumed at 1.0 pu voltage
    pub shunt_g_mw: Megawatts,
    /// Shunt susceptance, Mvar injected at 1.0 pu voltage
    pub shunt_b_mvar: Megavars,
    pub area: Option<i64>,
    pub zone: Option<i64>,
}

impl Default for Bus {
    fn default() -> Self {
        Self {
            id: BusId(0),
            name: default_name(),
            bus_type: BusType::Pq,
            base_kv: Kilovolts(0.0),
            voltage_pu: PerUnit::ONE,
            angle_rad: Radians(0.0),
            vmin_pu: None,
            vmax_pu: None,
            demand_mw: Megawatts(0.0),
            demand_mvar: Megavars(0.0),
            shunt_g_mw: Megawatts(0.0),
            shunt_b_mvar: Megavars(0.0),
            area: None,
            zone: None,
        }
    }
}

impl Bus {
    pub fn new(id: BusId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, bus_type: BusType) -> Self {
        self.bus_type = bus_type;
        self
    }

    pub fn with_base_kv(mut self, base_kv: f64) -> Self {
        self.base_kv = Kilovolts(base_kv);
        self
    }

    /// Set the real/reactive demand served at this bus.
    pub fn with_demand(mut self, p_mw: f64, q_mvar: f64) -> Self {
        self.demand_mw = Megawatts(p_mw);
        self.demand_mvar = Megavars(q_mvar);
        self
    }

    pub fn with_shunt(mut self, g_mw: f64, b_mvar: f64) -> Self {
        self.shunt_g_mw = Megawatts(g_mw);
        self.shunt_b_mvar = Megavars(b_mvar);
        self
    }

    /// True when the bus carries a nonzero shunt admittance.
    pub fn has_shunt(&self) -> bool {
        self.shunt_g_mw.value() != 0.0 || self.shunt_b_mvar.value() != 0.0
    }

    pub fn is_reference(&self) -> bool {
        self.bus_type == BusType::Ref
    }
}

/// Structural classification of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Line,
    Transformer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Series resistance (per-unit)
    pub resistance: f64,
    /// Series reactance (per-unit)
    pub reactance: f64,
    /// Total line charging susceptance (per-unit)
    pub charging_b: PerUnit,
    /// Off-nominal turns ratio, 1.0 for lines
    pub tap_ratio: f64,
    /// Transformer phase shift
    pub phase_shift: Radians,
    /// Long term rating (Rate A)
    pub rating_a: Option<MegavoltAmperes>,
    /// Short term rating (Rate B)
    pub rating_b: Option<MegavoltAmperes>,
    /// Emergency rating (Rate C)
    pub rating_c: Option<MegavoltAmperes>,
    pub angle_min: Option<Radians>,
    pub angle_max: Option<Radians>,
    pub in_service: bool,
}

impl Default for Branch {
    fn default() -> Self {
        Self {
            id: BranchId(0),
            name: default_name(),
            from_bus: BusId(0),
            to_bus: BusId(0),
            resistance: 0.0,
            reactance: 0.0,
            charging_b: PerUnit(0.0),
            tap_ratio: 1.0,
            phase_shift: Radians(0.0),
            rating_a: None,
            rating_b: None,
            rating_c: None,
            angle_min: None,
            angle_max: None,
            in_service: true,
        }
    }
}

impl Branch {
    pub fn new(id: BranchId, name: impl Into<String>, from_bus: BusId, to_bus: BusId) -> Self {
        Self {
            id,
            name: name.into(),
            from_bus,
            to_bus,
            ..Self::default()
        }
    }

    /// Set series impedance in per-unit.
    pub fn with_impedance(mut self, resistance: f64, reactance: f64) -> Self {
        self.resistance = resistance;
        self.reactance = reactance;
        self
    }

    /// Set off-nominal tap ratio and phase shift (degrees, as case files store it).
    pub fn with_tap(mut self, ratio: f64, shift_deg: f64) -> Self {
        self.tap_ratio = ratio;
        self.phase_shift = Degrees(shift_deg).to_radians();
        self
    }

    pub fn with_rating_a(mut self, mva: f64) -> Self {
        self.rating_a = Some(MegavoltAmperes(mva));
        self
    }

    pub fn out_of_service(mut self) -> Self {
        self.in_service = false;
        self
    }

    /// True if either end of the branch is `bus`.
    #[inline]
    pub fn connects(&self, bus: BusId) -> bool {
        self.from_bus == bus || self.to_bus == bus
    }

    /// The endpoint opposite `bus`, or `None` if the branch does not touch it.
    /// A self-loop returns the bus itself.
    pub fn other_end(&self, bus: BusId) -> Option<BusId> {
        if self.from_bus == bus {
            Some(self.to_bus)
        } else if self.to_bus == bus {
            Some(self.from_bus)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.from_bus == self.to_bus
    }

    /// A zero tap ratio is the case-file convention for "no transformer".
    pub fn kind(&self) -> BranchKind {
        let ratio = if self.tap_ratio == 0.0 {
            1.0
        } else {
            self.tap_ratio
        };
        if (ratio - 1.0).abs() > f64::EPSILON || self.phase_shift.value() != 0.0 {
            BranchKind::Transformer
        } else {
            BranchKind::Line
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub id: GenId,
    pub name: String,
    pub bus: BusId,
    /// Active power output (MW)
    pub active_power: Megawatts,
    /// Reactive power output (Mvar)
    pub reactive_power: Megavars,
    pub pmin: Megawatts,
    pub pmax: Megawatts,
    pub qmin: Megavars,
    pub qmax: Megavars,
    /// Voltage magnitude setpoint (per-unit)
    pub voltage_setpoint: Option<PerUnit>,
    /// Machine MVA base, defaults to the case base when absent
    pub mbase: Option<MegavoltAmperes>,
    pub in_service: bool,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            id: GenId(0),
            name: default_name(),
            bus: BusId(0),
            active_power: Megawatts(0.0),
            reactive_power: Megavars(0.0),
            pmin: Megawatts(0.0),
            pmax: Megawatts(f64::INFINITY),
            qmin: Megavars(f64::NEG_INFINITY),
            qmax: Megavars(f64::INFINITY),
            voltage_setpoint: None,
            mbase: None,
            in_service: true,
        }
    }
}

impl Generator {
    /// Create a generator with no output limits.
    pub fn new(id: GenId, name: impl Into<String>, bus: BusId) -> Self {
        Self {
            id,
            name: name.into(),
            bus,
            ..Self::default()
        }
    }

    /// Set active power limits (in MW)
    pub fn with_p_limits(mut self, pmin: f64, pmax: f64) -> Self {
        self.pmin = Megawatts(pmin);
        self.pmax = Megawatts(pmax);
        self
    }

    /// Set reactive power limits (in Mvar)
    pub fn with_q_limits(mut self, qmin: f64, qmax: f64) -> Self {
        self.qmin = Megavars(qmin);
        self.qmax = Megavars(qmax);
        self
    }

    pub fn with_output(mut self, p_mw: f64, q_mvar: f64) -> Self {
        self.active_power = Megawatts(p_mw);
        self.reactive_power = Megavars(q_mvar);
        self
    }

    pub fn out_of_service(mut self) -> Self {
        self.in_service = false;
        self
    }
}

impl_named!(Bus, Branch, Generator);

/// Any element a loader can append to a [`Case`].
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Bus(Bus),
    Branch(Branch),
    Generator(Generator),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Bus(_) => ElementKind::Bus,
            Element::Branch(_) => ElementKind::Branch,
            Element::Generator(_) => ElementKind::Generator,
        }
    }
}

impl Named for Element {
    fn name(&self) -> &str {
        match self {
            Element::Bus(bus) => &bus.name,
            Element::Branch(branch) => &branch.name,
            Element::Generator(gen) => &gen.name,
        }
    }
}

impl From<Bus> for Element {
    fn from(bus: Bus) -> Self {
        Element::Bus(bus)
    }
}

impl From<Branch> for Element {
    fn from(branch: Branch) -> Self {
        Element::Branch(branch)
    }
}

impl From<Generator> for Element {
    fn from(gen: Generator) -> Self {
        Element::Generator(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_default_name() {
        assert_eq!(Bus::default().name(), DEFAULT_NAME);
        assert_eq!(Branch::default().name(), DEFAULT_NAME);
        assert_eq!(Generator::default().name(), DEFAULT_NAME);
    }

    #[test]
    fn test_bus_builder() {
        let bus = Bus::new(BusId::new(3), "Bus 3")
            .with_type(BusType::Ref)
            .with_base_kv(138.0)
            .with_demand(50.0, 10.0);
        assert!(bus.is_reference());
        assert_eq!(bus.base_kv, Kilovolts(138.0));
        assert_eq!(bus.demand_mw.value(), 50.0);
        assert_eq!(bus.voltage_pu, PerUnit::ONE);
    }

    #[test]
    fn test_branch_endpoints() {
        let branch = Branch::new(BranchId::new(1), "L12", BusId::new(1), BusId::new(2));
        assert!(branch.connects(BusId::new(1)));
        assert!(branch.connects(BusId::new(2)));
        assert!(!branch.connects(BusId::new(3)));
        assert_eq!(branch.other_end(BusId::new(1)), Some(BusId::new(2)));
        assert_eq!(branch.other_end(BusId::new(2)), Some(BusId::new(1)));
        assert_eq!(branch.other_end(BusId::new(3)), None);
        assert!(!branch.is_self_loop());
    }

    #[test]
    fn test_self_loop_is_representable() {
        let branch = Branch::new(BranchId::new(1), "loop", BusId::new(4), BusId::new(4));
        assert!(branch.is_self_loop());
        assert_eq!(branch.other_end(BusId::new(4)), Some(BusId::new(4)));
    }

    #[test]
    fn test_branch_kind() {
        let line = Branch::new(BranchId::new(1), "line", BusId::new(1), BusId::new(2));
        assert_eq!(line.kind(), BranchKind::Line);

        let tap = line.clone().with_tap(0.978, 0.0);
        assert_eq!(tap.kind(), BranchKind::Transformer);

        let shifter = line.with_tap(1.0, -5.0);
        assert_eq!(shifter.kind(), BranchKind::Transformer);
        assert!(shifter.phase_shift.value() < 0.0);
    }

    #[test]
    fn test_generator_defaults_unbounded() {
        let gen = Generator::new(GenId::new(1), "G1", BusId::new(1));
        assert!(gen.in_service);
        assert!(!gen.pmax.is_finite());
        let gen = gen.with_p_limits(10.0, 100.0).with_q_limits(-30.0, 30.0);
        assert_eq!(gen.pmin.value(), 10.0);
        assert_eq!(gen.qmax.value(), 30.0);
    }

    #[test]
    fn test_element_conversion() {
        let element: Element = Generator::new(GenId::new(2), "G2", BusId::new(1)).into();
        assert_eq!(element.kind(), ElementKind::Generator);
        assert_eq!(element.name(), "G2");
        assert_eq!(ElementKind::Branch.to_string(), "branch");
    }

    #[test]
    fn test_id_display_and_ordering() {
        assert_eq!(BusId::new(14).to_string(), "14");
        assert!(BusId::new(1) < BusId::new(2));
        assert_eq!(GenId::from(5).value(), 5);
    }
}
