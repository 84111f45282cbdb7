//! The [`Case`] aggregate: ownership of every element plus topology queries.
//!
//! A case is filled once by a loader and then read by solvers. Appends are
//! the only mutation and they never validate, so a branch may arrive before
//! the buses it connects. Queries that follow a reference check it and fail
//! with a reference error instead of returning a partial topology.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ValidationConfig;
use crate::diagnostics::{Category, Diagnostics};
use crate::error::{CaseError, CaseResult};
use crate::named::{default_name, impl_named};
use crate::{Branch, BranchKind, Bus, BusId, BusType, Element, ElementKind, Generator, Named};

/// How the case designates its reference bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlackModel {
    /// Exactly one reference bus
    Single,
    /// No reference bus: slack is distributed by the solver
    Distributed,
    /// More than one bus declared as reference
    Multiple(usize),
}

/// Structural mode of a bus, derived from its declared type and the
/// generators attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BusMode {
    Slack,
    Pv,
    Pq,
    Isolated,
}

/// Element counts and totals of a case
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseStats {
    pub num_buses: usize,
    pub num_branches: usize,
    pub num_generators: usize,
    pub num_in_service_branches: usize,
    pub num_in_service_generators: usize,
    /// Branches with an off-nominal tap or a phase shift
    pub num_transformers: usize,
    /// Buses carrying a shunt admittance
    pub num_shunts: usize,
    pub total_demand_mw: f64,
    pub total_demand_mvar: f64,
    /// Sum of finite `pmax` over in-service generators
    pub total_gen_capacity_mw: f64,
    /// Sum of scheduled output over in-service generators
    pub total_generation_mw: f64,
}

impl std::fmt::Display for CaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} branches ({} in service), {} gens ({:.0} MW), demand {:.0} MW",
            self.num_buses,
            self.num_branches,
            self.num_in_service_branches,
            self.num_generators,
            self.total_gen_capacity_mw,
            self.total_demand_mw
        )
    }
}

/// A complete power network model: elements plus system base power.
///
/// Collections keep insertion order; the position returned by an append is
/// the element's stable index for consumers that address elements
/// positionally. Bus lookups by id go through an index maintained on
/// append, so `find_bus` is O(1). When two buses share an id, the first one
/// appended wins and [`Case::validate`] reports the collision.
#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    /// System base power (MVA). Zero until the loader sets it.
    pub base_mva: f64,
    buses: Vec<Bus>,
    branches: Vec<Branch>,
    generators: Vec<Generator>,
    bus_index: HashMap<BusId, usize>,
}

impl_named!(Case);

impl Default for Case {
    fn default() -> Self {
        Self {
            name: default_name(),
            base_mva: 0.0,
            buses: Vec::new(),
            branches: Vec::new(),
            generators: Vec::new(),
            bus_index: HashMap::new(),
        }
    }
}

impl Case {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty case with the given name, kept verbatim.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Append a bus and return its position.
    pub fn add_bus(&mut self, bus: Bus) -> usize {
        let position = self.buses.len();
        self.bus_index.entry(bus.id).or_insert(position);
        debug!(case = %self.name, bus = %bus.id, name = %bus.name, position, "bus appended");
        self.buses.push(bus);
        position
    }

    /// Append a branch and return its position. Endpoints are not checked.
    pub fn add_branch(&mut self, branch: Branch) -> usize {
        let position = self.branches.len();
        debug!(
            case = %self.name,
            branch = %branch.id,
            from = %branch.from_bus,
            to = %branch.to_bus,
            position,
            "branch appended"
        );
        self.branches.push(branch);
        position
    }

    /// Append a generator and return its position. The bus is not checked.
    pub fn add_generator(&mut self, generator: Generator) -> usize {
        let position = self.generators.len();
        debug!(case = %self.name, gen = %generator.id, bus = %generator.bus, position, "generator appended");
        self.generators.push(generator);
        position
    }

    /// Append any element to its collection and return its position there.
    pub fn append(&mut self, element: impl Into<Element>) -> usize {
        match element.into() {
            Element::Bus(bus) => self.add_bus(bus),
            Element::Branch(branch) => self.add_branch(branch),
            Element::Generator(generator) => self.add_generator(generator),
        }
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Every bus of the case, in insertion order.
    ///
    /// The slice borrows the case, so no append can happen while it is held.
    pub fn connected_buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn is_empty(&self) -> bool {
        self.buses.is_empty() && self.branches.is_empty() && self.generators.is_empty()
    }

    pub fn bus_names(&self) -> Vec<&str> {
        self.buses.iter().map(Named::name).collect()
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(Named::name).collect()
    }

    pub fn in_service_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(|b| b.in_service)
    }

    pub fn in_service_generators(&self) -> impl Iterator<Item = &Generator> {
        self.generators.iter().filter(|g| g.in_service)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    #[inline]
    pub fn contains_bus(&self, id: BusId) -> bool {
        self.bus_index.contains_key(&id)
    }

    /// Position of a bus in [`Case::connected_buses`].
    pub fn bus_position(&self, id: BusId) -> CaseResult<usize> {
        self.bus_index
            .get(&id)
            .copied()
            .ok_or(CaseError::BusNotFound(id))
    }

    pub fn find_bus(&self, id: BusId) -> CaseResult<&Bus> {
        let position = self.bus_position(id)?;
        Ok(&self.buses[position])
    }

    /// First bus carrying `name`, compared verbatim.
    pub fn find_bus_by_name(&self, name: &str) -> Option<&Bus> {
        self.buses.iter().find(|bus| bus.name == name)
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Branches with `bus` at either end, in insertion order.
    ///
    /// The iterator is lazy and recomputed on every call. Fails if `bus` is
    /// not in the case, or if an incident branch's far end is missing.
    pub fn branches_of(&self, bus: BusId) -> CaseResult<impl Iterator<Item = &Branch> + '_> {
        self.bus_position(bus)?;
        for branch in self.branches.iter().filter(|b| b.connects(bus)) {
            if let Some(far) = branch.other_end(bus) {
                if !self.contains_bus(far) {
                    return Err(CaseError::dangling(
                        ElementKind::Branch,
                        branch.id.value(),
                        &branch.name,
                        far,
                    ));
                }
            }
        }
        Ok(self.branches.iter().filter(move |b| b.connects(bus)))
    }

    /// Generators attached to `bus`, in insertion order.
    pub fn generators_of(&self, bus: BusId) -> CaseResult<impl Iterator<Item = &Generator> + '_> {
        self.bus_position(bus)?;
        Ok(self.generators.iter().filter(move |g| g.bus == bus))
    }

    /// Buses touched by at least one in-service branch, in bus order.
    pub fn non_islanded_buses(&self) -> Vec<&Bus> {
        let touched: HashSet<BusId> = self
            .in_service_branches()
            .flat_map(|b| [b.from_bus, b.to_bus])
            .collect();
        self.buses
            .iter()
            .filter(|bus| touched.contains(&bus.id))
            .collect()
    }

    pub fn slack_buses(&self) -> impl Iterator<Item = &Bus> {
        self.buses.iter().filter(|bus| bus.is_reference())
    }

    pub fn slack_model(&self) -> SlackModel {
        match self.slack_buses().count() {
            0 => SlackModel::Distributed,
            1 => SlackModel::Single,
            n => SlackModel::Multiple(n),
        }
    }

    /// Mode of a bus: its declared reference/isolated type wins, otherwise
    /// an attached in-service generator makes it PV.
    pub fn bus_mode(&self, id: BusId) -> CaseResult<BusMode> {
        let bus = self.find_bus(id)?;
        let mode = match bus.bus_type {
            BusType::Ref => BusMode::Slack,
            BusType::Isolated => BusMode::Isolated,
            BusType::Pq | BusType::Pv => {
                if self.generators_of(id)?.any(|g| g.in_service) {
                    BusMode::Pv
                } else {
                    BusMode::Pq
                }
            }
        };
        Ok(mode)
    }

    // =========================================================================
    // Case-level checks
    // =========================================================================

    /// `base_mva` if it can be divided by, otherwise a configuration error.
    pub fn checked_base_mva(&self) -> CaseResult<f64> {
        if self.base_mva.is_finite() && self.base_mva > 0.0 {
            Ok(self.base_mva)
        } else {
            Err(CaseError::Configuration(format!(
                "case '{}' has base_mva {}; it must be strictly positive",
                self.name, self.base_mva
            )))
        }
    }

    pub fn stats(&self) -> CaseStats {
        let mut stats = CaseStats {
            num_buses: self.buses.len(),
            num_branches: self.branches.len(),
            num_generators: self.generators.len(),
            num_in_service_branches: self.in_service_branches().count(),
            num_transformers: self
                .branches
                .iter()
                .filter(|b| b.kind() == BranchKind::Transformer)
                .count(),
            num_shunts: self.buses.iter().filter(|b| b.has_shunt()).count(),
            ..CaseStats::default()
        };
        for bus in &self.buses {
            stats.total_demand_mw += bus.demand_mw.value();
            stats.total_demand_mvar += bus.demand_mvar.value();
        }
        for gen in self.in_service_generators() {
            stats.num_in_service_generators += 1;
            stats.total_generation_mw += gen.active_power.value();
            if gen.pmax.is_finite() {
                stats.total_gen_capacity_mw += gen.pmax.value();
            }
        }
        stats
    }

    /// Every integrity error in the case: duplicate bus ids, then dangling
    /// branch endpoints, then dangling generator buses.
    ///
    /// An empty result means every reference resolves through
    /// [`Case::find_bus`].
    pub fn validate(&self) -> Vec<CaseError> {
        let errors = self.integrity_errors();
        for err in &errors {
            warn!(case = %self.name, "{err}");
        }
        errors
    }

    /// [`Case::validate`] without logging, for callers that report or
    /// return the errors themselves.
    pub(crate) fn integrity_errors(&self) -> Vec<CaseError> {
        let mut errors = Vec::new();

        for (position, bus) in self.buses.iter().enumerate() {
            if let Some(&first) = self.bus_index.get(&bus.id) {
                if first != position {
                    errors.push(CaseError::DuplicateBusId {
                        id: bus.id,
                        first,
                        second: position,
                    });
                }
            }
        }

        for branch in &self.branches {
            let mut ends = vec![branch.from_bus];
            if !branch.is_self_loop() {
                ends.push(branch.to_bus);
            }
            for end in ends {
                if !self.contains_bus(end) {
                    errors.push(CaseError::dangling(
                        ElementKind::Branch,
                        branch.id.value(),
                        &branch.name,
                        end,
                    ));
                }
            }
        }

        for gen in &self.generators {
            if !self.contains_bus(gen.bus) {
                errors.push(CaseError::dangling(
                    ElementKind::Generator,
                    gen.id.value(),
                    &gen.name,
                    gen.bus,
                ));
            }
        }

        errors
    }

    /// Integrity errors plus the policy warnings enabled in `config`.
    pub fn validate_into(&self, config: &ValidationConfig, diag: &mut Diagnostics) {
        let errors = self.integrity_errors();
        for err in &errors {
            diag.add_case_error(err);
        }

        if config.warn_empty {
            if self.buses.is_empty() {
                diag.add_warning(Category::Structure, "Case has no buses");
            } else if self.buses.len() > 1 && self.branches.is_empty() {
                diag.add_warning(Category::Structure, "Case has multiple buses but no branches");
            }
        }

        if config.warn_base_mva {
            if let Err(err) = self.checked_base_mva() {
                diag.add_warning(Category::Configuration, &err.to_string());
            }
        }

        if config.warn_self_loops {
            for branch in self.branches.iter().filter(|b| b.is_self_loop()) {
                diag.add_warning_with_entity(
                    Category::Topology,
                    &format!("both ends at bus {}", branch.from_bus),
                    &format!("branch {} '{}'", branch.id, branch.name),
                );
            }
        }

        if config.warn_isolated_buses && self.buses.len() > 1 {
            let connected: HashSet<BusId> =
                self.non_islanded_buses().iter().map(|b| b.id).collect();
            for bus in &self.buses {
                if bus.bus_type != BusType::Isolated && !connected.contains(&bus.id) {
                    diag.add_warning_with_entity(
                        Category::Topology,
                        "no in-service branch",
                        &format!("bus {} '{}'", bus.id, bus.name),
                    );
                }
            }
        }

        if config.warn_duplicate_names {
            let mut seen = HashSet::new();
            for bus in &self.buses {
                if !seen.insert(bus.name.as_str()) {
                    diag.add_warning_with_entity(
                        Category::Identity,
                        "name shared with an earlier bus",
                        &format!("bus {} '{}'", bus.id, bus.name),
                    );
                }
            }
        }

        if config.require_single_slack {
            match self.slack_model() {
                SlackModel::Single => {}
                SlackModel::Distributed => {
                    diag.add_warning(Category::Topology, "Case has no reference bus")
                }
                SlackModel::Multiple(n) => diag.add_warning(
                    Category::Topology,
                    &format!("Case has {n} reference buses"),
                ),
            }
        }

        info!(case = %self.name, stats = %self.stats(), "validated: {}", diag.summary());
    }
}
