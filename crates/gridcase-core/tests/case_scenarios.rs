//! End-to-end scenarios a loader and a solver would exercise against a case.

use gridcase_core::{
    find_islands, Branch, BranchId, Bus, BusId, BusMode, BusType, Case, CaseError, Category,
    Diagnostics, ElementKind, GenId, Generator, Named, SlackModel, ValidationConfig,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Three-bus network in the shape of a small case file: slack bus 1,
/// PV bus 2, load bus 3, a triangle of lines.
fn three_bus() -> Case {
    let mut case = Case::with_name("case3");
    case.base_mva = 100.0;
    case.append(Bus::new(BusId::new(1), "Bus 1").with_type(BusType::Ref).with_base_kv(345.0));
    case.append(Bus::new(BusId::new(2), "Bus 2").with_type(BusType::Pv).with_base_kv(345.0));
    case.append(
        Bus::new(BusId::new(3), "Bus 3")
            .with_base_kv(345.0)
            .with_demand(90.0, 30.0),
    );
    for (id, (from, to)) in [(1, 2), (2, 3), (3, 1)].into_iter().enumerate() {
        case.append(
            Branch::new(
                BranchId::new(id + 1),
                format!("Line {from}-{to}"),
                BusId::new(from),
                BusId::new(to),
            )
            .with_impedance(0.01, 0.085)
            .with_rating_a(250.0),
        );
    }
    case.append(
        Generator::new(GenId::new(1), "Gen 1", BusId::new(1))
            .with_p_limits(10.0, 250.0)
            .with_q_limits(-300.0, 300.0),
    );
    case.append(
        Generator::new(GenId::new(2), "Gen 2", BusId::new(2))
            .with_p_limits(10.0, 300.0)
            .with_output(163.0, 0.0),
    );
    case
}

#[test]
fn two_bus_scenario() {
    init_tracing();
    let mut c = Case::with_name("test_case");
    c.base_mva = 100.0;
    c.append(Bus::new(BusId::new(1), "bus1"));
    c.append(Bus::new(BusId::new(2), "bus2"));
    c.append(Branch::new(
        BranchId::new(1),
        "line1",
        BusId::new(1),
        BusId::new(2),
    ));

    assert_eq!(c.name(), "test_case");
    assert_eq!(c.connected_buses().len(), 2);

    let bus1 = c.find_bus_by_name("bus1").unwrap().id;
    let names: Vec<&str> = c.branches_of(bus1).unwrap().map(Named::name).collect();
    assert_eq!(names, ["line1"]);
}

#[test]
fn generator_on_missing_bus_is_one_reference_error() {
    init_tracing();
    let mut c = Case::with_name("broken");
    c.base_mva = 100.0;
    c.append(Bus::new(BusId::new(1), "bus1"));
    c.append(Generator::new(GenId::new(7), "orphan", BusId::new(99)));

    let errors = c.validate();
    let reference_errors: Vec<_> = errors.iter().filter(|e| e.is_reference_error()).collect();
    assert_eq!(reference_errors.len(), 1);
    match reference_errors[0] {
        CaseError::DanglingReference {
            element,
            id,
            name,
            bus,
        } => {
            assert_eq!(*element, ElementKind::Generator);
            assert_eq!(*id, 7);
            assert_eq!(name, "orphan");
            assert_eq!(*bus, BusId::new(99));
        }
        other => panic!("expected a dangling reference, got {other:?}"),
    }

    let err = c.generators_of(BusId::new(99)).err().unwrap();
    assert!(err.is_reference_error());
}

#[test]
fn buses_keep_insertion_order() {
    let mut c = Case::new();
    let ids = [30, 10, 20];
    for (position, id) in ids.into_iter().enumerate() {
        assert_eq!(c.append(Bus::new(BusId::new(id), format!("b{id}"))), position);
    }
    let order: Vec<usize> = c.connected_buses().iter().map(|b| b.id.value()).collect();
    assert_eq!(order, ids);
    assert_eq!(c.connected_buses(), c.connected_buses());
    assert_eq!(c.bus_position(BusId::new(10)).unwrap(), 1);
}

#[test]
fn solver_view_of_three_bus_case() {
    init_tracing();
    let case = three_bus();
    assert!(case.validate().is_empty());
    assert_eq!(case.checked_base_mva().unwrap(), 100.0);
    assert_eq!(case.slack_model(), SlackModel::Single);

    for bus in case.connected_buses() {
        assert_eq!(case.branches_of(bus.id).unwrap().count(), 2);
    }
    assert_eq!(case.bus_mode(BusId::new(1)).unwrap(), BusMode::Slack);
    assert_eq!(case.bus_mode(BusId::new(2)).unwrap(), BusMode::Pv);
    assert_eq!(case.bus_mode(BusId::new(3)).unwrap(), BusMode::Pq);

    let gens: Vec<_> = case
        .generators_of(BusId::new(2))
        .unwrap()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(gens, ["Gen 2"]);

    let islands = find_islands(&case).unwrap();
    assert_eq!(islands.island_count(), 1);

    let stats = case.stats();
    assert_eq!(stats.num_branches, 3);
    assert!((stats.total_gen_capacity_mw - 550.0).abs() < 1e-9);

    let mut diag = Diagnostics::new();
    let config = ValidationConfig {
        require_single_slack: true,
        warn_duplicate_names: true,
        ..ValidationConfig::default()
    };
    case.validate_into(&config, &mut diag);
    assert!(!diag.has_issues(), "{diag}");
}

#[test]
fn shared_read_access_after_loading() {
    let case = std::sync::Arc::new(three_bus());
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let case = std::sync::Arc::clone(&case);
            std::thread::spawn(move || {
                let bus = case.connected_buses()[i].id;
                case.branches_of(bus).map(|it| it.count()).unwrap_or(0)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}

#[test]
fn diagnostics_serialize_for_tools() {
    let mut case = three_bus();
    case.base_mva = 0.0;
    case.append(Branch::new(
        BranchId::new(9),
        "Line 3-7",
        BusId::new(3),
        BusId::new(7),
    ));

    let mut diag = Diagnostics::new();
    case.validate_into(&ValidationConfig::default(), &mut diag);
    assert_eq!(diag.error_count(), 1);
    assert_eq!(diag.issues_by_category(Category::Configuration).count(), 1);

    let json = serde_json::to_value(&diag).unwrap();
    let issues = json["issues"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|issue| issue["entity"] == "branch 9 'Line 3-7'" && issue["severity"] == "error"));
}
