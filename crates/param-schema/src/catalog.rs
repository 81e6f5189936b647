//! The canonical parameter catalog.
//!
//! A single process-wide schema tree describing every measurement procedure,
//! its parameters, their defaults, and their metadata. The tree is built once
//! on first access and is read-only afterwards; every entry point below that
//! returns a tree returns a fresh copy the caller may mutate freely.

use std::sync::OnceLock;

use log::{debug, info};
use serde_json::{json, Value};

use crate::node::{Leaf, Node, ParamType};
use crate::record::PARAMETERS_FORMAT_VERSION;

/// Marker key for parameters a user must supply before a run can start.
pub const ESSENTIAL_KEY: &str = "essential";

/// Reduce the catalog to its essential-marked view at initialization.
/// Off in normal deployments; flipped for minimal builds that drive
/// instruments from hand-supplied parameter files.
const ESSENTIAL_ONLY_CATALOG: bool = false;

static CATALOG: OnceLock<Node> = OnceLock::new();

/// The canonical catalog, shared and immutable.
pub fn canonical() -> &'static Node {
    CATALOG.get_or_init(|| {
        let mut catalog = build_catalog();
        if ESSENTIAL_ONLY_CATALOG {
            info!("reducing parameter catalog to its essential-marked view");
            catalog = catalog.filter_marked(ESSENTIAL_KEY);
        }
        let procedures = catalog
            .get("runConfigs")
            .and_then(Node::as_branch)
            .map_or(0, |children| children.len());
        debug!("parameter catalog initialized: {} procedures", procedures);
        catalog
    })
}

/// A private copy of the whole catalog.
pub fn full() -> Node {
    canonical().clone()
}

/// Default values for every parameter, as a plain value tree.
pub fn defaults() -> Value {
    canonical().defaults()
}

/// The catalog filtered down to essential-marked parameters.
pub fn essentials() -> Node {
    canonical().filter_marked(ESSENTIAL_KEY)
}

/// Names of the available procedures, in catalog order.
pub fn procedure_names() -> Vec<String> {
    canonical()
        .get("runConfigs")
        .and_then(Node::as_branch)
        .map(|children| children.keys().cloned().collect())
        .unwrap_or_default()
}

/// Default values for one procedure's parameters.
pub fn procedure_defaults(name: &str) -> Option<Value> {
    let procedure = canonical().get("runConfigs")?.get(name)?;
    Some(procedure.defaults())
}

// ── Catalog construction ────────────────────────────────────────────────

const PROCEDURES: &[&str] = &[
    "GateSweep",
    "DrainSweep",
    "StaticBias",
    "BurnOut",
    "AutoGateSweep",
    "NoiseCollection",
];

fn float(default: f64) -> Leaf {
    Leaf::new(json!(default)).typed(ParamType::Float)
}

fn int(default: i64) -> Leaf {
    Leaf::new(json!(default)).typed(ParamType::Int)
}

fn boolean(default: bool) -> Leaf {
    Leaf::new(json!(default)).typed(ParamType::Bool)
}

fn string(default: &str) -> Leaf {
    Leaf::new(json!(default)).typed(ParamType::String)
}

fn array(default: Value) -> Leaf {
    Leaf::new(default).typed(ParamType::Array)
}

fn choice(default: &str, options: &[&str]) -> Leaf {
    Leaf::new(json!(default))
        .typed(ParamType::Choice)
        .choices(options.iter().map(|option| json!(option)).collect())
}

fn constant(default: Value) -> Leaf {
    Leaf::new(default).typed(ParamType::Constant)
}

/// Structural marker listing the procedures a composite procedure builds on.
/// The `ignore` key keeps it out of every extracted value tree.
fn dependencies(on: &[&str]) -> Node {
    Node::branch(vec![
        ("ignore", Node::Raw(json!(true))),
        ("value", Node::Raw(json!(on))),
    ])
}

fn identifiers() -> Node {
    Node::branch(vec![
        ("user", string("").essential().into()),
        ("project", string("").essential().into()),
        ("wafer", string("").into()),
        ("chip", string("").into()),
        ("device", string("").essential().into()),
        ("step", int(0).into()),
    ])
}

fn measurement_system() -> Node {
    Node::branch(vec![
        (
            "system",
            choice("B2912A", &["B2912A", "PCB_System", "Emulated"])
                .essential()
                .into(),
        ),
        ("deviceRange", array(json!([])).into()),
        ("NPLC", float(1.0).units("cycles").into()),
    ])
}

fn gate_sweep() -> Node {
    Node::branch(vec![
        ("dependencies", dependencies(&[])),
        (
            "gateVoltageMinimum",
            float(-1.0).units("V").title("Gate voltage minimum").essential().into(),
        ),
        (
            "gateVoltageMaximum",
            float(1.0).units("V").title("Gate voltage maximum").essential().into(),
        ),
        (
            "drainVoltageSetPoint",
            float(0.5).units("V").title("Drain voltage set point").essential().into(),
        ),
        ("stepsInVGSPerDirection", int(100).essential().into()),
        ("pointsPerVGS", int(1).into()),
        ("gateVoltageRamps", int(2).into()),
        ("isFastSweep", boolean(false).into()),
        ("fastSweepSpeed", int(1000).units("Hz").into()),
    ])
}

fn drain_sweep() -> Node {
    Node::branch(vec![
        ("dependencies", dependencies(&[])),
        (
            "drainVoltageMinimum",
            float(0.0).units("V").title("Drain voltage minimum").essential().into(),
        ),
        (
            "drainVoltageMaximum",
            float(0.5).units("V").title("Drain voltage maximum").essential().into(),
        ),
        (
            "gateVoltageSetPoint",
            float(0.0).units("V").title("Gate voltage set point").essential().into(),
        ),
        ("stepsInVDSPerDirection", int(100).essential().into()),
        ("pointsPerVDS", int(1).into()),
        ("drainVoltageRamps", int(2).into()),
    ])
}

fn static_bias() -> Node {
    Node::branch(vec![
        ("dependencies", dependencies(&[])),
        ("totalBiasTime", int(60).units("s").essential().into()),
        ("measurementTime", int(10).units("s").essential().into()),
        ("gateVoltageSetPoint", float(0.0).units("V").essential().into()),
        ("drainVoltageSetPoint", float(0.5).units("V").essential().into()),
        ("delayBeforeMeasurementsBegin", int(0).units("s").into()),
        ("gateVoltageWhenDone", float(0.0).units("V").into()),
        ("drainVoltageWhenDone", float(0.0).units("V").into()),
        ("floatChannelsWhenDone", boolean(false).into()),
    ])
}

fn burn_out() -> Node {
    Node::branch(vec![
        ("dependencies", dependencies(&[])),
        ("pointsPerRamp", int(50).into()),
        (
            "thresholdProportion",
            float(0.92)
                .describe("Fraction of the peak current that triggers the cutoff")
                .into(),
        ),
        ("minimumAppliedDrainVoltage", float(1.1).units("V").essential().into()),
        ("maximumAppliedDrainVoltage", float(10.0).units("V").essential().into()),
    ])
}

fn auto_gate_sweep() -> Node {
    Node::branch(vec![
        ("dependencies", dependencies(&["GateSweep"])),
        ("sweepsPerVDS", int(1).into()),
        ("drainVoltageSetPoints", array(json!([])).units("V").essential().into()),
        ("delayBetweenSweeps", int(0).units("s").into()),
        ("timedSweepStarts", boolean(false).into()),
    ])
}

fn noise_collection() -> Node {
    Node::branch(vec![
        ("dependencies", dependencies(&[])),
        ("measurementSpeed", int(10000).units("Hz").essential().into()),
        ("points", int(60000).essential().into()),
        ("gateVoltageBias", float(0.0).units("V").into()),
        ("drainVoltageBias", float(0.1).units("V").into()),
    ])
}

fn build_catalog() -> Node {
    Node::branch(vec![
        ("runType", choice("GateSweep", PROCEDURES).essential().into()),
        ("Identifiers", identifiers()),
        (
            "runConfigs",
            Node::branch(vec![
                ("GateSweep", gate_sweep()),
                ("DrainSweep", drain_sweep()),
                ("StaticBias", static_bias()),
                ("BurnOut", burn_out()),
                ("AutoGateSweep", auto_gate_sweep()),
                ("NoiseCollection", noise_collection()),
            ]),
        ),
        ("MeasurementSystem", measurement_system()),
        ("dataFolder", string("data").title("Data folder").into()),
        (
            "ParametersFormatVersion",
            constant(json!(PARAMETERS_FORMAT_VERSION)).into(),
        ),
    ])
}
