//! End-to-end resolution flows combining extraction, merging, hydration, and
//! filtering the way the run-record tooling drives them.

use labrig_param_tree::{
    extract_defaults, intersection_defaults, merge, merge_defaults, must_include,
};
use serde_json::json;

// ── Sweep configuration scenario ────────────────────────────────────────

#[test]
fn gate_sweep_extract_filter_and_write_through() {
    let schema = json!({
        "runConfigs": {
            "GateSweep": {
                "gateVoltageMinimum": {"default": -1, "essential": true},
                "fastSweepSpeed": {"default": 1000}
            }
        }
    });

    assert_eq!(
        extract_defaults(&schema),
        json!({
            "runConfigs": {
                "GateSweep": {"gateVoltageMinimum": -1, "fastSweepSpeed": 1000}
            }
        })
    );

    assert_eq!(
        must_include(&schema, "essential"),
        json!({
            "runConfigs": {
                "GateSweep": {"gateVoltageMinimum": {"default": -1, "essential": true}}
            }
        })
    );

    let merged = merge_defaults(
        schema,
        json!({"runConfigs": {"GateSweep": {"gateVoltageMinimum": -0.5}}}),
    );
    assert_eq!(
        merged["runConfigs"]["GateSweep"]["gateVoltageMinimum"],
        json!({"default": -0.5, "essential": true})
    );
    assert_eq!(
        merged["runConfigs"]["GateSweep"]["fastSweepSpeed"],
        json!({"default": 1000})
    );
}

// ── Saved-record rehydration ────────────────────────────────────────────

#[test]
fn saved_record_rehydrates_with_metadata() {
    let schema = json!({
        "runType": {"type": "choice", "default": "GateSweep", "essential": true},
        "Identifiers": {
            "user": {"type": "string", "default": "", "essential": true},
            "device": {"type": "string", "default": "", "essential": true}
        },
        "runConfigs": {
            "GateSweep": {
                "dependencies": {"ignore": true, "value": []},
                "gateVoltageMinimum": {"type": "float", "default": -1.0, "units": "V"},
                "gateVoltageMaximum": {"type": "float", "default": 1.0, "units": "V"}
            }
        }
    });

    // A run starts from extracted defaults with user edits merged on top.
    let record = merge(
        extract_defaults(&schema),
        json!({
            "Identifiers": {"user": "stevenjay", "device": "12-13"},
            "runConfigs": {"GateSweep": {"gateVoltageMaximum": 0.8}}
        }),
    );
    assert_eq!(record["runType"], json!("GateSweep"));
    assert_eq!(record["Identifiers"]["user"], json!("stevenjay"));
    // The dependencies marker never reaches the value tree.
    assert!(record["runConfigs"]["GateSweep"].get("dependencies").is_none());

    // Loading the record back re-attaches descriptor metadata around the
    // stored values.
    let rehydrated = intersection_defaults(&record, &schema);
    assert_eq!(
        rehydrated["runConfigs"]["GateSweep"]["gateVoltageMaximum"],
        json!({"type": "float", "default": 0.8, "units": "V"})
    );
    assert_eq!(
        rehydrated["Identifiers"]["user"],
        json!({"type": "string", "default": "stevenjay", "essential": true})
    );
}

// ── Partial submissions ─────────────────────────────────────────────────

#[test]
fn web_submission_resolves_against_full_schema() {
    let schema = json!({
        "runConfigs": {
            "StaticBias": {
                "gateVoltageSetPoint": {"type": "float", "default": 0.0, "units": "V", "essential": true},
                "drainVoltageSetPoint": {"type": "float", "default": 0.5, "units": "V", "essential": true},
                "totalBiasTime": {"type": "int", "default": 60, "units": "s"}
            }
        }
    });

    // A schedule entry carries only what the user changed plus ad hoc notes.
    let submission = json!({
        "runConfigs": {
            "StaticBias": {"totalBiasTime": 3600}
        },
        "scheduleIndex": 2
    });

    let resolved = merge_defaults(schema, submission);
    assert_eq!(
        resolved["runConfigs"]["StaticBias"]["totalBiasTime"],
        json!({"type": "int", "default": 3600, "units": "s"})
    );
    // Untouched descriptors stay whole, ad hoc keys ride along bare.
    assert_eq!(
        resolved["runConfigs"]["StaticBias"]["gateVoltageSetPoint"]["default"],
        json!(0.0)
    );
    assert_eq!(resolved["scheduleIndex"], json!(2));
}

// ── Filter containment ──────────────────────────────────────────────────

#[test]
fn filtered_view_contains_exactly_marked_lineages() {
    let schema = json!({
        "runConfigs": {
            "GateSweep": {
                "gateVoltageMinimum": {"default": -1.0, "essential": true},
                "isFastSweep": {"default": false}
            },
            "NoiseCollection": {
                "measurementSpeed": {"default": 10000},
                "points": {"default": 60000}
            }
        },
        "MeasurementSystem": {
            "system": {"default": "B2912A", "essential": true},
            "NPLC": {"default": 1.0}
        }
    });

    let filtered = must_include(&schema, "essential");

    // Every surviving branch leads to a marked leaf.
    assert_eq!(
        filtered,
        json!({
            "runConfigs": {
                "GateSweep": {"gateVoltageMinimum": {"default": -1.0, "essential": true}}
            },
            "MeasurementSystem": {
                "system": {"default": "B2912A", "essential": true}
            }
        })
    );

    // A procedure with no marked parameter disappears entirely.
    assert!(filtered["runConfigs"].get("NoiseCollection").is_none());
}
