//! Console/log wire shape tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use lapse_core::{summarize, InstanceIdentity, Report, Trace};

fn sample_report() -> Report {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap();
    let mut a = Trace::started("mod.fn", start);
    a.stamp_end(start + Duration::seconds(30));
    let mut b = Trace::started("mod.other", start);
    b.stamp_end(start + Duration::milliseconds(120));

    Report {
        instance: InstanceIdentity {
            id: "7f6c1f7e-0b7a-4c3e-9d0e-3b9a8f1d2c4b".into(),
            hostname: "web-1".into(),
        },
        traces: summarize(&[a, b]),
    }
}

#[test]
fn json_round_trip() {
    let report = sample_report();
    let s = report.to_json().expect("encode");
    assert!(!s.contains('\n'), "report must be a single line");

    let back = Report::from_json(&s).expect("decode");
    assert_eq!(back, report);
}

#[test]
fn json_shape() {
    let v: Value = serde_json::from_str(&sample_report().to_json().unwrap()).unwrap();

    assert_eq!(v["instance"]["id"], "7f6c1f7e-0b7a-4c3e-9d0e-3b9a8f1d2c4b");
    assert_eq!(v["instance"]["hostname"], "web-1");

    let fnstats = &v["traces"]["mod.fn"];
    assert_eq!(fnstats["count"], 1);
    assert_eq!(fnstats["min"].as_f64().unwrap(), 30_000.0);
    assert_eq!(fnstats["max"].as_f64().unwrap(), 30_000.0);
    assert_eq!(fnstats["avg"].as_f64().unwrap(), 30_000.0);
    assert_eq!(v["traces"]["mod.other"]["avg"].as_f64().unwrap(), 120.0);
}

#[test]
fn generated_identity_is_unique() {
    let a = InstanceIdentity::generate("h");
    let b = InstanceIdentity::generate("h");
    assert_ne!(a.id, b.id);
    assert_eq!(a.id.len(), 36);
    assert_eq!(sample_report().trace_count(), 2);
}
