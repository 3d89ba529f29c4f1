use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_documented_tunables() {
    let o = ArenaOpts::default();
    assert_eq!(o.pick_slow_threshold_ms, 10.0);
    assert_eq!(o.pick_skip_unit_ms, 5.0);
    assert_eq!(o.outline_tolerance, 1.25);
    assert_eq!(o.stroke_tolerance, 0.1);
    assert_eq!(o.outline_line_width, 0.5);
    assert_eq!(o.min_stroke_width, 0.125);
    assert!(o.delayed_shapes);
    assert!(o.validate().is_ok());
}

#[test]
fn env_overrides_are_parsed_and_filtered() {
    let o = ArenaOpts::from_lookup(lookup(&[
        ("VECTOR_ARENA_PICK_SLOW_MS", " 25 "),
        ("VECTOR_ARENA_PICK_SKIP_MS", "2.5"),
        ("VECTOR_ARENA_DELAYED_SHAPES", "off"),
    ]));
    assert_eq!(o.pick_slow_threshold_ms, 25.0);
    assert_eq!(o.pick_skip_unit_ms, 2.5);
    assert!(!o.delayed_shapes);

    let bad = ArenaOpts::from_lookup(lookup(&[
        ("VECTOR_ARENA_PICK_SLOW_MS", "-1"),
        ("VECTOR_ARENA_PICK_SKIP_MS", "0"),
        ("VECTOR_ARENA_DELAYED_SHAPES", "maybe"),
    ]));
    assert_eq!(bad, ArenaOpts::default());
}

#[test]
fn json_fills_missing_fields_and_validates() {
    let o = ArenaOpts::from_json(r#"{ "pick_skip_unit_ms": 1.0 }"#).unwrap();
    assert_eq!(o.pick_skip_unit_ms, 1.0);
    assert_eq!(o.pick_slow_threshold_ms, 10.0);

    let err = ArenaOpts::from_json(r#"{ "pick_skip_unit_ms": 0.0 }"#).unwrap_err();
    assert!(err.to_string().contains("pick_skip_unit_ms"));
    let err = ArenaOpts::from_json(r#"{ "nope": 1 }"#).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}

#[test]
fn builders_set_fields() {
    let o = ArenaOpts::default()
        .with_pick_slow_threshold_ms(3.0)
        .with_min_stroke_width(1.0)
        .with_delayed_shapes(false);
    assert_eq!(o.pick_slow_threshold_ms, 3.0);
    assert_eq!(o.min_stroke_width, 1.0);
    assert!(!o.delayed_shapes);
}

#[test]
fn system_clock_is_monotonic() {
    let c = SystemClock::new();
    let a = c.now_ms();
    let b = c.now_ms();
    assert!(b >= a);
}

#[test]
fn json_files_load_and_io_failures_wrap() {
    let path = std::env::temp_dir().join(format!("vector-arena-opts-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "pick_skip_unit_ms": 2.0 }"#).unwrap();
    let o = ArenaOpts::from_json_file(&path).unwrap();
    assert_eq!(o.pick_skip_unit_ms, 2.0);
    std::fs::remove_file(&path).unwrap();

    let err = ArenaOpts::from_json_file(&path).unwrap_err();
    assert!(matches!(err, ArenaError::Other(_)));
    assert!(err.to_string().contains("failed to read arena options"));
}
