//! End-to-end parameter resolution against real YAML fixtures.
//!
//! Covers:
//! - Every mandatory key: removal fails with that exact path
//! - Every optional key: removal keeps the prior
//! - Shape mismatches (N±1 elements, nested elements) are type errors
//! - Load and parse failures are distinguished

use sd_config::binding::{mandatory_bindings, optional_bindings};
use sd_config::{
    ConfigError, Origin, ParameterSet, ParameterSetBuilder, PriorConfig, Shape, BINDINGS,
};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name)).expect("read fixture")
}

fn minimal_document() -> Value {
    serde_yaml::from_str(&fixture_text("minimal.yaml")).expect("parse minimal fixture")
}

/// Remove the leaf at a dotted path, leaving parents in place.
fn remove_path(doc: &mut Value, path: &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = segments.pop().expect("non-empty path");
    let mut node = doc;
    for segment in segments {
        node = node.get_mut(segment).expect("parent exists");
    }
    node.as_mapping_mut()
        .expect("parent is a mapping")
        .remove(leaf);
}

/// Set the leaf at a dotted path, creating parent mappings as needed.
fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = segments.pop().expect("non-empty path");
    let mut node = doc;
    for segment in segments {
        let map = node.as_mapping_mut().expect("mapping");
        if !map.contains_key(segment) {
            map.insert(Value::from(segment), Value::Mapping(Mapping::new()));
        }
        node = node.get_mut(segment).expect("just inserted");
    }
    node.as_mapping_mut()
        .expect("parent is a mapping")
        .insert(Value::from(leaf), value);
}

fn resolve(doc: &Value) -> Result<ParameterSet, ConfigError> {
    ParameterSetBuilder::new(&PriorConfig::default())
        .build(doc)
        .map(|r| r.params)
}

fn floats(n: usize) -> Value {
    Value::Sequence((0..n).map(|i| Value::from(i as f64 + 1.0)).collect())
}

fn assert_type_error(result: Result<ParameterSet, ConfigError>, path: &str) {
    match result {
        Err(ConfigError::TypeError(p)) => assert_eq!(p, path),
        other => panic!("expected TypeError({path}), got {other:?}"),
    }
}

// ============================================================================
// Minimal and full documents
// ============================================================================

#[test]
fn minimal_document_uses_priors_for_every_optional() {
    let priors = PriorConfig::default();
    let params = ParameterSet::from_file(&fixtures_dir().join("minimal.yaml"), &priors).unwrap();

    let k = params.camera_intrinsic();
    assert_eq!(k[(0, 0)], 1.0);
    assert_eq!(k[(1, 1)], 2.0);
    assert_eq!(k[(0, 2)], 3.0);
    assert_eq!(k[(1, 2)], 4.0);
    assert_eq!(k[(0, 1)], 0.0);
    assert_eq!(k[(2, 2)], 1.0);

    assert_eq!(params.plane_distance_cov(), priors.plane_distance_cov);
    assert_eq!(params.output_to_body_rotation(), priors.output_to_body_rotation);
    assert_eq!(params.output_to_body_translation(), priors.output_to_body_translation);
    assert_eq!(params.sliding_window_size(), priors.sliding_window_size);
    assert_eq!(
        params.feature_tracker_min_keypoint_distance(),
        priors.feature_tracker_min_keypoint_distance
    );
    assert_eq!(
        params.feature_tracker_max_keypoint_detection(),
        priors.feature_tracker_max_keypoint_detection
    );
    assert_eq!(params.feature_tracker_max_init_frames(), priors.feature_tracker_max_init_frames);
    assert_eq!(params.feature_tracker_max_frames(), priors.feature_tracker_max_frames);
    assert_eq!(
        params.feature_tracker_predict_keypoints(),
        priors.feature_tracker_predict_keypoints
    );
    assert_eq!(params.initializer_keyframe_gap(), priors.initializer_keyframe_gap);
    assert_eq!(params.initializer_min_matches(), priors.initializer_min_matches);
    assert_eq!(params.initializer_min_parallax(), priors.initializer_min_parallax);
    assert_eq!(params.initializer_min_triangulation(), priors.initializer_min_triangulation);
    assert_eq!(params.initializer_min_landmarks(), priors.initializer_min_landmarks);
    assert_eq!(params.initializer_refine_imu(), priors.initializer_refine_imu);
    assert_eq!(params.solver_iteration_limit(), priors.solver_iteration_limit);
    assert_eq!(params.solver_time_limit(), priors.solver_time_limit);
}

#[test]
fn full_document_overrides_every_optional() {
    let resolved = ParameterSetBuilder::new(&PriorConfig::default())
        .build_file(&fixtures_dir().join("full.yaml"))
        .unwrap();
    let params = &resolved.params;

    assert_eq!(params.plane_distance_cov(), 0.01);
    assert_eq!(params.output_to_body_translation()[2], 0.3);
    assert_eq!(params.output_to_body_rotation().k, 0.7071068);
    assert_eq!(params.sliding_window_size(), 12);
    assert!(!params.feature_tracker_predict_keypoints());
    assert!(!params.initializer_refine_imu());
    assert_eq!(params.initializer_min_parallax(), 15.0);
    assert_eq!(params.solver_iteration_limit(), 20);
    assert_eq!(params.solver_time_limit(), 0.06);

    assert_eq!(resolved.report.count(Origin::Prior), 0);
    assert_eq!(resolved.report.count(Origin::Document), BINDINGS.len());
    assert_eq!(resolved.report.unrecognized_keys, vec!["camera_model".to_string()]);
}

#[test]
fn quaternion_coefficients_are_xyzw() {
    let params =
        ParameterSet::from_file(&fixtures_dir().join("full.yaml"), &PriorConfig::default()).unwrap();
    let q = params.camera_to_body_rotation();
    assert_eq!(q.i, -0.0077);
    assert_eq!(q.j, 0.0105);
    assert_eq!(q.k, 0.7018);
    assert_eq!(q.w, 0.7123);
}

#[test]
fn custom_priors_flow_through() {
    let priors = PriorConfig::from_file(&fixtures_dir().join("priors.yaml")).unwrap();
    let params = ParameterSet::from_file(&fixtures_dir().join("minimal.yaml"), &priors).unwrap();
    assert_eq!(params.sliding_window_size(), 20);
    assert_eq!(params.solver_time_limit(), 0.1);
}

// ============================================================================
// Presence
// ============================================================================

#[test]
fn each_missing_mandatory_key_names_its_path() {
    for binding in mandatory_bindings() {
        let mut doc = minimal_document();
        remove_path(&mut doc, binding.path);
        match resolve(&doc) {
            Err(ConfigError::ConfigMissing(path)) => assert_eq!(path, binding.path),
            other => panic!("{}: expected ConfigMissing, got {other:?}", binding.path),
        }
    }
}

#[test]
fn missing_parent_mapping_is_missing_key() {
    let mut doc = minimal_document();
    doc.as_mapping_mut().unwrap().remove("imu");
    match resolve(&doc) {
        Err(ConfigError::ConfigMissing(path)) => assert_eq!(path, "imu.extrinsic.q_bi"),
        other => panic!("expected ConfigMissing, got {other:?}"),
    }
}

#[test]
fn each_absent_optional_key_keeps_prior() {
    let full: Value = serde_yaml::from_str(&fixture_text("full.yaml")).unwrap();
    let baseline = ParameterSetBuilder::new(&PriorConfig::default())
        .build(&full)
        .unwrap();

    for binding in optional_bindings() {
        let mut doc = full.clone();
        remove_path(&mut doc, binding.path);
        let resolved = ParameterSetBuilder::new(&PriorConfig::default())
            .build(&doc)
            .unwrap();
        assert_eq!(resolved.report.origin(binding.path), Some(Origin::Prior), "{}", binding.path);
        assert_ne!(resolved.params, baseline.params, "{} should revert", binding.path);
    }
}

#[test]
fn sliding_window_size_scalar_and_sequence() {
    let mut doc = minimal_document();
    set_path(&mut doc, "sliding_window_size", Value::from(42u64));
    assert_eq!(resolve(&doc).unwrap().sliding_window_size(), 42);

    set_path(&mut doc, "sliding_window_size", floats(2));
    assert_type_error(resolve(&doc), "sliding_window_size");
}

#[test]
fn explicit_null_is_type_error_not_missing() {
    let mut doc = minimal_document();
    set_path(&mut doc, "camera.noise", Value::Null);
    assert_type_error(resolve(&doc), "camera.noise");

    let mut doc = minimal_document();
    set_path(&mut doc, "solver.time_limit", Value::Null);
    assert_type_error(resolve(&doc), "solver.time_limit");
}

// ============================================================================
// Shape
// ============================================================================

#[test]
fn every_sequence_binding_rejects_off_by_one_lengths() {
    for binding in BINDINGS.iter() {
        let Some(n) = binding.shape().element_count() else {
            continue;
        };
        for len in [n - 1, n + 1] {
            let mut doc = minimal_document();
            set_path(&mut doc, binding.path, floats(len));
            assert_type_error(resolve(&doc), binding.path);
        }
    }
}

#[test]
fn every_sequence_binding_rejects_nested_element() {
    for binding in BINDINGS.iter() {
        let Some(n) = binding.shape().element_count() else {
            continue;
        };
        let mut elements: Vec<Value> = (0..n).map(|_| Value::from(1.0)).collect();
        elements[n / 2] = floats(2);
        let mut doc = minimal_document();
        set_path(&mut doc, binding.path, Value::Sequence(elements));
        assert_type_error(resolve(&doc), binding.path);
    }
}

#[test]
fn every_scalar_binding_rejects_sequence() {
    for binding in BINDINGS.iter().filter(|b| b.shape().element_count().is_none()) {
        let mut doc = minimal_document();
        set_path(&mut doc, binding.path, floats(1));
        assert_type_error(resolve(&doc), binding.path);
    }
}

#[test]
fn nested_matrix_rows_are_rejected() {
    let mut doc = minimal_document();
    set_path(
        &mut doc,
        "camera.noise",
        serde_yaml::from_str("[[1, 0], [0, 1]]").unwrap(),
    );
    assert_type_error(resolve(&doc), "camera.noise");
}

#[test]
fn matrix_is_filled_row_major() {
    let mut doc = minimal_document();
    set_path(&mut doc, "imu.noise.cov_a", floats(9));
    let m = resolve(&doc).unwrap().accelerometer_noise_cov();
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(m[(i, j)], (i * 3 + j) as f64 + 1.0);
        }
    }
}

#[test]
fn non_numeric_count_is_type_error() {
    let mut doc = minimal_document();
    set_path(&mut doc, "solver.iteration_limit", Value::from("many"));
    assert_type_error(resolve(&doc), "solver.iteration_limit");

    set_path(&mut doc, "solver.iteration_limit", Value::from(-3));
    assert_type_error(resolve(&doc), "solver.iteration_limit");
}

#[test]
fn shapes_match_the_schema() {
    let shape_of = |path: &str| {
        BINDINGS
            .iter()
            .find(|b| b.path == path)
            .map(|b| b.shape())
            .unwrap()
    };
    assert_eq!(shape_of("camera.intrinsic"), Shape::Vector(4));
    assert_eq!(shape_of("camera.noise"), Shape::Matrix { rows: 2, cols: 2 });
    assert_eq!(shape_of("imu.noise.cov_ba"), Shape::Matrix { rows: 3, cols: 3 });
    assert_eq!(shape_of("output.p_bo"), Shape::Vector(3));
    assert_eq!(shape_of("initializer.refine_imu"), Shape::Bool);
    assert_eq!(shape_of("plane.noise"), Shape::Float);
}

// ============================================================================
// Load and parse failures
// ============================================================================

#[test]
fn malformed_document_is_parse_error() {
    let err = ParameterSet::from_file(&fixtures_dir().join("malformed.yaml"), &PriorConfig::default())
        .unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)), "got {err:?}");
    assert_eq!(err.code(), 41);
}

#[test]
fn nonexistent_file_is_load_error() {
    let path = fixtures_dir().join("does-not-exist.yaml");
    let err = ParameterSet::from_file(&path, &PriorConfig::default()).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError { .. }), "got {err:?}");
    assert_eq!(err.resource(), Some(path.display().to_string().as_str()));
}

#[test]
fn empty_document_reports_first_mandatory_key() {
    let err = ParameterSet::from_yaml("", &PriorConfig::default()).unwrap_err();
    assert_eq!(err.path(), Some("camera.intrinsic"));
}

#[test]
fn rendered_document_resolves_to_equal_set() {
    let params =
        ParameterSet::from_file(&fixtures_dir().join("full.yaml"), &PriorConfig::default()).unwrap();
    let rendered = params.to_document();
    assert_eq!(resolve(&rendered).unwrap(), params);
}

#[test]
fn non_utf8_document_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.yaml");
    std::fs::write(&path, b"camera:\n  intrinsic: [1, 2, 3, \xff\xfe]\n").unwrap();

    let err = ParameterSet::from_file(&path, &PriorConfig::default()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)), "got {err:?}");
    assert_eq!(err.code(), 41);
}

#[test]
fn non_finite_values_survive_yaml_rendering() {
    let mut doc = minimal_document();
    set_path(&mut doc, "solver.time_limit", Value::from(f64::INFINITY));
    set_path(&mut doc, "plane.noise", Value::from(f64::NEG_INFINITY));
    let params = resolve(&doc).unwrap();
    assert_eq!(params.solver_time_limit(), f64::INFINITY);

    let text = serde_yaml::to_string(&params.to_document()).unwrap();
    assert!(text.contains(".inf"), "{text}");
    let again = ParameterSet::from_yaml(&text, &PriorConfig::default()).unwrap();
    assert_eq!(again, params);
}
