//! End-to-end tests for the training pipeline and session layer.

use polars::prelude::*;
use serde_json::json;

use insight_data::Dataset;
use insight_learning::{
    ModelType, Session, SplitPolicy, Trainer, TrainingRequest,
};

/// 100 customers: purchase decision driven by age, with a city column
/// that gets one-hot expanded.
fn customers() -> Dataset {
    let ages: Vec<i64> = (0..100).map(|i| 20 + (i * 37) % 50).collect();
    let cities: Vec<&str> = (0..100).map(|i| if i % 2 == 0 { "NY" } else { "LA" }).collect();
    let purchased: Vec<&str> = ages
        .iter()
        .map(|&age| if age >= 45 { "yes" } else { "no" })
        .collect();

    let df = df! {
        "age" => &ages,
        "city" => &cities,
        "purchased" => &purchased,
    }
    .unwrap();
    Dataset::new(df).unwrap()
}

/// 50 houses with a mostly-linear price, for the regression models.
fn houses() -> Dataset {
    let size: Vec<f64> = (0..50).map(|i| 40.0 + (i * 13 % 60) as f64).collect();
    let rooms: Vec<f64> = (0..50).map(|i| 1.0 + (i % 5) as f64).collect();
    let price: Vec<f64> = size
        .iter()
        .zip(&rooms)
        .map(|(s, r)| 3.0 * s + 5.0 * r + (s * r) % 7.0)
        .collect();

    let df = df! {
        "size" => &size,
        "rooms" => &rooms,
        "price" => &price,
    }
    .unwrap();
    Dataset::new(df).unwrap()
}

fn session_in(dir: &std::path::Path) -> Session {
    Session::new(Trainer::builder().with_artifact_dir(dir).build().unwrap())
}

#[test]
fn logistic_regression_on_mixed_columns() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.replace_dataset(customers());

    let report = session
        .train(&TrainingRequest {
            target_column: "purchased".to_string(),
            model_type: ModelType::LogisticRegression,
        })
        .unwrap();

    assert_eq!(report.feature_names, vec!["age", "city_LA", "city_NY"]);
    assert_eq!(report.class_labels, Some(vec!["no".to_string(), "yes".to_string()]));
    assert_eq!(report.split_info.train_size, 80);
    assert_eq!(report.split_info.test_size, 20);

    let accuracy = report.metrics.test_accuracy.unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    // The decision boundary is a clean age threshold.
    assert!(accuracy > 0.9);

    let importance = report.feature_importance.unwrap();
    let mut keys: Vec<&String> = importance.keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["age", "city_LA", "city_NY"]);

    let cm = report.metrics.confusion_matrix.unwrap();
    assert_eq!(cm.labels.len(), cm.matrix.len());
    let counted: usize = cm.matrix.iter().flatten().sum();
    assert_eq!(counted, 20);
}

#[test]
fn forest_classifier_reports_no_importance() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.replace_dataset(customers());

    let report = session
        .train(&TrainingRequest {
            target_column: "purchased".to_string(),
            model_type: ModelType::RandomForestClassifier,
        })
        .unwrap();

    assert!(report.feature_importance.is_none());
    assert!(report.metrics.test_accuracy.unwrap() > 0.8);
    assert!(report.metrics.test_mse.is_none());
}

#[test]
fn regression_models_report_error_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.replace_dataset(houses());

    for model_type in [ModelType::LinearRegression, ModelType::RandomForestRegressor] {
        let report = session
            .train(&TrainingRequest {
                target_column: "price".to_string(),
                model_type,
            })
            .unwrap();

        assert!(report.metrics.train_mse.is_some(), "{model_type}");
        assert!(report.metrics.test_mae.is_some(), "{model_type}");
        assert!(report.metrics.test_r2.is_some(), "{model_type}");
        assert!(report.metrics.test_accuracy.is_none(), "{model_type}");
        assert!(report.class_labels.is_none(), "{model_type}");
    }
}

#[test]
fn saved_artifact_predicts_original_labels() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.replace_dataset(customers());

    let report = session
        .train(&TrainingRequest {
            target_column: "purchased".to_string(),
            model_type: ModelType::RandomForestClassifier,
        })
        .unwrap();

    let artifact = session.load_artifact(&report.artifact).unwrap();
    assert_eq!(artifact.target_column, "purchased");
    assert_eq!(artifact.feature_names, report.feature_names);

    let records = [
        json!({"age": 65, "city": "NY"}),
        json!({"age": 21, "city": "LA"}),
    ];
    let records: Vec<_> = records
        .iter()
        .map(|r| r.as_object().unwrap().clone())
        .collect();
    let predictions = artifact.predict(&records).unwrap();

    assert_eq!(predictions[0], json!("yes"));
    assert_eq!(predictions[1], json!("no"));
}

#[test]
fn numeric_class_labels_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());

    let outcome: Vec<i64> = (0..40).map(|i| i64::from(i % 4 == 0)).collect();
    let score: Vec<f64> = outcome.iter().map(|&o| o as f64 * 10.0 + 1.0).collect();
    let df = df! {
        "score" => &score,
        "outcome" => &outcome,
    }
    .unwrap();
    session.replace_dataset(Dataset::new(df).unwrap());

    let report = session
        .train(&TrainingRequest {
            target_column: "outcome".to_string(),
            model_type: ModelType::RandomForestClassifier,
        })
        .unwrap();
    assert_eq!(report.class_labels, Some(vec!["0".to_string(), "1".to_string()]));

    let artifact = session.load_artifact(&report.artifact).unwrap();
    let record = json!({"score": 11.0});
    let predictions = artifact.predict(&[record.as_object().unwrap().clone()]).unwrap();
    assert_eq!(predictions[0], json!("1"));
}

#[test]
fn identical_runs_produce_identical_metrics() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let request = TrainingRequest {
        target_column: "price".to_string(),
        model_type: ModelType::LinearRegression,
    };

    let session_a = session_in(dir_a.path());
    session_a.replace_dataset(houses());
    let report_a = session_a.train(&request).unwrap();

    let session_b = session_in(dir_b.path());
    session_b.replace_dataset(houses());
    let report_b = session_b.train(&request).unwrap();

    assert_eq!(report_a.split_info, report_b.split_info);
    assert_eq!(report_a.metrics, report_b.metrics);
}

#[test]
fn custom_split_policy_changes_holdout_size() {
    let dir = tempfile::tempdir().unwrap();
    let trainer = Trainer::builder()
        .with_split_policy(SplitPolicy {
            test_ratio: 0.5,
            seed: 7,
        })
        .with_artifact_dir(dir.path())
        .build()
        .unwrap();
    let session = Session::new(trainer);
    session.replace_dataset(houses());

    let report = session
        .train(&TrainingRequest {
            target_column: "price".to_string(),
            model_type: ModelType::LinearRegression,
        })
        .unwrap();
    assert_eq!(report.split_info.test_size, 25);
}

#[test]
fn failed_training_leaves_no_artifact_and_envelope_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.replace_dataset(customers());

    let response = session.train_response(&TrainingRequest {
        target_column: "does_not_exist".to_string(),
        model_type: ModelType::LinearRegression,
    });

    assert!(!response.success);
    assert_eq!(response.error.unwrap()["code"], "TARGET_NOT_FOUND");
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn artifact_names_cannot_escape_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());

    let err = session.artifact_path("../outside.json").unwrap_err();
    assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
}

#[test]
fn regression_on_string_target_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_in(dir.path());
    session.replace_dataset(customers());

    let response = session.train_response(&TrainingRequest {
        target_column: "purchased".to_string(),
        model_type: ModelType::LinearRegression,
    });
    assert!(!response.success);
    assert_eq!(response.error.unwrap()["code"], "INVALID_DATA");
}
