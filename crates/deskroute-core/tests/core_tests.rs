use deskroute_core::{load_dataset, Error};
use std::io::Write;

#[test]
fn test_load_dataset_reads_jsonl_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"text": "Не могу войти в систему", "category": "access"}}"#).unwrap();
    writeln!(file, r#"{{"text": "Прошу оформить заявку на отпуск", "category": "requests"}}"#).unwrap();

    let samples = load_dataset(file.path()).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].category, "access");
    assert_eq!(samples[1].text, "Прошу оформить заявку на отпуск");
}

#[test]
fn test_load_dataset_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(dir.path().join("training_data.jsonl")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
