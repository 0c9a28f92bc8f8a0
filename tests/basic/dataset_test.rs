use std::fs::read_to_string;
use tinybatt::dataset::{
    handle_missing_values, load_dataset, write_csv, DataLoader, FeatureMapper, LoadOptions,
    MissingStrategy, Value,
};

use crate::common;

#[test]
fn test_process_dataset_when_csv_expect_standard_features() {
    let path = common::get_dataset_path("cells.csv");
    let processed = DataLoader::new()
        .process_dataset(&path, &LoadOptions::default())
        .unwrap();
    assert_eq!(processed.raw_data.shape(), (4, 7));
    assert_eq!(
        processed.available_features,
        vec!["capacity", "voltage", "current", "temperature", "charge_time"]
    );
    assert_eq!(
        processed.feature_mapping.get("capacity"),
        Some("Discharge_Capacity_Ah")
    );
    assert_eq!(processed.feature_mapping.get("discharge_time"), None);
    assert_eq!(processed.processed_data.missing_count(), 4);
}

#[test]
fn test_process_dataset_when_json_records_expect_standard_features() {
    let path = common::get_dataset_path("cells.json");
    let processed = DataLoader::new()
        .process_dataset(&path, &LoadOptions::default())
        .unwrap();
    assert_eq!(
        processed.available_features,
        vec!["voltage", "current", "temperature"]
    );
    assert_eq!(processed.feature_mapping.get("temperature"), Some("batt_temp"));
    assert_eq!(processed.processed_data.shape(), (3, 3));
}

#[test]
fn test_load_dataset_when_unsupported_format_expect_error() {
    let td = common::initialize_workspace();
    let path = td.path().join("cells.xlsx");
    std::fs::write(&path, b"not really a workbook").unwrap();
    let actual = load_dataset(&path, &LoadOptions::default()).unwrap_err();
    assert!(
        actual.to_string().starts_with("Unsupported file format: .xlsx"),
        "{actual}"
    );
}

#[test]
fn test_map_then_fill_with_mean_leaves_no_gaps() {
    let path = common::get_dataset_path("cells.csv");
    let processed = DataLoader::new()
        .process_dataset(&path, &LoadOptions::default())
        .unwrap();
    let clean = handle_missing_values(&processed.processed_data, MissingStrategy::Mean);
    assert_eq!(clean.missing_count(), 0);
    assert_eq!(clean.shape(), processed.processed_data.shape());
    let voltage = clean.column("voltage").unwrap();
    let filled = voltage.values[3].as_f64().unwrap();
    assert!((filled - 4.17).abs() < 1e-9, "{filled}");
}

#[test]
fn test_map_then_drop_and_write_csv() {
    let path = common::get_dataset_path("cells.csv");
    let processed = DataLoader::new()
        .process_dataset(&path, &LoadOptions::default())
        .unwrap();
    let clean = handle_missing_values(&processed.processed_data, MissingStrategy::Drop);
    assert_eq!(clean.shape(), (1, 5));

    let td = common::initialize_workspace();
    let out_path = td.path().join("out.csv");
    write_csv(&clean, std::fs::File::create(&out_path).unwrap()).unwrap();
    let written = read_to_string(&out_path).unwrap();
    assert_eq!(
        written,
        "capacity,voltage,current,temperature,charge_time\n2.05,4.19,-2,24.1,3600\n"
    );
}

#[test]
fn test_custom_mapper_detects_soc_column() {
    let mut mapper = FeatureMapper::new();
    mapper
        .add_custom_pattern("soc", &["state_of_charge", "soc"])
        .unwrap();
    let table = tinybatt::dataset::loader::read_csv(
        "Voltage,SoC_percent\n3.9,80\n".as_bytes(),
        b',',
    )
    .unwrap();
    let processed = DataLoader::with_mapper(mapper).process_table(table);
    assert_eq!(processed.available_features, vec!["voltage", "soc"]);
    assert_eq!(
        processed.processed_data.column("soc").unwrap().values,
        vec![Value::Number(80.0)]
    );
}
