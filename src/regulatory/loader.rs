use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{RegulatoryConfig, RegulatoryConfigError, RegulatoryDocument};
use crate::engine::RegulatoryBand;

/// Reads a JSON regulatory document, merges its CSV schedules, and validates the result.
pub fn load_config_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<RegulatoryConfig, RegulatoryConfigError> {
    let path = path.as_ref();
    let file = open(path)?;
    let document: RegulatoryDocument = serde_json::from_reader(file)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let document = resolve_schedule_files(document, base_dir)?;
    RegulatoryConfig::from_document(document)
}

/// Loads each `schedule_files` entry (relative to `base_dir`) into `schedules`.
pub fn resolve_schedule_files(
    mut document: RegulatoryDocument,
    base_dir: &Path,
) -> Result<RegulatoryDocument, RegulatoryConfigError> {
    let files = std::mem::take(&mut document.schedule_files);

    for (name, relative) in files {
        if document.schedules.contains_key(&name) {
            return Err(RegulatoryConfigError::DuplicateSchedule { name });
        }

        let path = base_dir.join(&relative);
        let bands = read_bands_csv(&name, open(&path)?)?;
        document.schedules.insert(name, bands);
    }

    Ok(document)
}

/// Parses `lower_bound,upper_bound,rate,label` rows. An empty upper bound marks the top band.
pub fn read_bands_csv<R: Read>(
    name: &str,
    reader: R,
) -> Result<Vec<RegulatoryBand>, RegulatoryConfigError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<RegulatoryBand>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| RegulatoryConfigError::Csv {
            name: name.to_string(),
            source,
        })
}

fn open(path: &Path) -> Result<File, RegulatoryConfigError> {
    File::open(path).map_err(|source| RegulatoryConfigError::Io {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PropertyType, ScheduleError};
    use std::io::Cursor;

    const BANDS_CSV: &str = "lower_bound,upper_bound,rate,label\n\
        0,100000,0.01,First 100k\n\
        100000,300000,0.03,Next 200k\n\
        300000,,0.05,Above 300k\n";

    const DOCUMENT_JSON: &str = r#"{
        "effective_from": "2025-07-01",
        "schedules": {
            "flat_levy": [
                { "lower_bound": 0, "upper_bound": null, "rate": 0.02, "label": "All" }
            ]
        },
        "ratio_rules": [
            { "name": "tdsr", "kind": "total_debt_service", "ceiling": 0.55 },
            {
                "name": "msr",
                "kind": "mortgage_service",
                "ceiling": 0.3,
                "applicable_property_types": ["hdb_flat"]
            }
        ],
        "no_applicable_rule": { "policy": "default_ceiling", "ceiling": 0.5 },
        "loan_policy": {
            "stress_test_floor_pct": { "private_condominium": 4.0 },
            "max_tenure_years": { "hdb_flat": 25 },
            "max_loan_to_value": 0.75
        }
    }"#;

    #[test]
    fn csv_bands_treat_empty_upper_bound_as_open() {
        let bands = read_bands_csv("sample", Cursor::new(BANDS_CSV)).expect("parses csv");

        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].upper_bound, Some(100_000.0));
        assert!(bands[2].is_unbounded());
        assert_eq!(bands[1].label, "Next 200k");
    }

    #[test]
    fn csv_with_bad_numbers_reports_schedule_name() {
        let raw = "lower_bound,upper_bound,rate,label\nzero,10,0.01,Broken\n";

        match read_bands_csv("broken", Cursor::new(raw)) {
            Err(RegulatoryConfigError::Csv { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("expected csv error, got {other:?}"),
        }
    }

    #[test]
    fn json_document_parses_and_validates() {
        let document: RegulatoryDocument =
            serde_json::from_str(DOCUMENT_JSON).expect("document parses");
        let config = RegulatoryConfig::from_document(document).expect("document validates");

        assert_eq!(config.schedule_names().collect::<Vec<_>>(), vec!["flat_levy"]);
        let msr = &config.ratio_rules().rules()[1];
        assert!(msr.applies_to(PropertyType::HdbFlat));
        assert!(!msr.applies_to(PropertyType::LandedHouse));
        assert_eq!(
            config
                .loan_policy()
                .effective_rate(PropertyType::PrivateCondominium, 3.1),
            4.0
        );
    }

    #[test]
    fn schedule_files_merge_and_validate() {
        let dir = std::env::temp_dir().join(format!("realty-finance-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        std::fs::write(dir.join("levy.csv"), BANDS_CSV).expect("write csv");

        let mut document: RegulatoryDocument =
            serde_json::from_str(DOCUMENT_JSON).expect("document parses");
        document
            .schedule_files
            .insert("tiered_levy".to_string(), PathBuf::from("levy.csv"));
        std::fs::write(
            dir.join("regulatory.json"),
            serde_json::to_vec(&document).expect("serializes"),
        )
        .expect("write json");

        let config = load_config_from_path(dir.join("regulatory.json")).expect("loads");
        let assessment = config
            .schedule("tiered_levy")
            .expect("csv schedule merged")
            .evaluate(250_000.0)
            .expect("evaluates");
        assert!((assessment.total - 5_500.0).abs() < 1e-6);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn duplicate_schedule_names_are_rejected() {
        let mut document: RegulatoryDocument =
            serde_json::from_str(DOCUMENT_JSON).expect("document parses");
        document
            .schedule_files
            .insert("flat_levy".to_string(), PathBuf::from("unused.csv"));

        assert!(matches!(
            resolve_schedule_files(document, Path::new(".")),
            Err(RegulatoryConfigError::DuplicateSchedule { .. })
        ));
    }

    #[test]
    fn malformed_csv_schedule_fails_validation() {
        let raw = "lower_bound,upper_bound,rate,label\n0,100,0.01,Low\n120,,0.02,High\n";
        let bands = read_bands_csv("gappy", Cursor::new(raw)).expect("parses csv");

        assert!(matches!(
            crate::engine::BandSchedule::new(bands),
            Err(ScheduleError::Gap { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        match load_config_from_path("/definitely/not/here.json") {
            Err(RegulatoryConfigError::Io { path, .. }) => {
                assert!(path.ends_with("here.json"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
