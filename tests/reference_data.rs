use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;
use serde::Serialize;
use tempdir::TempDir;

use helium_viscosity::dataset::{Manifest, SourceEntry, DATASET_VERSION, MANIFEST_FILE};
use helium_viscosity::{compute_deviations, Correlation, Dataset, Error, MarkerSymbol, ReferenceData, Result};

#[derive(Serialize)]
struct Row {
    temperature: f64,
    pressure: f64,
    viscosity: f64,
}

fn write_manifest(dir: &TempDir, version: u32, sources: &[(&str, MarkerSymbol)]) {
    let manifest = Manifest {
        version,
        name: "generated".to_owned(),
        sources: sources
            .iter()
            .map(|(label, marker)| SourceEntry {
                label: (*label).to_owned(),
                marker: *marker,
                file: format!("{label}.csv").into(),
            })
            .collect(),
    };
    std::fs::write(
        dir.path().join(MANIFEST_FILE),
        toml::to_string(&manifest).unwrap(),
    )
    .unwrap();
}

fn generate_isotherms<R: Rng>(
    dir: &TempDir,
    label: &str,
    temperatures: &[f64],
    num_pressures: usize,
    rng: &mut R,
) -> Vec<Row> {
    let mut rows = vec![];
    for &temperature in temperatures {
        for _ in 0..num_pressures {
            let pressure = rng.gen_range(0.1f64..50.0);
            let viscosity = Correlation::KtaMod.viscosity(temperature, pressure)
                * rng.gen_range(0.99f64..1.01);
            rows.push(Row {
                temperature,
                pressure,
                viscosity,
            });
        }
    }

    let mut wtr = csv::Writer::from_path(dir.path().join(format!("{label}.csv"))).unwrap();
    for row in &rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
    rows
}

#[test]
fn dataset_directory_is_loaded_in_manifest_order() -> Result<()> {
    let seed = 40;
    let mut rng = Isaac64Rng::seed_from_u64(seed);

    // Arrange
    let tmp_dir = TempDir::new("dataset_directory_is_loaded_in_manifest_order").unwrap();
    let sources = [("beta", MarkerSymbol::Square), ("alpha", MarkerSymbol::Plus)];
    write_manifest(&tmp_dir, DATASET_VERSION, &sources);
    let num_pressures = rng.gen_range(2..10);
    let beta = generate_isotherms(&tmp_dir, "beta", &[273.15, 293.15], num_pressures, &mut rng);
    let alpha = generate_isotherms(&tmp_dir, "alpha", &[293.4], num_pressures, &mut rng);

    // Act
    let dataset = Dataset::load(tmp_dir.path())?;

    // Assert
    assert_eq!(dataset.name(), "generated");
    let labels = dataset
        .sources()
        .iter()
        .map(|series| series.label())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["beta", "alpha"]);
    assert_eq!(dataset.sources()[0].len(), beta.len());
    assert_eq!(dataset.sources()[1].marker(), MarkerSymbol::Plus);
    for (row, pressure) in alpha.iter().zip(dataset.sources()[1].pressures()) {
        approx::assert_relative_eq!(row.pressure, *pressure);
    }

    let records = compute_deviations(&dataset, 293.15, Correlation::KtaMod)?;
    assert_eq!(records.len(), 2 * num_pressures);
    assert!(records[..num_pressures].iter().all(|r| r.source_label == "beta"));
    assert!(records[num_pressures..].iter().all(|r| r.source_label == "alpha"));
    for record in records.iter().filter(|r| r.source_label == "beta") {
        assert!(record.relative_deviation_pct.abs() <= 1.02);
    }
    Ok(())
}

#[test]
fn future_manifest_versions_are_refused() {
    let tmp_dir = TempDir::new("future_manifest_versions_are_refused").unwrap();
    write_manifest(&tmp_dir, DATASET_VERSION + 1, &[]);

    let result = Dataset::load(tmp_dir.path());

    assert!(matches!(result, Err(Error::UnsupportedDatasetVersion(v)) if v == DATASET_VERSION + 1));
}

#[test]
fn missing_source_file_names_the_path() {
    let tmp_dir = TempDir::new("missing_source_file_names_the_path").unwrap();
    write_manifest(&tmp_dir, DATASET_VERSION, &[("absent", MarkerSymbol::Circle)]);

    let err = Dataset::load(tmp_dir.path()).unwrap_err();

    assert!(matches!(&err, Error::Io { path, .. } if path.ends_with("absent.csv")));
}

#[test]
fn malformed_rows_are_reported() {
    let tmp_dir = TempDir::new("malformed_rows_are_reported").unwrap();
    write_manifest(&tmp_dir, DATASET_VERSION, &[("broken", MarkerSymbol::Circle)]);
    std::fs::write(
        tmp_dir.path().join("broken.csv"),
        "temperature,pressure,viscosity\n293.15,ten,19.6\n",
    )
    .unwrap();

    assert!(matches!(Dataset::load(tmp_dir.path()), Err(Error::Csv(_))));
}

#[test]
fn unknown_marker_in_manifest_is_rejected() {
    let tmp_dir = TempDir::new("unknown_marker_in_manifest_is_rejected").unwrap();
    std::fs::write(
        tmp_dir.path().join(MANIFEST_FILE),
        "version = 1\nname = \"m\"\n\n[[sources]]\nlabel = \"a\"\nmarker = \"Q\"\nfile = \"a.csv\"\n",
    )
    .unwrap();

    let err = Dataset::load(tmp_dir.path()).unwrap_err();

    assert!(matches!(err, Error::Toml(_)));
    assert!(err.to_string().contains('Q'));
}
