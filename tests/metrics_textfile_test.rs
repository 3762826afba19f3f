use anyhow::Result;
use std::fs;
use tempfile::tempdir;
use titanic_etl::{load, metrics, Config, Pipeline, RunOptions};

const TITANIC_SAMPLE: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,,0,0,STON/O2. 3101282,7.925,,
4,1,1,\"Futrelle, Mrs. Jacques Heath (Lily May Peel)\",female,35,1,0,113803,53.1,C123,S
5,0,3,\"Allen, Mr. William Henry\",male,,0,0,373450,8.05,,C
";

// The recorder is process-global, so this file holds a single test.
#[test]
fn test_run_writes_metrics_snapshot() -> Result<()> {
    let dir = tempdir()?;
    let mut config = Config::default();
    config.input.path = dir.path().join("Titanic.csv");
    config.database.path = dir.path().join("etl.db");
    config.metrics.textfile = Some(dir.path().join("metrics").join("titanic_etl.prom"));
    fs::write(&config.input.path, TITANIC_SAMPLE)?;
    load::run_migrations(&load::connect(&config.database.path)?)?;

    let handle = metrics::install_recorder()?;
    Pipeline::new(&config).run(RunOptions::default())?;

    let path = config.metrics.textfile.as_ref().expect("textfile path");
    metrics::write_textfile(&handle, path)?;
    let rendered = fs::read_to_string(path)?;

    let lines: Vec<&str> = rendered.lines().collect();
    for expected in [
        "titanic_etl_runs_total 1",
        "titanic_etl_rows_extracted_total 5",
        "titanic_etl_rows_loaded_total 5",
        "titanic_etl_values_imputed_total{column=\"Age\"} 2",
        "titanic_etl_values_imputed_total{column=\"embarkation_port\"} 1",
    ] {
        assert!(
            lines.contains(&expected),
            "snapshot lacks '{expected}':\n{rendered}"
        );
    }
    assert!(rendered.contains("titanic_etl_stage_duration_seconds"));
    Ok(())
}
