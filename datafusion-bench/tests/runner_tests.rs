use bench_results::ResultsStore;
use datafusion_bench::{BenchConfig, Error, ExperimentRunner};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const HEADER: &str = ",id,title,target,vote_count,status,release_date,revenue,runtime,adult,budget,imdb_id,original_language,original_title,overview,popularity,tagline,genres,production_companies,production_countries,spoken_languages,keywords";

/// (title, language) pairs; 5 en, 3 fr, 1 ja
const MOVIES: [(&str, &str); 9] = [
    ("Inception", "en"),
    ("Amelie", "fr"),
    ("Interstellar", "en"),
    ("Spirited Away", "ja"),
    ("Heat", "en"),
    ("La Haine", "fr"),
    ("Alien", "en"),
    ("Intouchables", "fr"),
    ("Arrival", "en"),
];

fn write_dataset(dir: &Path) -> std::path::PathBuf {
    write_dataset_with(dir, |_| ("120".to_string(), "false"))
}

/// Dataset whose `runtime` and `adult` cells come from `cells(row)`
fn write_dataset_with(
    dir: &Path,
    cells: impl Fn(usize) -> (String, &'static str),
) -> std::path::PathBuf {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for (idx, (title, language)) in MOVIES.iter().enumerate() {
        // Leave popularity empty on one row to exercise nulls
        let popularity = if idx == 3 { String::new() } else { format!("{}.5", idx) };
        let (runtime, adult) = cells(idx);
        csv.push_str(&format!(
            "{idx},{id},{title},1,{votes},Released,2010-07-15,{revenue},{runtime},{adult},1000000,tt{id},{language},{title},\"A story, with a comma\",{popularity},Tagline,\"Drama, Thriller\",Studio,Somewhere,English,keyword\n",
            idx = idx,
            id = 1000 + idx,
            title = title,
            votes = 10 * idx,
            revenue = 5_000_000_000u64 + idx as u64,
            runtime = runtime,
            adult = adult,
            language = language,
            popularity = popularity,
        ));
    }

    let path = dir.join("test_data.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn test_config(dir: &Path) -> BenchConfig {
    BenchConfig {
        dataset_path: write_dataset(dir),
        results_path: dir.join("out").join("results.json"),
        sample_interval: Duration::from_millis(20),
        target_partitions: Some(2),
        ..BenchConfig::default()
    }
}

fn expected_counts() -> Vec<(Option<String>, i64)> {
    vec![
        (Some("en".to_string()), 5),
        (Some("fr".to_string()), 3),
        (Some("ja".to_string()), 1),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_run_persists_result() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let runner = ExperimentRunner::new(config.clone());

    let report = runner.run(false, "node1_plain").await.expect("run failed");

    assert_eq!(report.initial_rows, MOVIES.len());
    assert_eq!(report.sorted_counts, expected_counts());
    assert!(report.result.ops_time <= report.result.total_time);
    assert!(!report.result.memory_usage_over_time.is_empty());

    let store = ResultsStore::load(&config.results_path).unwrap();
    assert_eq!(store.keys(), vec!["node1_plain"]);
    assert_eq!(store.get("node1_plain").unwrap(), &report.result);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_optimized_run_gives_same_counts() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let runner = ExperimentRunner::new(config.clone());

    let plain = runner.run(false, "node1_plain").await.unwrap();
    let optimized = runner.run(true, "node1_opt").await.unwrap();

    assert_eq!(optimized.sorted_counts, plain.sorted_counts);
    assert!(optimized.result.ops_time <= optimized.result.total_time);

    let store = ResultsStore::load(&config.results_path).unwrap();
    assert_eq!(store.keys(), vec!["node1_opt", "node1_plain"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_same_key_overwrites() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let runner = ExperimentRunner::new(config.clone());

    runner.run(false, "node1_plain").await.unwrap();
    let second = runner.run(true, "node1_plain").await.unwrap();

    let store = ResultsStore::load(&config.results_path).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("node1_plain").unwrap(), &second.result);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_memory_series_is_ordered() {
    let dir = TempDir::new().unwrap();
    let runner = ExperimentRunner::new(test_config(dir.path()));

    let report = runner.run(true, "node1_opt").await.unwrap();
    let series = &report.result.memory_usage_over_time;

    assert!(series
        .windows(2)
        .all(|w| w[0].elapsed_secs() <= w[1].elapsed_secs()));
    assert_eq!(
        report.result.final_memory_usage,
        series.last().unwrap().memory_mb()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_dataset_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let config = BenchConfig {
        dataset_path: dir.path().join("absent.csv"),
        ..test_config(dir.path())
    };
    let runner = ExperimentRunner::new(config.clone());

    let outcome = runner.run(false, "node1_plain").await;
    assert!(outcome.is_err());
    assert!(!config.results_path.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_key_rejected() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let runner = ExperimentRunner::new(config.clone());

    let outcome = runner.run(false, "").await;
    assert!(matches!(outcome, Err(Error::Config(_))));
    assert!(!config.results_path.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whitespace_key_accepted() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let runner = ExperimentRunner::new(config.clone());

    runner.run(false, " ").await.unwrap();

    let store = ResultsStore::load(&config.results_path).unwrap();
    assert_eq!(store.keys(), vec![" "]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unparsable_cells_do_not_fail_run() {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    // Replaces the clean dataset written by test_config
    write_dataset_with(dir.path(), |idx| match idx % 3 {
        0 => ("120.0".to_string(), "False"),
        1 => ("n/a".to_string(), "TRUE"),
        _ => ("95".to_string(), "maybe"),
    });
    let runner = ExperimentRunner::new(config.clone());

    let plain = runner.run(false, "node1_plain").await.expect("run failed");
    let optimized = runner.run(true, "node1_opt").await.expect("run failed");

    assert_eq!(plain.initial_rows, MOVIES.len());
    assert_eq!(plain.sorted_counts, expected_counts());
    assert_eq!(optimized.sorted_counts, expected_counts());

    let store = ResultsStore::load(&config.results_path).unwrap();
    assert_eq!(store.keys(), vec!["node1_opt", "node1_plain"]);
}
