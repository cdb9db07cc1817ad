use std::path::Path;

use emocause::{
    config::Settings,
    data::store::PoolSnapshot,
    nlp::{self, bootstrap::BootstrapConfig, embeddings::EmbeddingSize, rules::CandidatePolicy},
    EmoCauseError,
};
use tempfile::TempDir;

fn tweet(words: &[(&str, &str, i64)]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, (text, pos, parent))| format!("{}\t{text}\t_\t{pos}\t_\t_\t{parent}\t_\n", i + 1))
        .collect()
}

fn glove_line(word: &str, seed: f64) -> String {
    let values: Vec<String> = (0..25).map(|d| format!("{:.4}", seed + d as f64 * 0.01)).collect();
    format!("{word} {}\n", values.join(" "))
}

fn settings(dir: &TempDir) -> Settings {
    let root = dir.path();
    std::fs::write(root.join("lexicon.txt"), "# emotions\nlove\nhate\n").unwrap();
    let glove: String = [("i", 0.1), ("love", 0.5), ("pizza", 0.9), ("pasta", 0.91), ("bread", 0.92)]
        .iter()
        .map(|(w, s)| glove_line(w, *s))
        .collect();
    std::fs::write(root.join("glove25.txt"), glove).unwrap();
    std::fs::write(root.join("seeds.json"), r#"{"love": ["pizza"]}"#).unwrap();

    Settings {
        data_dir: root.to_path_buf(),
        outputs_dir: root.join("out"),
        lexicon_path: root.join("lexicon.txt"),
        embeddings_dir: root.to_path_buf(),
        embeddings_path: None,
        seeds_path: root.join("seeds.json"),
        negative_seeds_path: None,
        pool_path: root.join("pool.json"),
        embedding_size: EmbeddingSize::D25,
        test_mode: false,
        bootstrap: BootstrapConfig::default(),
    }
}

fn write_corpus(path: &Path, objects: &[&str]) {
    let text: Vec<String> = objects
        .iter()
        .map(|object| tweet(&[("I", "O", -1), ("love", "V", 0), (object, "N", 2)]))
        .collect();
    std::fs::write(path, text.join("\n")).unwrap();
}

#[tokio::test]
async fn training_then_test_mode_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&dir);
    let train = dir.path().join("train.conll");
    write_corpus(&train, &["pizza", "pasta"]);

    let summary = nlp::run_bootstrap(&settings, &train, CandidatePolicy::All, "relations")
        .await
        .unwrap();
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.cycles[0].cycle, 1);

    let csv = std::fs::read_to_string(settings.join_output("relations.csv")).unwrap();
    assert!(csv.starts_with("rank,sentence_id,emotion,cause,confidence,cycle,rule,sentence"));
    assert!(csv.contains("pasta"));
    let report = std::fs::read_to_string(settings.join_output("relations.txt")).unwrap();
    assert!(report.ends_with("\n\n"));
    assert!(report
        .split("\n\n")
        .any(|block| block == "1.0 EMOTION: love\tCAUSE: pizza\tTWEET: I love pizza"));
    assert_eq!(report.matches("EMOTION: ").count(), 2);

    let snapshot = PoolSnapshot::load(&settings.pool_path, 25).unwrap();
    assert_eq!(snapshot.pool.accepted.len(), 2);

    settings.test_mode = true;
    let test = dir.path().join("test.conll");
    write_corpus(&test, &["bread"]);
    let summary = nlp::run_bootstrap(&settings, &test, CandidatePolicy::All, "test_relations")
        .await
        .unwrap();
    assert_eq!(summary.cycles.len(), 1);
    assert_eq!(summary.cycles[0].cycle, 0);
    assert_eq!(summary.accepted, 1);

    let after = PoolSnapshot::load(&settings.pool_path, 25).unwrap();
    assert_eq!(after.pool.accepted.len(), 2);
}

#[tokio::test]
async fn test_mode_without_pool_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&dir);
    settings.test_mode = true;
    let input = dir.path().join("test.conll");
    write_corpus(&input, &["bread"]);

    let err = nlp::run_bootstrap(&settings, &input, CandidatePolicy::All, "relations")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EmoCauseError>(),
        Some(EmoCauseError::MissingResource { .. })
    ));
    assert!(!settings.join_output("relations.csv").exists());
}

#[tokio::test]
async fn missing_embedding_table_is_fatal_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings(&dir);
    settings.embeddings_path = Some(dir.path().join("glove_missing.txt"));
    let input = dir.path().join("train.conll");
    write_corpus(&input, &["pizza", "pasta"]);

    let err = nlp::run_bootstrap(&settings, &input, CandidatePolicy::All, "relations")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EmoCauseError>(),
        Some(EmoCauseError::MissingResource { resource: "embedding table", .. })
    ));
    assert!(!settings.join_output("relations.csv").exists());
    assert!(!settings.join_output("relations.txt").exists());
    assert!(!settings.pool_path.exists());
}

#[test]
fn snapshot_with_other_dimensions_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pool.json");
    PoolSnapshot::new(Default::default(), BootstrapConfig::default(), 50)
        .save(&path)
        .unwrap();
    let err = PoolSnapshot::load(&path, 25).unwrap_err();
    assert!(matches!(err, EmoCauseError::InvalidResource { .. }));
}

#[tokio::test]
async fn candidates_command_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir);
    let input = dir.path().join("tweets.conll");
    write_corpus(&input, &["pizza"]);
    let output = dir.path().join("candidates.csv");

    nlp::extract_candidates(&settings, &input, CandidatePolicy::All, Some(output.clone()))
        .await
        .unwrap();
    let csv = std::fs::read_to_string(output).unwrap();
    assert!(csv.contains("love,pizza,verb-direct-object,I love pizza"));
}
