use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn finrag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push(format!("finrag{}", std::env::consts::EXE_SUFFIX));
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("reports");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("banco.txt"),
        "Relatório do 3T25\n\
         Lucro líquido de R$ 10,5 bilhões no trimestre.\n\
         ROE de 22,5% no período.\n\
         Carteira de crédito estável.",
    )
    .unwrap();
    fs::write(
        files_dir.join("clima.md"),
        "# Boletim\n\nChuvas fortes no litoral sul durante a semana.",
    )
    .unwrap();
    fs::write(files_dir.join("planilha.csv"), "a,b\n1,2").unwrap();

    let config_content = format!(
        r#"[store]
path = "{}/data/finrag.sqlite"
collection = "financial_reports"

[embedding]
provider = "hashing"
dims = 256

[loader]
include_globs = ["*.txt", "*.md", "*.csv"]
"#,
        root.display().to_string().replace('\\', "/")
    );

    let config_path = config_dir.join("finrag.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_finrag(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = finrag_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run finrag binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn reports_dir(config_path: &Path) -> PathBuf {
    config_path.parent().unwrap().parent().unwrap().join("reports")
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_finrag(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));

    let (_, _, success) = run_finrag(&config_path, &["init"]);
    assert!(success, "second init failed");
}

#[test]
fn test_index_folder_reports_skipped_files() {
    let (_tmp, config_path) = setup_test_env();
    let folder = reports_dir(&config_path);

    let (stdout, stderr, success) =
        run_finrag(&config_path, &["index", folder.to_str().unwrap()]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Indexed 2 documents"), "stdout={}", stdout);
    assert!(stdout.contains("planilha.csv"));

    let (stdout, _, _) = run_finrag(&config_path, &["stats"]);
    assert!(stdout.contains("Chunks:      2"), "stdout={}", stdout);
    assert!(stdout.contains("Status:      active"));
}

#[test]
fn test_index_missing_folder_fails() {
    let (tmp, config_path) = setup_test_env();
    let missing = tmp.path().join("nope");
    let (_, stderr, success) = run_finrag(&config_path, &["index", missing.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("does not exist"), "stderr={}", stderr);
}

#[test]
fn test_ask_finds_answer_and_refines() {
    let (_tmp, config_path) = setup_test_env();
    let folder = reports_dir(&config_path);
    run_finrag(&config_path, &["index", folder.to_str().unwrap()]);

    let (stdout, stderr, success) = run_finrag(
        &config_path,
        &["ask", "Qual foi o lucro líquido do banco?", "--refine"],
    );
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Informação Encontrada"));
    assert!(stdout.contains("banco.txt"));
    assert!(stdout.contains("- Lucro líquido de R$ 10,5 bilhões no trimestre."));
}

#[test]
fn test_ask_json_output() {
    let (_tmp, config_path) = setup_test_env();
    run_finrag(&config_path, &["samples"]);

    let (stdout, stderr, success) =
        run_finrag(&config_path, &["ask", "receita líquida do varejo", "--json"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["status"], "found");
    assert_eq!(value["answer"]["result"]["rank"], 1);
    assert_eq!(value["answer"]["candidates"].as_array().unwrap().len(), 3);
}

#[test]
fn test_ask_empty_store_returns_no_result() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_finrag(&config_path, &["ask", "lucro"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Nenhum resultado encontrado"));
    assert!(stdout.contains("Sugestões"));
}

#[test]
fn test_search_lists_ranked_candidates() {
    let (_tmp, config_path) = setup_test_env();
    run_finrag(&config_path, &["samples"]);

    let (stdout, _, success) = run_finrag(&config_path, &["search", "EBITDA", "-k", "2"]);
    assert!(success);
    assert!(stdout.starts_with("1. ["), "stdout={}", stdout);
    assert!(stdout.contains("\n2. ["));
    assert!(!stdout.contains("\n3. ["));
}

#[test]
fn test_clear_then_already_empty() {
    let (_tmp, config_path) = setup_test_env();
    run_finrag(&config_path, &["samples"]);

    let (stdout, _, success) = run_finrag(&config_path, &["clear"]);
    assert!(success);
    assert!(stdout.contains("Removed 3 chunks"), "stdout={}", stdout);

    let (stdout, _, _) = run_finrag(&config_path, &["clear"]);
    assert!(stdout.contains("already empty"));
}

#[test]
fn test_reset_empties_collection() {
    let (_tmp, config_path) = setup_test_env();
    run_finrag(&config_path, &["samples"]);

    let (_, _, success) = run_finrag(&config_path, &["reset"]);
    assert!(success);
    let (stdout, _, _) = run_finrag(&config_path, &["stats"]);
    assert!(stdout.contains("Status:      empty"));
}

#[test]
fn test_chunk_preview_of_large_file() {
    let (tmp, config_path) = setup_test_env();
    let big = tmp.path().join("grande.txt");
    fs::write(&big, "Receita trimestral estável.\n".repeat(500)).unwrap();

    let (stdout, stderr, success) =
        run_finrag(&config_path, &["chunk", big.to_str().unwrap(), "--json"]);
    assert!(success, "chunk failed: {}", stderr);
    let chunks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let chunks = chunks.as_array().unwrap();
    assert!(chunks.len() >= 7);
    assert!(chunks[0]["text"]
        .as_str()
        .unwrap()
        .starts_with("📄 grande.txt: (Parte 1):"));
}

#[test]
fn test_extract_relevant_lines() {
    let (_tmp, config_path) = setup_test_env();
    let file = reports_dir(&config_path).join("banco.txt");

    let (stdout, _, success) =
        run_finrag(&config_path, &["extract", file.to_str().unwrap(), "ROE"]);
    assert!(success);
    assert!(stdout.starts_with("**📄 banco.txt:**"), "stdout={}", stdout);
    assert!(stdout.contains("- ROE de 22,5% no período."));
}

#[test]
fn test_invalid_config_fails_fast() {
    let (_tmp, config_path) = setup_test_env();
    fs::write(&config_path, "[chunking]\nmax_chunk_size = 100\noverlap = 200\n").unwrap();

    let (_, stderr, success) = run_finrag(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("overlap"), "stderr={}", stderr);
}
