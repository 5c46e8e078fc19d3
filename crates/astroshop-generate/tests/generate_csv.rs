use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use astroshop_generate::engine::REPORT_FILE;
use astroshop_generate::{GenerateOptions, GenerationEngine, GenerationError};

const TABLES: [&str; 6] = [
    "clientes",
    "produtos",
    "vendas",
    "itens_venda",
    "devolucoes",
    "itens_devolucao",
];

fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "astroshop_generate_{label}_{}",
        uuid::Uuid::new_v4()
    ));
    dir
}

fn options(seed: u64, out_dir: PathBuf) -> GenerateOptions {
    GenerateOptions {
        seed,
        customers: 80,
        sales: 600,
        return_fraction: 0.15,
        window_start: NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"),
        window_end: NaiveDate::from_ymd_opt(2025, 12, 31).expect("date"),
        out_dir,
        ..GenerateOptions::default()
    }
}

fn table_hashes(dir: &Path) -> Vec<String> {
    TABLES
        .iter()
        .map(|table| hash_file(&dir.join(format!("{table}.csv"))).expect("hash table"))
        .collect()
}

#[test]
fn generate_is_deterministic() {
    let dir_a = temp_out_dir("run_a");
    let dir_b = temp_out_dir("run_b");

    GenerationEngine::new(options(99, dir_a.clone()))
        .run()
        .expect("run generation A");
    GenerationEngine::new(options(99, dir_b.clone()))
        .run()
        .expect("run generation B");

    assert_eq!(
        table_hashes(&dir_a),
        table_hashes(&dir_b),
        "tables should be identical for the same seed"
    );
}

#[test]
fn different_seeds_produce_different_sales() {
    let dir_a = temp_out_dir("seed_a");
    let dir_b = temp_out_dir("seed_b");

    GenerationEngine::new(options(1, dir_a.clone()))
        .run()
        .expect("run generation A");
    GenerationEngine::new(options(2, dir_b.clone()))
        .run()
        .expect("run generation B");

    assert_ne!(
        hash_file(&dir_a.join("vendas.csv")).expect("hash A"),
        hash_file(&dir_b.join("vendas.csv")).expect("hash B")
    );
    assert_eq!(
        hash_file(&dir_a.join("produtos.csv")).expect("hash A"),
        hash_file(&dir_b.join("produtos.csv")).expect("hash B"),
        "catalog does not depend on the seed"
    );
}

#[test]
fn export_writes_tables_and_report() {
    let dir = temp_out_dir("export");
    let result = GenerationEngine::new(options(7, dir.clone()))
        .run()
        .expect("run generation");

    for (table, rows) in result.dataset.row_counts() {
        let contents =
            fs::read_to_string(dir.join(format!("{table}.csv"))).expect("read exported table");
        assert_eq!(contents.lines().count(), rows + 1, "{table} rows plus header");
    }

    let report: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.join(REPORT_FILE)).expect("read report"),
    )
    .expect("parse report");
    assert_eq!(report.get("seed").and_then(|v| v.as_u64()), Some(7));
    assert!(
        report
            .get("bytes_written")
            .and_then(|v| v.as_u64())
            .is_some_and(|bytes| bytes > 0)
    );

    let products = fs::read_to_string(dir.join("produtos.csv")).expect("read products");
    assert!(products.contains("Telescópio Catadióptrico 200mm"));
    assert!(products.starts_with("id_produto;nome_produto;categoria;preco\n"));
}

#[test]
fn export_failure_keeps_generated_data() {
    let blocker = temp_out_dir("blocker");
    fs::write(&blocker, b"not a directory").expect("create blocking file");

    let engine = GenerationEngine::new(options(3, blocker.clone()));
    let mut result = engine.generate().expect("generation succeeds in memory");
    let sales_before = result.dataset.sales.clone();

    let exported = engine.export(&mut result);
    assert!(matches!(exported, Err(GenerationError::Io(_))));
    assert_eq!(result.dataset.sales, sales_before);
    assert_eq!(result.report.bytes_written, 0);
}
