use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use astroshop_core::{
    Customer, DATE_FORMAT, Dataset, Product, Return, ReturnItem, Sale, SaleItem,
};

use crate::errors::GenerationError;

pub const DELIMITER: u8 = b';';

/// A row that can be exported as a delimited record.
pub trait CsvRow {
    /// Exported table name, also the file stem.
    const TABLE: &'static str;
    const HEADER: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

impl CsvRow for Customer {
    const TABLE: &'static str = "clientes";
    const HEADER: &'static [&'static str] = &[
        "id_cliente",
        "nome_cliente",
        "email",
        "idade",
        "regiao",
        "data_cadastro",
        "numero_compras",
        "total_gasto",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.age.to_string(),
            self.region.label().to_string(),
            self.registered_on.format(DATE_FORMAT).to_string(),
            self.purchase_count.to_string(),
            self.total_spend.to_string(),
        ]
    }
}

impl CsvRow for Product {
    const TABLE: &'static str = "produtos";
    const HEADER: &'static [&'static str] = &["id_produto", "nome_produto", "categoria", "preco"];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.category.label().to_string(),
            self.price.to_string(),
        ]
    }
}

impl CsvRow for Sale {
    const TABLE: &'static str = "vendas";
    const HEADER: &'static [&'static str] = &[
        "id_venda",
        "id_cliente",
        "data_venda",
        "canal_venda",
        "status_venda",
        "valor_total",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.customer_id.clone(),
            self.date.format(DATE_FORMAT).to_string(),
            self.channel.label().to_string(),
            self.status.label().to_string(),
            self.total.to_string(),
        ]
    }
}

impl CsvRow for SaleItem {
    const TABLE: &'static str = "itens_venda";
    const HEADER: &'static [&'static str] = &[
        "id_item_venda",
        "id_venda",
        "id_produto",
        "quantidade",
        "preco_unitario",
        "preco_total",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.sale_id.clone(),
            self.product_id.clone(),
            self.quantity.to_string(),
            self.unit_price.to_string(),
            self.line_total.to_string(),
        ]
    }
}

impl CsvRow for Return {
    const TABLE: &'static str = "devolucoes";
    const HEADER: &'static [&'static str] = &[
        "id_devolucao",
        "id_venda",
        "motivo_devolucao",
        "data_devolucao",
        "status_devolucao",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.sale_id.clone(),
            self.reason.label().to_string(),
            self.date.format(DATE_FORMAT).to_string(),
            self.status.label().to_string(),
        ]
    }
}

impl CsvRow for ReturnItem {
    const TABLE: &'static str = "itens_devolucao";
    const HEADER: &'static [&'static str] = &[
        "id_item_devolucao",
        "id_devolucao",
        "id_item_venda",
        "id_produto",
        "quantidade_devolvida",
        "motivo_item",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.return_id.clone(),
            self.sale_item_id.clone(),
            self.product_id.clone(),
            self.quantity.to_string(),
            self.reason.label().to_string(),
        ]
    }
}

/// Write all six tables into `dir`, creating it if needed.
///
/// Returns the total number of bytes written.
pub fn write_dataset(dir: &Path, dataset: &Dataset) -> Result<u64, GenerationError> {
    std::fs::create_dir_all(dir)?;
    let mut bytes = 0;
    bytes += write_table(dir, &dataset.customers)?;
    bytes += write_table(dir, &dataset.products)?;
    bytes += write_table(dir, &dataset.sales)?;
    bytes += write_table(dir, &dataset.sale_items)?;
    bytes += write_table(dir, &dataset.returns)?;
    bytes += write_table(dir, &dataset.return_items)?;
    Ok(bytes)
}

/// Write one table as `<dir>/<TABLE>.csv`.
pub fn write_table<T: CsvRow>(dir: &Path, rows: &[T]) -> Result<u64, GenerationError> {
    let path = dir.join(format!("{}.csv", T::TABLE));
    Ok(write_table_csv(&path, rows)?)
}

/// Write rows as a `;`-delimited UTF-8 table with a header row.
pub fn write_table_csv<T: CsvRow>(path: &Path, rows: &[T]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(counting);

    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use astroshop_core::{Category, Channel, Money, SaleStatus};

    use super::*;

    fn temp_dir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("astroshop_csv_{label}_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn writes_semicolon_table_with_header_and_accents() {
        let dir = temp_dir("products");
        let products = vec![Product {
            id: "prod_001".to_string(),
            name: "Telescópio Catadióptrico 200mm".to_string(),
            category: Category::Telescope,
            price: Money::from_cents(70000),
        }];
        let bytes = write_table(&dir, &products).expect("write products");
        let contents = std::fs::read_to_string(dir.join("produtos.csv")).expect("read csv");

        assert_eq!(bytes as usize, contents.len());
        assert_eq!(
            contents,
            "id_produto;nome_produto;categoria;preco\n\
             prod_001;Telescópio Catadióptrico 200mm;Telescópio;700.00\n"
        );
    }

    #[test]
    fn renders_dates_day_first() {
        let dir = temp_dir("sales");
        let sales = vec![Sale {
            id: "sale_00001".to_string(),
            customer_id: "c1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 7).expect("date"),
            channel: Channel::Marketplace,
            status: SaleStatus::PartiallyReturned,
            total: Money::from_cents(1050),
        }];
        write_table(&dir, &sales).expect("write sales");
        let contents = std::fs::read_to_string(dir.join("vendas.csv")).expect("read csv");
        let row = contents.lines().nth(1).expect("data row");
        assert_eq!(
            row,
            "sale_00001;c1;07/03/2025;marketplace;parcialmente devolvida;10.50"
        );
    }

    #[test]
    fn empty_tables_still_get_a_header() {
        let dir = temp_dir("empty");
        write_dataset(&dir, &Dataset::default()).expect("write dataset");
        for table in ["clientes", "produtos", "vendas", "itens_venda", "devolucoes", "itens_devolucao"] {
            let contents =
                std::fs::read_to_string(dir.join(format!("{table}.csv"))).expect("read csv");
            assert_eq!(contents.lines().count(), 1, "{table} should only have a header");
        }
    }
}
