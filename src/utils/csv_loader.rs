//! CSV record loader for ledger and fiscal exports

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::traits::*;
use crate::types::*;

/// Ledger export column names
pub mod ledger_columns {
    pub const REF_ID: &str = "ID_Lancamento";
    pub const DATE: &str = "Data";
    pub const ACCOUNT: &str = "Conta";
    pub const DESCRIPTION: &str = "Descricao";
    pub const DEBIT: &str = "Debito";
    pub const CREDIT: &str = "Credito";
    pub const ABSOLUTE_VALUE: &str = "Valor_Absoluto";
}

/// Fiscal table export column names
pub mod fiscal_columns {
    pub const INVOICE_ID: &str = "ID_Nota_Fiscal";
    pub const REF_ID: &str = "ID_Lancamento_Ref";
    pub const ISSUE_DATE: &str = "Data_Emissao";
    pub const OPERATION_NATURE: &str = "Natureza_Operacao";
    pub const COUNTERPARTY: &str = "Emitente_Destinatario";
    pub const TOTAL_VALUE: &str = "Valor_Total";
}

const LEDGER_TABLE: &str = "ledger";
const FISCAL_TABLE: &str = "fiscal";

/// Record source reading one CSV file per side
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    ledger_path: PathBuf,
    fiscal_path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(ledger_path: impl Into<PathBuf>, fiscal_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            fiscal_path: fiscal_path.into(),
        }
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn fiscal_path(&self) -> &Path {
        &self.fiscal_path
    }
}

impl RecordSource for CsvRecordSource {
    fn load_ledger(&self) -> ReconciliationResult<Vec<LedgerEntry>> {
        read_ledger_csv(File::open(&self.ledger_path)?)
    }

    fn load_fiscal(&self) -> ReconciliationResult<Vec<FiscalEntry>> {
        read_fiscal_csv(File::open(&self.fiscal_path)?)
    }
}

/// Read ledger entries from CSV with the ledger export header
pub fn read_ledger_csv<R: Read>(reader: R) -> ReconciliationResult<Vec<LedgerEntry>> {
    use ledger_columns::*;

    let mut table = Table::open(reader, LEDGER_TABLE)?;
    let ref_id = table.column(REF_ID)?;
    let date = table.column(DATE)?;
    let account = table.column(ACCOUNT)?;
    let description = table.column(DESCRIPTION)?;
    let debit = table.column(DEBIT)?;
    let credit = table.column(CREDIT)?;
    let absolute_value = table.column(ABSOLUTE_VALUE)?;

    let mut entries = Vec::new();
    for (row_number, record) in table.reader.records().enumerate() {
        let row = Row {
            table: LEDGER_TABLE,
            record: record?,
            row_number,
            key_column: ref_id,
        };
        entries.push(LedgerEntry {
            ref_id: row.text(ref_id, REF_ID)?,
            date: row.datetime(date, DATE)?,
            account: row.text(account, ACCOUNT)?,
            description: row.text(description, DESCRIPTION)?,
            debit: row.amount_or_zero(debit, DEBIT)?,
            credit: row.amount_or_zero(credit, CREDIT)?,
            absolute_value: row.amount(absolute_value, ABSOLUTE_VALUE)?,
        });
    }

    tracing::debug!(count = entries.len(), "loaded ledger entries");
    Ok(entries)
}

/// Read fiscal entries from CSV with the fiscal table export header
pub fn read_fiscal_csv<R: Read>(reader: R) -> ReconciliationResult<Vec<FiscalEntry>> {
    use fiscal_columns::*;

    let mut table = Table::open(reader, FISCAL_TABLE)?;
    let invoice_id = table.column(INVOICE_ID)?;
    let ref_id = table.column(REF_ID)?;
    let issue_date = table.column(ISSUE_DATE)?;
    let operation_nature = table.column(OPERATION_NATURE)?;
    let counterparty = table.column(COUNTERPARTY)?;
    let total_value = table.column(TOTAL_VALUE)?;

    let mut entries = Vec::new();
    for (row_number, record) in table.reader.records().enumerate() {
        let row = Row {
            table: FISCAL_TABLE,
            record: record?,
            row_number,
            key_column: invoice_id,
        };
        entries.push(FiscalEntry {
            invoice_id: row.text(invoice_id, INVOICE_ID)?,
            ref_id: row.text(ref_id, REF_ID)?,
            issue_date: row.datetime(issue_date, ISSUE_DATE)?,
            operation_nature: row.text(operation_nature, OPERATION_NATURE)?,
            counterparty: row.text(counterparty, COUNTERPARTY)?,
            total_value: row.amount(total_value, TOTAL_VALUE)?,
        });
    }

    tracing::debug!(count = entries.len(), "loaded fiscal entries");
    Ok(entries)
}

/// Parse a date cell as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

struct Table<R> {
    reader: csv::Reader<R>,
    headers: csv::StringRecord,
    name: &'static str,
}

impl<R: Read> Table<R> {
    fn open(reader: R, name: &'static str) -> ReconciliationResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        Ok(Self {
            reader,
            headers,
            name,
        })
    }

    fn column(&self, column: &str) -> ReconciliationResult<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ReconciliationError::MissingColumn {
                table: self.name.to_string(),
                column: column.to_string(),
            })
    }
}

struct Row {
    table: &'static str,
    record: csv::StringRecord,
    row_number: usize,
    key_column: usize,
}

impl Row {
    /// Identifier used in error messages: the row key, or its position
    fn label(&self) -> String {
        match self.record.get(self.key_column).map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => format!("row {}", self.row_number + 1),
        }
    }

    fn text(&self, index: usize, field: &str) -> ReconciliationResult<String> {
        self.record
            .get(index)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| ReconciliationError::MissingField {
                table: self.table.to_string(),
                record: self.label(),
                field: field.to_string(),
            })
    }

    fn required(&self, index: usize, field: &str) -> ReconciliationResult<String> {
        let value = self.text(index, field)?;
        if value.is_empty() {
            return Err(ReconciliationError::MissingField {
                table: self.table.to_string(),
                record: self.label(),
                field: field.to_string(),
            });
        }
        Ok(value)
    }

    fn datetime(&self, index: usize, field: &str) -> ReconciliationResult<NaiveDateTime> {
        let value = self.required(index, field)?;
        parse_datetime(&value).ok_or_else(|| ReconciliationError::InvalidDate {
            table: self.table.to_string(),
            record: self.label(),
            value,
        })
    }

    fn amount(&self, index: usize, field: &str) -> ReconciliationResult<BigDecimal> {
        let value = self.required(index, field)?;
        BigDecimal::from_str(&value).map_err(|_| ReconciliationError::InvalidAmount {
            table: self.table.to_string(),
            record: self.label(),
            value,
        })
    }

    fn amount_or_zero(&self, index: usize, field: &str) -> ReconciliationResult<BigDecimal> {
        if self.text(index, field)?.is_empty() {
            return Ok(BigDecimal::from(0));
        }
        self.amount(index, field)
    }
}
