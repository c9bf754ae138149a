//! Spreadsheet export of work tables
//!
//! Every calculation's working can be saved as a timestamped `.xlsx` or
//! `.csv` file next to the caller. Exports are side artifacts only; nothing
//! reads them back.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use crate::breakdown::Breakdown;
use crate::error::{CalcError, Result};
use crate::pv::{PvWorkTable, RollForwardTable};
use crate::retro::RetroLedger;

/// Single exported cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    Empty,
}

impl Cell {
    fn to_text(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Text(t) => t.clone(),
            Cell::Empty => String::new(),
        }
    }
}

/// Tabular working that can be exported
pub trait WorkTable {
    fn headers(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<Cell>>;
}

/// Output file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(CalcError::InvalidInput(format!("unknown export format: {}", other))),
        }
    }
}

/// Filename suffix such as `_20240601_134501123456`
pub fn timestamp_suffix(now: DateTime<Local>) -> String {
    now.format("_%Y%m%d_%H%M%S%6f").to_string()
}

/// Writes work tables into a directory
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    format: ExportFormat,
}

impl Exporter {
    pub fn new<P: AsRef<Path>>(dir: P, format: ExportFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
        }
    }

    /// Write `table` as `<dir>/<stem>_<timestamp>.<ext>` and return the path
    pub fn export(&self, table: &dyn WorkTable, stem: &str) -> Result<PathBuf> {
        let file_name = format!(
            "{}{}.{}",
            stem,
            timestamp_suffix(Local::now()),
            self.format.extension()
        );
        let path = self.dir.join(file_name);

        match self.format {
            ExportFormat::Xlsx => write_xlsx(table, &path)?,
            ExportFormat::Csv => write_csv(table, &path)?,
        }

        log::info!("exported {} rows to {}", table.rows().len(), path.display());
        Ok(path)
    }
}

fn write_xlsx(table: &dyn WorkTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in table.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header.as_str(), &bold)?;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                Cell::Empty => {}
                other => {
                    worksheet.write_string(row_num, col, other.to_text())?;
                }
            }
        }
    }

    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}

fn write_csv(table: &dyn WorkTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Cell::to_text))?;
    }
    writer.flush()?;
    Ok(())
}

/// Share as a percentage without trailing zeros: 0.71 -> `71`, 0.715 -> `71.5`
pub fn percent_label(share: f64) -> String {
    // Drop float noise such as 71.50000000000001
    let pct = (share * 100.0 * 1e6).round() / 1e6;
    pct.to_string()
}

/// Value only on the first row, blank below
fn first_only(idx: usize, cell: Cell) -> Cell {
    if idx == 0 {
        cell
    } else {
        Cell::Empty
    }
}

impl WorkTable for RetroLedger {
    fn headers(&self) -> Vec<String> {
        ["month", "monthly_amt", "monthly_rate", "accum_rate", "monthly_pen_w_int"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    Cell::Date(r.month),
                    Cell::Number(r.monthly_amt),
                    Cell::Number(r.monthly_rate),
                    Cell::Number(r.accum_rate),
                    Cell::Number(r.monthly_pen_w_int),
                ]
            })
            .collect()
    }
}

impl WorkTable for PvWorkTable {
    fn headers(&self) -> Vec<String> {
        vec![
            "compounded_int".to_string(),
            "amt".to_string(),
            "pmt_no".to_string(),
            "month".to_string(),
            "mult".to_string(),
            "monthly_rate".to_string(),
            format!("pv@{}", self.first_pmt_date.format("%Y-%m-%d")),
        ]
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                vec![
                    Cell::Number(r.compounded_int),
                    Cell::Number(r.amt),
                    Cell::Number(r.pmt_no as f64),
                    Cell::Date(r.month),
                    Cell::Number(r.mult),
                    first_only(idx, Cell::Number(self.monthly_rate)),
                    first_only(idx, Cell::Number(self.pv)),
                ]
            })
            .collect()
    }
}

impl WorkTable for RollForwardTable {
    fn headers(&self) -> Vec<String> {
        vec![
            "pmt_date".to_string(),
            "num_months".to_string(),
            "amt_100pct".to_string(),
            format!("amt_{}pct", percent_label(self.reduced_pct)),
        ]
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|r| {
                vec![
                    Cell::Date(r.pmt_date),
                    Cell::Number(r.num_months as f64),
                    Cell::Number(r.amt_100pct),
                    Cell::Number(r.amt_reduced),
                ]
            })
            .collect()
    }
}

impl WorkTable for Breakdown {
    fn headers(&self) -> Vec<String> {
        vec!["year".to_string(), "months".to_string()]
    }

    fn rows(&self) -> Vec<Vec<Cell>> {
        self.iter()
            .map(|(year, months)| vec![Cell::Number(year as f64), Cell::Number(months as f64)])
            .collect()
    }
}
