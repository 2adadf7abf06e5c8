use crate::dataset::SalesDataset;
use crate::error::ExportError;
use crate::grid::{ColumnId, ExportFormat};
use crate::record::SalesRecord;

/// A rendered download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Base name of every download, the extension comes from the format.
pub const EXPORT_BASENAME: &str = "aggrid_export";

/// Render a dataset in the requested format
///
/// # Arguments
/// * `dataset` - Rows to export, already filtered or selected by the caller
/// * `format` - CSV or XLSX
///
/// # Returns
/// * `Result<ExportFile, ExportError>` - File bytes with content type and file name
pub fn export(dataset: &SalesDataset, format: ExportFormat) -> Result<ExportFile, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(dataset.records())?.into_bytes(),
        ExportFormat::Xlsx => to_xlsx(dataset.records())?,
    };

    Ok(ExportFile {
        bytes,
        content_type: format.content_type(),
        file_name: format!("{}.{}", EXPORT_BASENAME, format.extension()),
    })
}

/// Convert sales records to CSV
///
/// The header row carries the column display names. Amounts are written with two
/// decimals and margins with one. Fields containing commas, quotes or newlines are quoted.
///
/// # Examples
/// ```
/// use salesgrid::downloader::to_csv;
///
/// let csv = to_csv(&[]).unwrap();
/// assert!(csv.starts_with("Date,Product,Category"));
/// ```
pub fn to_csv(records: &[SalesRecord]) -> Result<String, ExportError> {
    let mut csv_content = String::new();

    // Add header row with column names
    for (i, column) in ColumnId::ALL.iter().enumerate() {
        if i > 0 {
            csv_content.push(',');
        }
        push_field(&mut csv_content, column.header());
    }
    csv_content.push('\n');

    // Add data rows
    for record in records {
        for (i, column) in ColumnId::ALL.iter().enumerate() {
            if i > 0 {
                csv_content.push(',');
            }
            push_field(&mut csv_content, &cell_text(record, *column));
        }
        csv_content.push('\n');
    }

    Ok(csv_content)
}

fn push_field(out: &mut String, value: &str) {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        let escaped = value.replace('"', "\"\"");
        out.push('"');
        out.push_str(&escaped);
        out.push('"');
    } else {
        out.push_str(value);
    }
}

fn cell_text(record: &SalesRecord, column: ColumnId) -> String {
    match column {
        ColumnId::Date => record.date().format("%Y-%m-%d").to_string(),
        ColumnId::Product => record.product().to_string(),
        ColumnId::Category => record.category().to_string(),
        ColumnId::Region => record.region().to_string(),
        ColumnId::SalesRep => record.sales_rep().to_string(),
        ColumnId::Quantity => record.quantity().to_string(),
        ColumnId::UnitPrice => record.unit_price().to_string(),
        ColumnId::TotalAmount => record.total_amount().to_string(),
        ColumnId::ProfitMargin => record.profit_margin().to_string(),
    }
}

fn cell_number(record: &SalesRecord, column: ColumnId) -> Option<f64> {
    match column {
        ColumnId::Quantity => Some(f64::from(record.quantity())),
        ColumnId::UnitPrice => Some(record.unit_price().to_f64()),
        ColumnId::TotalAmount => Some(record.total_amount().to_f64()),
        ColumnId::ProfitMargin => Some(record.profit_margin().to_f64()),
        _ => None,
    }
}

/// Convert sales records to XLSX
///
/// One worksheet with a bold header row. Numeric columns are written as numbers so the
/// spreadsheet can aggregate them; dates and categorical columns as text.
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes
#[cfg(feature = "web")]
pub fn to_xlsx(records: &[SalesRecord]) -> Result<Vec<u8>, ExportError> {
    use rust_xlsxwriter::{Format, Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Sales")?;

    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");
    let percent = Format::new().set_num_format("0.0");

    for (c, column) in ColumnId::ALL.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, column.header(), &header)?;
    }

    for (r, record) in records.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, column) in ColumnId::ALL.iter().enumerate() {
            let col = c as u16;
            match (cell_number(record, *column), column.precision()) {
                (Some(n), Some(2)) => {
                    worksheet.write_number_with_format(row, col, n, &money)?;
                }
                (Some(n), Some(_)) => {
                    worksheet.write_number_with_format(row, col, n, &percent)?;
                }
                (Some(n), None) => {
                    worksheet.write_number(row, col, n)?;
                }
                (None, _) => {
                    worksheet.write_string(row, col, &cell_text(record, *column))?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

#[cfg(not(feature = "web"))]
pub fn to_xlsx(_records: &[SalesRecord]) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unsupported("xlsx"))
}
