// ==========================================
// 商品目录批量导入导出 - 导出层
// ==========================================
// 职责: 商品目录导出为 CSV / XLSX
// ==========================================

pub mod catalog_exporter;
pub mod csv_writer;
pub mod error;
pub mod xlsx_writer;

use crate::domain::ProductExportRow;

pub use catalog_exporter::{CatalogExporter, ExportDocument};
pub use csv_writer::CsvDocumentWriter;
pub use error::{ExportError, ExportResult};
pub use xlsx_writer::{Cell as XlsxCell, XlsxDocumentWriter};

/// 文档逐行写入接口
pub trait RowSink {
    fn write_row(&mut self, row: &ProductExportRow) -> ExportResult<()>;
}
