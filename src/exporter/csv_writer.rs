// ==========================================
// 商品目录批量导入导出 - CSV 导出写入器
// ==========================================
// 逐行写入底层 Write，不缓存结果集
// ==========================================

use crate::domain::{ProductExportRow, EXPORT_HEADER};
use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::RowSink;
use crate::repository::product_repo_impl::{format_price, format_timestamp};
use csv::WriterBuilder;
use std::io::Write;

pub struct CsvDocumentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvDocumentWriter<W> {
    /// 创建写入器并写出表头
    pub fn new(inner: W) -> ExportResult<Self> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(EXPORT_HEADER)?;
        Ok(Self { writer })
    }

    /// 刷新并取回底层 Write
    pub fn finish(self) -> ExportResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::CsvWriteError(e.to_string()))
    }
}

impl<W: Write> RowSink for CsvDocumentWriter<W> {
    fn write_row(&mut self, row: &ProductExportRow) -> ExportResult<()> {
        self.writer.write_record([
            row.id.to_string(),
            row.unique_id.clone(),
            row.name.clone(),
            format_price(row.price),
            row.category.clone(),
            format_timestamp(row.created_at),
        ])?;
        Ok(())
    }
}
