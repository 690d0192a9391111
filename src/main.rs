// ==========================================
// 商品目录批量导入导出 - 命令行入口
// ==========================================
// 用法:
//   catalog-bulk init-db <db>
//   catalog-bulk import <db> <file>
//   catalog-bulk export <db> <csv|xlsx> <out> [--search S] [--category-id N]
//                       [--sort-by name|price|createdAt] [--order ASC|DESC]
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use catalog_bulk::api::{ApiResponse, ExportParams, ProductBulkApi};
use catalog_bulk::db::{init_schema, open_sqlite_connection};
use catalog_bulk::importer::CancelHandle;
use catalog_bulk::{logging, ApiError, APP_NAME, VERSION};
use std::path::Path;

const USAGE: &str = "usage:
  catalog-bulk init-db <db>
  catalog-bulk import <db> <file>
  catalog-bulk export <db> <csv|xlsx> <out> [--search S] [--category-id N] [--sort-by F] [--order O]";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    tracing::info!(version = VERSION, "{}", APP_NAME);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("{}", USAGE);
    };

    match command.as_str() {
        "init-db" => {
            let db_path = args.get(1).ok_or_else(|| anyhow!("{}", USAGE))?;
            let conn = open_sqlite_connection(db_path)
                .with_context(|| format!("无法打开数据库: {}", db_path))?;
            init_schema(&conn).context("建表失败")?;
            println!("initialized {}", db_path);
        }
        "import" => {
            let (db_path, file) = match (args.get(1), args.get(2)) {
                (Some(db), Some(file)) => (db, file),
                _ => bail!("{}", USAGE),
            };
            run_import(db_path, file).await?;
        }
        "export" => {
            let (db_path, format, out) = match (args.get(1), args.get(2), args.get(3)) {
                (Some(db), Some(format), Some(out)) => (db, format, out),
                _ => bail!("{}", USAGE),
            };
            let mut params = parse_export_flags(&args[4..])?;
            params.format = Some(format.clone());
            run_export(db_path, &params, out)?;
        }
        other => bail!("unknown command: {}\n{}", other, USAGE),
    }

    Ok(())
}

async fn run_import(db_path: &str, file: &str) -> Result<()> {
    let api = ProductBulkApi::new(db_path)?;

    // Ctrl-C → 取消信号（当前行完成后停止）
    let (cancel, cancel_rx) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("收到中断信号，停止处理新行");
            cancel.cancel();
        }
    });

    let file_name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string());

    match api
        .bulk_upload_file(&file_name, Path::new(file), Some(cancel_rx))
        .await
    {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

fn run_export(db_path: &str, params: &ExportParams, out: &str) -> Result<()> {
    let api = ProductBulkApi::new(db_path)?;
    match api.export_from_params(params) {
        Ok(document) => {
            std::fs::write(out, &document.bytes)
                .with_context(|| format!("无法写入导出文件: {}", out))?;
            println!(
                "exported {} products to {} ({}; {})",
                document.row_count,
                out,
                document.content_type(),
                document.content_disposition()
            );
            Ok(())
        }
        Err(err) => fail(&err),
    }
}

fn parse_export_flags(flags: &[String]) -> Result<ExportParams> {
    let mut params = ExportParams::default();
    let mut iter = flags.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("missing value for {}", flag))?
            .clone();
        match flag.as_str() {
            "--search" => params.search = Some(value),
            "--category-id" => params.category_id = Some(value),
            "--sort-by" => params.sort_by = Some(value),
            "--order" => params.order = Some(value),
            other => bail!("unknown flag: {}\n{}", other, USAGE),
        }
    }
    Ok(params)
}

/// 请求级失败：输出失败响应后返回错误
fn fail(err: &ApiError) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&ApiResponse::<()>::failure(err))?);
    bail!("request failed with status {}", err.status_code())
}
