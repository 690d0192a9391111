// ==========================================
// 批量上传集成测试
// ==========================================
// 测试目标: 验证 文件 → 校验 → 落库 → 汇总 的完整流程
// ==========================================


use catalog_bulk::api::ProductBulkApi;
use catalog_bulk::exporter::{XlsxCell, XlsxDocumentWriter};
use catalog_bulk::importer::{BulkIngestor, Deadline};
use catalog_bulk::logging;
use catalog_bulk::repository::{ProductRepositoryImpl, UniqueIdFactory};
use std::io::Cursor;
use std::sync::Arc;
use test_helpers::{create_test_db, open_shared, seed_categories, valid_products_csv, write_upload};

/// 创建已初始化分类的 API
fn setup() -> (tempfile::NamedTempFile, ProductBulkApi, Vec<i64>) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let api = ProductBulkApi::from_connection(open_shared(&db_path).unwrap()).unwrap();
    let categories = seed_categories(api.repository()).expect("Failed to seed categories");
    (temp_file, api, categories)
}

#[tokio::test]
async fn test_all_valid_rows_inserted() {
    logging::init_test();
    let (_db, api, categories) = setup();

    let upload = write_upload(".csv", valid_products_csv(25, categories[0]).as_bytes()).unwrap();
    let response = api
        .bulk_upload_file("products.csv", upload.path(), None)
        .await
        .expect("upload should succeed");

    assert!(response.success);
    let data = response.data.unwrap();
    assert_eq!(data.inserted, 25);
    assert_eq!(data.failed, 0);
    assert_eq!(data.total, 25);
    assert_eq!(data.parsed, 25);
    assert!(data.errors.is_empty());
    assert!(!data.truncated);
    assert_eq!(api.repository().count_products().unwrap(), 25);
}

#[tokio::test]
async fn test_three_row_scenario() {
    logging::init_test();
    let (_db, api, _) = setup();

    let csv = "name,price,category_id\nMouse,25.50,1\n,10,1\nKeyboard,-5,1\n";
    let response = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap();

    let data = response.data.unwrap();
    assert_eq!(data.total, 3);
    assert_eq!(data.inserted, 1);
    assert_eq!(data.failed, 2);
    assert_eq!(data.errors.len(), 2);
    assert_eq!(data.errors[0].row, 2);
    assert_eq!(data.errors[0].reasons, vec!["name required".to_string()]);
    assert_eq!(data.errors[1].row, 3);
    assert_eq!(
        data.errors[1].reasons,
        vec!["price must be non-negative".to_string()]
    );
    // 部分失败仍然是成功响应
    assert!(response.success);
}

#[tokio::test]
async fn test_negative_price_row_is_isolated() {
    logging::init_test();
    let (_db, api, _) = setup();

    let csv = "name,price,category_id\nA,1.00,1\nB,2.00,1\nC,-3.00,1\nD,4.00,1\nE,-0.01,2\n";
    let data = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 3);
    assert_eq!(data.failed, 2);
    // errors 按文件顺序
    assert_eq!(data.errors.iter().map(|e| e.row).collect::<Vec<_>>(), vec![3, 5]);
    assert!(data
        .errors
        .iter()
        .all(|e| e.reasons.iter().any(|r| r.contains("price"))));
}

#[tokio::test]
async fn test_missing_category_rejected() {
    logging::init_test();
    let (_db, api, _) = setup();

    let csv = "name,price,category_id\nGhost Item,5,999\nReal Item,5,2\n";
    let data = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 1);
    assert_eq!(data.errors.len(), 1);
    assert_eq!(data.errors[0].row, 1);
    assert_eq!(
        data.errors[0].reasons,
        vec!["category 999 does not exist".to_string()]
    );
}

#[tokio::test]
async fn test_rejection_is_idempotent() {
    logging::init_test();
    let (_db, api, _) = setup();

    let csv = "name,price,category_id\n,abc,0\n";
    let first = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();
    let second = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(first.errors, second.errors);
    assert_eq!(
        first.errors[0].reasons,
        vec![
            "name required".to_string(),
            "price must be a valid decimal number".to_string(),
            "category_id must be a positive integer".to_string(),
        ]
    );
    assert_eq!(api.repository().count_products().unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_and_blank_rows() {
    logging::init_test();
    let (_db, api, _) = setup();

    // 第 2 行字段数不足；第 3 行完全空白被跳过（行号保留）
    let csv = "name,price,category_id\nA,1,1\nB,2\n,,\nD,4,1\n";
    let data = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 2);
    assert_eq!(data.failed, 1);
    assert_eq!(data.total, 3);
    assert_eq!(data.errors[0].row, 2);
    assert!(data.errors[0].reasons[0].contains("fields"));
}

#[tokio::test]
async fn test_error_rows_after_empty_lines() {
    logging::init_test();
    let (_db, api, _) = setup();

    // 第 2、4 行为真正的空行
    let csv = "name,price,category_id\nA,1,1\n\nB,-1,1\n\nC,3,999\n";
    let data = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 1);
    assert_eq!(data.failed, 2);
    assert_eq!(data.errors[0].row, 3);
    assert_eq!(
        data.errors[0].reasons,
        vec!["price must be non-negative".to_string()]
    );
    assert_eq!(data.errors[1].row, 5);
    assert_eq!(
        data.errors[1].reasons,
        vec!["category 999 does not exist".to_string()]
    );
}

#[tokio::test]
async fn test_overlong_image_reports_storage_limit() {
    logging::init_test();
    let (_db, api, _) = setup();

    let csv = format!(
        "name,price,category_id,image\nPoster,5,1,{}\nFrame,9,1,frames/oak.png\n",
        "p".repeat(501)
    );
    let data = api
        .bulk_upload_bytes("products.csv", csv.into_bytes(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 1);
    assert_eq!(data.failed, 1);
    assert_eq!(data.errors[0].row, 1);
    assert_eq!(
        data.errors[0].reasons,
        vec!["value exceeds a storage limit".to_string()]
    );
}

#[tokio::test]
async fn test_xlsx_upload_with_numeric_cells() {
    logging::init_test();
    let (_db, api, categories) = setup();

    let mut sheet = XlsxDocumentWriter::with_header(&["name", "price", "category_id", "image"]);
    let books = categories[2].to_string();
    sheet.push_row(&[
        XlsxCell::Text("Rust in Action"),
        XlsxCell::Number("39.99"),
        XlsxCell::Number(&books),
        XlsxCell::Text("covers/rust.png"),
    ]);
    sheet.push_row(&[XlsxCell::Text(""), XlsxCell::Text(""), XlsxCell::Text("")]);
    sheet.push_row(&[
        XlsxCell::Text("Free Sample"),
        XlsxCell::Number("0"),
        XlsxCell::Number(&books),
    ]);
    sheet.push_row(&[
        XlsxCell::Text("Broken"),
        XlsxCell::Text("n/a"),
        XlsxCell::Number(&books),
    ]);
    let bytes = sheet.finish(Cursor::new(Vec::new())).unwrap().into_inner();

    let data = api
        .bulk_upload_bytes("books.XLSX", bytes, None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 2);
    assert_eq!(data.failed, 1);
    assert_eq!(data.errors[0].row, 4);
    assert_eq!(
        data.errors[0].reasons,
        vec!["price must be a valid decimal number".to_string()]
    );
}

#[tokio::test]
async fn test_category_name_column() {
    logging::init_test();
    let (_db, api, _) = setup();

    let csv = "name,price,category\nYoga Mat,25,sports\nTent,120,Camping\n";
    let data = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 1);
    assert_eq!(
        data.errors[0].reasons,
        vec!["category 'Camping' does not exist".to_string()]
    );
}

// 固定 unique_id，使第二次落库触发唯一约束
struct FixedIdFactory;

impl UniqueIdFactory for FixedIdFactory {
    fn next_unique_id(&self) -> String {
        "00000000-0000-4000-8000-000000000000".to_string()
    }
}

#[tokio::test]
async fn test_storage_conflict_is_row_level() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path).unwrap();

    let plain_repo = ProductRepositoryImpl::from_connection(conn.clone());
    seed_categories(&plain_repo).unwrap();

    let repo = Arc::new(
        ProductRepositoryImpl::from_connection(conn.clone()).with_id_factory(Arc::new(FixedIdFactory)),
    );
    let config = Arc::new(catalog_bulk::config::ConfigManager::from_connection(conn).unwrap());
    let api = ProductBulkApi::with_parts(repo, config);

    let csv = "name,price,category_id\nFirst,1,1\nSecond,2,1\nThird,3,1\n";
    let data = api
        .bulk_upload_bytes("products.csv", csv.as_bytes().to_vec(), None)
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(data.inserted, 1);
    assert_eq!(data.failed, 2);
    assert_eq!(data.errors[0].row, 2);
    assert_eq!(
        data.errors[0].reasons,
        vec!["duplicate product (unique constraint)".to_string()]
    );
}

#[tokio::test]
async fn test_ingest_path_detects_format_from_extension() {
    logging::init_test();
    let (_db, api, categories) = setup();

    let upload = write_upload(".csv", valid_products_csv(3, categories[2]).as_bytes()).unwrap();
    let summary = BulkIngestor::new(api.repository().clone())
        .ingest_path(upload.path(), &Deadline::never())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 3);
    assert!(summary.outcomes.iter().all(|o| o.is_inserted()));

    let notes = write_upload(".txt", b"name,price\n").unwrap();
    let err = BulkIngestor::new(api.repository().clone())
        .ingest_path(notes.path(), &Deadline::never())
        .await
        .unwrap_err();
    assert!(err.is_format_error());
}
