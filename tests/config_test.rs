use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use warehouse_admin::core::EntityGateway;
use warehouse_admin::domain::model::Currency;
use warehouse_admin::utils::validation::Validate;
use warehouse_admin::{AdminConfig, HttpApi};

fn write_config(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

#[test]
fn test_config_file_drives_the_client() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/currencies/4/")
            .header("Authorization", "Bearer file-token")
            .header("Accept-Language", "uz");
        then.status(200)
            .json_body(json!({"id": 4, "name": "Sum", "symbol": "UZS", "side": "end", "main": true}));
    });

    let file = write_config(&format!(
        r#"
[api]
base_url = "{}/api"
timeout_seconds = 5
token = "file-token"

[api.headers]
Accept-Language = "uz"
"#,
        server.base_url()
    ))?;

    let config = AdminConfig::from_file(file.path())?;
    config.validate()?;

    let api = HttpApi::new(&config.api)?;
    let record = tokio_test::block_on(api.fetch("currencies", 4))?;

    mock.assert();
    let currency: Currency = serde_json::from_value(record)?;
    assert_eq!(currency.symbol, "UZS");
    assert!(currency.main);
    Ok(())
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let err = AdminConfig::from_file("/definitely/not/here/warehouse-admin.toml").unwrap_err();
    assert!(matches!(err, warehouse_admin::AdminError::IoError(_)));
}

#[test]
fn test_page_size_options_are_validated() -> Result<()> {
    let file = write_config(
        r#"
[table]
page_size_options = [20, 20]
default_page_size = 20
"#,
    )?;

    let config = AdminConfig::from_file(file.path())?;
    assert!(config.validate().is_err());
    Ok(())
}
