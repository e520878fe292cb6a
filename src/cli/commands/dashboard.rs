use serde_json::json;

use crate::cli::utils::output_data;
use crate::cli::{build_client, OutputFormat};

pub async fn handle(tenant: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client(tenant)?;
    let dashboard = client.get_dashboard().await?;
    output_data(&output_format, json!(dashboard))
}
