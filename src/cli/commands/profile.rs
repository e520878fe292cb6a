use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_data, output_success};
use crate::cli::{build_client, OutputFormat};
use crate::types::ProfileUpdate;

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Show the customer profile")]
    Show,

    #[command(about = "Update profile fields; omitted fields stay unchanged")]
    Update {
        #[arg(long, help = "First name")]
        first_name: Option<String>,
        #[arg(long, help = "Last name")]
        last_name: Option<String>,
        #[arg(long, help = "Phone number")]
        phone: Option<String>,
        #[arg(long, help = "Property address")]
        property_address: Option<String>,
    },
}

pub async fn handle(cmd: ProfileCommands, tenant: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client(tenant)?;

    match cmd {
        ProfileCommands::Show => {
            let customer = client.get_profile().await?;
            output_data(&output_format, json!({ "customer": customer }))
        }

        ProfileCommands::Update {
            first_name,
            last_name,
            phone,
            property_address,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone,
                property_address,
            };
            let customer = client.update_profile(&update).await?;
            output_success(
                &output_format,
                "Profile updated",
                Some(json!({ "customer": customer })),
            )
        }
    }
}
