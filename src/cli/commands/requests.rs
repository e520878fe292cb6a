use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::{output_data, output_success};
use crate::cli::{build_client, OutputFormat};
use crate::types::NewServiceRequest;

#[derive(Subcommand)]
pub enum RequestCommands {
    #[command(about = "List service requests for the signed-in customer")]
    List,

    #[command(about = "Show one service request with its comments")]
    Show {
        #[arg(help = "Service request id")]
        id: Uuid,
    },

    #[command(about = "Open a new service request")]
    Create {
        #[arg(help = "Short title")]
        title: String,
        #[arg(long, help = "Problem description")]
        description: String,
        #[arg(long, help = "Request category, e.g. leak or billing")]
        category: String,
    },

    #[command(about = "Add a comment to a service request")]
    Comment {
        #[arg(help = "Service request id")]
        id: Uuid,
        #[arg(help = "Comment text")]
        comment: String,
    },
}

pub async fn handle(cmd: RequestCommands, tenant: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client(tenant)?;

    match cmd {
        RequestCommands::List => {
            let requests = client.get_service_requests().await?;
            output_data(&output_format, json!({ "requests": requests }))
        }

        RequestCommands::Show { id } => {
            let request = client.get_service_request(id).await?;
            output_data(&output_format, json!({ "request": request }))
        }

        RequestCommands::Create {
            title,
            description,
            category,
        } => {
            let request = client
                .create_service_request(&NewServiceRequest {
                    title,
                    description,
                    category,
                })
                .await?;
            output_success(
                &output_format,
                &format!("Service request {} created", request.id),
                Some(json!({ "request": request })),
            )
        }

        RequestCommands::Comment { id, comment } => {
            let comment = client.add_comment(id, &comment).await?;
            output_success(
                &output_format,
                "Comment added",
                Some(json!({ "comment": comment })),
            )
        }
    }
}
