use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_data, output_success};
use crate::cli::{build_client, OutputFormat};
use crate::session::AuthStore;
use crate::types::{LoginCredentials, RegisterData};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the tenant portal")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password")]
        password: String,
    },

    #[command(about = "Logout and clear the local session")]
    Logout,

    #[command(about = "Show local authentication status (no network)")]
    Status,

    #[command(about = "Fetch the canonical profile for the signed-in customer")]
    Whoami,

    #[command(about = "Register a new customer account")]
    Register {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Account password")]
        password: String,
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Phone number")]
        phone: Option<String>,
        #[arg(long, help = "Utility account number to link")]
        account_number: Option<String>,
    },

    #[command(about = "Request a password reset email")]
    ForgotPassword {
        #[arg(help = "Account email")]
        email: String,
    },
}

pub async fn handle(cmd: AuthCommands, tenant: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = build_client(tenant)?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let mut store = AuthStore::new();
            store
                .login(&client, &LoginCredentials { email, password })
                .await;

            match store.state().error.clone() {
                None => {
                    let customer = store.state().customer.clone();
                    output_success(
                        &output_format,
                        &format!("Signed in to {}", tenant),
                        customer.map(|c| json!({ "customer": c })),
                    )
                }
                Some(message) => Err(anyhow::anyhow!(message)),
            }
        }

        AuthCommands::Logout => {
            let mut store = AuthStore::new();
            store.logout(&client).await;
            output_success(&output_format, &format!("Signed out of {}", tenant), None)
        }

        AuthCommands::Status => {
            let authenticated = client.is_authenticated();
            let customer = client.get_current_customer();
            output_data(
                &output_format,
                json!({
                    "tenant": tenant,
                    "authenticated": authenticated,
                    "customer": customer,
                }),
            )
        }

        AuthCommands::Whoami => {
            let customer = client.get_profile().await?;
            output_data(&output_format, json!({ "customer": customer }))
        }

        AuthCommands::Register {
            email,
            password,
            first_name,
            last_name,
            phone,
            account_number,
        } => {
            let mut store = AuthStore::new();
            store
                .register(
                    &client,
                    &RegisterData {
                        email,
                        password,
                        first_name,
                        last_name,
                        phone,
                        account_number,
                    },
                )
                .await;

            match store.state().error.clone() {
                None => output_success(
                    &output_format,
                    &format!("Registered and signed in to {}", tenant),
                    store.state().customer.clone().map(|c| json!({ "customer": c })),
                ),
                Some(message) => Err(anyhow::anyhow!(message)),
            }
        }

        AuthCommands::ForgotPassword { email } => {
            client.forgot_password(&email).await?;
            output_success(
                &output_format,
                "Password reset requested. Check your inbox.",
                None,
            )
        }
    }
}
