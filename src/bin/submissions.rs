use anyhow::{bail, Context, Result};
use multilingual_site::config;
use multilingual_site::contact::{
    ContactClient, SubmissionId, SubmissionStatus, DEFAULT_RECENT_LIMIT,
};
use tracing::info;

const USAGE: &str = "Usage: submissions list [limit] | submissions mark <id> <new|read|responded>";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("submissions=info".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;
    let client = ContactClient::from_config(&config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => list(&client, DEFAULT_RECENT_LIMIT).await,
        ["list", limit] => {
            let limit = limit
                .parse()
                .with_context(|| format!("Invalid limit: {}", limit))?;
            list(&client, limit).await
        }
        ["mark", id, status] => {
            let id: SubmissionId = id.parse()?;
            let status: SubmissionStatus = status.parse()?;
            let result = client.update_status(id.clone(), status).await;
            if let Some(e) = result.error {
                bail!("Failed to update submission {}: {}", id, e);
            }
            info!("✓ Submission {} marked as {}", id, status);
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

async fn list(client: &ContactClient, limit: u32) -> Result<()> {
    let result = client.recent(limit).await;
    if let Some(e) = result.error {
        bail!("Failed to fetch submissions: {}", e);
    }

    let rows = result.data.unwrap_or_default();
    info!("{} submissions", rows.len());
    for row in rows {
        let created = row
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{} [{}] {} {} <{}>{}",
            row.id,
            row.status,
            created,
            row.name,
            row.email,
            row.organization
                .map(|org| format!(" ({})", org))
                .unwrap_or_default()
        );
        println!("    {}", row.message.replace('\n', "\n    "));
    }
    Ok(())
}
