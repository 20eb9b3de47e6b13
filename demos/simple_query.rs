use graphql_pipeline::{Client, ClientConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = env::var("GRAPHQL_URL").unwrap_or_else(|_| "http://localhost:4000/graphql".to_string());

    let client = Client::new(ClientConfig::new(url))?;

    let response = client
        .execute_raw(
            "query Hero($episode: String) { hero(episode: $episode) { name } }",
            Some(serde_json::json!({ "episode": "JEDI" })),
        )
        .await?;

    println!("data: {}", response.data.unwrap_or_default());

    Ok(())
}
