use graphql_pipeline::{Client, ClientConfig, HttpResponseInfo, Operation, OperationVariables};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Data {
    hero: Hero,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Hero {
    name: String,
}

struct GetHero {
    episode: String,
}

impl Operation for GetHero {
    type Data = Data;

    fn name(&self) -> &str {
        "GetHero"
    }

    fn operation_id(&self) -> &str {
        "get-hero-v1"
    }

    fn query_document(&self) -> &str {
        "query GetHero($episode: String) { hero(episode: $episode) { name } }"
    }

    fn variables(&self) -> OperationVariables {
        OperationVariables::new().with("episode", self.episode.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = env::var("GRAPHQL_URL").unwrap_or_else(|_| "http://localhost:4000/graphql".to_string());

    let config = ClientConfig::new(url).with_operation_id_extension(true);
    let client = Client::new(config)?;

    let response = client
        .query(GetHero {
            episode: "EMPIRE".to_string(),
        })
        .await?;

    let status = response
        .execution_context
        .get::<HttpResponseInfo>()
        .map(|info| info.status);
    println!("status: {status:?}");
    println!("response: {:?}", response.data);
    Ok(())
}
