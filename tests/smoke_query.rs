use graphql_pipeline::{Client, ClientConfig, HttpResponseInfo};

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn smoke_typename() {
    let url = match std::env::var("GRAPHQL_URL") {
        Ok(url) => url,
        Err(_) => return,
    };

    let client = Client::new(ClientConfig::new(url)).expect("client");
    let response = client
        .execute_raw("query Smoke { __typename }", None)
        .await
        .expect("graphql query");

    assert!(response.data.is_some());
    let info = response
        .execution_context
        .get::<HttpResponseInfo>()
        .expect("http response info");
    assert_eq!(info.status, 200);
}
