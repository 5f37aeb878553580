use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;


use test_harness::router;

#[tokio::test]
async fn graphiql_page_serves_html() -> Result<()> {
    let request = Request::builder()
        .method("GET")
        .uri("/graphiql")
        .body(Body::empty())?;
    let response = router().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let page = String::from_utf8(bytes.to_vec())?;
    assert!(page.contains("graphiql"));
    assert!(page.contains("/graphql"));

    Ok(())
}

#[tokio::test]
async fn graphiql_page_is_idempotent() -> Result<()> {
    let mut pages = Vec::new();

    for _ in 0..2 {
        let request = Request::builder()
            .method("GET")
            .uri("/graphiql")
            .body(Body::empty())?;
        let response = router().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        pages.push(bytes);
    }

    assert_eq!(pages[0], pages[1]);

    Ok(())
}
