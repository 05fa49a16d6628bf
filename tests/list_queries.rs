mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{ids, TestApp};

async fn ten_posts() -> Result<TestApp> {
    let app = TestApp::spawn().await?;
    for i in 1..=10 {
        app.post(&format!("post {:02}", i)).await?;
    }
    Ok(app)
}

#[tokio::test]
async fn pages_are_offset_by_page_minus_one_times_size() -> Result<()> {
    let app = ten_posts().await?;

    let pages = [
        (1, 4, vec![1_i64, 2, 3, 4]),
        (2, 4, vec![5_i64, 6, 7, 8]),
        (3, 4, vec![9_i64, 10]),
    ];
    for (page, size, expected) in pages {
        let body = json!({ "pagination": { "page": page, "pageSize": size } });
        let (status, value) = app.call(Method::POST, "/posts/list", Some(body)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&value), expected, "page {}", page);
    }
    Ok(())
}

#[tokio::test]
async fn id_set_filter_returns_only_listed_ids() -> Result<()> {
    let app = ten_posts().await?;
    let body = json!({ "filter": { "id": [2, 5, 9, 42] } });
    let (_, value) = app.call(Method::POST, "/posts/list", Some(body)).await?;
    let found = ids(&value);
    assert!(found.iter().all(|id| [2, 5, 9].contains(id)));
    assert_eq!(found.len(), 3);

    let body = json!({ "filter": { "id": 7 } });
    let (_, value) = app.call(Method::POST, "/posts/list", Some(body)).await?;
    assert_eq!(ids(&value), vec![7_i64]);
    Ok(())
}

#[tokio::test]
async fn oversized_id_set_is_an_invalid_query() -> Result<()> {
    let app = ten_posts().await?;
    let body = json!({ "filter": { "id": (1..=70_000).collect::<Vec<i64>>() } });
    let (status, value) = app.call(Method::POST, "/posts/list", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["code"], "INVALID_QUERY");
    Ok(())
}

#[tokio::test]
async fn descending_sort_is_the_exact_reverse_of_ascending() -> Result<()> {
    let app = ten_posts().await?;
    let asc_body = json!({ "sort": [{ "sortBy": "id", "order": "asc" }] });
    let desc_body = json!({ "sort": [{ "sortBy": "id", "order": "DESC" }] });
    let (_, asc) = app.call(Method::POST, "/posts/list", Some(asc_body)).await?;
    let (_, desc) = app.call(Method::POST, "/posts/list", Some(desc_body)).await?;
    let mut reversed = ids(&desc);
    reversed.reverse();
    assert_eq!(ids(&asc), reversed);
    assert_eq!(ids(&asc).len(), 10);
    Ok(())
}

#[tokio::test]
async fn invalid_list_input_is_rejected_as_invalid_query() -> Result<()> {
    let app = ten_posts().await?;
    let bodies = [
        json!({ "sort": [{ "sortBy": "nope", "order": "asc" }] }),
        json!({ "sort": [{ "sortBy": "title", "order": "sideways" }] }),
        json!({ "filter": { "secret": 1 } }),
        json!({ "filter": { "id": ["one"] } }),
        json!({ "pagination": { "page": -1, "pageSize": 5 } }),
        json!({ "pagination": { "page": 1, "pageSize": 0 } }),
    ];
    for body in bodies {
        let (status, value) = app.call(Method::POST, "/posts/list", Some(body.clone())).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(value["code"], "INVALID_QUERY", "{}", body);
    }
    Ok(())
}

#[tokio::test]
async fn nested_list_ignores_caller_parent_filter() -> Result<()> {
    let app = TestApp::spawn().await?;
    let first = app.post("first").await?;
    let second = app.post("second").await?;
    app.comment(first, "ann").await?;
    let bob = app.comment(second, "bob").await?;

    let body = json!({ "filter": { "postId": [first, second] } });
    let (status, value) = app
        .call(Method::POST, &format!("/posts/{}/comments/list", second), Some(body))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&value), vec![bob]);
    Ok(())
}

#[tokio::test]
async fn nested_get_accepts_page_query_parameters() -> Result<()> {
    let app = TestApp::spawn().await?;
    let post = app.post("first").await?;
    let mut created = vec![];
    for name in ["a", "b", "c", "d", "e"] {
        created.push(app.comment(post, name).await?);
    }

    let (status, value) = app
        .call(Method::GET, &format!("/posts/{}/comments?page=2&pageSize=2", post), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&value), created[2..4].to_vec());

    let (_, value) = app.call(Method::GET, &format!("/posts/{}/comments", post), None).await?;
    assert_eq!(ids(&value), created);
    Ok(())
}

#[tokio::test]
async fn list_rows_carry_only_whitelisted_fields() -> Result<()> {
    let app = ten_posts().await?;
    let (_, value) = app
        .call(Method::POST, "/posts/list", Some(json!({ "pagination": { "pageSize": 1 } })))
        .await?;
    let row = value["data"][0].as_object().expect("row").clone();
    let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["body", "id", "title", "user"]);
    Ok(())
}
