use std::time::{SystemTime, UNIX_EPOCH};

use post_client::{BlogClient, BlogClientError, ListPostsParams, NewPost, PostChanges};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("POST_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
    let mut client = BlogClient::new(&base_url).expect("client");

    let suffix = unique_suffix();
    let email = format!("smoke_{suffix}@example.com");
    let password = "password123";

    let register = client
        .register("Smoke", &email, password, password)
        .await
        .expect("register must succeed");
    assert!(!register.access_token.is_empty());
    assert_eq!(register.token_type, "Bearer");
    assert_eq!(register.user.email, email);

    let login = client
        .login(&email, password)
        .await
        .expect("login must succeed");
    assert_eq!(login.user.id, register.user.id);

    let title = format!("Smoke {suffix}");
    let created = client
        .create_post(&NewPost {
            title: title.clone(),
            content: "smoke content".to_string(),
            slug: None,
        })
        .await
        .expect("create_post must succeed");
    assert_eq!(created.slug, format!("smoke-{suffix}"));
    assert_eq!(created.user.id, register.user.id);

    let by_slug = client
        .get_post(&created.slug)
        .await
        .expect("get_post by slug must succeed");
    assert_eq!(by_slug.id, created.id);

    let page = client
        .list_posts(&ListPostsParams {
            title: Some(title),
            ..ListPostsParams::default()
        })
        .await
        .expect("list_posts must succeed");
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].id, created.id);

    let updated = client
        .update_post(
            &created.id.to_string(),
            &PostChanges {
                title: Some("Smoke updated".to_string()),
                content: None,
            },
        )
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.title, "Smoke updated");
    assert_eq!(updated.slug, created.slug);

    client
        .delete_post(&created.slug)
        .await
        .expect("delete_post must succeed");
    let after_delete = client.get_post(&created.slug).await;
    assert!(matches!(after_delete, Err(BlogClientError::NotFound(_))));

    client.logout().await.expect("logout must succeed");
    assert!(client.get_token().is_none());
}
