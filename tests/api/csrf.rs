use crate::helpers::{extract_csrf_token, spawn_app};

#[tokio::test]
async fn a_post_without_a_token_is_rejected() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_form_without_token(
            "/user/login",
            &[
                ("email", app.test_user.email.as_str()),
                ("password", app.test_user.password.as_str()),
            ],
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "Bad Request");
}

#[tokio::test]
async fn a_token_from_another_session_is_rejected() {
    // Arrange
    let app = spawn_app().await;
    let other_client = app.new_client();
    let html = other_client
        .get(&format!("{}/user/login", app.address))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let foreign_token = extract_csrf_token(&html);
    // Make sure our own session exists.
    app.get("/").await;

    // Act
    let response = app
        .post_form_without_token(
            "/user/login",
            &[
                ("email", app.test_user.email.as_str()),
                ("password", app.test_user.password.as_str()),
                ("csrf_token", foreign_token.as_str()),
            ],
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn a_token_in_the_header_is_accepted() {
    // Arrange
    let app = spawn_app().await;
    let token = app.csrf_token().await;

    // Act
    let response = app
        .api_client
        .post(&format!("{}/user/login", app.address))
        .header("X-CSRF-Token", token)
        .form(&[
            ("email", app.test_user.email.as_str()),
            ("password", app.test_user.password.as_str()),
        ])
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 303);
}

#[tokio::test]
async fn tokens_change_per_page_but_all_of_them_validate() {
    // Arrange
    let app = spawn_app().await;
    let first = app.csrf_token().await;
    let second = app.csrf_token().await;
    assert_ne!(first, second);

    // Act
    let with_first = app
        .post_form_without_token(
            "/user/login",
            &[("email", "nobody@example.com"), ("password", "whatever"), ("csrf_token", &first)],
        )
        .await;
    let with_second = app
        .post_form_without_token(
            "/user/login",
            &[("email", "nobody@example.com"), ("password", "whatever"), ("csrf_token", &second)],
        )
        .await;

    // Assert
    assert_eq!(with_first.status().as_u16(), 200);
    assert_eq!(with_second.status().as_u16(), 200);
}
