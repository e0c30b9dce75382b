use crate::helpers::{assert_is_redirect_to, spawn_app};

#[tokio::test]
async fn you_must_be_logged_in_to_see_the_create_form() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/snippet/create").await;

    // Assert
    assert_is_redirect_to(&response, "/user/login");
}

#[tokio::test]
async fn you_must_be_logged_in_to_create_a_snippet() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .post_create_snippet("O snail", "Climb Mount Fuji", "7")
        .await;

    // Assert
    assert_is_redirect_to(&response, "/user/login");
}

#[tokio::test]
async fn the_create_form_is_never_cached() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;

    // Act
    let response = app.get("/snippet/create").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers().get("Cache-Control").unwrap(), "no-store");
}

#[tokio::test]
async fn a_created_snippet_can_be_viewed() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;

    // Act - Part 1 - Create
    let response = app
        .post_create_snippet("O snail", "Climb Mount Fuji,\nBut slowly, slowly!", "7")
        .await;
    assert_is_redirect_to(&response, "/snippet/1");

    // Act - Part 2 - Follow the redirect
    let html = app.get_html("/snippet/1").await;

    // Assert
    assert!(html.contains("Snippet successfully created!"));
    assert!(html.contains("O snail"));
    assert!(html.contains("But slowly, slowly!"));

    // Act - Part 3 - The flash is shown only once
    let html = app.get_html("/snippet/1").await;
    assert!(!html.contains("Snippet successfully created!"));
}

#[tokio::test]
async fn invalid_submissions_are_shown_again_with_errors() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;

    // Act
    let response = app
        .post_create_snippet("", "Some content", "30")
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("This field cannot be blank"));
    assert!(html.contains("This field is invalid"));
    assert!(html.contains("Some content"));
}

#[tokio::test]
async fn titles_longer_than_100_characters_are_rejected() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;
    let title = "a".repeat(101);

    // Act
    let response = app.post_create_snippet(&title, "content", "1").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("This field is too long (maximum is 100 characters)"));
}

#[tokio::test]
async fn show_snippet_only_accepts_positive_integer_ids() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;
    let response = app.post_create_snippet("An old silent pond", "A frog jumps in", "365").await;
    assert_is_redirect_to(&response, "/snippet/1");

    let test_cases = vec![
        ("/snippet/1", 200, "An old silent pond"),
        ("/snippet/999999", 404, "Not Found"),
        ("/snippet/-1", 404, "Not Found"),
        ("/snippet/1.23", 404, "Not Found"),
        ("/snippet/foo", 404, "Not Found"),
        ("/snippet/", 404, "Not Found"),
        ("/snippet/1/", 404, "Not Found"),
    ];

    for (path, status, body) in test_cases {
        // Act
        let response = app.get(path).await;

        // Assert
        assert_eq!(
            response.status().as_u16(),
            status,
            "unexpected status for {}",
            path
        );
        let html = response.text().await.unwrap();
        assert!(html.contains(body), "{} did not contain {:?}", path, body);
    }
}

#[tokio::test]
async fn the_home_page_lists_the_latest_snippets_newest_first() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;
    for i in 1..=11 {
        let response = app
            .post_create_snippet(&format!("Snippet number {:02}", i), "content", "1")
            .await;
        assert_eq!(response.status().as_u16(), 303);
    }

    // Act
    let html = app.get_html("/").await;

    // Assert
    assert!(!html.contains("Snippet number 01"));
    let newest = html.find("Snippet number 11").unwrap();
    let oldest_shown = html.find("Snippet number 02").unwrap();
    assert!(newest < oldest_shown);
}

#[tokio::test]
async fn the_home_page_works_with_no_snippets() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let html = app.get_html("/").await;

    // Assert
    assert!(html.contains("There's nothing to see here... yet!"));
}
