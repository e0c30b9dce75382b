use crate::helpers::{assert_is_redirect_to, spawn_app};

#[tokio::test]
async fn you_must_be_logged_in_to_log_out() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_logout().await;

    // Assert
    assert_is_redirect_to(&response, "/user/login");
}

#[tokio::test]
async fn logout_clears_session_state() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;

    // Act - Part 1 - Logout
    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/");

    // Act - Part 2 - Follow the redirect
    let html = app.get_html("/").await;
    assert!(html.contains("You've been logged out successfully!"));
    assert!(html.contains(r#"href="/user/login""#));

    // Act - Part 3 - Attempt to load the profile page
    let response = app.get("/user/profile").await;
    assert_is_redirect_to(&response, "/user/login");
}
