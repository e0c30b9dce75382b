use uuid::Uuid;

use crate::helpers::{assert_is_redirect_to, spawn_app};

#[tokio::test]
async fn you_must_be_logged_in_to_see_the_change_password_form() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/user/change-password").await;

    // Assert
    assert_is_redirect_to(&response, "/user/login");
}

#[tokio::test]
async fn you_must_be_logged_in_to_change_your_password() {
    // Arrange
    let app = spawn_app().await;
    let new_password = Uuid::new_v4().to_string();

    // Act
    let response = app
        .post_change_password(&Uuid::new_v4().to_string(), &new_password, &new_password)
        .await;

    // Assert
    assert_is_redirect_to(&response, "/user/login");
}

#[tokio::test]
async fn new_password_fields_must_match() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;
    let new_password = Uuid::new_v4().to_string();
    let another_new_password = Uuid::new_v4().to_string();

    // Act
    let response = app
        .post_change_password(&app.test_user.password, &new_password, &another_new_password)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Passwords do not match"));
}

#[tokio::test]
async fn current_password_must_be_valid() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;
    let new_password = Uuid::new_v4().to_string();
    let wrong_password = Uuid::new_v4().to_string();

    // Act
    let response = app
        .post_change_password(&wrong_password, &new_password, &new_password)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Current password is incorrect"));
}

#[tokio::test]
async fn new_password_must_be_long_enough() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;

    // Act
    let response = app
        .post_change_password(&app.test_user.password, "short", "short")
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("This field is too short (minimum is 10 characters)"));
}

#[tokio::test]
async fn changing_password_works() {
    // Arrange
    let app = spawn_app().await;
    app.login_test_user().await;
    let new_password = Uuid::new_v4().to_string();

    // Act - Part 1 - Change password
    let response = app
        .post_change_password(&app.test_user.password, &new_password, &new_password)
        .await;
    assert_is_redirect_to(&response, "/user/profile");

    // Act - Part 2 - Follow the redirect
    let html = app.get_html("/user/profile").await;
    assert!(html.contains("Your password has been updated!"));

    // Act - Part 3 - Logout
    let response = app.post_logout().await;
    assert_is_redirect_to(&response, "/");

    // Act - Part 4 - The old password no longer works
    let response = app
        .post_login(&app.test_user.email, &app.test_user.password)
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // Act - Part 5 - The new one does
    let response = app.post_login(&app.test_user.email, &new_password).await;
    assert_is_redirect_to(&response, "/snippet/create");
}
