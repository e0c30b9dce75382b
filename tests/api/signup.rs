use crate::helpers::{assert_is_redirect_to, spawn_app};

#[tokio::test]
async fn a_valid_signup_redirects_to_login_with_a_flash() {
    // Arrange
    let app = spawn_app().await;

    // Act - Part 1 - Sign up
    let response = app
        .post_signup("Bob", "bob@example.com", "correct-horse-battery")
        .await;
    assert_is_redirect_to(&response, "/user/login");

    // Act - Part 2 - Follow the redirect
    let html = app.get_html("/user/login").await;
    assert!(html.contains("Your signup was successful. Please log in."));

    // Act - Part 3 - The new account works
    let response = app.post_login("bob@example.com", "correct-horse-battery").await;
    assert_is_redirect_to(&response, "/snippet/create");
}

#[tokio::test]
async fn a_duplicate_email_is_reported_on_the_email_field() {
    // Arrange
    let app = spawn_app().await;
    let email = app.test_user.email.clone();

    // Act
    let response = app.post_signup("Bob", &email, "correct-horse-battery").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Address is already in use"));
}

#[tokio::test]
async fn invalid_signups_are_shown_again_with_errors() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (("", "bob@example.com", "correct-horse-battery"), "This field cannot be blank"),
        (("Bob", "not-an-email", "correct-horse-battery"), "This field is invalid"),
        (
            ("Bob", "bob@example.com", "short"),
            "This field is too short (minimum is 10 characters)",
        ),
    ];

    for ((name, email, password), message) in test_cases {
        // Act
        let response = app.post_signup(name, email, password).await;

        // Assert
        assert_eq!(response.status().as_u16(), 200);
        let html = response.text().await.unwrap();
        assert!(html.contains(message), "expected {:?}", message);
    }
}
