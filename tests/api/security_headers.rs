use crate::helpers::spawn_app;

fn assert_has_security_headers(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers.get("X-XSS-Protection").unwrap(), "1; mode=block");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "deny");
    assert_eq!(headers.get_all("X-Frame-Options").iter().count(), 1);
}

#[tokio::test]
async fn pages_carry_security_headers() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_has_security_headers(&response);
}

#[tokio::test]
async fn not_found_responses_carry_security_headers() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/does/not/exist").await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    assert_has_security_headers(&response);
    assert_eq!(response.text().await.unwrap(), "Not Found");
}

#[tokio::test]
async fn rejected_posts_carry_security_headers() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_form_without_token("/user/login", &[]).await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    assert_has_security_headers(&response);
}

#[tokio::test]
async fn ping_carries_security_headers() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get("/ping").await;

    // Assert
    assert_has_security_headers(&response);
}
