use std::sync::Arc;

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::Secret;
use uuid::Uuid;

use snippetbox::authentication::hash_password;
use snippetbox::configuration::{get_configuration, StorageKind};
use snippetbox::domain::NewUser;
use snippetbox::startup::Application;
use snippetbox::storage::{InMemoryStore, Storage, UserStore};
use snippetbox::telemetry::{get_line_subscriber, get_subscriber, init_subscriber};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    // We cannot assign the output of `get_subscriber` to a variable based on the value of `TEST_LOG`
    // because the sink is part of the type returned by `get_subscriber`, therefore they are not the
    // same type. We could work around it, but this is the most straight-forward way of moving forward.
    match std::env::var("TEST_LOG") {
        Ok(v) => {
            if v == "json" {
                init_subscriber(get_subscriber(
                    subscriber_name,
                    default_filter_level,
                    std::io::stdout,
                ));
            } else {
                init_subscriber(get_line_subscriber(
                    default_filter_level,
                    std::io::stdout,
                ));
            }
        }
        _ => {
            let subscriber = get_subscriber(
                subscriber_name,
                default_filter_level,
                std::io::sink,
            );
            init_subscriber(subscriber);
        }
    };
});

static CSRF_INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"name="csrf_token" value="([^"]+)""#).unwrap()
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub test_user: TestUser,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// A second browser: separate cookie jar, same server.
    pub fn new_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .build()
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_html(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    /// A fresh masked token for this client's session.
    ///
    /// Fetching a page consumes any pending flash message.
    pub async fn csrf_token(&self) -> String {
        let html = self.get_html("/user/login").await;
        extract_csrf_token(&html)
    }

    /// Post a form, adding a valid CSRF token.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let token = self.csrf_token().await;
        let mut fields = fields.to_vec();
        fields.push(("csrf_token", token.as_str()));
        self.post_form_without_token(path, &fields).await
    }

    pub async fn post_form_without_token(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", &self.address, path))
            .form(fields)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/user/login", &[("email", email), ("password", password)])
            .await
    }

    pub async fn login_test_user(&self) {
        let response = self
            .post_login(&self.test_user.email, &self.test_user.password)
            .await;
        assert_eq!(response.status().as_u16(), 303);
    }

    pub async fn post_logout(&self) -> reqwest::Response {
        self.post_form("/user/logout", &[]).await
    }

    pub async fn post_signup(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.post_form(
            "/user/signup",
            &[("name", name), ("email", email), ("password", password)],
        )
        .await
    }

    pub async fn post_create_snippet(
        &self,
        title: &str,
        content: &str,
        expires: &str,
    ) -> reqwest::Response {
        self.post_form(
            "/snippet/create",
            &[("title", title), ("content", content), ("expires", expires)],
        )
        .await
    }

    pub async fn post_change_password(
        &self,
        current_password: &str,
        new_password: &str,
        new_password_confirmation: &str,
    ) -> reqwest::Response {
        self.post_form(
            "/user/change-password",
            &[
                ("current_password", current_password),
                ("new_password", new_password),
                ("new_password_confirmation", new_password_confirmation),
            ],
        )
        .await
    }
}

pub fn extract_csrf_token(html: &str) -> String {
    CSRF_INPUT
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_owned())
        .expect("No CSRF token on the page.")
}

pub struct TestUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub async fn generate(users: &dyn UserStore) -> Self {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        let password = Uuid::new_v4().to_string();

        let password_hash = hash_password(Secret::new(password.clone()))
            .await
            .expect("Failed to hash the test password.");
        let user_id = users
            .insert(NewUser {
                name: name.clone(),
                email: email.clone(),
                password_hash,
            })
            .await
            .expect("Failed to store test user.");

        Self {
            user_id,
            name,
            email,
            password,
        }
    }
}

pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    // Randomize configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("failed to read configuration.");
        // Use random port
        c.application.port = 0;
        c.application.debug = false;
        c.session.secure_cookie = false;
        c.storage = StorageKind::Memory;
        c
    };

    let store = Arc::new(InMemoryStore::new());
    let test_user = TestUser::generate(store.as_ref()).await;

    // Launch the application as the background task
    let application =
        Application::build_with_storage(configuration, Storage::in_memory(store.clone()))
            .await
            .expect("failed to build application");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        store,
        test_user,
        api_client,
    }
}

pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}
