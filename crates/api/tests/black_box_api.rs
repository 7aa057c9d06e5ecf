use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use catalog_api::app::{AppState, build_app};
use catalog_auth::{Mobile, RoleFlags, TokenSettings, UserInput, UserStore};
use catalog_core::{BrandId, ManufacturerId, VariantId};
use catalog_infra::{InMemoryStore, Repository};
use catalog_products::{Brand, Variant};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    state: AppState,
    store: Arc<InMemoryStore>,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(store.clone(), &TokenSettings::new(JWT_SECRET));
        let app = build_app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            store,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn user_with_roles(&self, mobile: &str, roles: RoleFlags) {
        let input = UserInput {
            mobile: Some(mobile.into()),
            password: Some("secret123".into()),
            name: Some("testuser".into()),
        };
        self.state.auth.create_user_with_roles(input, roles).await.unwrap();
    }

    async fn login(&self, mobile: &str) -> Value {
        let res = self
            .client
            .post(self.url("/token/"))
            .json(&json!({ "mobile": mobile, "password": "secret123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn access_token(&self, mobile: &str, roles: RoleFlags) -> String {
        self.user_with_roles(mobile, roles).await;
        self.login(mobile).await["access"].as_str().unwrap().to_string()
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// POST and return the created body, failing loudly on anything but 201.
    async fn create(&self, path: &str, token: &str, body: Value) -> Value {
        let res = self.post(path, token, body).await;
        let status = res.status();
        let body: Value = res.json().await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "unexpected body {body}");
        body
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Manufacturer, brand and product ids for variant payloads.
async fn catalog_fixture(srv: &TestServer, token: &str) -> (String, String, String) {
    let manufacturer = srv.create("/manufacturer/", token, json!({ "name": "Acme" })).await;
    let m = manufacturer["id"].as_str().unwrap().to_string();

    let brand = srv
        .create("/brand/", token, json!({ "name": "Roadrunner", "manufacturer": m }))
        .await;
    let b = brand["id"].as_str().unwrap().to_string();

    let product = srv
        .create(
            "/product/",
            token,
            json!({ "name": "Rocket", "manufacturer": m, "brand": b, "description": null }),
        )
        .await;
    let p = product["id"].as_str().unwrap().to_string();

    (m, b, p)
}

fn variant(m: &str, b: &str, p: &str, sku: &str) -> Value {
    json!({
        "name": "Red",
        "product": p,
        "manufacturer": m,
        "brand": b,
        "price": 19.99,
        "SKU": sku,
        "stock": 4,
    })
}

#[tokio::test]
async fn register_then_login_issues_both_tokens() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/user/create/"))
        .json(&json!({ "mobile": "9876543210", "name": "validname", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User created successfully");

    let tokens = srv.login("9876543210").await;
    assert_eq!(tokens["mobile"], "9876543210");
    assert_eq!(tokens["name"], "validname");
    assert!(tokens["refresh"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(tokens["access"].as_str().is_some_and(|t| !t.is_empty()));

    let user = srv
        .store
        .find_by_mobile(&Mobile::parse("9876543210").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(user.last_login.is_some());
}

#[tokio::test]
async fn registration_rejects_malformed_mobile() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/user/create/"))
        .json(&json!({ "mobile": "98765", "name": "validname", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["fields"]["mobile"][0], "mobile number must be 10 digits");
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let srv = TestServer::spawn().await;
    srv.user_with_roles("9876543210", RoleFlags::member()).await;

    let res = srv
        .client
        .post(srv.url("/user/create/"))
        .json(&json!({ "mobile": "9876543210", "name": "othername", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    srv.user_with_roles("9876543210", RoleFlags::member()).await;

    let mut bodies = Vec::new();
    for (mobile, password) in [("9876543210", "wrongpass"), ("1111111111", "secret123")] {
        let res = srv
            .client
            .post(srv.url("/token/"))
            .json(&json!({ "mobile": mobile, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        bodies.push(res.json::<Value>().await.unwrap());
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["message"], "Unable to authenticate with provided credentials");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    for path in ["/manufacturer/", "/user/me/"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key("www-authenticate"));
    }
}

#[tokio::test]
async fn members_read_but_cannot_write() {
    let srv = TestServer::spawn().await;
    let member = srv.access_token("9000000001", RoleFlags::member()).await;

    let res = srv.client.get(srv.url("/manufacturer/")).bearer_auth(&member).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.post("/manufacturer/", &member, json!({ "name": "Acme" })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "permission_denied");
}

#[tokio::test]
async fn options_describes_collections_instances_and_profile() {
    let srv = TestServer::spawn().await;
    let exec = srv.access_token("9000000010", RoleFlags::executive()).await;
    let member = srv.access_token("9000000011", RoleFlags::member()).await;
    let created = srv.create("/manufacturer/", &exec, json!({ "name": "Zeta" })).await;
    let id = created["id"].as_str().unwrap();

    let cases = [
        ("/manufacturer/".to_string(), "GET, POST, HEAD, OPTIONS"),
        (format!("/manufacturer/{id}/"), "GET, PUT, PATCH, DELETE, HEAD, OPTIONS"),
        ("/user/me/".to_string(), "GET, PUT, PATCH, HEAD, OPTIONS"),
    ];
    for (path, allow) in cases {
        let res = srv
            .client
            .request(reqwest::Method::OPTIONS, srv.url(&path))
            .bearer_auth(&member)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(res.headers()["allow"], allow, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["methods"].as_array().map(Vec::len), Some(allow.split(", ").count()));
    }
}

#[tokio::test]
async fn executive_crud_lifecycle() {
    let srv = TestServer::spawn().await;
    let exec = srv.access_token("9000000002", RoleFlags::executive()).await;

    let created = srv.create("/manufacturer/", &exec, json!({ "name": "Acme" })).await;
    let id = created["id"].as_str().unwrap();
    assert!(created["date_added"].is_string());
    assert!(created.get("user").is_none());

    let res = srv
        .client
        .patch(srv.url(&format!("/manufacturer/{id}/")))
        .bearer_auth(&exec)
        .json(&json!({ "name": "Acme Corp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Acme Corp");

    // PUT needs every required field.
    let res = srv
        .client
        .put(srv.url(&format!("/manufacturer/{id}/")))
        .bearer_auth(&exec)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .delete(srv.url(&format!("/manufacturer/{id}/")))
        .bearer_auth(&exec)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv
        .client
        .get(srv.url(&format!("/manufacturer/{id}/")))
        .bearer_auth(&exec)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn variant_create_attaches_owner_and_rejects_duplicate_sku() {
    let srv = TestServer::spawn().await;
    let exec = srv.access_token("9000000003", RoleFlags::executive()).await;
    let (m, b, p) = catalog_fixture(&srv, &exec).await;

    let created = srv.create("/variant/", &exec, variant(&m, &b, &p, "RKT-RED")).await;
    assert_eq!(created["SKU"], "RKT-RED");

    let id: VariantId = created["id"].as_str().unwrap().parse().unwrap();
    let stored = Repository::<Variant>::get(srv.store.as_ref(), id).await.unwrap().unwrap();
    let owner = srv
        .store
        .find_by_mobile(&Mobile::parse("9000000003").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user, owner.id);

    let res = srv.post("/variant/", &exec, variant(&m, &b, &p, "RKT-RED")).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
    assert!(body["fields"]["SKU"].is_array());
}

#[tokio::test]
async fn variant_batch_is_all_or_nothing() {
    let srv = TestServer::spawn().await;
    let exec = srv.access_token("9000000004", RoleFlags::executive()).await;
    let (m, b, p) = catalog_fixture(&srv, &exec).await;

    let batch = json!([variant(&m, &b, &p, "A-1"), variant(&m, &b, &p, "A-2")]);
    let created = srv.create("/variant/", &exec, batch).await;
    assert_eq!(created.as_array().map(Vec::len), Some(2));

    // Second item collides with a stored SKU: nothing from this batch lands.
    let batch = json!([variant(&m, &b, &p, "A-3"), variant(&m, &b, &p, "A-1")]);
    let res = srv.post("/variant/", &exec, batch).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let listed: Value = srv
        .client
        .get(srv.url("/variant/"))
        .bearer_auth(&exec)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn deleting_a_manufacturer_cascades() {
    let srv = TestServer::spawn().await;
    let exec = srv.access_token("9000000005", RoleFlags::executive()).await;
    let (m, b, _p) = catalog_fixture(&srv, &exec).await;

    let res = srv
        .client
        .delete(srv.url(&format!("/manufacturer/{m}/")))
        .bearer_auth(&exec)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let brand_id: BrandId = b.parse().unwrap();
    assert!(Repository::<Brand>::get(srv.store.as_ref(), brand_id).await.unwrap().is_none());

    let products: Value = srv
        .client
        .get(srv.url("/product/"))
        .bearer_auth(&exec)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(products.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unknown_reference_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let exec = srv.access_token("9000000006", RoleFlags::executive()).await;

    let res = srv
        .post(
            "/brand/",
            &exec,
            json!({ "name": "Orphan", "manufacturer": ManufacturerId::new().to_string() }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["fields"]["manufacturer"].is_array());
}

#[tokio::test]
async fn refresh_token_mints_a_working_access_token() {
    let srv = TestServer::spawn().await;
    srv.user_with_roles("9000000007", RoleFlags::member()).await;
    let tokens = srv.login("9000000007").await;

    let res = srv
        .client
        .post(srv.url("/token/refresh/"))
        .json(&json!({ "refresh": tokens["refresh"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let access = body["access"].as_str().unwrap();

    let res = srv.client.get(srv.url("/user/me/")).bearer_auth(access).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me, json!({ "mobile": "9000000007", "name": "testuser" }));

    // A refresh token is not a bearer credential.
    let res = srv
        .client
        .get(srv.url("/user/me/"))
        .bearer_auth(tokens["refresh"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_superusers_edit_their_profile() {
    let srv = TestServer::spawn().await;
    let member = srv.access_token("9000000008", RoleFlags::member()).await;
    let admin = srv.access_token("9000000009", RoleFlags::superuser()).await;

    let res = srv
        .client
        .patch(srv.url("/user/me/"))
        .bearer_auth(&member)
        .json(&json!({ "name": "renamedmember" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .patch(srv.url("/user/me/"))
        .bearer_auth(&admin)
        .json(&json!({ "name": "renamedadmin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "renamedadmin");
}
