//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use mockable::DefaultClock;
use serde_json::{Value, json};

use super::session::SessionContext;
use super::state::HttpState;
use super::{configure_api, validation::json_config};
use crate::domain::{Error, UserId};
use crate::outbound::memory::MemoryStore;

/// Session middleware with a fresh key and an insecure cookie named `session`.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Bare application wrapped in the test session middleware.
pub fn session_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().wrap(test_session_middleware())
}

/// Stand-in for the identity provider: stores the path's user id as principal.
pub async fn login_route(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(path.into_inner())
        .map_err(|error| Error::invalid_request(error.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// The `session` cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Services wired over a fresh in-memory store.
pub fn memory_state() -> (HttpState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = HttpState::from_repositories(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(DefaultClock),
    );
    (state, store)
}

/// Initialised API service plus request shorthands.
pub struct TestClient<S> {
    app: S,
}

/// Start the full `/api/v1` surface over `state`, with a login stub at
/// `POST /test/login/{user_id}`.
pub async fn start_client(
    state: HttpState,
) -> TestClient<impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>> {
    let app = test::init_service(
        session_app()
            .app_data(web::Data::new(state))
            .app_data(json_config())
            .route("/test/login/{user_id}", web::post().to(login_route))
            .service(web::scope("/api/v1").configure(configure_api)),
    )
    .await;
    TestClient { app }
}

impl<S> TestClient<S>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    pub async fn send(&self, request: test::TestRequest, cookie: Option<&Cookie<'static>>) -> ServiceResponse {
        let request = match cookie {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        };
        test::call_service(&self.app, request.to_request()).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&Cookie<'static>>) -> ServiceResponse {
        self.send(test::TestRequest::get().uri(uri), cookie).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&Cookie<'static>>) -> ServiceResponse {
        self.send(test::TestRequest::delete().uri(uri), cookie).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&Cookie<'static>>) -> ServiceResponse {
        self.send(test::TestRequest::post().uri(uri), cookie).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        cookie: Option<&Cookie<'static>>,
        body: &Value,
    ) -> ServiceResponse {
        self.send(test::TestRequest::post().uri(uri).set_json(body), cookie)
            .await
    }

    pub async fn patch_json(
        &self,
        uri: &str,
        cookie: Option<&Cookie<'static>>,
        body: &Value,
    ) -> ServiceResponse {
        self.send(test::TestRequest::patch().uri(uri).set_json(body), cookie)
            .await
    }

    pub async fn register(&self, username: &str) -> ServiceResponse {
        self.post_json("/api/v1/users", None, &json!({ "username": username }))
            .await
    }

    /// Register `username` and return its id as sent on the wire.
    pub async fn register_id(&self, username: &str) -> String {
        let body: Value = test::read_body_json(self.register(username).await).await;
        body["id"].as_str().expect("user id").to_owned()
    }

    pub async fn login(&self, user_id: &str) -> Cookie<'static> {
        let res = self.post(&format!("/test/login/{user_id}"), None).await;
        assert!(res.status().is_success(), "login stub failed");
        session_cookie(&res)
    }
}
