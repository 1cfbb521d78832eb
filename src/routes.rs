use crate::{
    auth::{backend::MemberBackend, crud_session_store::CrudSessionStore},
    state::PortalState,
};
use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{Expiry, SessionManagerLayer, cookie::time::Duration},
};

pub mod auth_modal;
pub mod careers;
pub mod index;
pub mod info_pages;
pub mod placements;
pub mod profile;
pub mod students;

///every page, plus the session and auth layers, with sessions kept in the state's store
pub fn build_router(state: PortalState) -> Router {
    let session_store = CrudSessionStore::new(state.store_handle());
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(5)));
    let auth_backend = MemberBackend::new(state.store_handle());
    let auth_layer = AuthManagerLayerBuilder::new(auth_backend, session_layer).build();

    Router::new()
        .route("/", get(index::get_index))
        .route("/home", get(index::get_index))
        .route("/about", get(info_pages::get_about))
        .route("/gallery", get(info_pages::get_gallery))
        .route("/ratings", get(info_pages::get_ratings))
        .route("/careers", get(careers::get_careers))
        .route("/profile", get(profile::get_profile))
        .route("/students", get(students::get_students))
        .route(
            "/students/new",
            get(students::get_new_student).post(students::post_new_student),
        )
        .route("/students/{id}", get(students::get_student))
        .route(
            "/students/{id}/edit",
            get(students::get_edit_student).post(students::post_edit_student),
        )
        .route("/placements", get(placements::get_placements))
        .route(
            "/placements/new",
            get(placements::get_new_placement).post(placements::post_new_placement),
        )
        .route("/placements/{id}", get(placements::get_placement))
        .route(
            "/placements/{id}/edit",
            get(placements::get_edit_placement).post(placements::post_edit_placement),
        )
        .route(
            "/internal/auth_modal",
            get(auth_modal::internal_get_auth_modal).post(auth_modal::internal_post_auth_modal),
        )
        .route(
            "/internal/auth_modal/mode",
            post(auth_modal::internal_post_switch_mode),
        )
        .route(
            "/internal/auth_modal/close",
            get(auth_modal::internal_get_close_modal),
        )
        .route(
            "/internal/auth_modal/oauth/{provider}",
            post(auth_modal::internal_post_oauth),
        )
        .route("/logout", post(auth_modal::post_logout))
        .fallback(|| async { Redirect::to("/") })
        .layer(auth_layer)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::build_router;
    use crate::{
        config::RuntimeConfiguration, crud::memory::InMemoryCrudStore, state::PortalState,
    };
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, Response, header},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    pub fn app() -> (Router, InMemoryCrudStore) {
        let store = InMemoryCrudStore::new();
        let state = PortalState::with_store(
            Arc::new(store.clone()),
            RuntimeConfiguration::in_memory("127.0.0.1:0"),
        );
        (build_router(state), store)
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_text(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    ///the `name=value` half of the session cookie, ready to send back
    pub fn session_cookie(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get(header::SET_COOKIE)?
            .to_str()
            .ok()?
            .split(';')
            .next()
            .map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use axum::http::{StatusCode, header};

    #[tokio::test]
    async fn unknown_paths_redirect_home() {
        let (app, _) = app();
        let response = send(&app, get("/definitely/not/a/page")).await;

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn static_pages_render_with_nav() {
        let (app, _) = app();

        for page in ["/", "/home", "/about", "/gallery", "/ratings", "/careers"] {
            let response = send(&app, get(page)).await;
            assert_eq!(response.status(), StatusCode::OK, "{page}");

            let body = body_text(response).await;
            assert!(body.contains("PlaceRight"), "{page}");
            assert!(body.contains("id=\"auth_modal\""), "{page}");
            assert!(body.contains("Sign in"), "{page}");
        }
    }
}
