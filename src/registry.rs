use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::handler::Handler;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};

use crate::auth::seal_registration;
use crate::err::{self, Error};
use crate::models::{Existence, RegisterStudent, Registered, RegistryQuery, Student};
use crate::store::SharedStore;
use crate::{proceeds, Payload};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str =
    "Content-Type, Access-Control-Allow-Headers, Access-Control-Allow-Methods";

/// Mounts the registry on `path`. Every response, including errors and
/// the 404 fallback, is JSON and carries permissive CORS headers.
pub fn router(path: &str, store: SharedStore) -> Router {
    Router::new()
        .route(
            path,
            get(list_or_check).post(register_student).options(preflight),
        )
        .fallback(err::handler404.into_service())
        .layer(Extension(store))
        .layer(middleware::from_fn(cors_headers))
}

async fn cors_headers<B>(req: Request<B>, next: Next<B>) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    res
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn list_or_check(
    Extension(store): Extension<SharedStore>,
    query: Result<Query<RegistryQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            log::debug!("Rejected query string: {}", rejection);
            return Error::malformed(rejection.to_string()).into_response();
        }
    };

    if query.check.is_some() {
        check_existence(&store, query).await.into_response()
    } else {
        list_students(&store).await.into_response()
    }
}

pub async fn list_students(store: &SharedStore) -> Payload<Vec<Student>> {
    proceeds(store.list().await?)
}

pub async fn check_existence(store: &SharedStore, query: RegistryQuery) -> Payload<Existence> {
    let (student_number, email) = match (query.student_number, query.email) {
        (Some(student_number), Some(email)) => (student_number, email),
        (None, _) => return Err(missing_parameter("student_number")),
        (_, None) => return Err(missing_parameter("email")),
    };

    let exists = store.exists(&student_number, &email).await?;
    proceeds(Existence { exists })
}

async fn register_student(
    Extension(store): Extension<SharedStore>,
    body: Bytes,
) -> Payload<Registered> {
    let request = serde_json::from_slice::<RegisterStudent>(&body).map_err(|err| {
        log::debug!("Rejected registration body: {}", err);
        Error::from(err)
    })?;
    request.validate()?;

    let student = seal_registration(request)?;
    store.insert(&student).await?;
    log::info!("Registered student {}", student.student.student_number);

    proceeds(Registered {
        message: "Student registered successfully",
    })
}

fn missing_parameter(name: &str) -> Error {
    log::debug!("Existence check without `{}`", name);
    Error::malformed(format!("`{}` query parameter is required", name))
}
