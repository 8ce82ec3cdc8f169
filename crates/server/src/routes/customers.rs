use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::Deserialize;
use tracing::info;

use common::types::{CustomerRegistration, CustomerSession, CustomerUpdate, CustomerView, LoginRequest, MessageResponse};
use service::auth::domain::{LoginInput, Role};
use service::customer_service::{self, CustomerSearch};
use service::errors::ServiceError;

use crate::{errors::{ApiJson, ApiPath, ApiQuery, JsonApiError}, routes::session_cookie, state::ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NameQuery { pub name: String }

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AddressQuery { pub address: String }

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PhoneQuery { pub phone_number: String }

#[utoipa::path(
    post, path = "/api/customers", tag = "customers",
    request_body = crate::openapi::CustomerRegistrationDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn register(State(state): State<ServerState>, WithRejection(Json(input), _): ApiJson<CustomerRegistration>) -> Result<(StatusCode, Json<CustomerView>), JsonApiError> {
    let created = customer_service::register(&state.db, input).await?;
    info!(customer_id = created.id, "customer registered");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post, path = "/api/customers/login", tag = "customers",
    request_body = crate::openapi::LoginRequestDoc,
    responses(
        (status = 200, description = "Logged In"),
        (status = 400, description = "Email and password are required"),
        (status = 401, description = "Invalid email or password.")
    )
)]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, WithRejection(Json(input), _): ApiJson<LoginRequest>) -> Result<(CookieJar, Json<CustomerSession>), JsonApiError> {
    let session = state.auth
        .login(LoginInput { role: Role::Customer, email: input.email, password: input.password })
        .await
        .map_err(ServiceError::from)?;
    let customer = customer_service::get(&state.db, session.account_id).await?;
    let jar = match &session.token {
        Some(token) => jar.add(session_cookie(token.clone())),
        None => jar,
    };
    info!(customer_id = customer.id, "customer logged in");
    Ok((jar, Json(CustomerSession { customer, token: session.token })))
}

#[utoipa::path(get, path = "/api/customers", tag = "customers", responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<CustomerView>>, JsonApiError> {
    Ok(Json(customer_service::list(&state.db).await?))
}

#[utoipa::path(
    get, path = "/api/customers/{id}", tag = "customers",
    params(("id" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<CustomerView>, JsonApiError> {
    Ok(Json(customer_service::get(&state.db, id).await?))
}

#[utoipa::path(
    get, path = "/api/customers/email/{email}", tag = "customers",
    params(("email" = String, Path, description = "Customer email")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get_by_email(State(state): State<ServerState>, WithRejection(Path(email), _): ApiPath<String>) -> Result<Json<CustomerView>, JsonApiError> {
    Ok(Json(customer_service::get_by_email(&state.db, &email).await?))
}

#[utoipa::path(get, path = "/api/customers/search", tag = "customers", params(SearchQuery), responses((status = 200, description = "Matches")))]
pub async fn search(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<SearchQuery>) -> Result<Json<Vec<CustomerView>>, JsonApiError> {
    let filter = CustomerSearch { first_name: q.first_name, last_name: q.last_name, address: q.address };
    Ok(Json(customer_service::search(&state.db, filter).await?))
}

pub async fn search_first_name(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<NameQuery>) -> Result<Json<Vec<CustomerView>>, JsonApiError> {
    let filter = CustomerSearch { first_name: Some(q.name), ..Default::default() };
    Ok(Json(customer_service::search(&state.db, filter).await?))
}

pub async fn search_last_name(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<NameQuery>) -> Result<Json<Vec<CustomerView>>, JsonApiError> {
    let filter = CustomerSearch { last_name: Some(q.name), ..Default::default() };
    Ok(Json(customer_service::search(&state.db, filter).await?))
}

pub async fn search_address(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<AddressQuery>) -> Result<Json<Vec<CustomerView>>, JsonApiError> {
    let filter = CustomerSearch { address: Some(q.address), ..Default::default() };
    Ok(Json(customer_service::search(&state.db, filter).await?))
}

#[utoipa::path(
    get, path = "/api/customers/search/phone", tag = "customers", params(PhoneQuery),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn search_phone(State(state): State<ServerState>, WithRejection(Query(q), _): ApiQuery<PhoneQuery>) -> Result<Json<CustomerView>, JsonApiError> {
    Ok(Json(customer_service::find_by_phone(&state.db, &q.phone_number).await?))
}

#[utoipa::path(
    put, path = "/api/customers/{id}", tag = "customers",
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = crate::openapi::CustomerUpdateDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>, WithRejection(Json(input), _): ApiJson<CustomerUpdate>) -> Result<Json<CustomerView>, JsonApiError> {
    Ok(Json(customer_service::update(&state.db, id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/customers/{id}", tag = "customers",
    params(("id" = i32, Path, description = "Customer ID")),
    responses((status = 200, description = "Customer deleted successfully."), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, WithRejection(Path(id), _): ApiPath<i32>) -> Result<Json<MessageResponse>, JsonApiError> {
    customer_service::delete(&state.db, id).await?;
    info!(customer_id = id, "customer deleted");
    Ok(Json(MessageResponse { message: "Customer deleted successfully.".into() }))
}
