use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequestDoc { pub email: String, pub password: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CustomerRegistrationDoc {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub password: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CustomerUpdateDoc {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// Empty keeps the current password.
    pub password: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProviderRegistrationDoc {
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub license_number: Option<String>,
    pub years_experience: Option<i32>,
    pub primary_service: Option<String>,
    pub password: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProviderUpdateDoc {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub business_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub license_number: Option<String>,
    pub years_experience: Option<i32>,
    pub primary_service: Option<String>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewServiceDoc {
    pub provider_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub service_type: Option<String>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServiceUpdateDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub service_type: Option<String>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewSubscriptionDoc { pub customer_id: i32, pub service_id: i32 }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct NewReviewDoc {
    pub customer_id: i32,
    pub service_id: i32,
    /// 1 through 5.
    pub rating: i32,
    pub comment: String,
}

#[derive(ToSchema)]
pub struct ReviewUpdateDoc { pub rating: i32, pub comment: String }

#[derive(ToSchema)]
pub struct ProviderReplyDoc { pub response: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    pub error: String,
    pub message: Option<String>,
    pub field: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::customers::register,
        crate::routes::customers::login,
        crate::routes::customers::list,
        crate::routes::customers::get,
        crate::routes::customers::get_by_email,
        crate::routes::customers::search,
        crate::routes::customers::search_phone,
        crate::routes::customers::update,
        crate::routes::customers::delete,
        crate::routes::providers::register,
        crate::routes::providers::login,
        crate::routes::providers::list,
        crate::routes::providers::list_active,
        crate::routes::providers::get,
        crate::routes::providers::update,
        crate::routes::providers::delete,
        crate::routes::services::list,
        crate::routes::services::list_active,
        crate::routes::services::search,
        crate::routes::services::list_by_provider,
        crate::routes::services::get,
        crate::routes::services::create,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::activate,
        crate::routes::services::deactivate,
        crate::routes::subscriptions::create,
        crate::routes::subscriptions::list,
        crate::routes::subscriptions::get,
        crate::routes::subscriptions::list_by_customer,
        crate::routes::subscriptions::list_by_service,
        crate::routes::subscriptions::list_by_provider,
        crate::routes::subscriptions::delete,
        crate::routes::subscriptions::delete_pair,
        crate::routes::subscriptions::check,
        crate::routes::subscriptions::count_by_customer,
        crate::routes::subscriptions::count_by_service,
        crate::routes::reviews::create,
        crate::routes::reviews::list,
        crate::routes::reviews::get,
        crate::routes::reviews::update,
        crate::routes::reviews::delete,
        crate::routes::reviews::list_by_service,
        crate::routes::reviews::list_by_customer,
        crate::routes::reviews::list_by_provider,
        crate::routes::reviews::average_rating,
        crate::routes::reviews::rating_distribution,
        crate::routes::reviews::provider_statistics,
        crate::routes::reviews::respond,
        crate::routes::location::with_distance,
        crate::routes::location::nearby,
        crate::routes::location::distance,
        crate::routes::location::geocode,
        crate::routes::location::distance_summary,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBodyDoc,
            LoginRequestDoc,
            CustomerRegistrationDoc,
            CustomerUpdateDoc,
            ProviderRegistrationDoc,
            ProviderUpdateDoc,
            NewServiceDoc,
            ServiceUpdateDoc,
            NewSubscriptionDoc,
            NewReviewDoc,
            ReviewUpdateDoc,
            ProviderReplyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "customers"),
        (name = "providers"),
        (name = "services"),
        (name = "subscriptions"),
        (name = "reviews"),
        (name = "location")
    )
)]
pub struct ApiDoc;
