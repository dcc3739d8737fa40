use crate::handlers::{
    delegates::{
        assign_persons, create_delegate, delete_delegate, get_delegate, get_delegates,
        update_delegate,
    },
    governments::{
        create_government, delete_government, filter_governments, get_government,
        get_governments, update_government,
    },
    health::health_check,
    persons::{
        create_person, delete_person, disassociate_delegates, export_persons, filter_persons,
        get_person, get_persons, get_persons_by_delegate, get_persons_by_type,
        get_persons_not_assigned, import_doctors, import_others, update_person,
    },
    products::{
        create_product, delete_product, filter_products, get_product, get_products,
        import_products, update_product,
    },
    regions::{create_region, delete_region, filter_regions, get_region, get_regions, update_region},
    reports::{create_report, delete_report, filter_reports, get_report, get_reports, update_report},
    samples::{
        create_sample, delete_sample, filter_samples, get_sample, get_samples, import_samples,
        update_sample,
    },
    specialties::{
        create_specialty, delete_specialty, get_specialties, get_specialty, update_specialty,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted import upload
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = state.request_timeout;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Geography
        .route("/api/v1/governments", post(create_government).get(get_governments))
        .route("/api/v1/governments/filter", post(filter_governments))
        .route(
            "/api/v1/governments/:government_id",
            get(get_government).put(update_government).delete(delete_government),
        )
        .route("/api/v1/regions", post(create_region).get(get_regions))
        .route("/api/v1/regions/filter", post(filter_regions))
        .route(
            "/api/v1/regions/:region_id",
            get(get_region).put(update_region).delete(delete_region),
        )
        // Specialties
        .route("/api/v1/specialties", post(create_specialty).get(get_specialties))
        .route(
            "/api/v1/specialties/:specialty_id",
            get(get_specialty).put(update_specialty).delete(delete_specialty),
        )
        // Persons
        .route("/api/v1/persons", post(create_person).get(get_persons))
        .route("/api/v1/persons/filter", post(filter_persons))
        .route("/api/v1/persons/type/:type_id", get(get_persons_by_type))
        .route("/api/v1/persons/delegate/:delegate_id", get(get_persons_by_delegate))
        .route(
            "/api/v1/persons/not-delegate/:delegate_id/:type_id",
            get(get_persons_not_assigned),
        )
        .route("/api/v1/persons/import/doctors", post(import_doctors))
        .route("/api/v1/persons/import/others", post(import_others))
        .route("/api/v1/persons/export/type/:type_id", get(export_persons))
        .route(
            "/api/v1/persons/:person_id",
            get(get_person).put(update_person).delete(delete_person),
        )
        .route("/api/v1/persons/:person_id/delegates", delete(disassociate_delegates))
        // Delegates
        .route("/api/v1/delegates", post(create_delegate).get(get_delegates))
        .route(
            "/api/v1/delegates/:delegate_id",
            get(get_delegate).put(update_delegate).delete(delete_delegate),
        )
        .route("/api/v1/delegates/:delegate_id/assign-persons", post(assign_persons))
        // Catalog
        .route("/api/v1/products", post(create_product).get(get_products))
        .route("/api/v1/products/filter", post(filter_products))
        .route("/api/v1/products/import", post(import_products))
        .route(
            "/api/v1/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/v1/samples", post(create_sample).get(get_samples))
        .route("/api/v1/samples/filter", post(filter_samples))
        .route("/api/v1/samples/import", post(import_samples))
        .route(
            "/api/v1/samples/:sample_id",
            get(get_sample).put(update_sample).delete(delete_sample),
        )
        // Reports
        .route("/api/v1/reports", post(create_report).get(get_reports))
        .route("/api/v1/reports/filter", post(filter_reports))
        .route(
            "/api/v1/reports/:report_id",
            get(get_report).put(update_report).delete(delete_report),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .layer(CorsLayer::permissive()),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
