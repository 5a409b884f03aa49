use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::prediction::handler::upload_image,
        crate::features::prediction::handler::get_prediction_status,
        crate::features::health::handler::health_check,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::features::prediction::models::UploadForm,
            crate::features::prediction::models::UploadResponse,
            crate::features::health::handler::HealthResponse,
        )
    ),
    tags(
        (name = "Prediction", description = "Upload & status relay APIs"),
        (name = "Health", description = "Health APIs"),
    ),
    info(
        title = "Cutout Backend API",
        version = "0.1.0",
        description = "Background removal relay for the Replicate predictions API (Axum)"
    )
)]
pub struct ApiDoc;
