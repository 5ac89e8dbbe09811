use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::convert::handler::index,
        crate::modules::convert::handler::convert,
    ),
    components(
        schemas(
            crate::modules::convert::dto::ConvertForm,
            crate::modules::convert::dto::Quality,
            crate::common::response::ErrorResponse,
        )
    ),
    tags(
        (name = "Convert", description = "Audio extraction to MP3")
    )
)]
pub struct ApiDoc;
