use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder, Paths};

/// Minimal OpenAPI specification for Feed Service.
pub fn doc() -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Ripple Feed Service API")
                .version("1.0.0")
                .description(Some(
                    "Ranked main feed and post read endpoints for the Ripple platform.",
                ))
                .build(),
        )
        .paths(Paths::new())
        .build()
}
