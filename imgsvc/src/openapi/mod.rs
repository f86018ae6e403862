//! OpenAPI documentation for the image API.
//!
//! Served as JSON at `/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "imgsvc",
        description = "Upload images, run analysis tasks over them and browse the results."
    ),
    paths(
        api::handlers::images::upload_image,
        api::handlers::images::list_images,
        api::handlers::images::view_image,
    ),
    components(schemas(
        api::models::images::UploadResponse,
        api::models::images::ImageHistoryItem,
    )),
    tags(
        (name = "images", description = "Image upload, history and retrieval")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_image_routes() {
        let doc = ApiDoc::openapi();

        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        assert!(paths.contains(&"/images"));
        assert!(paths.contains(&"/images/view/{name}"));

        let images = &doc.paths.paths["/images"];
        assert!(images.post.is_some());
        assert!(images.get.is_some());
    }
}
