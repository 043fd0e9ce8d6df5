//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the lesson quiz REST endpoints (enrollment,
//! dashboard, lesson reading and lesson authoring) so client code can be
//! generated from it. The quiz itself runs over `/ws` and is not described here.
//!
//! Usage: `openapi [OUTPUT_PATH]`, defaulting to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn lesson_quiz_document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = "Lesson Quiz API".to_string();
    doc
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let json = lesson_quiz_document().to_pretty_json()?;
    std::fs::write(&path, json)?;
    println!("Lesson quiz OpenAPI document written to {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_the_rest_endpoints() {
        let doc = lesson_quiz_document();
        assert_eq!(doc.info.title, "Lesson Quiz API");
        for path in ["/enroll", "/dashboard", "/lessons", "/lessons/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
