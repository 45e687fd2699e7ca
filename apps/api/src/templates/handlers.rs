use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use crate::models::document::DocumentKind;
use crate::templates::{catalog, TemplateInfo};

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub kind: Option<DocumentKind>,
}

#[derive(Serialize)]
pub struct CatalogEntry {
    pub kind: DocumentKind,
    #[serde(flatten)]
    pub template: TemplateInfo,
}

/// GET /api/v1/templates?kind=resume|cover_letter
/// Lists both families when no kind is given.
pub async fn handle_list_templates(Query(query): Query<CatalogQuery>) -> Json<Vec<CatalogEntry>> {
    let kinds = match query.kind {
        Some(kind) => vec![kind],
        None => vec![DocumentKind::Resume, DocumentKind::CoverLetter],
    };
    let entries = kinds
        .into_iter()
        .flat_map(|kind| {
            catalog(kind)
                .into_iter()
                .map(move |template| CatalogEntry { kind, template })
        })
        .collect();
    Json(entries)
}
