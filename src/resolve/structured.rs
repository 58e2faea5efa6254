use crate::domain::render::{GeoKind, GeoNode, RenderModel};
use serde_json::{json, Map, Value};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

fn schema_type(kind: GeoKind) -> &'static str {
    match kind {
        GeoKind::City => "City",
        GeoKind::AdministrativeArea => "AdministrativeArea",
        GeoKind::Country => "Country",
    }
}

/// GeoNode → schema.org Place (遞迴 containedInPlace)
pub fn place_json(node: &GeoNode) -> Value {
    let mut place = Map::new();
    place.insert("@type".to_string(), json!(schema_type(node.kind)));
    place.insert("name".to_string(), json!(node.name));
    if let Some(geo) = node.geo {
        place.insert(
            "geo".to_string(),
            json!({
                "@type": "GeoCoordinates",
                "latitude": geo.lat,
                "longitude": geo.lng,
            }),
        );
    }
    if let Some(external_ref) = &node.external_ref {
        place.insert("sameAs".to_string(), json!(external_ref));
    }
    if let Some(container) = &node.contained_in_place {
        place.insert("containedInPlace".to_string(), place_json(container));
    }
    Value::Object(place)
}

pub fn faq_page_json(model: &RenderModel) -> Option<Value> {
    if model.faqs.is_empty() {
        return None;
    }
    let questions: Vec<Value> = model
        .faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {"@type": "Answer", "text": faq.answer},
            })
        })
        .collect();
    Some(json!({"@type": "FAQPage", "mainEntity": questions}))
}

/// 頁面的 JSON-LD `@graph`：Service 節點，有 FAQ 時再加 FAQPage
pub fn service_json_ld(model: &RenderModel) -> Value {
    let service = json!({
        "@type": "Service",
        "name": model.seo.meta_title,
        "description": model.seo.meta_description,
        "serviceType": model.service_title,
        "areaServed": place_json(&model.area_served),
    });

    let mut graph = vec![service];
    graph.extend(faq_page_json(model));

    json!({
        "@context": SCHEMA_CONTEXT,
        "@graph": graph,
    })
}
