#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::path::Path;

pub fn services() -> Value {
    json!([{
        "id": "svc-web",
        "slug": "diseno-web",
        "title": "Diseño web",
        "shortDescription": "Webs rápidas para empresas.",
        "hero": {
            "title": "Diseño web profesional",
            "subtitle": "Para empresas que quieren crecer",
            "description": "Creamos sitios web que convierten.",
            "primaryButton": {"label": "Pide presupuesto", "href": "/contacto"}
        },
        "features": [
            {"title": "Rendimiento", "description": "Carga rápida.", "icon": "bolt"},
            {"title": "SEO técnico", "description": "Listo para posicionar."}
        ],
        "process": [
            {"title": "Descubrimiento", "description": "Entendemos tu negocio."},
            {"title": "Lanzamiento", "description": "Publicamos y medimos."}
        ],
        "testimonials": [
            {"quote": "Duplicamos ventas.", "author": "Ana"},
            {"quote": "Muy resolutivos.", "author": "Luis"},
            {"quote": "La web vuela.", "author": "Marta"}
        ],
        "faqs": [
            {"question": "¿Cuánto tarda?", "answer": "Seis semanas."}
        ],
        "cta": {
            "title": "¿Hablamos?",
            "description": "Respondemos en 24 horas.",
            "button": {"label": "Contactar", "href": "/contacto"}
        },
        "impactSection": {
            "title": "Resultados",
            "description": "Datos de clientes.",
            "stats": [
                {"value": "+150", "label": "Proyectos"},
                {"value": "98%", "label": "Satisfacción"}
            ]
        }
    }])
}

pub fn areas() -> Value {
    json!([
        {"id": "prov-cantabria", "name": "Provincia de Cantabria", "level": "province"},
        {"id": "ccaa-cantabria", "name": "Cantabria", "level": "autonomousCommunity",
         "externalRef": "https://www.wikidata.org/wiki/Q3946"},
        {"id": "prov-sevilla", "name": "Provincia de Sevilla", "level": "province"},
        {"id": "ccaa-andalucia", "name": "Comunidad Autónoma de Andalucía", "level": "autonomousCommunity"}
    ])
}

pub fn locations() -> Value {
    json!([
        {"id": "loc-santander", "slug": "santander", "name": "Santander", "type": "city",
         "province": "prov-cantabria", "autonomousCommunity": "ccaa-cantabria",
         "geo": {"lat": 43.46, "lng": -3.80}, "population": 172000,
         "nearbyLocations": ["loc-torrelavega"]},
        {"id": "loc-torrelavega", "slug": "torrelavega", "name": "Torrelavega", "type": "town",
         "parent": "loc-santander"},
        {"id": "loc-sevilla", "slug": "sevilla", "name": "Sevilla", "type": "city",
         "province": "prov-sevilla", "autonomousCommunity": "ccaa-andalucia"}
    ])
}

/// 模型回應：feature 多一個、stat 數值被改寫
pub fn model_output(city_hint: &str) -> String {
    let body = json!({
        "customHero": {
            "title": format!("Diseño web en {}", city_hint),
            "subtitle": "Para empresas locales",
            "description": "Webs pensadas para tu ciudad."
        },
        "customFeatures": [
            {"title": "Rendimiento local", "description": "Carga rápida."},
            {"title": "SEO local", "description": "Posiciona en tu zona."},
            {"title": "Extra", "description": "No debería quedar."}
        ],
        "customProcess": [
            {"title": "Descubrimiento", "description": "Visitamos tu negocio."},
            {"title": "Lanzamiento", "description": "Publicamos."}
        ],
        "customFaqs": [
            {"question": "¿Cuánto tarda aquí?", "answer": "Seis semanas."}
        ],
        "customCta": {"title": "¿Hablamos?", "description": "Te visitamos."},
        "customImpactSection": {
            "title": "Resultados locales",
            "description": "Datos de la zona.",
            "stats": [
                {"value": "+9000", "label": "Proyectos locales"},
                {"label": "Satisfacción local"}
            ]
        }
    });
    format!("```json\n{}\n```", serde_json::to_string_pretty(&body).unwrap())
}

pub async fn write_content(dir: &Path) -> Result<()> {
    tokio::fs::write(dir.join("services.json"), serde_json::to_vec_pretty(&services())?).await?;
    tokio::fs::write(dir.join("locations.json"), serde_json::to_vec_pretty(&locations())?).await?;
    tokio::fs::write(
        dir.join("administrative_areas.json"),
        serde_json::to_vec_pretty(&areas())?,
    )
    .await?;
    Ok(())
}

/// 測試用設定：所有等待都設為 0
pub fn config_toml(endpoint: &str, store: &Path, reports: &Path, max_attempts: u32) -> String {
    format!(
        r#"
[job]
name = "integration"

[store]
path = "{store}"

[generator]
endpoint = "{endpoint}"
model = "gen-model-1"
timeout_seconds = 5

[rate_limit]
min_delay_ms = 0
max_delay_ms = 0

[retry]
max_attempts = {max_attempts}
delay_seconds = 0

[schedule]
pair_interval_seconds = 0

[report]
output_path = "{reports}"
formats = ["csv", "json"]
"#,
        store = store.display().to_string().replace('\\', "/"),
        reports = reports.display().to_string().replace('\\', "/"),
        endpoint = endpoint,
        max_attempts = max_attempts,
    )
}
