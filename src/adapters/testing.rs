//! 單元測試共用的假儲存與範例資料

use crate::domain::model::*;
use crate::domain::ports::{Storage, TextGenerator};
use crate::utils::error::{PagesError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, path: &str, data: &[u8]) {
        self.files.lock().await.insert(path.to_string(), data.to_vec());
    }

    pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(path).cloned()
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.lock().await.get(path).cloned())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.files.lock().await.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}

/// 依序回傳預先排好的回應；排完後重複最後一個成功回應
#[derive(Default)]
pub struct ScriptedGenerator {
    script: std::sync::Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    calls: AtomicUsize,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            fallback: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn scripted(responses: Vec<Result<String>>) -> Self {
        Self {
            script: std::sync::Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    pub fn then_always(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or(PagesError::ProviderTimeout { seconds: 0 })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn link(label: &str, href: &str) -> Option<Link> {
    Some(Link {
        label: label.to_string(),
        href: href.to_string(),
    })
}

pub fn sample_service() -> Service {
    Service {
        id: "svc-web".to_string(),
        slug: "diseno-web".to_string(),
        title: "Diseño web".to_string(),
        short_description: "Webs rápidas y medibles para empresas.".to_string(),
        hero: Hero {
            title: "Diseño web profesional".to_string(),
            subtitle: "Para empresas que quieren crecer".to_string(),
            description: "Creamos sitios web que convierten visitas en clientes.".to_string(),
            primary_button: link("Pide presupuesto", "/contacto"),
            secondary_button: link("Ver proyectos", "/proyectos"),
        },
        features: vec![
            Feature {
                title: "Rendimiento".to_string(),
                description: "Carga en menos de un segundo.".to_string(),
                icon: Some("bolt".to_string()),
            },
            Feature {
                title: "SEO técnico".to_string(),
                description: "Estructura lista para posicionar.".to_string(),
                icon: Some("search".to_string()),
            },
            Feature {
                title: "Accesibilidad".to_string(),
                description: "Cumplimos WCAG 2.1 AA.".to_string(),
                icon: None,
            },
        ],
        process: vec![
            ProcessStep {
                title: "Descubrimiento".to_string(),
                description: "Entendemos tu negocio.".to_string(),
                icon: Some("compass".to_string()),
            },
            ProcessStep {
                title: "Diseño".to_string(),
                description: "Prototipos y validación.".to_string(),
                icon: Some("pen".to_string()),
            },
            ProcessStep {
                title: "Lanzamiento".to_string(),
                description: "Publicamos y medimos.".to_string(),
                icon: Some("rocket".to_string()),
            },
        ],
        technologies: vec![Technology {
            name: "Rust".to_string(),
            description: None,
            icon: None,
        }],
        pricing: None,
        testimonials: vec![
            Testimonial {
                quote: "Duplicamos las ventas online.".to_string(),
                author: "Ana López".to_string(),
                role: Some("CEO".to_string()),
                company: Some("Tienda Norte".to_string()),
            },
            Testimonial {
                quote: "Un equipo muy resolutivo.".to_string(),
                author: "Luis Pérez".to_string(),
                role: None,
                company: None,
            },
            Testimonial {
                quote: "La web vuela.".to_string(),
                author: "Marta Gil".to_string(),
                role: Some("CMO".to_string()),
                company: None,
            },
            Testimonial {
                quote: "Repetiremos seguro.".to_string(),
                author: "Jorge Ruiz".to_string(),
                role: None,
                company: Some("Ruiz & Co".to_string()),
            },
        ],
        related_projects: vec![],
        faqs: vec![
            Faq {
                question: "¿Cuánto tarda un proyecto?".to_string(),
                answer: "Entre cuatro y ocho semanas.".to_string(),
            },
            Faq {
                question: "¿Incluye mantenimiento?".to_string(),
                answer: "Sí, el primer año.".to_string(),
            },
            Faq {
                question: "¿Trabajáis con WordPress?".to_string(),
                answer: "Sí, y con stacks a medida.".to_string(),
            },
        ],
        cta: Some(Cta {
            title: "¿Hablamos?".to_string(),
            description: "Te respondemos en 24 horas.".to_string(),
            button: link("Contactar", "/contacto"),
        }),
        impact_section: Some(ImpactSection {
            title: "Resultados".to_string(),
            description: "Datos de nuestros clientes.".to_string(),
            stats: vec![
                Stat {
                    value: "+150".to_string(),
                    label: "Proyectos".to_string(),
                    description: Some("entregados".to_string()),
                },
                Stat {
                    value: "98%".to_string(),
                    label: "Clientes satisfechos".to_string(),
                    description: None,
                },
            ],
        }),
        seo: Some(Seo {
            meta_title: "Diseño web profesional".to_string(),
            meta_description: "Agencia de diseño web.".to_string(),
        }),
    }
}

pub fn area(id: &str, name: &str, level: AreaLevel) -> AdministrativeArea {
    AdministrativeArea {
        id: id.to_string(),
        name: name.to_string(),
        level,
        geo: None,
        external_ref: None,
    }
}

pub fn location(id: &str, slug: &str, name: &str, kind: LocationKind) -> Location {
    Location {
        id: id.to_string(),
        slug: slug.to_string(),
        name: name.to_string(),
        kind,
        parent: None,
        province: None,
        autonomous_community: None,
        geo: None,
        population: None,
        nearby_locations: Vec::new(),
        external_ref: None,
    }
}

/// Santander: provincia y comunidad se llaman igual (Cantabria)
pub fn santander() -> ResolvedLocation {
    let mut resolved = ResolvedLocation::bare(location(
        "loc-santander",
        "santander",
        "Santander",
        LocationKind::City,
    ));
    resolved.province = Some(area("prov-cantabria", "Provincia de Cantabria", AreaLevel::Province));
    resolved.community = Some(area(
        "ccaa-cantabria",
        "Cantabria",
        AreaLevel::AutonomousCommunity,
    ));
    resolved
}

/// 模型回應範例：比基礎內容多一個 feature、缺 icon 與數值
pub fn sample_model_json() -> serde_json::Value {
    serde_json::json!({
        "customHero": {
            "title": "Diseño web en Madrid",
            "subtitle": "Para empresas madrileñas",
            "description": "Webs para negocios de Madrid.",
            "primaryButton": {"label": "Llama ya", "href": "/otra"}
        },
        "customFeatures": [
            {"title": "X", "description": "x"},
            {"title": "Y", "description": "y"},
            {"title": "Z", "description": "z", "icon": "star"},
            {"title": "W", "description": "w"}
        ],
        "customProcess": [
            {"title": "P1", "description": "p1"},
            {"title": "P2", "description": "p2"},
            {"title": "P3", "description": "p3"}
        ],
        "customFaqs": [
            {"question": "Q1", "answer": "A1"},
            {"question": "Q2", "answer": "A2"},
            {"question": "Q3", "answer": "A3"}
        ],
        "customCta": {"title": "¿Hablamos en Madrid?", "description": "Oficina en Madrid."},
        "customImpactSection": {
            "title": "Resultados en Madrid",
            "description": "Datos locales.",
            "stats": [
                {"value": "+999", "label": "Proyectos en Madrid"},
                {"label": "Clientes felices"}
            ]
        },
        "customSeo": {"metaTitle": "Diseño web en Madrid", "metaDescription": "Agencia en Madrid."}
    })
}
