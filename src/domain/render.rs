use crate::domain::model::{
    Cta, Faq, Feature, GeoPoint, Hero, ImpactSection, NearbyLocation, Pricing, ProcessStep,
    RelatedProject, Seo, Technology, Testimonial,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    City,
    AdministrativeArea,
    Country,
}

/// 地理包含階層節點，每次請求即時建立，不會儲存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoNode {
    pub kind: GeoKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contained_in_place: Option<Box<GeoNode>>,
}

impl GeoNode {
    pub fn new(kind: GeoKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            geo: None,
            external_ref: None,
            contained_in_place: None,
        }
    }

    pub fn within(mut self, container: GeoNode) -> Self {
        self.contained_in_place = Some(Box::new(container));
        self
    }

    /// 由內而外列出整條包含鏈
    pub fn chain(&self) -> Vec<&GeoNode> {
        let mut nodes = vec![self];
        let mut current = self;
        while let Some(next) = current.contained_in_place.as_deref() {
            nodes.push(next);
            current = next;
        }
        nodes
    }

    pub fn count_kind(&self, kind: GeoKind) -> usize {
        self.chain().iter().filter(|node| node.kind == kind).count()
    }
}

/// 合併後的頁面內容 (只存在於單次請求)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub service_slug: String,
    pub service_title: String,
    pub location_slug: String,
    pub location_name: String,
    pub hero: Hero,
    pub features: Vec<Feature>,
    pub process: Vec<ProcessStep>,
    pub technologies: Vec<Technology>,
    pub pricing: Option<Pricing>,
    pub testimonials: Vec<Testimonial>,
    pub related_projects: Vec<RelatedProject>,
    pub faqs: Vec<Faq>,
    pub cta: Cta,
    pub impact_section: Option<ImpactSection>,
    pub seo: Seo,
    pub nearby_locations: Vec<NearbyLocation>,
    pub area_served: GeoNode,
    pub has_override: bool,
}
