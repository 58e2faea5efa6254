use serde::{Deserialize, Serialize};

/// 按鈕或連結：結構性欄位，永遠以基礎內容為準
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_button: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_button: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plans: Vec<PricingPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<Link>,
}

/// 影響力數據。`value` 是行銷承諾的數字，只有 label / description 可以在地化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
}

/// 人工撰寫的服務頁基礎內容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub hero: Hero,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub process: Vec<ProcessStep>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default)]
    pub related_projects: Vec<RelatedProject>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<Cta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_section: Option<ImpactSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    City,
    Town,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationKind::City => write!(f, "city"),
            LocationKind::Town => write!(f, "town"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// 地點文件。parent / province / community 都是其他文件的 id 參照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomous_community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(default)]
    pub nearby_locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AreaLevel {
    Province,
    AutonomousCommunity,
}

/// 行政區 (省或自治區)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeArea {
    pub id: String,
    pub name: String,
    pub level: AreaLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
}

/// 已解析參照的地點；parent 只往上解析一層
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub location: Location,
    pub parent: Option<Box<ResolvedLocation>>,
    pub province: Option<AdministrativeArea>,
    pub community: Option<AdministrativeArea>,
    pub nearby: Vec<NearbyLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyLocation {
    pub name: String,
    pub slug: String,
}

impl ResolvedLocation {
    pub fn bare(location: Location) -> Self {
        Self {
            location,
            parent: None,
            province: None,
            community: None,
            nearby: Vec::new(),
        }
    }

    /// 城鎮沒有指定省份時沿用上層城市的省份
    pub fn effective_province(&self) -> Option<&AdministrativeArea> {
        self.province
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.province.as_ref()))
    }

    pub fn effective_community(&self) -> Option<&AdministrativeArea> {
        self.community
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.community.as_ref()))
    }

    pub fn id(&self) -> &str {
        &self.location.id
    }

    pub fn slug(&self) -> &str {
        &self.location.slug
    }

    pub fn name(&self) -> &str {
        &self.location.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_button: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_button: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Vec<Stat>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

/// 在地化覆寫內容：與 Service 的區塊一一對應，所有欄位皆為選填。
/// 型別本身就不可能帶出 Service 沒有的欄位。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideContent {
    #[serde(rename = "customHero", default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroOverride>,
    #[serde(rename = "customFeatures", default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<Feature>>,
    #[serde(rename = "customProcess", default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Vec<ProcessStep>>,
    #[serde(rename = "customTechnologies", default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<Technology>>,
    #[serde(rename = "customPricing", default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(rename = "customTestimonials", default, skip_serializing_if = "Option::is_none")]
    pub testimonials: Option<Vec<Testimonial>>,
    #[serde(rename = "customRelatedProjects", default, skip_serializing_if = "Option::is_none")]
    pub related_projects: Option<Vec<RelatedProject>>,
    #[serde(rename = "customFaqs", default, skip_serializing_if = "Option::is_none")]
    pub faqs: Option<Vec<Faq>>,
    #[serde(rename = "customCta", default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<CtaOverride>,
    #[serde(rename = "customImpactSection", default, skip_serializing_if = "Option::is_none")]
    pub impact_section: Option<ImpactOverride>,
    #[serde(rename = "customSeo", default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoOverride>,
}

impl OverrideContent {
    /// 欄位層級的 set：只寫入 `patch` 中存在的區塊
    pub fn apply_set(&mut self, patch: &OverrideContent) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut self.hero, &patch.hero);
        set(&mut self.features, &patch.features);
        set(&mut self.process, &patch.process);
        set(&mut self.technologies, &patch.technologies);
        set(&mut self.pricing, &patch.pricing);
        set(&mut self.testimonials, &patch.testimonials);
        set(&mut self.related_projects, &patch.related_projects);
        set(&mut self.faqs, &patch.faqs);
        set(&mut self.cta, &patch.cta);
        set(&mut self.impact_section, &patch.impact_section);
        set(&mut self.seo, &patch.seo);
    }

    pub fn is_empty(&self) -> bool {
        *self == OverrideContent::default()
    }
}

/// 內容庫中的覆寫文件，(service_ref, location_ref) 至多一份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideDocument {
    pub id: String,
    pub service_ref: String,
    pub location_ref: String,
    #[serde(flatten)]
    pub content: OverrideContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl OverrideDocument {
    pub fn document_id(service_id: &str, location_id: &str) -> String {
        format!("override.{}.{}", service_id, location_id)
    }

    pub fn new(service_id: &str, location_id: &str, content: OverrideContent) -> Self {
        Self {
            id: Self::document_id(service_id, location_id),
            service_ref: service_id.to_string(),
            location_ref: location_id.to_string(),
            content,
            generated_at: Some(chrono::Utc::now()),
        }
    }
}
