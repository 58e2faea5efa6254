use crate::domain::model::{ResolvedLocation, Service};
use crate::utils::error::Result;
use serde::Serialize;

pub const ELLIPSIS: &str = "…";

/// 各類文字欄位的字元預算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBudget {
    Title,
    Subtitle,
    Short,
    Paragraph,
    LongParagraph,
}

impl FieldBudget {
    pub fn max_chars(self) -> usize {
        match self {
            FieldBudget::Title => 160,
            FieldBudget::Subtitle => 220,
            FieldBudget::Short => 300,
            FieldBudget::Paragraph => 600,
            FieldBudget::LongParagraph => 1400,
        }
    }
}

/// 硬截斷到預算字元數並加上省略號；以 Unicode 字元計算，不會切斷多位元組字元
pub fn clamp(text: &str, budget: FieldBudget) -> String {
    let text = text.trim();
    let limit = budget.max_chars();
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut clamped: String = text.chars().take(limit).collect();
    let kept = clamped.trim_end().len();
    clamped.truncate(kept);
    clamped.push_str(ELLIPSIS);
    clamped
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroText {
    pub title: String,
    pub subtitle: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemText {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqText {
    pub question: String,
    pub answer: String,
}

/// 只有 label / description，數值不送給模型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatText {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactText {
    pub title: String,
    pub description: String,
    pub stats: Vec<StatText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoText {
    pub meta_title: String,
    pub meta_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContext {
    pub title: String,
    pub short_description: String,
    pub hero: HeroText,
    pub features: Vec<ItemText>,
    pub process: Vec<ItemText>,
    pub faqs: Vec<FaqText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<ItemText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_section: Option<ImpactText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationContext {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autonomous_community: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    pub nearby: Vec<String>,
}

/// 送給模型的有界上下文。按鈕連結與數值這類結構性欄位刻意不放進來
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptContext {
    pub service: ServiceContext,
    pub location: LocationContext,
}

impl PromptContext {
    pub fn build(service: &Service, location: &ResolvedLocation) -> Self {
        use FieldBudget::*;

        let item = |title: &str, description: &str| ItemText {
            title: clamp(title, Title),
            description: clamp(description, Paragraph),
        };

        let service_context = ServiceContext {
            title: clamp(&service.title, Title),
            short_description: clamp(&service.short_description, Short),
            hero: HeroText {
                title: clamp(&service.hero.title, Title),
                subtitle: clamp(&service.hero.subtitle, Subtitle),
                description: clamp(&service.hero.description, LongParagraph),
            },
            features: service
                .features
                .iter()
                .map(|f| item(&f.title, &f.description))
                .collect(),
            process: service
                .process
                .iter()
                .map(|p| item(&p.title, &p.description))
                .collect(),
            faqs: service
                .faqs
                .iter()
                .map(|faq| FaqText {
                    question: clamp(&faq.question, Subtitle),
                    answer: clamp(&faq.answer, Paragraph),
                })
                .collect(),
            cta: service.cta.as_ref().map(|cta| ItemText {
                title: clamp(&cta.title, Title),
                description: clamp(&cta.description, Paragraph),
            }),
            impact_section: service.impact_section.as_ref().map(|impact| ImpactText {
                title: clamp(&impact.title, Title),
                description: clamp(&impact.description, Paragraph),
                stats: impact
                    .stats
                    .iter()
                    .map(|stat| StatText {
                        label: clamp(&stat.label, Title),
                        description: stat.description.as_deref().map(|d| clamp(d, Short)),
                    })
                    .collect(),
            }),
            seo: service.seo.as_ref().map(|seo| SeoText {
                meta_title: clamp(&seo.meta_title, Title),
                meta_description: clamp(&seo.meta_description, Short),
            }),
        };

        let location_context = LocationContext {
            name: location.name().to_string(),
            kind: location.location.kind.to_string(),
            parent: location.parent.as_ref().map(|p| p.name().to_string()),
            province: location.effective_province().map(|a| a.name.clone()),
            autonomous_community: location.effective_community().map(|a| a.name.clone()),
            population: location.location.population,
            nearby: location.nearby.iter().map(|n| n.name.clone()).collect(),
        };

        Self {
            service: service_context,
            location: location_context,
        }
    }
}

/// 組合最終 prompt：上下文 JSON + 輸出契約
pub fn render_prompt(context: &PromptContext) -> Result<String> {
    let context_json = serde_json::to_string_pretty(context)?;
    let service = &context.service;

    let mut contract = vec![
        r#"- "customHero": {"title", "subtitle", "description"}"#.to_string(),
        format!(
            r#"- "customFeatures": exactly {} items of {{"title", "description"}}"#,
            service.features.len()
        ),
        format!(
            r#"- "customProcess": exactly {} items of {{"title", "description"}}"#,
            service.process.len()
        ),
        format!(
            r#"- "customFaqs": exactly {} items of {{"question", "answer"}}"#,
            service.faqs.len()
        ),
    ];
    if service.cta.is_some() {
        contract.push(r#"- "customCta": {"title", "description"}"#.to_string());
    }
    if let Some(impact) = &service.impact_section {
        contract.push(format!(
            r#"- "customImpactSection": {{"title", "description", "stats": exactly {} items of {{"label", "description"}}}}"#,
            impact.stats.len()
        ));
    }
    if service.seo.is_some() {
        contract.push(r#"- "customSeo": {"metaTitle", "metaDescription"}"#.to_string());
    }

    Ok(format!(
        "You adapt a service landing page to a specific location in Spain.\n\
         Rewrite the prose below for {location} so it reads as written for that place, \
         in Spanish (es-ES), keeping the meaning and every marketing claim intact.\n\
         Do not invent numbers, prices, clients or links.\n\n\
         CONTEXT:\n{context}\n\n\
         Answer with a single JSON object and nothing else, using these keys:\n{contract}\n",
        location = context.location.name,
        context = context_json,
        contract = contract.join("\n"),
    ))
}
