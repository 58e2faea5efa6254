//! Validation and best-effort repair of generated override content.
//!
//! Two phases: `validate` rejects output that is malformed or incomplete
//! (the pipeline retries), `repair` then absorbs harmless drift such as extra
//! array items, missing icons or rewritten links. Repair never fails.

use crate::domain::model::{
    Cta, CtaOverride, Faq, Feature, Hero, HeroOverride, ImpactOverride, ImpactSection,
    OverrideContent, ProcessStep, Seo, SeoOverride, Service, Stat,
};
use crate::utils::error::{PagesError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// 模型與基礎內容都沒有 icon 時使用
pub const DEFAULT_ICON: &str = "check";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```$").expect("valid fence regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hero,
    Features,
    Process,
    Faqs,
    Cta,
    ImpactSection,
    Seo,
}

impl Section {
    pub fn key(self) -> &'static str {
        match self {
            Section::Hero => "customHero",
            Section::Features => "customFeatures",
            Section::Process => "customProcess",
            Section::Faqs => "customFaqs",
            Section::Cta => "customCta",
            Section::ImpactSection => "customImpactSection",
            Section::Seo => "customSeo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// 基礎內容有這個區塊時必須出現
    RequiredWithBase,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinItems {
    None,
    /// 至少與基礎陣列一樣多 (多出的在 repair 時截斷)
    MatchBase,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionRule {
    pub section: Section,
    pub presence: Presence,
    pub min_items: MinItems,
}

pub const OVERRIDE_CONTRACT: &[SectionRule] = &[
    SectionRule {
        section: Section::Hero,
        presence: Presence::RequiredWithBase,
        min_items: MinItems::None,
    },
    SectionRule {
        section: Section::Features,
        presence: Presence::RequiredWithBase,
        min_items: MinItems::MatchBase,
    },
    SectionRule {
        section: Section::Process,
        presence: Presence::RequiredWithBase,
        min_items: MinItems::MatchBase,
    },
    SectionRule {
        section: Section::Faqs,
        presence: Presence::RequiredWithBase,
        min_items: MinItems::MatchBase,
    },
    SectionRule {
        section: Section::Cta,
        presence: Presence::RequiredWithBase,
        min_items: MinItems::None,
    },
    SectionRule {
        section: Section::ImpactSection,
        presence: Presence::Optional,
        min_items: MinItems::MatchBase,
    },
    SectionRule {
        section: Section::Seo,
        presence: Presence::Optional,
        min_items: MinItems::None,
    },
];

/// 必填文字欄位。基礎內容與覆寫用相同欄位名稱，只有基礎內容非空的欄位才必填
trait TextFields {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)>;
}

impl TextFields for HeroOverride {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
        ]
    }
}

impl TextFields for Hero {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", Some(self.title.as_str())),
            ("description", Some(self.description.as_str())),
        ]
    }
}

impl TextFields for Feature {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", Some(self.title.as_str())),
            ("description", Some(self.description.as_str())),
        ]
    }
}

impl TextFields for ProcessStep {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", Some(self.title.as_str())),
            ("description", Some(self.description.as_str())),
        ]
    }
}

impl TextFields for Faq {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("question", Some(self.question.as_str())),
            ("answer", Some(self.answer.as_str())),
        ]
    }
}

impl TextFields for CtaOverride {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", self.title.as_deref()),
            ("description", self.description.as_deref()),
        ]
    }
}

impl TextFields for Cta {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("title", Some(self.title.as_str())),
            ("description", Some(self.description.as_str())),
        ]
    }
}

impl TextFields for Stat {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("label", Some(self.label.as_str()))]
    }
}

impl TextFields for ImpactOverride {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("title", self.title.as_deref())]
    }
}

impl TextFields for ImpactSection {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("title", Some(self.title.as_str()))]
    }
}

impl TextFields for Seo {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("metaTitle", Some(self.meta_title.as_str())),
            ("metaDescription", Some(self.meta_description.as_str())),
        ]
    }
}

impl TextFields for SeoOverride {
    fn text_fields(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![
            ("metaTitle", self.meta_title.as_deref()),
            ("metaDescription", self.meta_description.as_deref()),
        ]
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// 基礎內容本身就空白的欄位不要求模型補上
fn first_blank<T: TextFields, B: TextFields>(item: &T, base: Option<&B>) -> Option<&'static str> {
    let required = base.map(B::text_fields).unwrap_or_default();
    item.text_fields()
        .into_iter()
        .find(|(name, value)| {
            is_blank(*value)
                && required
                    .iter()
                    .any(|(base_name, base_value)| base_name == name && !is_blank(*base_value))
        })
        .map(|(name, _)| name)
}

/// 超出基礎長度的項目會在 repair 時截斷，不檢查
fn first_blank_item<T: TextFields>(items: &[T], base: &[T]) -> Option<String> {
    items
        .iter()
        .zip(base)
        .enumerate()
        .find_map(|(i, (item, base_item))| {
            first_blank(item, Some(base_item)).map(|field| format!("[{}].{}", i, field))
        })
}

/// 單一區塊的檢查結果
struct SectionProbe {
    present: bool,
    base_present: bool,
    len: Option<usize>,
    base_len: usize,
    blank_field: Option<String>,
}

fn object_probe<T: TextFields, B: TextFields>(
    value: Option<&T>,
    base: Option<&B>,
    base_present: bool,
) -> SectionProbe {
    SectionProbe {
        present: value.is_some(),
        base_present,
        len: None,
        base_len: 0,
        blank_field: value.and_then(|v| first_blank(v, base)).map(str::to_string),
    }
}

fn list_probe<T: TextFields>(items: Option<&Vec<T>>, base: &[T]) -> SectionProbe {
    SectionProbe {
        present: items.is_some(),
        base_present: !base.is_empty(),
        len: items.map(Vec::len),
        base_len: base.len(),
        blank_field: items.and_then(|items| first_blank_item(items, base)),
    }
}

fn probe(section: Section, content: &OverrideContent, base: &Service) -> SectionProbe {
    match section {
        Section::Hero => object_probe(
            content.hero.as_ref(),
            Some(&base.hero),
            !is_blank(Some(&base.hero.title)) || !is_blank(Some(&base.hero.description)),
        ),
        Section::Features => list_probe(content.features.as_ref(), &base.features),
        Section::Process => list_probe(content.process.as_ref(), &base.process),
        Section::Faqs => list_probe(content.faqs.as_ref(), &base.faqs),
        Section::Cta => object_probe(content.cta.as_ref(), base.cta.as_ref(), base.cta.is_some()),
        Section::ImpactSection => {
            let impact = content.impact_section.as_ref();
            let stats = impact.and_then(|i| i.stats.as_ref());
            let base_impact = base.impact_section.as_ref();
            let base_stats = base_impact.map_or(&[][..], |i| i.stats.as_slice());
            SectionProbe {
                present: impact.is_some(),
                base_present: base_impact.is_some(),
                len: stats.map(Vec::len),
                base_len: base_stats.len(),
                blank_field: impact
                    .and_then(|i| first_blank(i, base_impact))
                    .map(str::to_string)
                    .or_else(|| {
                        stats
                            .and_then(|s| first_blank_item(s, base_stats))
                            .map(|f| format!("stats{}", f))
                    }),
            }
        }
        Section::Seo => object_probe(content.seo.as_ref(), base.seo.as_ref(), base.seo.is_some()),
    }
}

/// 去掉 ```json ... ``` 外框
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// 解析模型輸出；失敗時回傳可重試的 `UnparsableOutput`
pub fn parse_override(raw: &str) -> Result<OverrideContent> {
    let body = strip_code_fences(raw);

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(first_err) => {
            // 模型偶爾會在 JSON 前後加一段說明文字
            let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
                return Err(PagesError::UnparsableOutput {
                    message: first_err.to_string(),
                });
            };
            if start >= end {
                return Err(PagesError::UnparsableOutput {
                    message: first_err.to_string(),
                });
            }
            serde_json::from_str(&body[start..=end]).map_err(|e| PagesError::UnparsableOutput {
                message: e.to_string(),
            })?
        }
    };

    if !value.is_object() {
        return Err(PagesError::UnparsableOutput {
            message: "top-level value is not an object".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| PagesError::UnparsableOutput {
        message: format!("shape mismatch: {}", e),
    })
}

/// 依 `OVERRIDE_CONTRACT` 檢查必填區塊、非空文字與陣列最少數量
pub fn validate(content: &OverrideContent, base: &Service) -> Result<()> {
    for rule in OVERRIDE_CONTRACT {
        let key = rule.section.key();
        let probe = probe(rule.section, content, base);

        if !probe.present {
            if rule.presence == Presence::RequiredWithBase && probe.base_present {
                return Err(PagesError::validation(key, "required section is missing"));
            }
            continue;
        }
        // 基礎內容沒有的選填區塊在 repair 時丟棄，不必檢查
        if rule.presence == Presence::Optional && !probe.base_present {
            continue;
        }

        if let (MinItems::MatchBase, Some(len)) = (rule.min_items, probe.len) {
            if len < probe.base_len {
                return Err(PagesError::validation(
                    key,
                    format!("expected at least {} items, got {}", probe.base_len, len),
                ));
            }
        }

        if let Some(field) = probe.blank_field {
            return Err(PagesError::validation(key, format!("{} is empty", field)));
        }
    }
    Ok(())
}

fn truncate_to<T>(items: &mut Vec<T>, max: usize, section: Section) {
    if items.len() > max {
        tracing::debug!(
            section = section.key(),
            from = items.len(),
            to = max,
            "✂️ Truncating generated array to base length"
        );
        items.truncate(max);
    }
}

fn backfill_icon(icon: &mut Option<String>, base_icon: Option<&String>) {
    if is_blank(icon.as_deref()) {
        *icon = Some(
            base_icon
                .filter(|i| !i.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_ICON.to_string()),
        );
    }
}

/// 盡力修復：截斷多餘項目、補 icon、還原數值與結構性連結
pub fn repair(content: &mut OverrideContent, base: &Service) {
    // 只保留管線要求生成的區塊
    content.technologies = None;
    content.pricing = None;
    content.testimonials = None;
    content.related_projects = None;

    if let Some(hero) = content.hero.as_mut() {
        hero.primary_button = base.hero.primary_button.clone();
        hero.secondary_button = base.hero.secondary_button.clone();
    }

    if let Some(features) = content.features.as_mut() {
        truncate_to(features, base.features.len(), Section::Features);
        for (i, feature) in features.iter_mut().enumerate() {
            backfill_icon(&mut feature.icon, base.features.get(i).and_then(|b| b.icon.as_ref()));
        }
    }

    if let Some(process) = content.process.as_mut() {
        truncate_to(process, base.process.len(), Section::Process);
        for (i, step) in process.iter_mut().enumerate() {
            backfill_icon(&mut step.icon, base.process.get(i).and_then(|b| b.icon.as_ref()));
        }
    }

    if let Some(faqs) = content.faqs.as_mut() {
        truncate_to(faqs, base.faqs.len(), Section::Faqs);
    }

    if let Some(cta) = content.cta.as_mut() {
        cta.button = base.cta.as_ref().and_then(|c| c.button.clone());
    }

    match &base.impact_section {
        None => content.impact_section = None,
        Some(base_impact) => {
            if let Some(stats) = content.impact_section.as_mut().and_then(|i| i.stats.as_mut()) {
                truncate_to(stats, base_impact.stats.len(), Section::ImpactSection);
                for (stat, base_stat) in stats.iter_mut().zip(&base_impact.stats) {
                    stat.value = base_stat.value.clone();
                    if is_blank(stat.description.as_deref()) {
                        stat.description = base_stat.description.clone();
                    }
                }
            }
        }
    }

    // 截斷後變成空陣列的區塊視同不存在
    if content.features.as_ref().is_some_and(Vec::is_empty) {
        content.features = None;
    }
    if content.process.as_ref().is_some_and(Vec::is_empty) {
        content.process = None;
    }
    if content.faqs.as_ref().is_some_and(Vec::is_empty) {
        content.faqs = None;
    }
}

/// parse → validate → repair
pub fn process_model_output(raw: &str, base: &Service) -> Result<OverrideContent> {
    let mut content = parse_override(raw)?;
    validate(&content, base)?;
    repair(&mut content, base);
    Ok(content)
}
