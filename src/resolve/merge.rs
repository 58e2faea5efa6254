//! Base + override → RenderModel.
//!
//! Precedence is evaluated per field: a present, non-empty override value wins,
//! then the base value, then a structural default built from the service and
//! location names. Lists are replaced wholesale. Stat values always come from
//! the base record.

use crate::domain::model::{
    Cta, Hero, ImpactSection, Link, OverrideContent, ResolvedLocation, Seo, Service, Stat,
};
use crate::domain::render::RenderModel;
use crate::resolve::diversify::{diversification_key, diversify_testimonials, DEFAULT_SUFFIX_COUNT};
use crate::resolve::geo::build_hierarchy;

pub const DEFAULT_CTA_HREF: &str = "/contacto";
pub const DEFAULT_CTA_LABEL: &str = "Contactar";

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// override → base → default
fn pick_text(over: Option<&String>, base: &str, default: impl FnOnce() -> String) -> String {
    present(over)
        .map(str::to_string)
        .or_else(|| (!base.trim().is_empty()).then(|| base.to_string()))
        .unwrap_or_else(default)
}

fn pick_list<T: Clone>(over: Option<&Vec<T>>, base: &[T]) -> Vec<T> {
    match over {
        Some(items) if !items.is_empty() => items.clone(),
        _ => base.to_vec(),
    }
}

fn merge_hero(service: &Service, location_name: &str, over: &OverrideContent) -> Hero {
    let hero = over.hero.as_ref();
    let base = &service.hero;
    Hero {
        title: pick_text(hero.and_then(|h| h.title.as_ref()), &base.title, || {
            format!("{} en {}", service.title, location_name)
        }),
        subtitle: pick_text(hero.and_then(|h| h.subtitle.as_ref()), &base.subtitle, || {
            service.short_description.clone()
        }),
        description: pick_text(
            hero.and_then(|h| h.description.as_ref()),
            &base.description,
            || service.short_description.clone(),
        ),
        primary_button: hero
            .and_then(|h| h.primary_button.clone())
            .or_else(|| base.primary_button.clone()),
        secondary_button: hero
            .and_then(|h| h.secondary_button.clone())
            .or_else(|| base.secondary_button.clone()),
    }
}

fn merge_cta(service: &Service, location_name: &str, over: &OverrideContent) -> Cta {
    let cta = over.cta.as_ref();
    let base = service.cta.as_ref();
    Cta {
        title: pick_text(
            cta.and_then(|c| c.title.as_ref()),
            base.map_or("", |b| b.title.as_str()),
            || format!("¿Necesitas {} en {}?", service.title, location_name),
        ),
        description: pick_text(
            cta.and_then(|c| c.description.as_ref()),
            base.map_or("", |b| b.description.as_str()),
            || {
                format!(
                    "Cuéntanos tu proyecto y te ayudamos con {} en {}.",
                    service.title, location_name
                )
            },
        ),
        button: cta
            .and_then(|c| c.button.clone())
            .or_else(|| base.and_then(|b| b.button.clone()))
            .or_else(|| {
                Some(Link {
                    label: DEFAULT_CTA_LABEL.to_string(),
                    href: DEFAULT_CTA_HREF.to_string(),
                })
            }),
    }
}

/// 數值一律取基礎內容同索引的值
fn merge_stats(over: Option<&Vec<Stat>>, base: &[Stat]) -> Vec<Stat> {
    let mut stats = pick_list(over, base);
    for (stat, base_stat) in stats.iter_mut().zip(base) {
        stat.value = base_stat.value.clone();
    }
    stats
}

fn merge_impact(service: &Service, over: &OverrideContent) -> Option<ImpactSection> {
    let impact = over.impact_section.as_ref();
    let base = service.impact_section.as_ref();
    if impact.is_none() && base.is_none() {
        return None;
    }

    let base_stats = base.map_or(&[][..], |b| b.stats.as_slice());
    Some(ImpactSection {
        title: pick_text(
            impact.and_then(|i| i.title.as_ref()),
            base.map_or("", |b| b.title.as_str()),
            String::new,
        ),
        description: pick_text(
            impact.and_then(|i| i.description.as_ref()),
            base.map_or("", |b| b.description.as_str()),
            String::new,
        ),
        stats: merge_stats(impact.and_then(|i| i.stats.as_ref()), base_stats),
    })
}

fn merge_seo(service: &Service, location_name: &str, over: &OverrideContent) -> Seo {
    let seo = over.seo.as_ref();
    let base = service.seo.as_ref();
    Seo {
        meta_title: pick_text(
            seo.and_then(|s| s.meta_title.as_ref()),
            base.map_or("", |b| b.meta_title.as_str()),
            || format!("{} en {}", service.title, location_name),
        ),
        meta_description: pick_text(
            seo.and_then(|s| s.meta_description.as_ref()),
            base.map_or("", |b| b.meta_description.as_str()),
            || service.short_description.clone(),
        ),
    }
}

/// 合併基礎內容與覆寫。相同輸入永遠得到相同輸出
pub fn resolve(
    service: &Service,
    location: &ResolvedLocation,
    override_content: Option<&OverrideContent>,
) -> RenderModel {
    let empty = OverrideContent::default();
    let over = override_content.unwrap_or(&empty);
    let location_name = location.name();

    let testimonials = match over.testimonials.as_ref() {
        Some(items) if !items.is_empty() => items.clone(),
        _ => {
            // 只對基礎推薦做差異化；覆寫的推薦已是在地內容
            let mut base = service.testimonials.clone();
            diversify_testimonials(
                &mut base,
                &diversification_key(&service.slug, location.slug()),
                location_name,
                DEFAULT_SUFFIX_COUNT,
            );
            base
        }
    };

    RenderModel {
        service_slug: service.slug.clone(),
        service_title: service.title.clone(),
        location_slug: location.slug().to_string(),
        location_name: location_name.to_string(),
        hero: merge_hero(service, location_name, over),
        features: pick_list(over.features.as_ref(), &service.features),
        process: pick_list(over.process.as_ref(), &service.process),
        technologies: pick_list(over.technologies.as_ref(), &service.technologies),
        pricing: over.pricing.clone().or_else(|| service.pricing.clone()),
        testimonials,
        related_projects: pick_list(over.related_projects.as_ref(), &service.related_projects),
        faqs: pick_list(over.faqs.as_ref(), &service.faqs),
        cta: merge_cta(service, location_name, over),
        impact_section: merge_impact(service, over),
        seo: merge_seo(service, location_name, over),
        nearby_locations: location.nearby.clone(),
        area_served: build_hierarchy(location),
        has_override: override_content.is_some_and(|o| !o.is_empty()),
    }
}
