use crate::domain::model::{
    AdministrativeArea, Location, NearbyLocation, ResolvedLocation, Service,
};
use crate::domain::ports::ContentStore;
use crate::utils::error::{PagesError, Result};
use std::collections::HashMap;

/// nearbyLocations 上限
pub const MAX_NEARBY_LOCATIONS: usize = 12;

/// 一次載入的服務與已解析地點
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub services: Vec<Service>,
    pub locations: Vec<ResolvedLocation>,
}

impl Catalog {
    pub fn service_by_slug(&self, slug: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.slug == slug)
    }

    pub fn location_by_slug(&self, slug: &str) -> Option<&ResolvedLocation> {
        self.locations.iter().find(|l| l.slug() == slug)
    }
}

/// 從內容庫讀取 Service / Location，並解析地點之間的參照
pub struct CatalogReader<'a, S: ContentStore> {
    store: &'a S,
}

impl<'a, S: ContentStore> CatalogReader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Catalog> {
        let services = self.store.services().await?;
        let locations = self.load_locations().await?;

        tracing::info!(
            "📚 Catalog loaded: {} services, {} locations",
            services.len(),
            locations.len()
        );
        Ok(Catalog {
            services,
            locations,
        })
    }

    pub async fn load_locations(&self) -> Result<Vec<ResolvedLocation>> {
        let locations = self.store.locations().await?;
        let areas = self.store.administrative_areas().await?;
        Ok(resolve_references(&locations, &areas))
    }

    pub async fn service_by_slug(&self, slug: &str) -> Result<Service> {
        self.store
            .services()
            .await?
            .into_iter()
            .find(|s| s.slug == slug)
            .ok_or_else(|| PagesError::not_found("service", slug))
    }

    pub async fn location_by_slug(&self, slug: &str) -> Result<ResolvedLocation> {
        self.load_locations()
            .await?
            .into_iter()
            .find(|l| l.slug() == slug)
            .ok_or_else(|| PagesError::not_found("location", slug))
    }
}

/// 解析 parent / province / community / nearby 參照；未知的 id 視為不存在
pub fn resolve_references(
    locations: &[Location],
    areas: &[AdministrativeArea],
) -> Vec<ResolvedLocation> {
    let by_id: HashMap<&str, &Location> = locations.iter().map(|l| (l.id.as_str(), l)).collect();
    let areas_by_id: HashMap<&str, &AdministrativeArea> =
        areas.iter().map(|a| (a.id.as_str(), a)).collect();

    locations
        .iter()
        .map(|location| {
            let mut resolved = resolve_own_areas(location, &areas_by_id);

            if let Some(parent_id) = &location.parent {
                match by_id.get(parent_id.as_str()) {
                    Some(parent) if parent.id != location.id => {
                        resolved.parent = Some(Box::new(resolve_own_areas(parent, &areas_by_id)));
                    }
                    Some(_) => {
                        tracing::warn!(location = %location.slug, "⚠️ Location lists itself as parent");
                    }
                    None => {
                        tracing::warn!(
                            location = %location.slug,
                            parent = %parent_id,
                            "⚠️ Unknown parent reference"
                        );
                    }
                }
            }

            resolved.nearby = location
                .nearby_locations
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .take(MAX_NEARBY_LOCATIONS)
                .map(|nearby| NearbyLocation {
                    name: nearby.name.clone(),
                    slug: nearby.slug.clone(),
                })
                .collect();

            resolved
        })
        .collect()
}

fn resolve_own_areas(
    location: &Location,
    areas_by_id: &HashMap<&str, &AdministrativeArea>,
) -> ResolvedLocation {
    let lookup = |reference: &Option<String>| -> Option<AdministrativeArea> {
        let id = reference.as_deref()?;
        let found = areas_by_id.get(id).map(|area| (*area).clone());
        if found.is_none() {
            tracing::warn!(location = %location.slug, area = %id, "⚠️ Unknown administrative area reference");
        }
        found
    };

    let mut resolved = ResolvedLocation::bare(location.clone());
    resolved.province = lookup(&location.province);
    resolved.community = lookup(&location.autonomous_community);
    resolved
}
