use crate::core::catalog::CatalogReader;
use crate::domain::ports::ContentStore;
use crate::domain::render::RenderModel;
use crate::resolve::merge::resolve;
use crate::utils::error::Result;

/// 服務時的解析入口：`resolve(serviceSlug, locationSlug) -> RenderModel | NotFound`
pub struct PageResolver<S: ContentStore> {
    store: S,
}

impl<S: ContentStore> PageResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, service_slug: &str, location_slug: &str) -> Result<RenderModel> {
        let catalog = CatalogReader::new(&self.store);
        let service = catalog.service_by_slug(service_slug).await?;
        let location = catalog.location_by_slug(location_slug).await?;

        // 覆寫讀不到時退回基礎內容，不讓線上請求失敗
        let override_doc = match self.store.find_override(&service.id, location.id()).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    service = %service_slug,
                    location = %location_slug,
                    error = %e,
                    "⚠️ Override lookup failed, serving base content"
                );
                None
            }
        };

        Ok(resolve(
            &service,
            &location,
            override_doc.as_ref().map(|doc| &doc.content),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::{DocumentStore, LOCATIONS_FILE, OVERRIDES_FILE, SERVICES_FILE};
    use crate::adapters::testing::{location, sample_service, MockStorage};
    use crate::domain::model::{HeroOverride, LocationKind, OverrideContent, OverrideDocument};
    use crate::utils::error::PagesError;

    async fn seeded() -> DocumentStore<MockStorage> {
        let store = DocumentStore::new(MockStorage::new());
        store.seed(SERVICES_FILE, &[sample_service()]).await.unwrap();
        store
            .seed(
                LOCATIONS_FILE,
                &[location("loc-madrid", "madrid", "Madrid", LocationKind::City)],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_unknown_slugs_are_not_found() {
        let resolver = PageResolver::new(seeded().await);

        let err = resolver.resolve("no-existe", "madrid").await.unwrap_err();
        assert!(matches!(err, PagesError::NotFound { ref kind, .. } if kind == "service"));

        let err = resolver.resolve("diseno-web", "atlantis").await.unwrap_err();
        assert!(matches!(err, PagesError::NotFound { ref kind, .. } if kind == "location"));
    }

    #[tokio::test]
    async fn test_override_applied_when_present() {
        let store = seeded().await;
        let doc = OverrideDocument::new(
            "svc-web",
            "loc-madrid",
            OverrideContent {
                hero: Some(HeroOverride {
                    title: Some("Diseño web en Madrid".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        store.seed(OVERRIDES_FILE, &[doc]).await.unwrap();

        let model = PageResolver::new(store).resolve("diseno-web", "madrid").await.unwrap();

        assert!(model.has_override);
        assert_eq!(model.hero.title, "Diseño web en Madrid");
    }

    #[tokio::test]
    async fn test_broken_override_collection_serves_base() {
        let store = seeded().await;
        store.storage().put(OVERRIDES_FILE, b"{not json").await;

        let model = PageResolver::new(store).resolve("diseno-web", "madrid").await.unwrap();

        assert!(!model.has_override);
        assert_eq!(model.hero.title, "Diseño web profesional");
    }
}
