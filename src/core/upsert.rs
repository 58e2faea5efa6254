use crate::domain::model::{OverrideContent, OverrideDocument};
use crate::domain::ports::ContentStore;
use crate::utils::error::{PagesError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// 先查詢再建立或 patch。不具原子性，依賴管線單一寫入者
pub struct OverrideUpserter<'a, S: ContentStore> {
    store: &'a S,
}

impl<'a, S: ContentStore> OverrideUpserter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn upsert(
        &self,
        service_id: &str,
        location_id: &str,
        content: OverrideContent,
    ) -> Result<UpsertOutcome> {
        match self.store.find_override(service_id, location_id).await? {
            Some(existing) => {
                self.store.patch_override(&existing.id, &content).await?;
                tracing::debug!(id = %existing.id, "✏️ Override patched");
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let doc = OverrideDocument::new(service_id, location_id, content);
                let id = doc.id.clone();
                match self.store.create_override(doc.clone()).await {
                    Ok(()) => {
                        tracing::debug!(id = %id, "🆕 Override created");
                        Ok(UpsertOutcome::Created)
                    }
                    Err(PagesError::UpsertConflict { .. }) => {
                        // 查詢與寫入之間有別人寫入：最後寫入者為準，不合併
                        tracing::warn!(id = %id, "⚠️ Override appeared between check and create, replacing");
                        self.store.replace_override(doc).await?;
                        Ok(UpsertOutcome::Updated)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::DocumentStore;
    use crate::adapters::testing::MockStorage;
    use crate::domain::model::{Faq, HeroOverride};

    fn hero(title: &str) -> OverrideContent {
        OverrideContent {
            hero: Some(HeroOverride {
                title: Some(title.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_first_upsert_creates() {
        let store = DocumentStore::new(MockStorage::new());
        let upserter = OverrideUpserter::new(&store);

        let outcome = upserter.upsert("svc-web", "loc-madrid", hero("Madrid")).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(store.overrides().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_upsert_patches_without_duplicate() {
        let store = DocumentStore::new(MockStorage::new());
        let upserter = OverrideUpserter::new(&store);

        upserter.upsert("svc-web", "loc-madrid", hero("v1")).await.unwrap();
        let outcome = upserter.upsert("svc-web", "loc-madrid", hero("v2")).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        let docs = store.overrides().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].content.hero.as_ref().unwrap().title.as_deref(),
            Some("v2")
        );
    }

    #[tokio::test]
    async fn test_patch_keeps_hand_edited_sections() {
        let store = DocumentStore::new(MockStorage::new());
        let upserter = OverrideUpserter::new(&store);

        let mut first = hero("v1");
        first.faqs = Some(vec![Faq {
            question: "¿Editado a mano?".to_string(),
            answer: "Sí".to_string(),
        }]);
        upserter.upsert("svc-web", "loc-madrid", first).await.unwrap();
        upserter.upsert("svc-web", "loc-madrid", hero("v2")).await.unwrap();

        let doc = store
            .find_override("svc-web", "loc-madrid")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.content.faqs.unwrap()[0].answer, "Sí");
    }
}
