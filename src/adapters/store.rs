use crate::domain::model::{
    AdministrativeArea, Location, OverrideContent, OverrideDocument, Service,
};
use crate::domain::ports::{ContentStore, Storage};
use crate::utils::error::{PagesError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

pub const SERVICES_FILE: &str = "services.json";
pub const LOCATIONS_FILE: &str = "locations.json";
pub const AREAS_FILE: &str = "administrative_areas.json";
pub const OVERRIDES_FILE: &str = "overrides.json";

/// 以 JSON 集合檔實作的內容庫，每個集合是一個文件陣列
pub struct DocumentStore<S: Storage> {
    storage: S,
    // 覆寫文件的 read-modify-write 需要序列化
    write_lock: Mutex<()>,
}

impl<S: Storage> DocumentStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let Some(bytes) = self.storage.read_file(file).await? else {
            tracing::debug!("Collection {} not found, treating as empty", file);
            return Ok(Vec::new());
        };

        serde_json::from_slice(&bytes).map_err(|e| PagesError::Store {
            message: format!("{} is not a valid document array: {}", file, e),
        })
    }

    async fn write_collection<T: Serialize>(&self, file: &str, docs: &[T]) -> Result<()> {
        let json = serde_json::to_vec_pretty(docs)?;
        self.storage.write_file(file, &json).await
    }

    /// 寫入整個集合 (用於初始化資料或測試)
    pub async fn seed<T: Serialize>(&self, file: &str, docs: &[T]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_collection(file, docs).await
    }

    pub async fn overrides(&self) -> Result<Vec<OverrideDocument>> {
        self.read_collection(OVERRIDES_FILE).await
    }
}

impl<S: Storage> ContentStore for DocumentStore<S> {
    async fn services(&self) -> Result<Vec<Service>> {
        self.read_collection(SERVICES_FILE).await
    }

    async fn locations(&self) -> Result<Vec<Location>> {
        self.read_collection(LOCATIONS_FILE).await
    }

    async fn administrative_areas(&self) -> Result<Vec<AdministrativeArea>> {
        self.read_collection(AREAS_FILE).await
    }

    async fn find_override(
        &self,
        service_id: &str,
        location_id: &str,
    ) -> Result<Option<OverrideDocument>> {
        let docs: Vec<OverrideDocument> = self.read_collection(OVERRIDES_FILE).await?;
        Ok(docs
            .into_iter()
            .find(|doc| doc.service_ref == service_id && doc.location_ref == location_id))
    }

    async fn create_override(&self, doc: OverrideDocument) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut docs: Vec<OverrideDocument> = self.read_collection(OVERRIDES_FILE).await?;

        let duplicate = docs.iter().any(|existing| {
            existing.id == doc.id
                || (existing.service_ref == doc.service_ref
                    && existing.location_ref == doc.location_ref)
        });
        if duplicate {
            return Err(PagesError::UpsertConflict {
                service_id: doc.service_ref,
                location_id: doc.location_ref,
            });
        }

        docs.push(doc);
        self.write_collection(OVERRIDES_FILE, &docs).await
    }

    async fn replace_override(&self, doc: OverrideDocument) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut docs: Vec<OverrideDocument> = self.read_collection(OVERRIDES_FILE).await?;

        // 同一組的所有舊文件都移除，最後寫入者為準
        docs.retain(|existing| {
            existing.id != doc.id
                && !(existing.service_ref == doc.service_ref
                    && existing.location_ref == doc.location_ref)
        });
        docs.push(doc);
        self.write_collection(OVERRIDES_FILE, &docs).await
    }

    async fn patch_override(&self, id: &str, set: &OverrideContent) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut docs: Vec<OverrideDocument> = self.read_collection(OVERRIDES_FILE).await?;

        let doc = docs
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| PagesError::Store {
                message: format!("cannot patch missing override document {}", id),
            })?;
        doc.content.apply_set(set);
        doc.generated_at = Some(chrono::Utc::now());

        self.write_collection(OVERRIDES_FILE, &docs).await
    }
}
