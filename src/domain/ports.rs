use crate::domain::model::{
    AdministrativeArea, Location, OverrideContent, OverrideDocument, Service,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 位元組層級的儲存後端
pub trait Storage: Send + Sync {
    /// 檔案不存在時回傳 `Ok(None)`
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 內容庫：讀取服務 / 地點，寫入覆寫文件
pub trait ContentStore: Send + Sync {
    fn services(&self) -> impl std::future::Future<Output = Result<Vec<Service>>> + Send;

    fn locations(&self) -> impl std::future::Future<Output = Result<Vec<Location>>> + Send;

    fn administrative_areas(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<AdministrativeArea>>> + Send;

    fn find_override(
        &self,
        service_id: &str,
        location_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<OverrideDocument>>> + Send;

    /// 同一組 (service, location) 已存在時回傳 `UpsertConflict`
    fn create_override(
        &self,
        doc: OverrideDocument,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// createOrReplace
    fn replace_override(
        &self,
        doc: OverrideDocument,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// patch(id).set(fields).commit()
    fn patch_override(
        &self,
        id: &str,
        set: &OverrideContent,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 外部文字生成模型：一次呼叫，prompt 進、文字出
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}
