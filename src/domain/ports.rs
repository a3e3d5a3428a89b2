use crate::domain::model::{Port, SyncReport};
use crate::utils::error::{Result, StoreResult};
use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// 港口資料的儲存層。`create` 與 `update` 的效果相同，差別只在呼叫端的意圖。
#[async_trait]
pub trait PortRepository: Send + Sync {
    /// 以 `unloc` 及 `port.unlocs` 內的每個代碼寫入整筆資料
    async fn create(&self, unloc: &str, port: Port) -> StoreResult<()>;
    /// 以整筆資料取代 `unloc` 及 `port.unlocs` 下的既有資料
    async fn update(&self, unloc: &str, port: Port) -> StoreResult<()>;
    async fn get(&self, unloc: &str) -> StoreResult<Port>;
}

#[async_trait]
pub trait PortDomainService: Send + Sync {
    /// 逐筆讀取 `{ unloc: port, ... }` 並 upsert 到儲存層。
    /// 中途失敗時，已寫入的資料不會回滾。
    async fn sync_ports(
        &self,
        ports: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<SyncReport>;

    async fn get_port(&self, unloc: &str) -> Result<Port>;
}
