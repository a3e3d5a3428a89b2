use crate::domain::model::Port;
use crate::domain::ports::PortRepository;
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// 記憶體內的港口儲存。每次操作只持有一次鎖，同一筆資料的所有代碼在同一個寫入鎖內更新。
#[derive(Debug, Default)]
pub struct InMemoryPortRepository {
    ports: RwLock<HashMap<String, Port>>,
}

impl InMemoryPortRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> StoreResult<usize> {
        let ports = self.ports.read().map_err(|_| poisoned())?;
        Ok(ports.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn put(&self, unloc: &str, port: Port) -> StoreResult<()> {
        let mut ports = self.ports.write().map_err(|_| poisoned())?;
        for alias in port.unlocs.iter().filter(|u| u.as_str() != unloc) {
            ports.insert(alias.clone(), port.clone());
        }
        ports.insert(unloc.to_string(), port);
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        message: "port map lock poisoned".to_string(),
    }
}

#[async_trait]
impl PortRepository for InMemoryPortRepository {
    async fn create(&self, unloc: &str, port: Port) -> StoreResult<()> {
        self.put(unloc, port)
    }

    async fn update(&self, unloc: &str, port: Port) -> StoreResult<()> {
        self.put(unloc, port)
    }

    async fn get(&self, unloc: &str) -> StoreResult<Port> {
        let ports = self.ports.read().map_err(|_| poisoned())?;
        ports.get(unloc).cloned().ok_or_else(|| StoreError::NotFound {
            unloc: unloc.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn port(code: &str, unlocs: &[&str]) -> Port {
        Port {
            code: code.to_string(),
            unlocs: unlocs.iter().map(|u| u.to_string()).collect(),
            ..Port::default()
        }
    }

    #[tokio::test]
    async fn test_create_port() {
        let repo = InMemoryPortRepository::new();

        repo.create("UNLOC", port("52000", &["UNLOC"])).await.unwrap();

        assert_eq!(repo.len().unwrap(), 1);
        assert_eq!(repo.get("UNLOC").await.unwrap().code, "52000");
    }

    #[tokio::test]
    async fn test_get_missing_port() {
        let repo = InMemoryPortRepository::new();

        let err = repo.get("UNLOC").await.unwrap_err();

        assert_eq!(
            err,
            StoreError::NotFound {
                unloc: "UNLOC".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_update_replaces_whole_record() {
        let repo = InMemoryPortRepository::new();
        let mut original = port("52000", &["UNLOC"]);
        original.name = "Ajman".to_string();
        original.alias = vec!["Ajman Port".to_string()];
        repo.create("UNLOC", original).await.unwrap();

        repo.update("UNLOC", port("updated", &["UNLOC"])).await.unwrap();

        let stored = repo.get("UNLOC").await.unwrap();
        assert_eq!(stored, port("updated", &["UNLOC"]));
    }

    #[tokio::test]
    async fn test_record_indexed_under_every_unloc() {
        let repo = InMemoryPortRepository::new();

        repo.create("KEY", port("1", &["AAAAA", "BBBBB"])).await.unwrap();

        assert_eq!(repo.len().unwrap(), 3);
        for unloc in ["KEY", "AAAAA", "BBBBB"] {
            assert_eq!(repo.get(unloc).await.unwrap().code, "1");
        }
    }

    #[tokio::test]
    async fn test_identifiers_are_case_sensitive() {
        let repo = InMemoryPortRepository::new();

        repo.create("AEAJM", port("1", &["AEAJM"])).await.unwrap();

        assert!(repo.get("aeajm").await.is_err());
        assert!(repo.get(" AEAJM").await.is_err());
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_unavailable() {
        let repo = Arc::new(InMemoryPortRepository::new());

        let poisoner = Arc::clone(&repo);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.ports.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            repo.get("AEAJM").await,
            Err(StoreError::Unavailable { .. })
        ));
        assert!(matches!(
            repo.create("AEAJM", Port::default()).await,
            Err(StoreError::Unavailable { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_never_expose_partial_records() {
        let repo = Arc::new(InMemoryPortRepository::new());
        let mut initial = port("0", &["SHARED", "ALIAS"]);
        initial.name = "0".to_string();
        repo.create("SHARED", initial).await.unwrap();

        let mut handles = Vec::new();
        for writer in 0..8 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                for i in 0..200 {
                    let value = format!("{}-{}", writer, i);
                    let mut record = port(&value, &["SHARED", "ALIAS"]);
                    record.name = value;
                    repo.update("SHARED", record).await.unwrap();
                }
            }));
        }
        for _ in 0..4 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                for _ in 0..400 {
                    let stored = repo.get("SHARED").await.unwrap();
                    assert_eq!(stored.name, stored.code);
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let shared = repo.get("SHARED").await.unwrap();
        let alias = repo.get("ALIAS").await.unwrap();
        assert_eq!(shared, alias);
    }
}
