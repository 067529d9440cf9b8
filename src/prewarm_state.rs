//! 启动预热：后台线程拉取诵读者目录，界面层按需等待或读取。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::catalog::reciters::{self, ReciterVariant};
use crate::third_party::http::AudioTransport;

static PREWARMING: AtomicBool = AtomicBool::new(false);
static CATALOG: RwLock<Option<Arc<Vec<ReciterVariant>>>> = RwLock::new(None);

pub fn mark_prewarm_done() {
    PREWARMING.store(false, Ordering::SeqCst);
}

pub fn is_prewarm_in_progress() -> bool {
    PREWARMING.load(Ordering::SeqCst)
}

pub fn set_catalog(list: Vec<ReciterVariant>) {
    if let Ok(mut slot) = CATALOG.write() {
        *slot = Some(Arc::new(list));
    }
}

/// 当前目录；尚未加载时为空列表。
pub fn catalog() -> Arc<Vec<ReciterVariant>> {
    CATALOG
        .read()
        .ok()
        .and_then(|slot| slot.clone())
        .unwrap_or_default()
}

pub fn is_loaded() -> bool {
    CATALOG.read().map(|slot| slot.is_some()).unwrap_or(false)
}

/// 在后台线程加载目录；已有加载在进行时直接返回。
pub fn spawn_catalog_load(transport: Arc<dyn AudioTransport>, url: String) {
    if PREWARMING.swap(true, Ordering::SeqCst) {
        return;
    }
    let spawned = thread::Builder::new()
        .name("catalog-prewarm".to_string())
        .spawn(move || {
            let list = reciters::load(transport.as_ref(), &url);
            info!(target: "startup", "目录预热完成: {} 项", list.len());
            set_catalog(list);
            mark_prewarm_done();
        });
    if spawned.is_err() {
        mark_prewarm_done();
    }
}

/// 等待预热结束，最多 `timeout`。
pub fn wait_ready(timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while is_prewarm_in_progress() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(50));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::third_party::fake::{FakeTransport, Reply};

    #[test]
    fn background_load_publishes_catalog() {
        let fake = Arc::new(FakeTransport::new());
        let body = br#"{"reciters":[{"id":1,"name":"a","letter":"a","moshaf":[
            {"id":2,"name":"n","server":"https://s/","surah_total":1,"surah_list":"1"}]}]}"#;
        fake.on_get("https://catalog.test", Reply::Body(200, body.to_vec()));

        spawn_catalog_load(fake, "https://catalog.test".to_string());
        assert!(wait_ready(Duration::from_secs(5)));
        assert!(is_loaded());
        assert_eq!(catalog().len(), 1);
        assert_eq!(catalog()[0].id, "1-2");
    }
}
