use std::future::Future;

use anyhow::Result;
use log::debug;

/// 画面ごとに発行するリクエストの世代番号。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// 画面ごとに独立して保持するデータのキャッシュ。
///
/// 取得のたびに丸ごと置き換える。画面間での共有や同期は行わない。
/// 取得を開始するたびに世代番号を発行し、最新でない世代の応答は破棄する。
#[derive(Debug)]
pub struct ViewCache<T> {
    latest: u64,
    data: Option<T>,
}

impl<T> Default for ViewCache<T> {
    fn default() -> Self {
        Self {
            latest: 0,
            data: None,
        }
    }
}

impl<T> ViewCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい取得を開始し、その世代番号を返す。以前の世代は古いものとして扱う。
    pub fn begin(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    /// 取得結果を反映する。最新の世代でない場合は破棄して`false`を返す。
    pub fn apply(&mut self, generation: Generation, data: T) -> bool {
        if generation.0 != self.latest {
            debug!(
                "discard stale response: generation {} (latest {})",
                generation.0, self.latest
            );
            return false;
        }
        self.data = Some(data);
        true
    }

    /// 取得して反映する。
    ///
    /// 取得中は`&mut self`を借用し続けるため、この経路だけでは応答が古くなることはない。
    /// 取得を並行させる場合は`begin`と`apply`を直接使う。
    pub async fn refresh<F, Fut>(&mut self, fetch: F) -> Result<Option<&T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let generation = self.begin();
        let data = fetch().await?;
        self.apply(generation, data);

        Ok(self.data.as_ref())
    }

    pub fn get(&self) -> Option<&T> {
        self.data.as_ref()
    }
}
