use std::env;

/// APIのベースURLを指定する環境変数。
pub const API_URL_ENV: &str = "WORKTRACK_API_URL";

/// APIのベースURLの既定値。
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// 実行時の設定。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
}

impl Config {
    /// コマンドライン引数、環境変数、既定値の順に設定を決定する。
    ///
    /// # Arguments
    ///
    /// * `api_url` - コマンドライン引数で指定されたAPIのベースURL
    pub fn load(api_url: Option<&str>) -> Self {
        Self::resolve(api_url, env::var(API_URL_ENV).ok().as_deref())
    }

    fn resolve(cli: Option<&str>, env: Option<&str>) -> Self {
        let api_url = cli
            .or(env)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        Self { api_url }
    }
}
