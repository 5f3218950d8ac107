//! # Observability 基盤
//!
//! tracing subscriber の組み立てを 1 か所にまとめる。
//!
//! ## 設計方針
//!
//! - **出力形式は環境変数で選ぶ**: `LOG_FORMAT=json` で 1 行 1 JSON
//!   （Cloud Logging がそのまま構造化ログとして取り込む）、それ以外は人間向けの形式
//! - **フィルタ**: `RUST_LOG` が無ければ [`DEFAULT_FILTER`]
//! - **SpanTrace**: `tracing_error::ErrorLayer` を常に登録し、
//!   infra 層のエラーが発生地点のスパンを保持できるようにする

use std::str::FromStr;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,apptmail=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 JSON。イベントのフィールドはトップレベルに展開する
    Json,
    /// 人間向けの複数行形式
    #[default]
    Pretty,
}

/// 未知の `LOG_FORMAT` 値
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogFormat(pub String);

impl std::fmt::Display for UnknownLogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown LOG_FORMAT={:?} (expected \"json\" or \"pretty\")", self.0)
    }
}

impl std::error::Error for UnknownLogFormat {}

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(UnknownLogFormat(s.to_string())),
        }
    }
}

impl LogFormat {
    /// 環境変数の値から形式を決める
    ///
    /// 未設定なら既定値。不正な値は subscriber がまだ無いため stderr に警告して既定値にする。
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::parse::<Self>) {
            None => Self::default(),
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                eprintln!("WARNING: {e}, falling back to pretty");
                Self::default()
            }
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// ルートスパンの `service` フィールド
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    /// `LOG_FORMAT` を読んで設定を作る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let value = std::env::var("LOG_FORMAT").ok();
        Self::new(service_name, LogFormat::from_env_value(value.as_deref()))
    }
}

/// グローバル subscriber を登録し、サービス名付きのルートスパンを返す
///
/// 戻り値のスパンは `main` で `entered()` しておく。
/// 2 回目以降の呼び出しは subscriber の登録に失敗するため、プロセスで 1 回だけ呼ぶこと。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) -> tracing::Span {
    use tracing_subscriber::{EnvFilter, Layer as _, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let output = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::info_span!("app", service = %config.service_name)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case(" json\n", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    #[case("text", LogFormat::Pretty)]
    fn test_log_formatをパースできる(#[case] value: &str, #[case] expected: LogFormat) {
        assert_eq!(value.parse::<LogFormat>(), Ok(expected));
    }

    #[test]
    fn test_未知の値はエラーに元の値を含める() {
        let err = "yaml".parse::<LogFormat>().unwrap_err();

        assert_eq!(err, UnknownLogFormat("yaml".to_string()));
        assert!(err.to_string().contains("\"yaml\""));
    }

    #[rstest]
    #[case(None, LogFormat::Pretty)]
    #[case(Some("json"), LogFormat::Json)]
    #[case(Some("yaml"), LogFormat::Pretty)]
    #[case(Some(""), LogFormat::Pretty)]
    fn test_環境変数の値から形式を決める(#[case] value: Option<&str>, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_env_value(value), expected);
    }
}
