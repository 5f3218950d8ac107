//! # Notifier サーバー
//!
//! 予約ドキュメント（`BookAppointments/{appointmentId}`）の作成イベントを受け取り、
//! 患者に予約確認メールを送信するサービス。
//!
//! ## 役割
//!
//! ```text
//! ┌──────────────┐ Eventarc ┌──────────────┐  GET users/{id}  ┌──────────────┐
//! │  Firestore   │─────────→│   Notifier   │─────────────────→│  Firestore   │
//! │ (作成イベント) │          │              │                  │   (users)    │
//! └──────────────┘          └──────────────┘                  └──────────────┘
//!                                  │ send
//!                                  ↓
//!                           ┌──────────────┐
//!                           │ SendGrid 等  │
//!                           └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFIER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | No | ポート番号（デフォルト: `8080`） |
//! | `FIRESTORE_PROJECT_ID` | **Yes** | GCP プロジェクト ID |
//! | `FIRESTORE_EMULATOR_HOST` | No | エミュレータの `host:port` |
//! | `NOTIFICATION_BACKEND` | No | `sendgrid` / `ses` / `smtp` / `noop`（デフォルト: `noop`） |
//! | `SENDGRID_API_KEY` | backend=sendgrid のとき | SendGrid API キー |
//! | `APPOINTMENT_TIMEZONE` | No | 予約日時の表示タイムゾーン（デフォルト: `UTC`） |
//!
//! その他の変数は [`apptmail_notifier::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Firestore エミュレータ + Mailpit）
//! FIRESTORE_PROJECT_ID=demo-apptmail FIRESTORE_EMULATOR_HOST=localhost:8081 \
//!   NOTIFICATION_BACKEND=smtp cargo run -p apptmail-notifier
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use apptmail_infra::{
    firestore::FirestoreClient,
    notification::{
        NoopNotificationSender,
        NotificationSender,
        SendGridNotificationSender,
        SesNotificationSender,
        SmtpNotificationSender,
    },
    repository::{FirestoreUserRepository, UserRepository},
};
use apptmail_notifier::{
    config::{ConfigError, NotificationBackend, NotificationConfig, NotifierConfig},
    handler::{self, TriggerState},
    usecase::{AppointmentConfirmationUseCase, TemplateRenderer},
};
use apptmail_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Notifier サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("notifier");
    let _tracing_guard = init_tracing(&tracing_config).entered();

    // 設定読み込み
    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Notifier サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // 依存コンポーネントを初期化
    let firestore = FirestoreClient::new(&config.firestore);
    let user_repository: Arc<dyn UserRepository> = Arc::new(FirestoreUserRepository::new(
        firestore,
        config.user_collection.clone(),
    ));
    let sender = build_sender(&config.notification).await?;
    tracing::info!(
        backend = %config.notification.backend,
        "通知送信バックエンドを初期化しました"
    );

    let template_renderer = TemplateRenderer::new(config.display_timezone)
        .context("テンプレートの読み込みに失敗しました")?;
    let usecase = AppointmentConfirmationUseCase::new(
        user_repository,
        sender,
        template_renderer,
        config.notification.from_address.clone(),
    );
    let trigger_state = Arc::new(TriggerState {
        usecase,
        appointment_collection: config.appointment_collection.clone(),
    });

    // ルーター構築
    let app = handler::router(trigger_state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Notifier サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 設定に応じた送信バックエンドを作成する
async fn build_sender(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationSender>, ConfigError> {
    let sender: Arc<dyn NotificationSender> = match config.backend {
        NotificationBackend::SendGrid => {
            let api_key = config
                .sendgrid_api_key
                .clone()
                .ok_or(ConfigError::Missing("SENDGRID_API_KEY"))?;
            Arc::new(SendGridNotificationSender::new(
                &config.sendgrid_base_url,
                api_key,
            ))
        }
        NotificationBackend::Ses => Arc::new(SesNotificationSender::from_env().await),
        NotificationBackend::Smtp => Arc::new(SmtpNotificationSender::new(
            &config.smtp_host,
            config.smtp_port,
        )),
        NotificationBackend::Noop => Arc::new(NoopNotificationSender),
    };

    Ok(sender)
}
