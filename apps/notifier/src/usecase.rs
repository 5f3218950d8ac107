//! # ユースケース層
//!
//! 予約確認メール送信のビジネスロジックを実装する。

pub mod confirmation;
pub mod template_renderer;

pub use confirmation::AppointmentConfirmationUseCase;
pub use template_renderer::TemplateRenderer;
