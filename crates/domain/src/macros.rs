/// Firestore のドキュメント ID を包む Newtype を定義する宣言型マクロ
///
/// 生成されるもの:
/// - `String` を包むタプル構造体（`Debug`, `Clone`, `Eq`, `Hash`, serde）
/// - `new()`: ドキュメント ID の制約を検証する。値は加工せずそのまま保持する
/// - `as_str()` / `AsRef<str>` / `Display`
///
/// ドキュメント ID の制約:
///
/// - 空白だけではない（空白を含む ID 自体は有効で、前後の空白も ID の一部）
/// - `/` を含まない（パスの区切りになるため）
/// - `.` / `..` ではない
/// - `__.*__` の形ではない（Firestore の予約名）
/// - UTF-8 で 1500 バイト以内
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use apptmail_domain::appointment::PatientId;
///
/// let id = PatientId::new(" patient-1 ")?;
/// assert_eq!(id.as_str(), " patient-1 ");
/// assert!(PatientId::new("   ").is_err());
/// assert!(PatientId::new("users/patient-1").is_err());
/// # Ok(())
/// # }
/// ```
macro_rules! define_document_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident($label:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value = value.into();

                $crate::macros::check_document_id(&value)
                    .map_err(|reason| $crate::DomainError::Validation(format!("{}{}", $label, reason)))?;

                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// ドキュメント ID の上限（バイト）
pub(crate) const MAX_DOCUMENT_ID_BYTES: usize = 1500;

/// ドキュメント ID の制約を検証し、違反理由を返す
pub(crate) fn check_document_id(id: &str) -> Result<(), &'static str> {
    if id.trim().is_empty() {
        return Err("は必須です");
    }
    if id.contains('/') {
        return Err("に `/` は使用できません");
    }
    if id == "." || id == ".." {
        return Err("に `.` / `..` は使用できません");
    }
    if id.len() >= 4 && id.starts_with("__") && id.ends_with("__") {
        return Err("に予約名（`__.*__`）は使用できません");
    }
    if id.len() > MAX_DOCUMENT_ID_BYTES {
        return Err("は 1500 バイト以内である必要があります");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("patient-1")]
    #[case("aB3_xYz9")]
    #[case("__")]
    #[case("患者-01")]
    #[case(" patient-1 ")]
    fn test_ドキュメントidとして有効(#[case] id: &str) {
        assert_eq!(check_document_id(id), Ok(()));
    }

    #[rstest]
    #[case("")]
    #[case(" \t\n")]
    #[case("users/patient-1")]
    #[case(".")]
    #[case("..")]
    #[case("__reserved__")]
    fn test_ドキュメントidとして無効(#[case] id: &str) {
        assert!(check_document_id(id).is_err());
    }

    #[test]
    fn test_上限はバイト数で数える() {
        // 3 バイト文字 × 500 = 1500 バイト
        assert!(check_document_id(&"あ".repeat(500)).is_ok());
        assert!(check_document_id(&"あ".repeat(501)).is_err());
    }
}
