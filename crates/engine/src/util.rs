//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use sea_orm::{DbErr, SqlErr, sea_query::LikeExpr};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("{label} inválido")))
}

/// Trim a required text field and enforce its maximum length.
pub(crate) fn normalize_required_text(
    value: &str,
    label: &str,
    max_chars: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} não pode ser vazio"
        )));
    }
    if trimmed.chars().count() > max_chars {
        return Err(EngineError::InvalidInput(format!(
            "{label} deve ter no máximo {max_chars} caracteres"
        )));
    }
    Ok(trimmed.to_string())
}

/// Money limits stored on products must never be negative.
pub(crate) fn ensure_non_negative_money(value: Money, label: &str) -> ResultEngine<()> {
    if value.is_negative() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} não pode ser negativo"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(value: i32, label: &str) -> ResultEngine<()> {
    if value < 0 {
        return Err(EngineError::InvalidInput(format!(
            "{label} não pode ser negativo"
        )));
    }
    Ok(())
}

/// Minimal structural e-mail check: `local@domain.tld`, no whitespace.
pub(crate) fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && !host.starts_with('.') && tld.len() >= 2
        }
        None => false,
    }
}

/// Map a storage-level unique violation into the user-facing duplicate error.
pub(crate) fn map_unique_violation(err: DbErr, message: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(message.to_string()),
        _ => EngineError::Database(err),
    }
}

/// Map a foreign-key violation raised on delete into a referential block.
pub(crate) fn map_foreign_key_violation(err: DbErr, message: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            EngineError::ReferenceProtected(message.to_string())
        }
        _ => EngineError::Database(err),
    }
}

/// Lowercase `needle` and escape the `LIKE` wildcards in it with `\`.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive `LIKE` pattern matching `needle` anywhere. `%`, `_` and
/// `\` typed by the user match literally.
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check() {
        assert!(is_valid_email("jhrq@gmail.com"));
        assert!(is_valid_email("a.b@mail.example.org"));
        assert!(!is_valid_email("jhrq"));
        assert!(!is_valid_email("jhrq@gmail"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email("jh rq@gmail.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn required_text_is_trimmed_and_bounded() {
        assert_eq!(
            normalize_required_text("  Produto 1 ", "nome", 150).unwrap(),
            "Produto 1"
        );
        assert!(normalize_required_text("   ", "nome", 150).is_err());
        assert!(normalize_required_text("abcdef", "susep", 5).is_err());
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(escape_like("Produto 1"), "produto 1");
        assert_eq!(escape_like("10%_A\\b"), "10\\%\\_a\\\\b");
    }
}
