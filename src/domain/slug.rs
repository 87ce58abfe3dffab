//! Group slug derivation and validation.
//!
//! Slugs are the public identity of a group, so they are restricted to the
//! URL-safe alphabet `[-a-zA-Z0-9_]`. When an administrator does not supply
//! one, a slug is derived from the group title and suffixed with a counter
//! until the supplied uniqueness predicate accepts it.

use std::future::Future;

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;
const MAX_SLUG_LEN: usize = 50;

/// Errors that can occur while producing a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("slug `{slug}` may only contain letters, digits, hyphens and underscores")]
    InvalidCharacters { slug: String },
    #[error("slug `{slug}` exceeds {MAX_SLUG_LEN} characters")]
    TooLong { slug: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors that can occur while generating a slug via an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let mut candidate = slugify(input);
    candidate.truncate(MAX_SLUG_LEN);
    let candidate = candidate.trim_end_matches('-').to_string();

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Check an explicitly supplied slug against the allowed alphabet.
pub fn validate_slug(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::EmptyInput);
    }
    if slug.chars().count() > MAX_SLUG_LEN {
        return Err(SlugError::TooLong {
            slug: slug.to_string(),
        });
    }
    let valid = slug
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    if !valid {
        return Err(SlugError::InvalidCharacters {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Produce a slug for `input` that the async `is_unique` predicate accepts.
///
/// The predicate must return `true` when the candidate does not exist yet.
/// Collisions are retried with a monotonic suffix (`-2`, `-3`, …).
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = with_suffix(&base, attempt);
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

/// Append `-{attempt}`, shortening `base` so the result stays within `MAX_SLUG_LEN`.
fn with_suffix(base: &str, attempt: usize) -> String {
    let suffix = format!("-{attempt}");
    let keep = MAX_SLUG_LEN.saturating_sub(suffix.len());
    let stem = base.get(..keep).unwrap_or(base).trim_end_matches('-');
    format!("{stem}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        let slug = derive_slug("Lev Tolstoy Fans").expect("slug");
        assert_eq!(slug, "lev-tolstoy-fans");
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn validate_slug_accepts_underscores_and_digits() {
        assert!(validate_slug("group_1-a").is_ok());
    }

    #[test]
    fn validate_slug_rejects_spaces() {
        assert!(matches!(
            validate_slug("two words"),
            Err(SlugError::InvalidCharacters { .. })
        ));
    }

    #[tokio::test]
    async fn generate_unique_slug_async_appends_counter() {
        use std::sync::Arc;
        use tokio::sync::Mutex;

        let existing = Arc::new(Mutex::new(vec!["book-club".to_string()]));

        let slug = generate_unique_slug_async("Book Club", |candidate| {
            let existing = existing.clone();
            let candidate = candidate.to_string();
            async move {
                let mut guard = existing.lock().await;
                if guard.contains(&candidate) {
                    Ok::<bool, std::convert::Infallible>(false)
                } else {
                    guard.push(candidate);
                    Ok::<bool, std::convert::Infallible>(true)
                }
            }
        })
        .await
        .expect("unique slug");

        assert_eq!(slug, "book-club-2");
        let guard = existing.lock().await;
        assert!(guard.contains(&slug));
    }

    #[tokio::test]
    async fn suffixed_slugs_stay_within_length_limit() {
        let title = "a".repeat(80);
        let base = derive_slug(&title).expect("slug");
        assert_eq!(base.len(), MAX_SLUG_LEN);

        let slug = generate_unique_slug_async(&title, |candidate| {
            let fresh = candidate != base;
            async move { Ok::<bool, std::convert::Infallible>(fresh) }
        })
        .await
        .expect("unique slug");

        assert_eq!(slug, format!("{}-2", "a".repeat(MAX_SLUG_LEN - 2)));
        assert!(validate_slug(&slug).is_ok());
    }

    #[test]
    fn suffix_does_not_leave_double_hyphen() {
        let base = format!("{}-bc", "a".repeat(46));
        assert_eq!(with_suffix(&base, 10), format!("{}-10", "a".repeat(46)));
        assert_eq!(with_suffix("short", 3), "short-3");
    }

    #[tokio::test]
    async fn generate_unique_slug_async_exhausts() {
        let result = generate_unique_slug_async("Example", |_| async {
            Ok::<bool, std::convert::Infallible>(false)
        })
        .await;

        assert!(matches!(
            result,
            Err(SlugAsyncError::Slug(SlugError::Exhausted { ref base })) if base == "example"
        ));
    }
}
