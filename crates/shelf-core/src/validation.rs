//! Input validation for administrative operations.

use shelf_utils::string::{is_valid_slug, slugify};
use url::Url;

use crate::{error::ShelfError, ShelfResult};

/// Trim `value` and reject it if nothing is left.
pub fn required<'a>(field: &str, value: &'a str) -> ShelfResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShelfError::Validation(format!("{field} is required")));
    }
    Ok(value)
}

/// Trim an optional text field, mapping blank input to `None`.
pub fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Require a well-formed slug.
pub fn slug(value: &str) -> ShelfResult<&str> {
    let value = required("Slug", value)?;
    if !is_valid_slug(value) {
        return Err(ShelfError::Validation(format!(
            "Invalid slug '{value}': use lowercase letters, digits and single dashes"
        )));
    }
    Ok(value)
}

/// Use `explicit` as the slug when given, otherwise derive one from `name`.
pub fn resolve_slug(explicit: Option<&str>, name: &str) -> ShelfResult<String> {
    match optional(explicit) {
        Some(explicit) => slug(explicit).map(str::to_string),
        None => {
            let slug = slugify(name);
            if slug.is_empty() {
                return Err(ShelfError::Validation(format!(
                    "Cannot derive a slug from '{name}', provide one explicitly"
                )));
            }
            Ok(slug)
        }
    }
}

/// Require an absolute http(s) URL.
pub fn http_url<'a>(field: &str, value: &'a str) -> ShelfResult<&'a str> {
    let value = required(field, value)?;
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(value),
        _ => {
            Err(ShelfError::Validation(format!(
                "{field} must be an http(s) URL, got '{value}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("Name", "  Zustand ").unwrap(), "Zustand");
        let err = required("Name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" npm i zustand ")), Some("npm i zustand"));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_resolve_slug_generated() {
        assert_eq!(
            resolve_slug(None, "Storage & State").unwrap(),
            "storage-and-state"
        );
        assert_eq!(resolve_slug(Some(" "), "MMKV").unwrap(), "mmkv");
    }

    #[test]
    fn test_resolve_slug_explicit() {
        assert_eq!(resolve_slug(Some("rn-mmkv"), "MMKV").unwrap(), "rn-mmkv");
        assert!(matches!(
            resolve_slug(Some("Not A Slug"), "x"),
            Err(ShelfError::Validation(_))
        ));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug(" react-query ").unwrap(), "react-query");
        assert!(slug("").is_err());
        assert!(slug("-leading").is_err());
    }

    #[test]
    fn test_resolve_slug_unusable_name() {
        assert!(matches!(
            resolve_slug(None, "!!!"),
            Err(ShelfError::Validation(_))
        ));
    }

    #[test]
    fn test_http_url() {
        assert!(http_url("Source URL", "https://github.com/pmndrs/zustand").is_ok());
        assert!(http_url("Source URL", "ftp://example.com/x").is_err());
        assert!(http_url("Source URL", "github.com/pmndrs/zustand").is_err());
        assert!(http_url("Source URL", "").is_err());
    }
}
