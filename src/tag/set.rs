use crate::go::search::struct_type_by_name;
use crate::pool::with_parser;
use crate::span::{replace_span, Span};
use crate::tag::errors::TagError;
use crate::tag::extract::{extract_field_index, extract_keyed_value_index, FieldMode};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const TAG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::tag");

/// Where a new sub-field goes inside the keyed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum InsertLocation {
    /// Right after the opening quote
    Top,
    /// Right before the closing quote
    #[default]
    End,
}

impl FromStr for InsertLocation {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TOP" => Ok(Self::Top),
            "END" => Ok(Self::End),
            _ => Err(TagError::InvalidLocation {
                location: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for InsertLocation {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for InsertLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "TOP"),
            Self::End => write!(f, "END"),
        }
    }
}

/// Set `field:value` inside the quoted value of `key`.
///
/// An existing field has its value replaced in place, with a `;` appended
/// when none follows. A missing field is added as `field:value;` at the top
/// or end of the keyed value; at the end a separating `;` is inserted
/// unless the value is empty or already ends in `;` or a space.
pub fn set_tag_field_value(
    tag: &str,
    key: &str,
    field: &str,
    value: &str,
    location: InsertLocation,
) -> Result<String, TagError> {
    let keyed = extract_keyed_value_index(tag, key)?.ok_or_else(|| TagError::KeyNotFound {
        key: key.to_string(),
    })?;
    debug!(
        target: TAG_TARGET,
        tag,
        keyed_value = keyed.value,
        start = keyed.start,
        end = keyed.end,
        "modifying tag field"
    );

    let Some(existing) = extract_field_index(keyed.value, field, FieldMode::IncludeWhitespacePrefix)?
    else {
        let mut insertion = format!("{field}:{value};");
        let at = match location {
            InsertLocation::Top => keyed.start,
            InsertLocation::End => {
                let at = keyed.end;
                let previous = tag.as_bytes().get(at.wrapping_sub(1)).copied();
                if !matches!(previous, Some(b'"' | b';' | b' ')) {
                    insertion.insert(0, ';');
                }
                at
            }
        };
        return Ok(format!("{}{insertion}{}", &tag[..at], &tag[at..]));
    };

    let start = keyed.start + existing.start;
    let end = keyed.start + existing.end;
    debug!(
        target: TAG_TARGET,
        field,
        old = existing.value,
        new = value,
        "replacing tag field value"
    );

    let mut replacement = value.to_string();
    if tag.as_bytes().get(end) != Some(&b';') {
        replacement.push(';');
    }
    Ok(format!("{}{replacement}{}", &tag[..start], &tag[end..]))
}

/// Rewrite one sub-field of a struct field's tag inside Go source.
///
/// Locates `struct_name.field_name`, applies [`set_tag_field_value`] to the
/// content of its raw-string tag and splices the result back.
pub fn rewrite_struct_tag(
    source: &[u8],
    struct_name: &str,
    field_name: &str,
    key: &str,
    sub_field: &str,
    value: &str,
    location: InsertLocation,
) -> Result<Vec<u8>, TagError> {
    let (content_span, content) = with_parser(|parser| -> Result<(Span, String), TagError> {
        let parsed = parser.parse_checked(source)?;
        let item = struct_type_by_name(&parsed, struct_name).ok_or_else(|| {
            TagError::StructNotFound {
                name: struct_name.to_string(),
            }
        })?;
        let field = item
            .field_by_name(field_name)
            .ok_or_else(|| TagError::FieldNotFound {
                struct_name: struct_name.to_string(),
                field: field_name.to_string(),
            })?;
        let literal = field.tag().ok_or_else(|| TagError::MissingTag {
            field: field_name.to_string(),
        })?;
        if !literal.starts_with('`') {
            return Err(TagError::UnsupportedTagLiteral {
                field: field_name.to_string(),
            });
        }
        let span = field
            .tag_content_span()
            .ok_or_else(|| TagError::MissingTag {
                field: field_name.to_string(),
            })?;
        Ok((span, parsed.span_text(span).to_string()))
    })??;

    let rewritten = set_tag_field_value(&content, key, sub_field, value, location)?;
    if rewritten == content {
        return Ok(source.to_vec());
    }
    Ok(replace_span(source, content_span, rewritten.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tag: &str, field: &str, value: &str, location: InsertLocation) -> String {
        set_tag_field_value(tag, "gorm", field, value, location).unwrap()
    }

    #[test]
    fn insert_field_top() {
        assert_eq!(
            set(r#"gorm:"column:id""#, "type", "bigint", InsertLocation::Top),
            r#"gorm:"type:bigint;column:id""#
        );
    }

    #[test]
    fn insert_field_end() {
        assert_eq!(
            set(r#"gorm:"column:id""#, "type", "bigint", InsertLocation::End),
            r#"gorm:"column:id;type:bigint;""#
        );
    }

    #[test]
    fn update_existing_field() {
        assert_eq!(
            set(r#"gorm:"column:id;type:int""#, "type", "bigint", InsertLocation::End),
            r#"gorm:"column:id;type:bigint;""#
        );
        assert_eq!(
            set(r#"gorm:"type:int;column:id""#, "type", "bigint", InsertLocation::Top),
            r#"gorm:"type:bigint;column:id""#
        );
    }

    #[test]
    fn insert_multiple_fields_top() {
        let once = set(r#"gorm:"column:id""#, "type", "int", InsertLocation::Top);
        let twice = set(&once, "size", "10", InsertLocation::Top);
        assert_eq!(twice, r#"gorm:"size:10;type:int;column:id""#);
    }

    #[test]
    fn end_insertion_separators() {
        assert_eq!(
            set(r#"gorm:"column:id ;type:int""#, "index", "idx_name", InsertLocation::End),
            r#"gorm:"column:id ;type:int;index:idx_name;""#
        );
        assert_eq!(
            set(r#"gorm:"column:id;;;type:int""#, "index", "idx_name", InsertLocation::End),
            r#"gorm:"column:id;;;type:int;index:idx_name;""#
        );
        assert_eq!(
            set(r#"gorm:"column:id;""#, "index", "idx", InsertLocation::End),
            r#"gorm:"column:id;index:idx;""#
        );
        assert_eq!(
            set(r#"gorm:"""#, "index", "idx", InsertLocation::End),
            r#"gorm:"index:idx;""#
        );
    }

    #[test]
    fn insert_top_with_leading_whitespace() {
        assert_eq!(
            set(r#"gorm:" column:id""#, "type", "bigint", InsertLocation::Top),
            r#"gorm:"type:bigint; column:id""#
        );
    }

    #[test]
    fn other_keys_are_untouched() {
        let tag = r#"json:"id" gorm:"column:id""#;
        assert_eq!(
            set(tag, "type", "int", InsertLocation::End),
            r#"json:"id" gorm:"column:id;type:int;""#
        );
    }

    #[test]
    fn missing_key_is_an_error() {
        let result = set_tag_field_value(r#"json:"id""#, "gorm", "type", "bigint", InsertLocation::End);
        assert!(matches!(result, Err(TagError::KeyNotFound { key }) if key == "gorm"));
    }

    #[test]
    fn location_parsing() {
        assert_eq!("top".parse::<InsertLocation>().unwrap(), InsertLocation::Top);
        assert_eq!("END".parse::<InsertLocation>().unwrap(), InsertLocation::End);
        assert!(matches!(
            "INVALID".parse::<InsertLocation>(),
            Err(TagError::InvalidLocation { .. })
        ));
        assert_eq!(InsertLocation::Top.to_string(), "TOP");
    }

    const MODEL: &[u8] = b"package model\n\ntype User struct {\n\tID   int    `gorm:\"column:id\" json:\"id\"`\n\tName string `json:\"name\"`\n\tAge  int\n}\n";

    #[test]
    fn rewrite_tag_in_source() {
        let out = rewrite_struct_tag(MODEL, "User", "ID", "gorm", "type", "bigint", InsertLocation::End)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("`gorm:\"column:id;type:bigint;\" json:\"id\"`"));
        assert!(text.contains("Name string `json:\"name\"`"));
    }

    #[test]
    fn rewrite_is_identity_when_value_already_set() {
        let first = rewrite_struct_tag(MODEL, "User", "ID", "gorm", "type", "bigint", InsertLocation::End)
            .unwrap();
        let second = rewrite_struct_tag(&first, "User", "ID", "gorm", "type", "bigint", InsertLocation::End)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rewrite_reports_missing_pieces() {
        let err = |s: &str, f: &str, k: &str| {
            rewrite_struct_tag(MODEL, s, f, k, "type", "int", InsertLocation::End).unwrap_err()
        };
        assert!(matches!(err("Account", "ID", "gorm"), TagError::StructNotFound { .. }));
        assert!(matches!(err("User", "Email", "gorm"), TagError::FieldNotFound { .. }));
        assert!(matches!(err("User", "Age", "gorm"), TagError::MissingTag { .. }));
        assert!(matches!(err("User", "Name", "gorm"), TagError::KeyNotFound { .. }));
    }
}
