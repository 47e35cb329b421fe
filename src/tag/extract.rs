//! Positional extraction over `key:"a:1;b:2"` style tags.
//!
//! Every lookup has an index form returning a [`TagMatch`], so callers can
//! splice a replacement in place. For any match, `input[start..end] == value`.

use crate::tag::errors::TagError;
use regex::Regex;

/// A matched value and its byte range in the searched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'a> {
    pub value: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Whether whitespace right after `field:` belongs to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldMode {
    /// Keep leading whitespace, for in-place replacement of the raw column
    #[default]
    IncludeWhitespacePrefix,
    /// Skip leading whitespace, for the semantic value
    ExcludeWhitespacePrefix,
}

fn first_group<'a>(regex: &Regex, input: &'a str) -> Option<TagMatch<'a>> {
    let group = regex.captures(input)?.get(1)?;
    Some(TagMatch {
        value: group.as_str(),
        start: group.start(),
        end: group.end(),
    })
}

fn keyed_regex(key: &str) -> Result<Regex, TagError> {
    Ok(Regex::new(&format!(
        r#"\b{}\s*:\s*"([^"]*)""#,
        regex::escape(key)
    ))?)
}

fn field_regex(field: &str, mode: FieldMode) -> Result<Regex, TagError> {
    let field = regex::escape(field);
    let pattern = match mode {
        FieldMode::IncludeWhitespacePrefix => format!(r"\b{field}\s*:([^;]+)"),
        FieldMode::ExcludeWhitespacePrefix => format!(r"\b{field}\s*:\s*([^;]+)"),
    };
    Ok(Regex::new(&pattern)?)
}

/// Quoted value of `key` in a full tag, e.g. `column:id` for `gorm` in
/// `gorm:"column:id" json:"id"`.
///
/// `None` when the key is absent; `Some("")` when it is present but empty.
pub fn extract_keyed_value<'a>(tag: &'a str, key: &str) -> Result<Option<&'a str>, TagError> {
    Ok(extract_keyed_value_index(tag, key)?.map(|m| m.value))
}

pub fn extract_keyed_value_index<'a>(
    tag: &'a str,
    key: &str,
) -> Result<Option<TagMatch<'a>>, TagError> {
    Ok(first_group(&keyed_regex(key)?, tag))
}

/// Unquoted value of `field` inside a keyed value, terminated by `;` or
/// the end of input.
pub fn extract_field<'a>(
    segment: &'a str,
    field: &str,
    mode: FieldMode,
) -> Result<Option<&'a str>, TagError> {
    Ok(extract_field_index(segment, field, mode)?.map(|m| m.value))
}

pub fn extract_field_index<'a>(
    segment: &'a str,
    field: &str,
    mode: FieldMode,
) -> Result<Option<TagMatch<'a>>, TagError> {
    Ok(first_group(&field_regex(field, mode)?, segment))
}

/// A bare `field` with no `:value`, like `index` in `column:id;index`.
///
/// `index:idx_name` does not count as presence of `index`.
pub fn extract_presence_only_field_index<'a>(
    segment: &'a str,
    field: &str,
) -> Result<Option<TagMatch<'a>>, TagError> {
    let regex = Regex::new(&format!(
        r"(?:^|;)\s*({})\s*(?:;|$)",
        regex::escape(field)
    ))?;
    Ok(first_group(&regex, segment))
}

/// The value span of a specific `field:value` pair.
///
/// A tag may repeat a field with different values; this targets the one
/// whose value is `value`. The span includes whitespace around the value.
/// Pairs end at `;`, at any of `extra_terminators`, or at end of input.
pub fn extract_equals_value_index<'a>(
    segment: &'a str,
    field: &str,
    value: &str,
    extra_terminators: &str,
) -> Result<Option<TagMatch<'a>>, TagError> {
    let terminators: String = extra_terminators
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    let regex = Regex::new(&format!(
        r"(?:^|[;{terminators}])\s*{}\s*:(\s*{}\s*)(?:[;{terminators}]|$)",
        regex::escape(field),
        regex::escape(value),
    ))?;
    Ok(first_group(&regex, segment))
}
