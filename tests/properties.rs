use go_syntax_kit::tag::{extract_field, extract_keyed_value, rewrite_struct_tag, FieldMode};
use go_syntax_kit::{
    code_of, delete_span, inject_imports, replace_span, set_tag_field_value, InsertLocation, Span,
};
use proptest::prelude::*;

fn source_and_span() -> impl Strategy<Value = (Vec<u8>, Span)> {
    proptest::collection::vec(any::<u8>(), 0..64).prop_flat_map(|source| {
        let len = source.len();
        (Just(source), 0..=len).prop_flat_map(|(source, start)| {
            let len = source.len();
            (Just(source), Just(start), start..=len)
                .prop_map(|(source, start, end)| (source, Span::new(start, end)))
        })
    })
}

fn import_path() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[a-z]{1,6}){0,2}"
}

fn location() -> impl Strategy<Value = InsertLocation> {
    prop_oneof![Just(InsertLocation::Top), Just(InsertLocation::End)]
}

const MAIN: &[u8] = b"package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println()\n}\n";

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn splice_keeps_everything_outside_the_span(
        (source, span) in source_and_span(),
        new in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        let out = replace_span(&source, span, &new).unwrap();
        prop_assert_eq!(out.len(), source.len() - span.len() + new.len());
        prop_assert_eq!(&out[..span.start], &source[..span.start]);
        prop_assert_eq!(&out[span.start + new.len()..], &source[span.end..]);

        let inserted = Span::new(span.start, span.start + new.len());
        prop_assert_eq!(code_of(&out, inserted).unwrap(), new.as_slice());

        // Putting the old bytes back restores the input
        let old = code_of(&source, span).unwrap();
        prop_assert_eq!(replace_span(&out, inserted, old).unwrap(), source.clone());

        prop_assert_eq!(delete_span(&source, span).unwrap(), replace_span(&source, span, b"").unwrap());
    }

    #[test]
    fn spans_past_the_end_are_rejected(source in ".{0,32}", extra in 1usize..8) {
        let bytes = source.as_bytes();
        let span = Span::new(0, bytes.len() + extra);
        prop_assert!(replace_span(bytes, span, b"x").is_err());
        prop_assert!(code_of(bytes, span).is_err());
    }

    #[test]
    fn import_injection_is_order_independent_and_idempotent(
        paths in proptest::collection::vec(import_path(), 0..6),
    ) {
        let once = inject_imports(MAIN, paths.as_slice()).unwrap();

        let mut reversed = paths.clone();
        reversed.reverse();
        prop_assert_eq!(&inject_imports(MAIN, reversed.as_slice()).unwrap(), &once);

        let twice = inject_imports(&once, paths.as_slice()).unwrap();
        prop_assert_eq!(&twice, &once);

        let text = String::from_utf8(once).unwrap();
        for path in &paths {
            let quoted = format!("\"{path}\"");
            prop_assert_eq!(text.matches(quoted.as_str()).count(), 1);
        }
    }

    #[test]
    fn set_then_extract_returns_the_value(
        field in "[a-z]{1,8}",
        value in "[a-z0-9]{1,8}",
        location in location(),
    ) {
        let tag = r#"gorm:"column:id" json:"id""#;
        let rewritten = set_tag_field_value(tag, "gorm", &field, &value, location).unwrap();

        let gorm = extract_keyed_value(&rewritten, "gorm").unwrap().unwrap();
        let found = extract_field(gorm, &field, FieldMode::ExcludeWhitespacePrefix).unwrap();
        prop_assert_eq!(found, Some(value.as_str()));
        prop_assert_eq!(extract_keyed_value(&rewritten, "json").unwrap(), Some("id"));

        let again = set_tag_field_value(&rewritten, "gorm", &field, &value, location).unwrap();
        prop_assert_eq!(again, rewritten);
    }

    #[test]
    fn struct_tag_rewrite_only_touches_the_tag(
        value in "[a-z0-9]{1,8}",
        location in location(),
    ) {
        let source = "package model\n\ntype User struct {\n\tID int `gorm:\"column:id\"`\n\tName string\n}\n";
        let out = rewrite_struct_tag(
            source.as_bytes(), "User", "ID", "gorm", "type", &value, location,
        ).unwrap();
        let text = String::from_utf8(out).unwrap();

        let tag_start = source.find('`').unwrap() + 1;
        prop_assert_eq!(&text[..tag_start], &source[..tag_start]);
        let tail = "`\n\tName string\n}\n";
        prop_assert!(text.ends_with(tail));

        let tag = &text[tag_start..text.len() - tail.len()];
        let gorm = extract_keyed_value(tag, "gorm").unwrap().unwrap();
        prop_assert_eq!(
            extract_field(gorm, "type", FieldMode::ExcludeWhitespacePrefix).unwrap(),
            Some(value.as_str())
        );
    }
}
