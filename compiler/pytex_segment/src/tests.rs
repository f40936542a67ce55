#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

/// `(is_executable, text)` pairs, for compact expectations.
fn shape(document: &str) -> Vec<(bool, &str)> {
    segment(document)
        .iter()
        .map(|s| (s.is_executable(), s.text()))
        .collect()
}

fn reconstruct(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        segment.write_source(&mut out);
    }
    out
}

#[test]
fn empty_document_has_no_segments() {
    assert!(segment("").is_empty());
}

#[test]
fn no_delimiters_is_one_literal() {
    assert_eq!(shape("just \\LaTeX"), vec![(false, "just \\LaTeX")]);
}

#[test]
fn adjacent_delimiters_are_one_empty_executable() {
    assert_eq!(shape("🐍🐍"), vec![(false, ""), (true, "")]);
}

#[test]
fn leading_and_trailing_literals() {
    assert_eq!(
        shape("🐍🐍 and some LaTeX"),
        vec![(false, ""), (true, ""), (false, " and some LaTeX")]
    );
    assert_eq!(
        shape("Some LaTeX 🐍🐍"),
        vec![(false, "Some LaTeX "), (true, "")]
    );
}

#[test]
fn back_to_back_blocks_have_an_empty_literal_between() {
    assert_eq!(
        shape("🐍print(\"a\")🐍🐍print(\"b\")🐍"),
        vec![
            (false, ""),
            (true, "print(\"a\")"),
            (false, ""),
            (true, "print(\"b\")"),
        ]
    );
}

#[test]
fn interleaved_document() {
    let document =
        "🐍print(\"some python\")🐍 and some LaTeX 🐍print(\"and more python\")🐍 and more LaTeX";
    assert_eq!(
        shape(document),
        vec![
            (false, ""),
            (true, "print(\"some python\")"),
            (false, " and some LaTeX "),
            (true, "print(\"and more python\")"),
            (false, " and more LaTeX"),
        ]
    );
}

#[test]
fn code_may_span_lines() {
    let document = "a\n🐍\nfor i in range(2):\n    print(i)\n🐍\nb";
    assert_eq!(
        shape(document),
        vec![
            (false, "a\n"),
            (true, "\nfor i in range(2):\n    print(i)\n"),
            (false, "\nb"),
        ]
    );
}

#[test]
fn odd_delimiter_count_opens_an_unterminated_block() {
    let segments = segment("text 🐍print(1)");
    assert_eq!(segments.len(), 2);
    assert!(segments[0].is_terminated());
    assert!(segments[1].is_executable());
    assert!(!segments[1].is_terminated());
    assert_eq!(segments[1].text(), "print(1)");

    let segments = segment("🐍a🐍b🐍");
    assert_eq!(
        segments.iter().map(|s| (s.kind(), s.text())).collect::<Vec<_>>(),
        vec![
            (SegmentKind::Literal, ""),
            (SegmentKind::Executable, "a"),
            (SegmentKind::Literal, "b"),
            (SegmentKind::Executable, ""),
        ]
    );
    assert!(!segments[3].is_terminated());
}

#[test]
fn spans_index_the_document() {
    let document = "ab🐍cd🐍ef";
    let segments = segment(document);
    for segment in &segments {
        assert_eq!(&document[segment.span().to_range()], segment.text());
    }
    assert_eq!(segments[1].span(), Span::new(6, 8));
}

#[test]
fn other_emoji_are_literal_text() {
    assert_eq!(shape("🐉 🐊 🦎"), vec![(false, "🐉 🐊 🦎")]);
}

#[test]
fn lazy_iterator_is_fused() {
    let mut iter = segments("x🐍y🐍");
    assert_eq!(iter.next().map(|s| s.text()), Some("x"));
    assert_eq!(iter.next().map(|s| s.text()), Some("y"));
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

fn document_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            3 => "[a-z \\n\\\\{}]{0,6}",
            1 => Just(DELIMITER.to_owned()),
            1 => Just("é🐊".to_owned()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn segmentation_is_lossless(document in document_strategy()) {
        let segments = segment(&document);
        prop_assert_eq!(reconstruct(&segments), document);
    }

    #[test]
    fn segment_counts_follow_delimiter_count(document in document_strategy()) {
        let delimiters = document.matches(DELIMITER).count();
        let segments = segment(&document);
        let executable = segments.iter().filter(|s| s.is_executable()).count();
        let literal = segments.len() - executable;
        prop_assert_eq!(executable, delimiters.div_ceil(2));
        if delimiters % 2 == 0 {
            let k = delimiters / 2;
            prop_assert!(literal == k || literal == k + 1, "{} literals for {} pairs", literal, k);
        }
        let unterminated = segments.iter().filter(|s| !s.is_terminated()).count();
        prop_assert_eq!(unterminated, delimiters % 2);
    }

    #[test]
    fn segments_alternate_starting_with_literal(document in document_strategy()) {
        for (i, segment) in segment(&document).iter().enumerate() {
            prop_assert_eq!(segment.is_executable(), i % 2 == 1);
            prop_assert!(!segment.text().contains(DELIMITER));
        }
    }

    #[test]
    fn delimiter_free_text_is_one_literal(text in "[^\u{1F40D}]{1,40}") {
        let segments = segment(&text);
        prop_assert_eq!(segments.len(), 1);
        prop_assert_eq!(segments[0].text(), text.as_str());
    }
}
