use emocause::{
    data::conll::parse_corpus,
    nlp::tree::{PosTag, TokenRow},
    EmoCauseError,
};

const TWO_TWEETS: &str = "\
1\tI\t_\tO\t_\t_\t-1\t_
2\tlove\t_\tV\t_\t_\t0\t_
3\tBernie\t_\t^\t_\t_\t2\tMW
4\tSanders\t_\t^\t_\t_\t3\tMW

1\tso\t_\tR\t_\t_\t2\t_
2\thappy\t_\tA\t_\t_\t0\t_
";

#[test]
fn parses_blank_line_separated_sentences() {
    let corpus = parse_corpus(TWO_TWEETS, 0);
    assert_eq!(corpus.len(), 2);
    assert!(corpus.skipped.is_empty());

    let first = &corpus.sentences[0];
    assert_eq!(first.raw_text, "I love Bernie Sanders");
    let love = first.node(2).unwrap();
    assert_eq!(love.pos, PosTag::Verb);
    assert_eq!(love.children, vec![3]);
    assert!(first.node(3).unwrap().multiword);
    assert_eq!(first.node(1).unwrap().parent, None);
    assert_eq!(corpus.sentences[1].id, 1);
}

#[test]
fn malformed_sentence_is_skipped_and_ids_stay_stable() {
    let text = "\
1\ta\t_\tN\t_\t_\t2\t_
2\tb\t_\tN\t_\t_\t1\t_

1\tgood\t_\tA\t_\t_\t0\t_
";
    let corpus = parse_corpus(text, 10);
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.sentences[0].id, 11);
    assert!(matches!(
        corpus.skipped.as_slice(),
        [EmoCauseError::MalformedInput { sentence: 10, .. }]
    ));
}

#[test]
fn out_of_range_parent_is_malformed() {
    let corpus = parse_corpus("1\tsad\t_\tA\t_\t_\t5\t_\n", 0);
    assert!(corpus.is_empty());
    assert!(corpus.skipped[0].is_sentence_local());
}

#[test]
fn short_rows_are_rejected() {
    let err = TokenRow::parse("1\tword\t_\tN", 3).unwrap_err();
    assert!(matches!(err, EmoCauseError::MalformedInput { sentence: 3, .. }));
}
