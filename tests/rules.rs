mod common;

use common::SIMPLE_CONFIG;
use elf_rebind::{AuditFlags, ConfigError, MAX_REPLACEMENT_PATH, RuleSet};
use rstest::rstest;

#[rstest]
fn parse_keeps_document_order() {
    let rules = RuleSet::parse(
        b"libA.so:\n  libB.so: /opt/b.so\n  libD.so: /opt/d.so\nlibX.so:\n  libY.so: /opt/y.so\n",
    )
    .unwrap();
    assert_eq!(rules.len(), 2);
    let sources: Vec<&[u8]> = rules.iter().map(|r| r.source()).collect();
    assert_eq!(sources, [&b"libA.so"[..], &b"libX.so"[..]]);
    let first = &rules.iter().next().unwrap().targets();
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].suffix(), b"libD.so");
    assert_eq!(first[1].replacement(), b"/opt/d.so");
}

#[rstest]
#[case(b"/x/libA.so", b"/y/libB.so", Some(&b"/opt/libC.so"[..]))]
#[case(b"libA.so", b"libB.so", Some(&b"/opt/libC.so"[..]))]
#[case(b"/x/libA.so.1", b"/y/libB.so", None)]
#[case(b"/x/libA.so", b"/y/libZ.so", None)]
#[case(b"A.so", b"libB.so", None)]
#[case(b"/x/liba.so", b"/y/libB.so", None)]
fn find_by_suffix(#[case] source: &[u8], #[case] target: &[u8], #[case] expected: Option<&[u8]>) {
    let rules = RuleSet::parse(SIMPLE_CONFIG.as_bytes()).unwrap();
    assert_eq!(rules.find(source, target), expected);
}

#[rstest]
fn find_is_deterministic() {
    let rules = RuleSet::parse(SIMPLE_CONFIG.as_bytes()).unwrap();
    let first = rules.find(b"x/libA.so", b"y/libB.so");
    let before = rules.clone();
    for _ in 0..4 {
        assert_eq!(rules.find(b"x/libA.so", b"y/libB.so"), first);
    }
    assert_eq!(rules, before);
}

#[rstest]
fn first_match_in_document_order_wins() {
    let rules = RuleSet::parse(
        b"A.so:\n  B.so: /first.so\nlibA.so:\n  libB.so: /second.so\n",
    )
    .unwrap();
    assert_eq!(rules.find(b"/lib/libA.so", b"/lib/libB.so"), Some(&b"/first.so"[..]));

    let rules = RuleSet::parse(b"libA.so:\n  B.so: /first.so\n  libB.so: /second.so\n").unwrap();
    assert_eq!(rules.find(b"libA.so", b"libB.so"), Some(&b"/first.so"[..]));
}

#[rstest]
fn later_rule_used_when_earlier_targets_miss() {
    let rules = RuleSet::parse(
        b"A.so:\n  Q.so: /q.so\nlibA.so:\n  libB.so: /b.so\n",
    )
    .unwrap();
    assert_eq!(rules.find(b"libA.so", b"libB.so"), Some(&b"/b.so"[..]));
}

#[rstest]
fn scalars_are_raw_text() {
    let rules = RuleSet::parse(b"'1.0':\n  0x10: \"/opt/lib C.so\"\n").unwrap();
    assert_eq!(rules.find(b"lib-1.0", b"lib0x10"), Some(&b"/opt/lib C.so"[..]));
}

#[rstest]
fn null_words_are_names() {
    let rules = RuleSet::parse(b"null:\n  Null: NULL\n").unwrap();
    assert_eq!(rules.find(b"lib.null", b"lib.Null"), Some(&b"NULL"[..]));
}

#[rstest]
fn empty_root_mapping_has_no_rules() {
    let rules = RuleSet::parse(b"{}").unwrap();
    assert!(rules.is_empty());
}

#[rstest]
#[case::not_yaml(b"a: [b\n", "unparseable")]
#[case::not_utf8(b"\xff\xfe: x\n", "unparseable")]
#[case::empty(b"", "empty")]
#[case::comment_only(b"# nothing\n", "empty")]
#[case::scalar_root(b"libA.so\n", "root")]
#[case::sequence_root(b"- libA.so\n", "root")]
#[case::sequence_key(b"? [a, b]\n: {x: y}\n", "key")]
#[case::mapping_key(b"? {a: b}\n: {x: y}\n", "key")]
#[case::scalar_value(b"libA.so: /opt/libC.so\n", "nested")]
#[case::null_value(b"libA.so:\n", "nested")]
#[case::sequence_value(b"libA.so: [libB.so]\n", "nested")]
#[case::sequence_leaf(b"libA.so:\n  libB.so: [/opt/libC.so]\n", "leaf")]
#[case::mapping_leaf(b"libA.so:\n  libB.so: {x: y}\n", "leaf")]
#[case::sequence_nested_key(b"libA.so:\n  ? [libB.so]\n  : /opt/libC.so\n", "leaf")]
#[case::empty_leaf(b"libA.so:\n  libB.so:\n", "blank")]
#[case::empty_key(b"'':\n  libB.so: /opt/libC.so\n", "blank")]
#[case::empty_rule(b"libA.so: {}\n", "no-targets")]
fn malformed_documents_are_rejected(#[case] text: &[u8], #[case] kind: &str) {
    let err = RuleSet::parse(text).unwrap_err();
    let matches = match kind {
        "unparseable" => matches!(err, ConfigError::Unparseable { .. }),
        "empty" => err == ConfigError::EmptyDocument,
        "root" => err == ConfigError::RootNotMapping,
        "key" => err == ConfigError::NonScalarKey,
        "nested" => err == ConfigError::NestedValueNotMapping,
        "leaf" => err == ConfigError::NonScalarNestedEntry,
        "blank" => err == ConfigError::EmptyScalar,
        "no-targets" => err == ConfigError::EmptyRule,
        _ => unreachable!(),
    };
    assert!(matches, "unexpected error for {kind}: {err:?}");
}

#[rstest]
fn one_bad_entry_rejects_everything() {
    let err = RuleSet::parse(b"libA.so:\n  libB.so: /ok.so\nlibX.so: oops\n").unwrap_err();
    assert_eq!(err, ConfigError::NestedValueNotMapping);
}

#[rstest]
fn first_violation_in_document_order_wins() {
    let err = RuleSet::parse(b"libA.so:\n  libB.so: [x]\n? [k]\n: {a: b}\n").unwrap_err();
    assert_eq!(err, ConfigError::NonScalarNestedEntry);
}

#[rstest]
fn replacement_path_limit_is_enforced() {
    let ok = "a".repeat(MAX_REPLACEMENT_PATH);
    let text = format!("libA.so:\n  libB.so: {ok}\n");
    let rules = RuleSet::parse(text.as_bytes()).unwrap();
    assert_eq!(rules.find(b"libA.so", b"libB.so"), Some(ok.as_bytes()));

    let long = "a".repeat(MAX_REPLACEMENT_PATH + 1);
    let text = format!("libA.so:\n  libB.so: {long}\n");
    assert_eq!(
        RuleSet::parse(text.as_bytes()).unwrap_err(),
        ConfigError::PathTooLong {
            len: MAX_REPLACEMENT_PATH + 1
        }
    );
}

#[rstest]
fn aliased_targets_are_shared() {
    let rules = RuleSet::parse(
        b"libA.so: &t\n  libB.so: /opt/libC.so\nlibX.so: *t\n",
    )
    .unwrap();
    assert_eq!(rules.find(b"libX.so", b"libB.so"), Some(&b"/opt/libC.so"[..]));
}

#[rstest]
#[case(b"/x/libA.so", AuditFlags::BIND_FROM)]
#[case(b"/y/libB.so", AuditFlags::BIND_TO)]
#[case(b"/z/libAB.so", AuditFlags::BIND_FROM.union(AuditFlags::BIND_TO))]
#[case(b"/opt/libC.so", AuditFlags::empty())]
fn audit_flags_follow_suffixes(#[case] name: &[u8], #[case] expected: AuditFlags) {
    let rules = RuleSet::parse(b"A.so:\n  libB.so: /opt/libC.so\nlibAB.so:\n  B.so: /x.so\n")
        .unwrap();
    assert_eq!(rules.audit_flags(name), expected);
}
