//! Drives the full `VCardParser` over the literal end-to-end scenarios,
//! rather than unit-testing the individual lexing stages.

use vcard21::{EventConsumer, ParseError, PropertyValue, VCardParser, VCardProperty};

#[derive(Debug, Default, PartialEq)]
struct Trace {
    events: Vec<String>,
}

impl EventConsumer for Trace {
    fn on_vcard_started(&mut self) {
        self.events.push("vcard_started".to_string());
    }
    fn on_vcard_ended(&mut self) {
        self.events.push("vcard_ended".to_string());
    }
    fn on_entry_started(&mut self) {
        self.events.push("entry_started".to_string());
    }
    fn on_entry_ended(&mut self) {
        self.events.push("entry_ended".to_string());
    }
    fn on_property_created(&mut self, property: &VCardProperty) {
        self.events.push(format!("property:{}={:?}", property.name, property.value));
    }
}

fn trace(input: &[u8]) -> Trace {
    let mut trace = Trace::default();
    let mut parser = VCardParser::new();
    parser.add_consumer(&mut trace);
    parser.parse(input).unwrap();
    trace
}

#[test]
fn scenario_1_simple_card() {
    let t = trace(b"BEGIN:VCARD\r\nVERSION:2.1\r\nN:Doe;John;;;\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:VERSION=Text(\"2.1\")".to_string(),
            format!(
                "property:N={:?}",
                PropertyValue::List(vec![
                    "Doe".to_string(),
                    "John".to_string(),
                    "".to_string(),
                    "".to_string(),
                    "".to_string(),
                ])
            ),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn scenario_2_case_insensitive_begin_end() {
    let t = trace(b"begin:vcard\r\nN:A\r\nend:vcard\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            format!("property:N={:?}", PropertyValue::List(vec!["A".to_string()])),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn scenario_3_nested_entry() {
    let t = trace(
        b"BEGIN:VCARD\r\nN:test1\r\nBEGIN:VCARD\r\nN:test2\r\nEND:VCARD\r\nTEL:1\r\nEND:VCARD\r\n",
    );
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            format!("property:N={:?}", PropertyValue::List(vec!["test1".to_string()])),
            "entry_started".to_string(),
            format!("property:N={:?}", PropertyValue::List(vec!["test2".to_string()])),
            "entry_ended".to_string(),
            "property:TEL=Text(\"1\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn scenario_4_quoted_printable_continuation() {
    // The spec's own narrated end-to-end value for this scenario drops the
    // input's second line's trailing '=' and keeps the first line's, which
    // does not follow from applying its own decode rule ("keep the '=',
    // append CRLF, stop at a segment that doesn't end in '=') to either
    // line literally — both lines in the narrated byte string end in '='.
    // This test instead exercises the unambiguous rule on an input shaped
    // so the continuation terminates the way the narration describes,
    // without the END:VCARD terminator being absorbed into the value.
    let t = trace(b"BEGIN:VCARD\r\nNOTE;ENCODING=QUOTED-PRINTABLE:Now's the time =\r\nfor all folk\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:NOTE=Text(\"Now's the time =\\r\\nfor all folk\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn scenario_5_folded_value() {
    // The fold-unwrap rule strips exactly the single leading fold-indicator
    // space from a continuation line (so "Omega" joined directly to
    // "<omega@example.com>" leaves no space between them); a narrated
    // worked example elsewhere shows a space surviving the join, which only
    // follows if the continuation line carries a second, literal leading
    // space beyond the fold indicator. This test follows the literal
    // algorithm rather than that narration, matching
    // `folding_strips_exactly_one_leading_space`.
    let t = trace(b"BEGIN:VCARD\r\nEMAIL:\"Omega\"\r\n <omega@example.com>\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:EMAIL=Text(\"\\\"Omega\\\"<omega@example.com>\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn scenario_6_agent_rejection() {
    let mut parser = VCardParser::new();
    let err = parser
        .parse(b"BEGIN:VCARD\r\nAGENT:BEGIN:VCARD\r\nEND:VCARD\r\n".as_slice())
        .unwrap_err();
    assert!(matches!(
        err,
        ParseError::Decode(vcard21::DecodeError::AgentNotSupported(_))
    ));
}

#[test]
fn mixed_case_type_shorthand_and_multiple_params() {
    let t = trace(b"BEGIN:VCARD\r\nTEL;HOME;TYPE=VOICE:555-0100\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:TEL=Text(\"555-0100\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn double_quoted_param_value_survives_colon_and_semicolon() {
    let mut trace_consumer = Trace::default();
    let mut parser = VCardParser::new();
    parser.add_consumer(&mut trace_consumer);
    parser
        .parse(b"BEGIN:VCARD\r\nADR;TYPE=\"work;x:y\":;;1 Road;;;;\r\nEND:VCARD\r\n".as_slice())
        .unwrap();
    assert!(
        trace_consumer
            .events
            .iter()
            .any(|e| e.starts_with("property:ADR="))
    );
}

#[test]
fn base64_terminated_by_blank_line() {
    // BASE64 payload lines all arrive as continuations; the property line
    // itself carries an empty value before the encoded body.
    let t = trace(b"BEGIN:VCARD\r\nPHOTO;ENCODING=BASE64:\r\naGVsbG8=\r\n\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            format!("property:PHOTO={:?}", PropertyValue::Bytes(b"hello".to_vec())),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn base64_terminated_by_detecting_next_property() {
    let t = trace(b"BEGIN:VCARD\r\nPHOTO;ENCODING=BASE64:\r\naGVsbG8=\r\nNOTE:hi\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            format!("property:PHOTO={:?}", PropertyValue::Bytes(b"hello".to_vec())),
            "property:NOTE=Text(\"hi\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn folding_aborts_at_end_vcard() {
    let t = trace(b"BEGIN:VCARD\r\nNOTE:first\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:NOTE=Text(\"first\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn empty_group_token_is_dropped_with_no_event() {
    let t = trace(b"BEGIN:VCARD\r\n..TEL:1\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:TEL=Text(\"1\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn comment_line_is_skipped_not_fatal() {
    let t = trace(b"BEGIN:VCARD\r\n# a comment\r\nFN:A\r\nEND:VCARD\r\n");
    assert_eq!(
        t.events,
        vec![
            "vcard_started".to_string(),
            "entry_started".to_string(),
            "property:FN=Text(\"A\")".to_string(),
            "entry_ended".to_string(),
            "vcard_ended".to_string(),
        ]
    );
}

#[test]
fn feeding_the_same_stream_twice_is_deterministic() {
    let input: &[u8] = b"BEGIN:VCARD\r\nFN:A\r\nEND:VCARD\r\n";
    let first = trace(input);
    let second = trace(input);
    assert_eq!(first, second);
}

#[test]
fn n_identical_consumers_each_see_an_identical_sequence() {
    let mut a = Trace::default();
    let mut b = Trace::default();
    let mut parser = VCardParser::new();
    parser.add_consumer(&mut a);
    parser.add_consumer(&mut b);
    parser
        .parse(b"BEGIN:VCARD\r\nFN:A\r\nEND:VCARD\r\n".as_slice())
        .unwrap();
    assert_eq!(a, b);
}
