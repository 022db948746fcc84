/// Masking pipeline tests
///
/// Tests cover:
/// - Records without sensitive data pass through byte-for-byte
/// - Top-level, embedded JSON, query string and XML masking
/// - The full writer chain assembled from a configuration

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use logger_redacted::{EventWriter, FieldMasker, XmlFieldMasker, MASK, SENSITIVE_KEYWORDS};
    use proptest::prelude::*;
    use quick_xml::events::Event as XmlEvent;
    use quick_xml::reader::Reader;
    use serde_json::{json, Map, Value};
    use url::form_urlencoded;

    fn run_chain(input: &[u8]) -> Vec<u8> {
        let mut writer = EventWriter::new(Vec::new())
            .with_processor(XmlFieldMasker::new())
            .with_processor(FieldMasker::new());
        writer.write_all(input).unwrap();
        writer.into_inner()
    }

    fn run_event(event: &Value) -> Value {
        let output = run_chain(&serde_json::to_vec(event).unwrap());
        serde_json::from_slice(&output).unwrap()
    }

    fn contains_keyword(text: &str) -> bool {
        let lower = text.to_lowercase();
        SENSITIVE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
    }

    fn safe_name() -> impl Strategy<Value = String> {
        "[a-z][a-z_]{0,9}".prop_filter("must not name a keyword", |name| !contains_keyword(name))
    }

    fn safe_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,:-]{0,16}".prop_filter("must not mention a keyword", |text| !contains_keyword(text))
    }

    fn safe_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            safe_text().prop_map(Value::String),
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
        ]
    }

    fn safe_event() -> impl Strategy<Value = Map<String, Value>> {
        proptest::collection::vec((safe_name(), safe_value()), 0..8)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    fn text_of(xml: &str, element: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut inside = false;
        let mut texts = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                XmlEvent::Start(start) => inside = start.name().as_ref() == element.as_bytes(),
                XmlEvent::Text(text) if inside => texts.push(text.unescape().unwrap().into_owned()),
                XmlEvent::End(_) => inside = false,
                XmlEvent::Eof => break,
                _ => {}
            }
        }
        texts
    }

    // =========================================================================
    // EXAMPLES
    // =========================================================================

    #[test]
    fn test_embedded_json_example() {
        let output = run_chain(br#"{"metadata":"{\"password\":\"s3cret\",\"user\":\"bob\"}"}"#);

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"metadata\":\"{\\\"password\\\":\\\"***\\\",\\\"user\\\":\\\"bob\\\"}\"}\n"
        );
    }

    #[test]
    fn test_top_level_example() {
        let output = run_chain(br#"{"password":"s3cret"}"#);
        assert_eq!(output, b"{\"password\":\"***\"}\n".to_vec());
    }

    #[test]
    fn test_all_keywords_are_masked() {
        let mut event = Map::new();
        for keyword in SENSITIVE_KEYWORDS {
            event.insert((*keyword).to_string(), json!("value"));
        }
        event.insert("Password".into(), json!("case matters"));

        let masked = run_event(&Value::Object(event));

        for keyword in SENSITIVE_KEYWORDS {
            assert_eq!(masked[*keyword], json!(MASK), "{keyword}");
        }
        assert_eq!(masked["Password"], json!("case matters"));
    }

    #[test]
    fn test_mixed_record() {
        let masked = run_event(&json!({
            "msg": "payment sent",
            "amount": 12.50,
            "query": "card_number=4111&currency=EUR",
            "request": "<payment><card cvv=\"123\"><number>4111</number></card><secret>x</secret></payment>",
            "body": "{\"cvc\":\"999\",\"amount\":1}"
        }));

        assert_eq!(masked["msg"], json!("payment sent"));
        assert_eq!(masked["amount"], json!(12.50));
        assert_eq!(masked["query"], json!("card_number=***&currency=EUR"));
        assert_eq!(
            masked["request"],
            json!("<payment><card cvv=\"***\"><number>4111</number></card><secret>***</secret></payment>")
        );
        assert_eq!(masked["body"], json!("{\"cvc\":\"***\",\"amount\":1}"));
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #[test]
        fn prop_records_without_keywords_are_unchanged(event in safe_event()) {
            let input = serde_json::to_vec(&event).unwrap();
            let mut expected = input.clone();
            expected.push(b'\n');

            prop_assert_eq!(run_chain(&input), expected);
        }

        #[test]
        fn prop_top_level_keyword_is_masked(
            event in safe_event(),
            keyword in proptest::sample::select(SENSITIVE_KEYWORDS),
            secret in "[a-zA-Z0-9!@#$ ]{1,20}",
        ) {
            let mut input = event.clone();
            input.insert(keyword.to_string(), Value::String(secret));

            let masked = run_event(&Value::Object(input));

            prop_assert_eq!(&masked[keyword], &json!(MASK));
            for (key, value) in &event {
                if key != keyword {
                    prop_assert_eq!(&masked[key.as_str()], value);
                }
            }
        }

        #[test]
        fn prop_embedded_json_keyword_is_masked(
            object in safe_event(),
            keyword in proptest::sample::select(SENSITIVE_KEYWORDS),
            secret in safe_text(),
        ) {
            let mut embedded = object.clone();
            embedded.insert(keyword.to_string(), Value::String(secret));
            let field = serde_json::to_string(&embedded).unwrap();

            let masked = run_event(&json!({ "data": field }));

            let reparsed: Map<String, Value> = serde_json::from_str(masked["data"].as_str().unwrap()).unwrap();
            prop_assert_eq!(&reparsed[keyword], &json!(MASK));
            for (key, value) in &object {
                if key != keyword {
                    prop_assert_eq!(&reparsed[key.as_str()], value);
                }
            }
        }

        #[test]
        fn prop_query_keyword_is_masked(
            params in proptest::collection::btree_map(safe_name(), "[a-z0-9]{0,8}", 0..5),
            keyword in proptest::sample::select(SENSITIVE_KEYWORDS),
            secret in "[a-z0-9]{1,8}",
        ) {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in &params {
                query.append_pair(key, value);
            }
            query.append_pair(keyword, &secret);

            let masked = run_event(&json!({ "query": query.finish() }));

            let reparsed: BTreeMap<String, String> =
                form_urlencoded::parse(masked["query"].as_str().unwrap().as_bytes()).into_owned().collect();
            prop_assert_eq!(reparsed.get(keyword).map(String::as_str), Some(MASK));
            for (key, value) in &params {
                prop_assert_eq!(reparsed.get(key), Some(value));
            }
        }

        #[test]
        fn prop_xml_keyword_element_is_masked(
            children in proptest::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{1,8}", 0..5),
            keyword in proptest::sample::select(SENSITIVE_KEYWORDS),
            secret in "[a-z0-9]{1,8}",
        ) {
            let children: BTreeMap<_, _> = children
                .into_iter()
                .filter(|(name, _)| !contains_keyword(name))
                .collect();

            let mut xml = String::from("<root id=\"1\">");
            for (name, value) in &children {
                xml.push_str(&format!("<{name}>{value}</{name}>"));
            }
            xml.push_str(&format!("<{keyword}>{secret}</{keyword}></root>"));

            let masked = run_event(&json!({ "xml": xml }));
            let masked = masked["xml"].as_str().unwrap();

            prop_assert!(masked.starts_with("<root id=\"1\">"));
            prop_assert_eq!(text_of(masked, keyword), vec![MASK.to_string()]);
            for (name, value) in &children {
                prop_assert_eq!(text_of(masked, name), vec![value.clone()]);
            }
        }
    }
}
