use proptest::prelude::*;
use rask_logger::{Level, Message, Value, fields_from_flat, render_template};

fn level() -> impl Strategy<Value = Level> {
    prop::sample::select(Level::ALL.to_vec())
}

proptest! {
    #[test]
    fn level_order_matches_rank(a in level(), b in level()) {
        prop_assert_eq!(a < b, (a as u8) < (b as u8));
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn level_parses_its_own_name(l in level()) {
        prop_assert_eq!(l.as_str().parse::<Level>().unwrap(), l);
        prop_assert_eq!(l.label().parse::<Level>().unwrap(), l);
    }

    #[test]
    fn text_without_braces_renders_verbatim(text in "[^{}]*") {
        prop_assert_eq!(render_template(&text, &[]), text.clone());
        prop_assert_eq!(Message::from(text.as_str()).render(), text.clone());
    }

    #[test]
    fn template_matches_format(
        a in "[a-z ]{0,12}",
        b in "[a-z ]{0,12}",
        x in any::<i64>(),
        y in any::<u64>(),
    ) {
        let template = format!("{a}{{}}{b}{{}}");
        let rendered = render_template(&template, &[Value::from(x), Value::from(y)]);
        prop_assert_eq!(rendered, format!("{a}{x}{b}{y}"));
    }

    #[test]
    fn surplus_and_missing_arguments_never_panic(
        template in "[a-z{} ]{0,24}",
        args in prop::collection::vec(any::<i32>(), 0..6),
    ) {
        let args: Vec<Value> = args.into_iter().map(Value::from).collect();
        let _ = render_template(&template, &args);
    }

    #[test]
    fn flat_sequences_pair_up(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let fields = fields_from_flat(values.clone());
        prop_assert_eq!(fields.len(), values.len().div_ceil(2));
        for (i, field) in fields.iter().enumerate() {
            prop_assert_eq!(&field.key, &values[2 * i].to_string());
            match values.get(2 * i + 1) {
                Some(v) => prop_assert_eq!(&field.value, &Value::I64(*v)),
                None => prop_assert!(field.value.is_missing()),
            }
        }
    }
}
