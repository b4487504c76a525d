//! Property-based tests for implicit operator insertion and parameter naming

use lodestone_config::Conventions;
use lodestone_query::token::QueryToken;
use lodestone_query::QueryBuilder;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Call {
    Clause,
    Open,
    Close,
}

fn calls() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..3, 0..40)
}

proptest! {
    /// Property: inserted operators = clause calls after the first, minus
    /// calls that immediately follow an opening parenthesis
    #[test]
    fn operator_count_matches_clause_structure(choices in calls()) {
        let mut builder = QueryBuilder::for_collection(Conventions::default(), "Users").unwrap();
        let mut depth = 0usize;
        let mut previous: Option<Call> = None;
        let mut expected = 0usize;

        for choice in choices {
            let call = match choice {
                2 if depth > 0 => Call::Close,
                1 => Call::Open,
                _ => Call::Clause,
            };
            match call {
                Call::Clause | Call::Open => {
                    if !matches!(previous, None | Some(Call::Open)) {
                        expected += 1;
                    }
                    if call == Call::Open {
                        builder.open_subclause().unwrap();
                        depth += 1;
                    } else {
                        builder.where_equals("field", 1).unwrap();
                    }
                }
                Call::Close => {
                    builder.close_subclause().unwrap();
                    depth -= 1;
                }
            }
            previous = Some(call);
        }
        for _ in 0..depth {
            builder.close_subclause().unwrap();
        }

        let inserted = builder
            .where_tokens()
            .iter()
            .filter(|t| t.is_operator())
            .count();
        prop_assert_eq!(inserted, expected);
        prop_assert!(builder.to_query_text().is_ok());
    }

    /// Property: generated parameter names are sequential
    #[test]
    fn parameter_names_are_sequential(count in 1usize..30) {
        let mut builder = QueryBuilder::for_collection(Conventions::default(), "Users").unwrap();
        for i in 0..count {
            builder.where_equals("n", i).unwrap();
        }
        let names: Vec<String> = builder.parameters().iter().map(|(k, _)| k.to_string()).collect();
        let expected: Vec<String> = (0..count).map(|i| format!("p{i}")).collect();
        prop_assert_eq!(names, expected);
    }

    /// Property: no where token sequence renders two operators in a row
    #[test]
    fn operators_never_adjacent(choices in calls(), negations in proptest::collection::vec(any::<bool>(), 40)) {
        let mut builder = QueryBuilder::for_collection(Conventions::default(), "Users").unwrap();
        let mut depth = 0usize;
        for (i, choice) in choices.into_iter().enumerate() {
            if negations[i] {
                builder.negate_next().unwrap();
            }
            match choice {
                1 => {
                    builder.open_subclause().unwrap();
                    depth += 1;
                }
                2 if depth > 0 => {
                    builder.close_subclause().unwrap();
                    depth -= 1;
                }
                _ => {
                    builder.where_equals("field", 1).unwrap();
                }
            }
        }
        for _ in 0..depth {
            builder.close_subclause().unwrap();
        }

        let tokens = builder.where_tokens();
        for pair in tokens.windows(2) {
            prop_assert!(!(pair[0].is_operator() && pair[1].is_operator()));
            prop_assert!(!matches!(
                (&pair[0], &pair[1]),
                (QueryToken::OpenSubclause, QueryToken::Operator(_))
            ));
        }
    }
}
