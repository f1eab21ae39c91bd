use budget_puzzles::{
    knapsack::return_renderings, Answer, GeneratorConfig, Instance, Item, Mode, Puzzle, Solution,
};
use serde_json::{json, Map, Value};

fn two_item_puzzle() -> Puzzle {
    Puzzle {
        seed: 0,
        config: GeneratorConfig::new(2, 150000, Mode::Trivial),
        instance: Instance {
            items: vec![Item::from((60000, 90000)), Item::from((70000, 95000))],
            capacity: 150000,
        },
        solution: Solution {
            max_return: 185000,
            solution_count: 1,
            selected_indices: Some(vec![0, 1]),
        },
    }
}

fn total_return(text: &str) -> Answer {
    Answer {
        selected_indices: None,
        total_return: Some(text.to_string()),
    }
}

#[test]
fn test_verify_selection_accepts_optimum_in_any_order() {
    let puzzle = two_item_puzzle();
    assert_eq!(puzzle.verify_selection(&[1, 0]).unwrap(), 185000);
}

#[test]
fn test_verify_selection_rejects_bad_selections() {
    let puzzle = two_item_puzzle();
    assert!(puzzle.verify_selection(&[0, 0]).is_err());
    assert!(puzzle.verify_selection(&[0, 2]).is_err());
    assert!(puzzle.verify_selection(&[1]).is_err());
    assert!(puzzle.verify_selection(&[]).is_err());
}

#[test]
fn test_verify_selection_rejects_over_capacity() {
    let config = GeneratorConfig::new(5, 150000, Mode::Random);
    let puzzle = Puzzle::generate_instance(11, &config).unwrap();
    let all: Vec<usize> = (0..5).collect();
    let err = puzzle.verify_selection(&all).unwrap_err();
    assert!(err.to_string().contains("exceeded capacity"));

    let expected = puzzle.solution.selected_indices.clone().unwrap();
    assert_eq!(
        puzzle.verify_selection(&expected).unwrap(),
        puzzle.solution.max_return
    );
}

#[test]
fn test_uniform_selection_checks_cardinality() {
    let config = GeneratorConfig::new(5, 150000, Mode::NItems).with_items_in_solution(2);
    let puzzle = Puzzle::generate_instance(4, &config).unwrap();
    assert!(puzzle.verify_selection(&[0, 1]).is_ok());
    assert!(puzzle.verify_selection(&[3, 4]).is_ok());
    assert!(puzzle.verify_selection(&[2]).is_err());
    assert!(puzzle.verify_selection(&[0, 1, 2]).is_err());
}

#[test]
fn test_return_renderings() {
    assert_eq!(return_renderings(999), vec!["999"]);
    assert_eq!(
        return_renderings(1234567),
        vec!["1234567", "1,234,567", "1, 234, 567", "1 234 567"]
    );
    assert_eq!(
        return_renderings(185000),
        vec!["185000", "185,000", "185, 000", "185 000"]
    );
}

#[test]
fn test_verify_answer_total_return() {
    let puzzle = two_item_puzzle();
    for text in [
        "185000",
        "The total return is 185,000$",
        "Total: 185, 000.",
        "It comes to 185 000, as computed.",
        "The total is $185,000.00",
        "185000.00 dollars",
        "investments 3 185000",
    ] {
        assert!(puzzle.verify_answer(&total_return(text)).is_ok(), "{}", text);
    }
    for text in [
        "1185000",
        "185,0001",
        "1,185,000",
        "185,000,000",
        "185.000",
        "180000",
        "",
    ] {
        assert!(puzzle.verify_answer(&total_return(text)).is_err(), "{}", text);
    }
}

#[test]
fn test_verify_answer_requires_content() {
    let puzzle = two_item_puzzle();
    assert!(puzzle.verify_answer(&Answer::default()).is_err());
    let answer = Answer {
        selected_indices: Some(vec![0, 1]),
        total_return: Some("185,000".to_string()),
    };
    assert!(puzzle.verify_answer(&answer).is_ok());
}

#[test]
fn test_answer_from_json_map() {
    let map: Map<String, Value> = match json!({"selected_indices": [1, 0]}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    let answer = Answer::try_from(map).unwrap();
    assert_eq!(answer.selected_indices, Some(vec![1, 0]));
    assert_eq!(answer.total_return, None);
    assert!(two_item_puzzle().verify_answer(&answer).is_ok());
}
