//! Randomized soundness of statistics and column-filter pushdown: no
//! predicate evaluation over summaries may ever drop a matching row.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use riff_expr::Expr;
use riff_format::config::{self, Config};
use riff_format::{FileReader, FileWriter, PredicateState};
use riff_types::{Field, Row, ScalarType, TypeDescription, Value};

const WORDS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

fn schema() -> Vec<Field> {
    vec![
        Field::new("name", ScalarType::Utf8, true),
        Field::new("id", ScalarType::Int, false),
        Field::new("score", ScalarType::Long, true),
    ]
}

fn td() -> TypeDescription {
    TypeDescription::new(&schema(), &["id", "name"]).unwrap()
}

/// Random row in the original schema order (name, id, score).
fn random_row(rng: &mut StdRng) -> Row {
    let name = if rng.random_range(0..10) == 0 {
        Value::Null
    } else {
        Value::from(WORDS[rng.random_range(0..WORDS.len())])
    };
    let id = Value::Int(rng.random_range(0..200));
    let score = if rng.random_range(0..5) == 0 {
        Value::Null
    } else {
        Value::Long(rng.random_range(-50..50))
    };
    Row::from_values(vec![name, id, score])
}

fn random_leaf(rng: &mut StdRng) -> Expr {
    match rng.random_range(0..8) {
        0 => Expr::eq("id", rng.random_range(0..220)),
        1 => Expr::gt("id", rng.random_range(-10..220)),
        2 => Expr::lt("id", rng.random_range(-10..220)),
        3 => Expr::ge("id", rng.random_range(-10..220)),
        4 => Expr::le("id", rng.random_range(-10..220)),
        5 => {
            let values = (0..rng.random_range(1..4))
                .map(|_| Value::Int(rng.random_range(0..220)))
                .collect();
            Expr::in_set("id", values)
        }
        6 => Expr::eq("name", WORDS[rng.random_range(0..WORDS.len())]),
        _ => Expr::is_null(if rng.random_range(0..2) == 0 {
            "name"
        } else {
            "score"
        }),
    }
}

fn random_predicate(rng: &mut StdRng, depth: usize) -> Expr {
    if depth == 0 || rng.random_range(0..3) == 0 {
        return random_leaf(rng);
    }
    match rng.random_range(0..3) {
        0 => Expr::And(
            (0..rng.random_range(2..4))
                .map(|_| random_predicate(rng, depth - 1))
                .collect(),
        ),
        1 => Expr::Or(
            (0..rng.random_range(2..4))
                .map(|_| random_predicate(rng, depth - 1))
                .collect(),
        ),
        _ => Expr::not(random_predicate(rng, depth - 1)),
    }
}

/// Remap an original-order row into the read layout of `td`.
fn to_read_layout(row: &Row, td: &TypeDescription) -> Row {
    let mut bound = Row::new(td.size());
    for spec in td.specs() {
        bound.update(spec.position(), row.value(spec.orig_position()).clone());
    }
    bound
}

#[test]
fn pushdown_never_drops_matching_rows() {
    let mut rng = StdRng::seed_from_u64(0x52494646);
    let dir = tempfile::tempdir().unwrap();
    let td = td();

    for round in 0..5 {
        let path = dir.path().join(format!("table-{round}.riff"));
        // sort by id so stripes carry tight, prunable ranges
        let mut rows: Vec<Row> = (0..400).map(|_| random_row(&mut rng)).collect();
        rows.sort_by_key(|r| match r.value(1) {
            Value::Int(v) => *v,
            _ => 0,
        });

        let write_config = Config::new().set(config::STRIPE_ROWS, 40);
        let mut writer = FileWriter::create(&path, td.clone(), &write_config).unwrap();
        for row in &rows {
            writer.write_row(row).unwrap();
        }
        writer.finish(None).unwrap();

        let bound_rows: Vec<Row> = rows.iter().map(|r| to_read_layout(r, &td)).collect();

        for _ in 0..40 {
            let predicate = random_predicate(&mut rng, 2);
            let state = PredicateState::new(&predicate, &td).unwrap();
            let expected: Vec<&Row> = bound_rows
                .iter()
                .filter(|r| state.evaluate_row(*r))
                .collect();

            let mut reader = FileReader::open(&path, &write_config).unwrap();
            let got: Vec<Row> = reader
                .prepare_read(Some(&predicate))
                .unwrap()
                .map(|r| r.unwrap())
                .collect();

            assert_eq!(
                got.len(),
                expected.len(),
                "row count mismatch for predicate {predicate}"
            );
            for (g, e) in got.iter().zip(expected) {
                assert_eq!(g, e, "row mismatch for predicate {predicate}");
            }
        }
    }
}

#[test]
fn pushdown_soundness_without_column_filters() {
    let mut rng = StdRng::seed_from_u64(7);
    let dir = tempfile::tempdir().unwrap();
    let td = td();
    let path = dir.path().join("table.riff");

    let rows: Vec<Row> = (0..300).map(|_| random_row(&mut rng)).collect();
    let write_config = Config::new()
        .set(config::STRIPE_ROWS, 30)
        .set(config::COLUMN_FILTER_ENABLED, false);
    let mut writer = FileWriter::create(&path, td.clone(), &write_config).unwrap();
    for row in &rows {
        writer.write_row(row).unwrap();
    }
    writer.finish(None).unwrap();

    let bound_rows: Vec<Row> = rows.iter().map(|r| to_read_layout(r, &td)).collect();
    for _ in 0..25 {
        let predicate = random_predicate(&mut rng, 2);
        let state = PredicateState::new(&predicate, &td).unwrap();
        let expected = bound_rows
            .iter()
            .filter(|r| state.evaluate_row(*r))
            .count();

        let mut reader = FileReader::open(&path, &write_config).unwrap();
        let got = reader
            .prepare_read(Some(&predicate))
            .unwrap()
            .map(|r| r.unwrap())
            .filter(|r| state.evaluate_row(r))
            .count();
        assert_eq!(got, expected, "lost rows for predicate {predicate}");
    }
}

#[test]
fn planner_skips_stripes_for_selective_predicates() {
    let dir = tempfile::tempdir().unwrap();
    let td = td();
    let path = dir.path().join("table.riff");

    // deterministic, tightly clustered ids: stripe k covers [k*10, k*10+9]
    let rows: Vec<Row> = (0..100)
        .map(|i| Row::from_values(vec![Value::from("w"), Value::Int(i), Value::Null]))
        .collect();
    let write_config = Config::new().set(config::STRIPE_ROWS, 10);
    let mut writer = FileWriter::create(&path, td.clone(), &write_config).unwrap();
    for row in &rows {
        writer.write_row(row).unwrap();
    }
    writer.finish(None).unwrap();

    let mut reader = FileReader::open(&path, &write_config).unwrap();
    let iter = reader.prepare_read(Some(&Expr::eq("id", 55))).unwrap();
    assert_eq!(iter.num_stripes(), 1, "only one stripe can contain id 55");
    let rows: Vec<Row> = iter.map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
}
