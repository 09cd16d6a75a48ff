use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use crudpath::construct::Property;
use crudpath::datatype::{DataType, Value};
use crudpath::syntax::Grammar;

fn properties(n: usize) -> Vec<Property> {
    (0..n)
        .map(|i| match i % 4 {
            0 => Property::new(format!("name{}", i), DataType::string(64)),
            1 => Property::new(format!("age{}", i), DataType::integer(150)),
            2 => Property::new(format!("born{}", i), DataType::dateonly()),
            _ => Property::new(
                format!("nickname{}", i),
                DataType::string(32).with_absent_value(Value::from("")).unwrap_or_else(|| DataType::string(32)),
            ),
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    for n in [4, 40, 400] {
        let properties = properties(n);
        c.bench_function(&format!("compile {}", n), |b| {
            b.iter(|| Grammar::compile(black_box(&properties)))
        });
    }

    let grammar = match Grammar::compile(&properties(4)) {
        Ok(grammar) => grammar,
        Err(e) => panic!("{}", e),
    };
    let short = ["age1", "30"];
    c.bench_function("decode 1 noun", |b| b.iter(|| grammar.decode(black_box(&short))));
    let full = [
        "name0", "startsWith", "Al", "age1", "between", "18", "65", "born2", "before", "2000-01-01", "nickname3",
        "has", "true", "s", "smith",
    ];
    c.bench_function("decode full path", |b| b.iter(|| grammar.decode(black_box(&full))));
    let broken = ["name0", "is", "Al", "age1", "oops", "born2", "1999"];
    c.bench_function("decode broken path", |b| b.iter(|| grammar.decode(black_box(&broken))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
