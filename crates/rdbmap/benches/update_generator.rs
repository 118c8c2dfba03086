use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rdbmap::sql::numbered_placeholders;
use rdbmap::{DataObject, Mapping, update_command};

/// A table with `n` mapped columns plus `ID`, and an object with every
/// column changed.
fn changed_row(n: usize, collision: bool) -> (Mapping, DataObject) {
    let mut mapping = Mapping::new();
    mapping.add_primary_key(["T.ID"]).unwrap();
    let mut object = DataObject::new("T").with("ID", 1_i64);
    for i in 0..n {
        mapping.add_column("T", &format!("COL{i}"), Some(&format!("col{i}")));
        object = object.with(format!("col{i}"), i as i64);
    }
    if collision {
        mapping.add_column("T", "VERSION", None);
        mapping.add_managed_column("T.VERSION").unwrap();
        mapping.add_collision_column("T.VERSION").unwrap();
        object = object.with("VERSION", 1_i64);
    }
    for i in 0..n {
        object.set(&format!("col{i}"), (i * 2) as i64);
    }
    (mapping, object)
}

fn bench_full_row_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_generator/full_row");

    for n in [1, 5, 10, 50] {
        let (mapping, object) = changed_row(n, false);
        let table = mapping.table_for_type(&object).into_owned();
        group.bench_with_input(BenchmarkId::from_parameter(n), &object, |b, object| {
            b.iter(|| black_box(update_command(&mapping, &table, object).unwrap()));
        });
    }

    group.finish();
}

fn bench_collision_column(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_generator/collision_column");

    for n in [1, 5, 10, 50] {
        let (mapping, object) = changed_row(n, true);
        let table = mapping.table_for_type(&object).into_owned();
        group.bench_with_input(BenchmarkId::from_parameter(n), &object, |b, object| {
            b.iter(|| black_box(update_command(&mapping, &table, object).unwrap()));
        });
    }

    group.finish();
}

fn bench_numbering(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_generator/numbered_sql");

    for n in [10, 100] {
        let (mapping, object) = changed_row(n, false);
        let table = mapping.table_for_type(&object).into_owned();
        let cmd = update_command(&mapping, &table, &object).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &cmd.sql, |b, sql| {
            b.iter(|| black_box(numbered_placeholders(sql)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_row_check,
    bench_collision_column,
    bench_numbering
);
criterion_main!(benches);
