use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use choiceset::catalogue::get_by_name;
use choiceset::design::ChoiceSet;
use choiceset::enumerate::{enumerate_profiles, PairEnumerator};
use choiceset::space::AttributeSpace;

fn medium_space() -> AttributeSpace {
    AttributeSpace::new([
        vec![30, 50, 80],
        vec![30, 50, 80],
        vec![0, 50, 80],
        vec![0, 1, 2],
        vec![0, 1, 2],
        vec![0, 50, 80],
        vec![0, 1, 2],
        vec![0, 1, 2],
        vec![100, 1250, 3500],
    ])
    .unwrap()
}

fn bench_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("Profiles");

    for name in ["copy", "constraints"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &name, |b, &name| {
            let config = get_by_name(name).unwrap();
            let filter = config.profile_filter().unwrap();
            b.iter(|| enumerate_profiles(&config.space, &filter));
        });
    }
    group.finish();
}

fn bench_partners(c: &mut Criterion) {
    let mut group = c.benchmark_group("Partners_Row0");

    for name in ["copy", "constraints"] {
        let config = get_by_name(name).unwrap();
        let profiles = enumerate_profiles(&config.space, &config.profile_filter().unwrap());
        let filter = config.choice_filter();
        group.bench_function(name, |b| {
            b.iter(|| PairEnumerator::new(&profiles, &filter).partners(0));
        });
    }
    group.finish();
}

fn bench_pair_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pair_Scan");
    group.sample_size(10);

    let mut config = get_by_name("copy").unwrap();
    config.space = medium_space();
    let profiles = enumerate_profiles(&config.space, &config.profile_filter().unwrap());
    let filter = config.choice_filter();

    // Block size trades merge frequency against buffered partners
    for rows in [16, 128, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut sets: Vec<ChoiceSet> = Vec::new();
                PairEnumerator::new(&profiles, &filter)
                    .block_rows(rows)
                    .run(&mut sets)
                    .unwrap();
                sets.len()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_profiles, bench_partners, bench_pair_scan);
criterion_main!(benches);
