//! Latency benchmarks for the classification pipeline
//!
//! Run with: cargo bench -p deskroute-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deskroute_classifiers::{ClassifierSettings, RuleTable, RuleTagger, TextClassifier};

fn rules() -> RuleTable {
    RuleTable::new([
        ("access", vec!["пароль", "войти", "доступ"]),
        ("software", vec!["1С", "SAP", "программа"]),
        ("hardware", vec!["принтер", "монитор"]),
        ("network", vec!["интернет", "vpn", "сеть"]),
    ])
    .unwrap()
}

fn training_set() -> (Vec<String>, Vec<String>) {
    let rows = [
        ("Не могу войти в систему", "access"),
        ("Забыл пароль от почты", "access"),
        ("SAP не подключается к базе", "software"),
        ("Программа 1С не запускается", "software"),
        ("Принтер не печатает", "hardware"),
        ("Сломался монитор", "hardware"),
        ("Нет интернета в офисе", "network"),
        ("Не подключается VPN", "network"),
    ];
    rows.iter()
        .map(|(t, c)| (t.to_string(), c.to_string()))
        .unzip()
}

fn benchmark_rule_tagger(c: &mut Criterion) {
    let tagger = RuleTagger::new(rules()).unwrap();

    let mut group = c.benchmark_group("rule_tagger");
    for (name, text) in [
        ("no_match", "Прошу оформить отпуск с понедельника"),
        ("single_match", "Не могу войти в систему"),
        ("multi_match", "Пароль от SAP не подходит, интернет тоже пропал"),
    ] {
        group.bench_with_input(BenchmarkId::new("tag", name), &text, |b, text| {
            b.iter(|| tagger.tag(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let (texts, labels) = training_set();
    let clf = TextClassifier::train(&texts, &labels, rules(), &ClassifierSettings::default()).unwrap();

    let mut group = c.benchmark_group("text_classifier");
    group.sample_size(100);

    group.bench_function("predict_short", |b| {
        b.iter(|| clf.predict(black_box("Пароль не подходит")).unwrap())
    });

    let long = "Добрый день, с утра не могу войти в 1С, пишет что пароль неверный, \
                при этом SAP открывается, но очень медленно работает интернет";
    group.bench_function("predict_long", |b| {
        b.iter(|| clf.predict(black_box(long)).unwrap())
    });

    group.bench_function("predict_batch_8", |b| {
        b.iter(|| clf.predict_batch(black_box(&texts)).unwrap())
    });

    group.finish();
}

fn benchmark_train(c: &mut Criterion) {
    let (texts, labels) = training_set();
    c.bench_function("train_standard_pipeline", |b| {
        b.iter(|| {
            TextClassifier::train(
                black_box(&texts),
                black_box(&labels),
                rules(),
                &ClassifierSettings::default(),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_rule_tagger, benchmark_predict, benchmark_train);
criterion_main!(benches);
