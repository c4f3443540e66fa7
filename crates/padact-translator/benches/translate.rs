use codspeed_criterion_compat::{black_box, criterion_group, criterion_main, Criterion};

use padact_translator::{
    ControllerState, ExclusivityGroup, KeyboardActionTranslator, MappingConfig,
};

fn build_translator(count: u16) -> KeyboardActionTranslator {
    let configs = (0..count)
        .map(|vk| {
            let group_id = i32::from(vk % 8);
            MappingConfig::new(vk)
                .with_infinite_repeat(vk % 3 == 0)
                .with_exclusivity_group(ExclusivityGroup::overtaking(group_id))
        })
        .collect();
    KeyboardActionTranslator::new(configs).unwrap()
}

fn translate_benchmark(c: &mut Criterion) {
    let mut translator = build_translator(64);

    c.bench_function("translate 64 mappings, down+up cycle", |b| {
        b.iter(|| {
            for vk in 0..64u16 {
                translator
                    .translate(black_box(ControllerState::down(vk)))
                    .apply(&mut translator);
                translator
                    .translate(black_box(ControllerState::up(vk)))
                    .apply(&mut translator);
            }
        });
    });
}

criterion_group!(benches, translate_benchmark);
criterion_main!(benches);
