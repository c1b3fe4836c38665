use criterion::{criterion_group, criterion_main, Criterion};
use pixelveil_core::sequence::{generate, SequenceOptions};
use pixelveil_core::{codec, payload, CarrierImage};
use pixelveil_crypto::cipher;

pub fn image_embedding(c: &mut Criterion) {
    let carrier = CarrierImage::filled(512, 512, [90, 120, 150, 255]).expect("Invalid carrier");
    let envelope = cipher::encrypt(b"Hello World!", &[7u8; 32]);
    let bitstream = payload::encode(&envelope);

    c.bench_function("Sequence Generation", |b| {
        b.iter(|| generate(b"benchmark seed!!", 512, 512, &SequenceOptions::default()))
    });

    let sequence = generate(b"benchmark seed!!", 512, 512, &SequenceOptions::default())
        .expect("Cannot generate sequence");
    c.bench_function("Image Embedding", |b| {
        b.iter(|| {
            codec::embed(&carrier, &bitstream, &sequence).expect("Cannot embed secret message")
        })
    });
}

criterion_group!(benches, image_embedding);
criterion_main!(benches);
