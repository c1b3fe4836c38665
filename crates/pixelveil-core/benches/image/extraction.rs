use criterion::{criterion_group, criterion_main, Criterion};
use pixelveil_core::{CarrierImage, SequenceOptions};
use pixelveil_crypto::KeyMaterial;

pub fn image_extraction(c: &mut Criterion) {
    let keys = KeyMaterial::from_parts([7u8; 32], *b"benchmark seed!!");
    let options = SequenceOptions::default();
    let carrier = CarrierImage::filled(512, 512, [90, 120, 150, 255]).expect("Invalid carrier");
    let secret_image = pixelveil_core::hide(&carrier, "Hello World!", &keys, &options)
        .expect("Cannot hide message");

    c.bench_function("Image Extraction", |b| {
        b.iter(|| {
            pixelveil_core::extract(&secret_image, &keys, &options)
                .expect("Cannot extract message")
        })
    });
}

criterion_group!(benches, image_extraction);
criterion_main!(benches);
