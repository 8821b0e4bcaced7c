use criterion::{black_box, criterion_group, criterion_main, Criterion};
use frame_buffer::{CursorMode, FrameBuffer, DEFAULT_CAPACITY};
use imu_protocol::{encode_packet, FrameSynchronizer, PacketDecoder};

fn bench_find_start(c: &mut Criterion) {
    let sync = FrameSynchronizer::default();

    // Worst case: no signature anywhere, full ring scanned
    let mut empty = FrameBuffer::with_default_capacity(CursorMode::Shared);
    empty.append(&vec![0x55; DEFAULT_CAPACITY]);
    c.bench_function("find_start_miss", |b| {
        b.iter(|| sync.find_start(black_box(&empty), black_box(0)))
    });

    let mut late = FrameBuffer::with_default_capacity(CursorMode::Shared);
    late.append(&vec![0x55; DEFAULT_CAPACITY - 20]);
    late.append(&encode_packet(1, 0.1, 0.2, 0.3));
    c.bench_function("find_start_last_frame", |b| {
        b.iter(|| sync.find_start(black_box(&late), black_box(0)))
    });

    let decoder = PacketDecoder::new();
    c.bench_function("decode", |b| {
        b.iter(|| decoder.decode(black_box(&late), black_box(DEFAULT_CAPACITY - 20)))
    });
}

criterion_group!(benches, bench_find_start);
criterion_main!(benches);
