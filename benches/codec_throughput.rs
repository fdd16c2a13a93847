use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rwio::{read_lines_chunked, read_text, write_text, Codec, WriteOptions};
use tempfile::TempDir;

fn create_log_text(size_kb: usize) -> String {
    let target_size = size_kb * 1024;
    let mut content = String::with_capacity(target_size + 128);
    let mut line_num = 0;

    while content.len() < target_size {
        content.push_str(&format!(
            "[2024-09-02T10:{:02}:{:02}] INFO: Request {} user_{}\n",
            (line_num / 60) % 60,
            line_num % 60,
            line_num,
            line_num % 1000
        ));
        line_num += 1;
    }

    content
}

fn size_label(size_kb: usize) -> String {
    if size_kb < 1024 {
        format!("{}KB", size_kb)
    } else {
        format!("{}MB", size_kb / 1024)
    }
}

const CODECS: [Codec; 6] = [
    Codec::None,
    Codec::Gzip,
    Codec::Bzip2,
    Codec::Xz,
    Codec::Zstd,
    Codec::TarGzip,
];

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_text");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    let dir = TempDir::new().unwrap();
    for &size_kb in &[64, 1024] {
        let text = create_log_text(size_kb);
        group.throughput(Throughput::Bytes(text.len() as u64));

        for codec in CODECS.into_iter().filter(|c| c.ensure_available().is_ok()) {
            let path = dir.path().join(format!("write-{}", codec.name()));
            let options = WriteOptions::new().compression(codec);
            group.bench_with_input(
                BenchmarkId::new(codec.name(), size_label(size_kb)),
                &text,
                |b, text| {
                    b.iter(|| write_text(&path, black_box(text), &options).unwrap());
                },
            );
        }
    }

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_text");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    let dir = TempDir::new().unwrap();
    for &size_kb in &[64, 1024] {
        let text = create_log_text(size_kb);
        group.throughput(Throughput::Bytes(text.len() as u64));

        for codec in CODECS.into_iter().filter(|c| c.ensure_available().is_ok()) {
            let path = dir.path().join(format!("read-{}-{}", codec.name(), size_kb));
            write_text(&path, &text, &WriteOptions::new().compression(codec)).unwrap();
            group.bench_with_input(
                BenchmarkId::new(codec.name(), size_label(size_kb)),
                &path,
                |b, path| {
                    b.iter(|| black_box(read_text(path, codec).unwrap().len()));
                },
            );
        }
    }

    group.finish();
}

fn bench_chunked_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_lines_chunked");
    group.sample_size(10);

    let dir = TempDir::new().unwrap();
    let text = create_log_text(1024);
    let path = dir.path().join("chunked.log.gz");
    write_text(&path, &text, &WriteOptions::new()).unwrap();

    for &chunksize in &[1, 100, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("gzip", chunksize),
            &chunksize,
            |b, &chunksize| {
                b.iter(|| {
                    let chunks = read_lines_chunked(&path, Codec::Gzip, chunksize).unwrap();
                    let lines: usize = chunks.map(|chunk| chunk.unwrap().len()).sum();
                    black_box(lines);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_write, bench_read, bench_chunked_lines);
criterion_main!(benches);
