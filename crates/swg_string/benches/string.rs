use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn generate(entries: u64) -> swg_string::StringFile {
    let mut file = swg_string::StringFile::default();
    for id in 0..entries {
        let variants = (0..id % 4)
            .map(|v| swg_string::StringVariant::new(v, v as u16, format!("variant {} of {}", v, id)))
            .collect();
        file.insert(
            swg_string::LocaleStringId(id),
            swg_string::StringEntry::new(variants, 0, format!("localized string number {}", id)),
        );
    }
    file
}

pub mod read {
    use divan::Bencher;
    use std::io::Cursor;
    use swg_string::StringFileReader;

    #[divan::bench(args = [100, 10_000])]
    fn decode(bencher: Bencher, entries: u64) {
        bencher
            .with_inputs(|| super::generate(entries).to_bytes().unwrap())
            .bench_refs(|data| {
                divan::black_box(StringFileReader::decode(Cursor::new(data)).unwrap());
            });
    }
}

pub mod write {
    use divan::Bencher;
    use swg_string::StringLayout;

    #[divan::bench(args = [100, 10_000])]
    fn plan(bencher: Bencher, entries: u64) {
        let file = super::generate(entries);
        bencher.bench_local(|| {
            divan::black_box(StringLayout::plan(&file).unwrap());
        });
    }

    #[divan::bench(args = [100, 10_000])]
    fn encode(bencher: Bencher, entries: u64) {
        let file = super::generate(entries);
        bencher.bench_local(|| {
            divan::black_box(file.to_bytes().unwrap());
        });
    }
}

pub mod json {
    use divan::Bencher;
    use swg_string::StringFile;

    #[divan::bench(args = [100, 10_000])]
    fn round_trip(bencher: Bencher, entries: u64) {
        let file = super::generate(entries);
        bencher.bench_local(|| {
            let text = file.to_json_string().unwrap();
            divan::black_box(StringFile::from_json_str(&text).unwrap());
        });
    }
}
