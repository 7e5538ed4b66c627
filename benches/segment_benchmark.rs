use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use doseocr::{
    find_blobs, DoseOcr, Glyph, GlyphDictionary, OcrConfig, PixelMask, ScanOrder, SegmentConfig,
    Vendor,
};

/// A page of `rows` text lines, each a run of small distinct glyphs.
fn synthetic_page(rows: u32) -> PixelMask {
    let width = 640;
    let mut mask = PixelMask::blank(width, rows * 16 + 8);
    for row in 0..rows {
        let y = 4 + row * 16;
        let mut x = 4;
        let mut w = 1;
        while x + w < width - 4 {
            for yy in y..y + 7 {
                for xx in x..x + w {
                    mask.set(xx, yy, true);
                }
            }
            x += w + 15;
            w = w % 5 + 1;
        }
    }
    mask
}

fn dictionary() -> GlyphDictionary {
    let mut dict = GlyphDictionary::new();
    for w in 1..=5u32 {
        let glyph = Glyph::new(w, 7, vec![true; (w * 7) as usize]).expect("valid glyph");
        dict.insert(glyph, w.to_string());
    }
    dict
}

fn benchmark_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");

    for vendor in Vendor::ALL {
        let cfg = SegmentConfig::for_vendor(vendor);
        let page = synthetic_page(20);
        group.bench_with_input(BenchmarkId::from_parameter(vendor), &page, |b, page| {
            b.iter(|| {
                find_blobs(black_box(page), page.bounds(), &cfg, ScanOrder::RowMajor)
                    .expect("segmentation failed")
            });
        });
    }

    group.finish();
}

fn benchmark_page_recognition(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_recognition");
    group.sample_size(20);

    for rows in [5u32, 20, 40] {
        let page = synthetic_page(rows);
        let ocr = DoseOcr::new(OcrConfig::for_vendor(Vendor::Ge), dictionary());
        group.bench_with_input(BenchmarkId::from_parameter(rows), &page, |b, page| {
            b.iter(|| ocr.read_page(black_box(page)).expect("recognition failed"));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_segmentation, benchmark_page_recognition);
criterion_main!(benches);
