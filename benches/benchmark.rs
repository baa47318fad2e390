//! Performance benchmarks for chat-capture.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Extraction of a single rich message (text, code, artifacts, timestamp)
//! - Full captures against simulated virtualized pages of growing length

use chat_capture::dom;
use chat_capture::extractor::Extractor;
use chat_capture::hasher::fingerprint_element;
use chat_capture::host::SimulatedPage;
use chat_capture::{CaptureSession, NoProgress, Options, PlatformProfile, Role};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const RICH_MESSAGE: &str = r#"
<div class="message assistant-turn" data-message-id="m1" data-message-author-role="assistant">
  <time datetime="2024-05-01T12:30:00Z">May 1</time>
  <div class="message-content">
    <p>Here is how to read a file line by line:</p>
    <pre><code class="language-rust">use std::fs;

fn main() {
    for line in fs::read_to_string("notes.txt").unwrap().lines() {
        println!("{line}");
    }
}</code></pre>
    <p>Use <code>BufReader</code> for large inputs. See <a href="/artifacts/42">the artifact</a>.</p>
    <div role="toolbar"><button>Copy</button><button>Retry</button></div>
  </div>
</div>
"#;

fn bench_extract_message(c: &mut Criterion) {
    let profile = PlatformProfile::generic();
    let options = Options::default();
    let extractor = Extractor::new(&profile, &options, None);
    let doc = dom::parse(RICH_MESSAGE);
    let sel = doc.select("[data-message-id]");

    c.bench_function("extract_message", |b| {
        b.iter(|| {
            let fingerprint = fingerprint_element(black_box(&sel), &options);
            extractor.extract(&sel, fingerprint, 0)
        });
    });
}

/// Full two-phase capture; the virtual clock keeps waits free.
fn bench_capture_simulated(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_simulated");

    for rows in [50usize, 200, 800] {
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut page = SimulatedPage::builder()
                    .rows((0..rows).map(|i| {
                        let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                        (role, format!("message {i} with a little body text"))
                    }))
                    .load_more_button(rows / 2, 25)
                    .build();
                CaptureSession::new(Options::default()).run(&mut page, &PlatformProfile::generic(), &mut NoProgress)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract_message, bench_capture_simulated);
criterion_main!(benches);
