mod common;

use common::{generation_content, malformed, parser, record, StubSync};
use pretty_assertions::assert_eq;
use spectra_datasets::{Content, DatasetError, DatasetLoader, ParseError, SpectralDistribution};
use spectra_records::SyncError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn load_syncs_parses_and_stores() {
    let repo = tempfile::tempdir().unwrap();
    let sync = Arc::new(StubSync::default());
    let loader = DatasetLoader::new(
        record(repo.path()),
        parser(|_: &Path| Ok(generation_content(1, 2))),
        sync.clone(),
    );

    assert!(!loader.is_loaded());
    let content = loader.load().unwrap();

    assert_eq!(sync.calls(), 1);
    assert_eq!(content.len(), 2);
    assert!(Arc::ptr_eq(&content, &loader.content().unwrap()));
}

#[test]
fn parser_sees_the_record_repository() {
    let repo = tempfile::tempdir().unwrap();
    let expected = repo.path().to_path_buf();
    let loader = DatasetLoader::new(
        record(repo.path()),
        parser(move |p: &Path| {
            assert_eq!(p, expected.as_path());
            Ok(Content::new())
        }),
        Arc::new(StubSync::default()),
    );
    loader.load().unwrap();
}

#[test]
fn reload_replaces_content_wholesale() {
    let repo = tempfile::tempdir().unwrap();
    let generation = Arc::new(AtomicUsize::new(0));
    let g = generation.clone();
    let loader = DatasetLoader::new(
        record(repo.path()),
        parser(move |_: &Path| {
            let n = g.fetch_add(1, Ordering::SeqCst) + 1;
            // second generation drops a distribution
            Ok(generation_content(n, if n == 1 { 3 } else { 2 }))
        }),
        Arc::new(StubSync::default()),
    );

    let first = loader.load().unwrap();
    let second = loader.load().unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 2);
    assert_eq!(loader.content().unwrap().len(), 2);
    assert!(second.values().all(|sd| sd.range() == [2.0]));
}

#[test]
fn failed_parse_keeps_previous_content() {
    let repo = tempfile::tempdir().unwrap();
    let broken = Arc::new(AtomicBool::new(false));
    let b = broken.clone();
    let loader = DatasetLoader::new(
        record(repo.path()),
        parser(move |p: &Path| {
            if b.load(Ordering::SeqCst) {
                Err(malformed(p))
            } else {
                Ok(generation_content(1, 2))
            }
        }),
        Arc::new(StubSync::default()),
    );

    let first = loader.load().unwrap();
    broken.store(true, Ordering::SeqCst);

    let err = loader.load().unwrap_err();
    assert!(matches!(err, DatasetError::Parse(ParseError::Malformed { .. })));
    assert_eq!(*loader.content().unwrap(), *first);
}

#[test]
fn failed_sync_skips_parse_and_keeps_content() {
    let repo = tempfile::tempdir().unwrap();
    let sync = Arc::new(StubSync::default());
    let parses = Arc::new(AtomicUsize::new(0));
    let p = parses.clone();
    let loader = DatasetLoader::new(
        record(repo.path()),
        parser(move |_: &Path| {
            p.fetch_add(1, Ordering::SeqCst);
            Ok(generation_content(1, 1))
        }),
        sync.clone(),
    );

    let first = loader.load().unwrap();
    sync.offline.store(true, Ordering::SeqCst);

    assert!(matches!(
        loader.load(),
        Err(DatasetError::Sync(SyncError::Msg(_)))
    ));
    assert_eq!(parses.load(Ordering::SeqCst), 1);
    assert_eq!(*loader.content().unwrap(), *first);
}

#[test]
fn failure_before_first_load_stays_unloaded() {
    let repo = tempfile::tempdir().unwrap();
    let loader = DatasetLoader::new(
        record(repo.path()),
        parser(|p: &Path| Err(malformed(p))),
        Arc::new(StubSync::default()),
    );
    assert!(loader.load().is_err());
    assert!(!loader.is_loaded());
    assert!(loader.content().is_none());
}

#[test]
fn readers_never_observe_partial_content() {
    const SIZE: usize = 16;
    let repo = tempfile::tempdir().unwrap();
    let generation = Arc::new(AtomicUsize::new(0));
    let g = generation.clone();
    let loader = Arc::new(DatasetLoader::new(
        record(repo.path()),
        parser(move |_: &Path| {
            let n = g.fetch_add(1, Ordering::SeqCst) + 1;
            let mut content = Content::new();
            for i in 0..SIZE {
                let name = format!("sd-{i}");
                let sd = SpectralDistribution::new(name.clone(), vec![500.0], vec![n as f64])?;
                content.insert(name, sd);
                thread::sleep(Duration::from_micros(200));
            }
            Ok(content)
        }),
        Arc::new(StubSync::default()),
    ));
    loader.load().unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let loader = loader.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut samples = 0;
                while !done.load(Ordering::SeqCst) {
                    let content = loader.content().unwrap();
                    assert_eq!(content.len(), SIZE);
                    let first = content["sd-0"].range()[0];
                    assert!(content.values().all(|sd| sd.range()[0] == first));
                    samples += 1;
                }
                samples
            })
        })
        .collect();

    for _ in 0..5 {
        loader.load().unwrap();
    }
    done.store(true, Ordering::SeqCst);

    for r in readers {
        assert!(r.join().unwrap() > 0);
    }
    assert_eq!(loader.content().unwrap()["sd-0"].range(), [6.0]);
}

#[test]
fn concurrent_loads_are_serialized() {
    let repo = tempfile::tempdir().unwrap();
    let active = Arc::new(AtomicUsize::new(0));
    let overlap = Arc::new(AtomicBool::new(false));
    let (a, o) = (active.clone(), overlap.clone());
    let loader = Arc::new(DatasetLoader::new(
        record(repo.path()),
        parser(move |_: &Path| {
            if a.fetch_add(1, Ordering::SeqCst) > 0 {
                o.store(true, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(5));
            a.fetch_sub(1, Ordering::SeqCst);
            Ok(generation_content(1, 1))
        }),
        Arc::new(StubSync::default()),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loader = loader.clone();
            thread::spawn(move || loader.load().map(|_| ()))
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }
    assert!(!overlap.load(Ordering::SeqCst));
}
