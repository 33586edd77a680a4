use deptheval::{DepthEvalError, EvalConfig, Evaluator, RunOutcome};
use image::{ImageBuffer, Luma, Rgb};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn depth_value(x: u32, y: u32) -> u16 {
    1000 + ((x * 37) ^ (y * 23)) as u16 % 800 + (x + y) as u16 * 5
}

fn write_depth<F>(path: &Path, width: u32, height: u32, f: F)
where
    F: Fn(u32, u32) -> u16,
{
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([f(x, y)]));
    img.save(path).unwrap();
}

struct Layout {
    _root: TempDir,
    reference: std::path::PathBuf,
    candidate: std::path::PathBuf,
    output: std::path::PathBuf,
}

fn layout() -> Layout {
    let root = TempDir::new().unwrap();
    let reference = root.path().join("depth");
    let candidate = root.path().join("depth_pngs_colmap");
    fs::create_dir(&reference).unwrap();
    fs::create_dir(&candidate).unwrap();
    let output = root.path().join("depth_metrics.csv");
    Layout {
        _root: root,
        reference,
        candidate,
        output,
    }
}

fn evaluator(layout: &Layout) -> Evaluator {
    Evaluator::new(EvalConfig::new(
        &layout.reference,
        &layout.candidate,
        &layout.output,
    ))
    .unwrap()
}

#[test]
fn identity_pair_is_perfect() {
    let dirs = layout();
    write_depth(&dirs.reference.join("1.png"), 24, 18, depth_value);
    write_depth(&dirs.candidate.join("1.jpg.geometric.png"), 24, 18, depth_value);

    let report = evaluator(&dirs).evaluate().unwrap();
    assert_eq!(report.records().len(), 1);
    let record = report.records()[0];
    assert_eq!(record.image, "1");
    assert!((record.scale - 1.0).abs() < 1e-6);
    assert!(record.rmse < 1e-3);
    assert!((record.ssim - 1.0).abs() < 1e-6);
    assert!(record.psnr > 100.0);
}

#[test]
fn scaled_half_resolution_candidate_is_recovered() {
    let dirs = layout();
    // Blocky reference so nearest-neighbor upsampling reproduces it exactly.
    let blocky = |x: u32, y: u32| depth_value(x / 2, y / 2);
    write_depth(&dirs.reference.join("3.png"), 32, 24, blocky);
    write_depth(&dirs.candidate.join("3.jpg.geometric.png"), 16, 12, |x, y| {
        (depth_value(x, y) / 4).max(1)
    });

    let report = evaluator(&dirs).evaluate().unwrap();
    assert_eq!(report.records().len(), 1, "failures: {:?}", report.failures());
    let record = report.records()[0];
    assert!(record.scale > 3.5 && record.scale < 4.5);
    assert!(record.scale.is_finite());
}

#[test]
fn unmatched_and_non_overlapping_pairs_are_excluded() {
    let dirs = layout();
    write_depth(&dirs.reference.join("1.png"), 16, 16, depth_value);
    write_depth(&dirs.candidate.join("1.jpg.geometric.png"), 16, 16, depth_value);

    // Reference valid only on the left half, candidate only on the right half.
    write_depth(&dirs.reference.join("2.png"), 16, 16, |x, y| {
        if x < 8 {
            depth_value(x, y)
        } else {
            0
        }
    });
    write_depth(&dirs.candidate.join("2.jpg.geometric.png"), 16, 16, |x, y| {
        if x >= 8 {
            depth_value(x, y)
        } else {
            0
        }
    });

    // No reference for key 9.
    write_depth(&dirs.candidate.join("9.jpg.geometric.png"), 16, 16, depth_value);
    // Not a candidate at all.
    fs::write(dirs.candidate.join("notes.txt"), "colmap run").unwrap();

    let outcome = evaluator(&dirs).run().unwrap();
    let RunOutcome::Written { path, report } = outcome else {
        panic!("expected a written result set");
    };
    assert_eq!(report.matched, 2);
    assert_eq!(report.unmatched.len(), 1);
    assert_eq!(report.unmatched[0].file_name, "9.jpg.geometric.png");
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].key, "2");
    assert_eq!(
        report.failures()[0].reason,
        DepthEvalError::NoOverlap {
            candidate: "2.jpg.geometric.png".to_string(),
            reference: "2.png".to_string(),
        }
    );

    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "image,scale,RMSE,PSNR,SSIM");
    assert!(lines[1].starts_with("1,"));
}

#[test]
fn undecodable_candidate_fails_only_its_pair() {
    let dirs = layout();
    write_depth(&dirs.reference.join("1.png"), 12, 12, depth_value);
    write_depth(&dirs.candidate.join("1.jpg.geometric.png"), 12, 12, depth_value);
    write_depth(&dirs.reference.join("4.png"), 12, 12, depth_value);
    fs::write(dirs.candidate.join("4.jpg.geometric.png"), b"not a png").unwrap();

    let report = evaluator(&dirs).evaluate().unwrap();
    assert_eq!(report.records().len(), 1);
    assert_eq!(report.records()[0].image, "1");
    assert_eq!(report.failures().len(), 1);
    assert!(matches!(
        report.failures()[0].reason,
        DepthEvalError::ImageIo { .. }
    ));
}

#[test]
fn colour_candidate_is_collapsed_to_luminance() {
    let dirs = layout();
    write_depth(&dirs.reference.join("6.png"), 12, 12, |x, y| 50 + (x * 3 + y) as u16);
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(12, 12, |x, y| {
        let v = (50 + x * 3 + y) as u8;
        Rgb([v, v, v])
    });
    img.save(dirs.candidate.join("6.jpg.geometric.png")).unwrap();

    let report = evaluator(&dirs).evaluate().unwrap();
    assert_eq!(report.records().len(), 1);
    assert!((report.records()[0].scale - 1.0).abs() < 1e-6);
    assert!(report.records()[0].rmse < 1e-3);
}

#[test]
fn no_matching_pairs_writes_nothing() {
    let dirs = layout();
    write_depth(&dirs.candidate.join("1.jpg.geometric.png"), 8, 8, depth_value);

    let outcome = evaluator(&dirs).run().unwrap();
    match outcome {
        RunOutcome::EmptyBatch { report } => {
            assert_eq!(report.matched, 0);
            assert_eq!(report.unmatched.len(), 1);
        }
        RunOutcome::Written { .. } => panic!("nothing should be written"),
    }
    assert!(!dirs.output.exists());
}

#[test]
fn all_pairs_failing_is_an_empty_batch() {
    let dirs = layout();
    write_depth(&dirs.reference.join("1.png"), 8, 8, |_, _| 0);
    write_depth(&dirs.candidate.join("1.jpg.geometric.png"), 8, 8, depth_value);

    let outcome = evaluator(&dirs).run().unwrap();
    assert!(matches!(outcome, RunOutcome::EmptyBatch { .. }));
    assert_eq!(outcome.report().failures().len(), 1);
    assert!(!dirs.output.exists());
}

#[cfg(unix)]
#[test]
fn symlinked_candidates_and_references_are_evaluated() {
    use std::os::unix::fs::symlink;

    let dirs = layout();
    let store = dirs.reference.parent().unwrap().join("store");
    fs::create_dir(&store).unwrap();

    // Pair 1: reference is a link into the store.
    write_depth(&store.join("gt_1.png"), 12, 12, depth_value);
    symlink(store.join("gt_1.png"), dirs.reference.join("1.png")).unwrap();
    write_depth(&dirs.candidate.join("1.jpg.geometric.png"), 12, 12, depth_value);

    // Pair 2: candidate is a link into the store.
    write_depth(&dirs.reference.join("2.png"), 12, 12, depth_value);
    write_depth(&store.join("colmap_2.png"), 12, 12, depth_value);
    symlink(
        store.join("colmap_2.png"),
        dirs.candidate.join("2.jpg.geometric.png"),
    )
    .unwrap();

    let report = evaluator(&dirs).evaluate().unwrap();
    assert_eq!(report.matched, 2);
    assert!(report.unmatched.is_empty(), "{:?}", report.unmatched);
    assert!(report.failures().is_empty(), "{:?}", report.failures());
    let mut keys: Vec<&str> = report
        .records()
        .into_iter()
        .map(|r| r.image.as_str())
        .collect();
    keys.sort();
    assert_eq!(keys, ["1", "2"]);
}

#[test]
fn outcomes_keep_pair_order_across_successes_and_failures() {
    let dirs = layout();
    for key in 0..4u32 {
        write_depth(&dirs.reference.join(format!("{key}.png")), 10, 10, depth_value);
        if key % 2 == 0 {
            write_depth(
                &dirs.candidate.join(format!("{key}.jpg.geometric.png")),
                10,
                10,
                depth_value,
            );
        } else {
            fs::write(dirs.candidate.join(format!("{key}.jpg.geometric.png")), b"bad").unwrap();
        }
    }

    let report = evaluator(&dirs).evaluate().unwrap();
    assert_eq!(report.outcomes.len(), 4);
    let mut ok_keys = Vec::new();
    for outcome in &report.outcomes {
        match outcome {
            Ok(record) => ok_keys.push(record.image.clone()),
            Err(failure) => assert!(matches!(failure.reason, DepthEvalError::ImageIo { .. })),
        }
    }
    let record_keys: Vec<String> = report.records().iter().map(|r| r.image.clone()).collect();
    assert_eq!(ok_keys, record_keys);
    assert_eq!(report.failures().len(), 2);
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_run_matches_sequential_content() {
    let dirs = layout();
    for key in 0..6u32 {
        let shift = key as u16 * 3;
        write_depth(&dirs.reference.join(format!("{key}.png")), 16, 16, |x, y| {
            depth_value(x, y) + shift
        });
        write_depth(
            &dirs.candidate.join(format!("{key}.jpg.geometric.png")),
            16,
            16,
            |x, y| depth_value(y, x) / 2 + 1,
        );
    }

    let sequential = evaluator(&dirs).evaluate().unwrap();
    let mut config = EvalConfig::new(&dirs.reference, &dirs.candidate, &dirs.output);
    config.parallel = true;
    let parallel = Evaluator::new(config).unwrap().evaluate().unwrap();

    let mut a: Vec<_> = sequential.records().into_iter().cloned().collect();
    let mut b: Vec<_> = parallel.records().into_iter().cloned().collect();
    a.sort_by(|l, r| l.image.cmp(&r.image));
    b.sort_by(|l, r| l.image.cmp(&r.image));
    assert_eq!(a, b);
}
