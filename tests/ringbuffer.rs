// Single-threaded behaviour of ByteRing for each storage layout

use dmxp_bytering::Core::{max_capacity, page_size, round_to_pages};
use dmxp_bytering::{BackingKind, ByteRing, ErrorKind, RingBuilder, RingConfig, RingError};
use std::io;
use std::time::{Duration, Instant};

fn backings() -> Vec<BackingKind> {
    if cfg!(unix) {
        vec![BackingKind::Mirrored, BackingKind::SplitCopy]
    } else {
        vec![BackingKind::SplitCopy]
    }
}

fn ring(backing: BackingKind, size: usize) -> ByteRing {
    RingBuilder::new()
        .with_capacity(size)
        .with_backing(backing)
        .build()
        .expect("ring should initialize")
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

#[test]
fn test_capacity_rounding() {
    for backing in backings() {
        for requested in [1, 100, 5000, page_size(), page_size() + 1, 3 * page_size() - 7] {
            let ring = ring(backing, requested);
            let cap = ring.capacity();
            assert_eq!(cap, round_to_pages(requested).unwrap());
            assert!(cap >= requested && cap - requested < page_size());
        }
    }
}

#[test]
fn test_uninitialized_ring_defaults() {
    let ring = ByteRing::new();
    assert_eq!(ring.capacity(), 0);
    assert!(ring.is_empty());
    assert!(!ring.is_initialized());
    assert_eq!(ring.backing(), None);

    assert!(matches!(ring.write(b"abc"), Err(RingError::NotInitialized)));
    // Must not block on an unmapped ring.
    let mut buf = [0u8; 4];
    assert!(matches!(ring.read(&mut buf), Err(RingError::NotInitialized)));

    ring.teardown();
    ring.teardown();
    assert_eq!(ring.capacity(), 0);
}

#[test]
fn test_invalid_configuration_leaves_ring_inert() {
    let ring = ByteRing::new();

    for bad in [0, max_capacity() + 1, usize::MAX] {
        let err = ring.initialize(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "size {bad}");
        assert!(!ring.is_initialized());
        assert_eq!(ring.capacity(), 0);
    }

    ring.teardown();
    ring.initialize(100).expect("a valid size still works afterwards");
    assert_eq!(ring.capacity(), page_size());
}

#[test]
fn test_double_initialize_fails_fast() {
    let ring = ByteRing::new();
    ring.initialize(100).unwrap();

    let err = ring.initialize(10 * page_size()).unwrap_err();
    assert!(matches!(err, RingError::AlreadyInitialized { capacity } if capacity == page_size()));
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(ring.capacity(), page_size());
}

#[test]
fn test_teardown_then_reinitialize() {
    for backing in backings() {
        let ring = ring(backing, 100);
        assert_eq!(ring.write(b"pending").unwrap(), 7);

        ring.teardown();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 0);
        assert!(matches!(ring.write(b"x"), Err(RingError::NotInitialized)));

        ring.initialize(2 * page_size()).unwrap();
        assert_eq!(ring.capacity(), 2 * page_size());
        assert!(ring.is_empty(), "fresh storage starts empty");
    }
}

#[test]
fn test_write_then_read() {
    for backing in backings() {
        let ring = ring(backing, 100);
        let data = pattern(64, 1);

        assert_eq!(ring.write(&data).unwrap(), 64);
        assert!(!ring.is_empty());
        assert_eq!(ring.len(), 64);

        let mut out = vec![0u8; 64];
        assert_eq!(ring.read(&mut out).unwrap(), 64);
        assert_eq!(out, data);
        assert!(ring.is_empty());
        assert_eq!(ring.free_space(), ring.capacity());
    }
}

#[test]
fn test_rejected_write_leaves_state_unchanged() {
    for backing in backings() {
        let ring = ring(backing, 1);
        let cap = ring.capacity();

        assert_eq!(ring.write(&pattern(cap - 10, 2)).unwrap(), cap - 10);
        let (len, free) = (ring.len(), ring.free_space());
        assert_eq!(free, 10);

        // Never partial: 20 bytes do not fit, so nothing is written.
        assert_eq!(ring.write(&pattern(20, 3)).unwrap(), 0);
        assert_eq!(ring.len(), len);
        assert_eq!(ring.free_space(), free);

        assert_eq!(ring.write(&pattern(10, 4)).unwrap(), 10);
        assert_eq!(ring.free_space(), 0);
        assert_eq!(ring.write(&[1]).unwrap(), 0);
    }
}

#[test]
fn test_write_larger_than_capacity_rejected_even_when_empty() {
    for backing in backings() {
        let ring = ring(backing, 1);
        let cap = ring.capacity();
        assert_eq!(ring.write(&pattern(cap + 1, 5)).unwrap(), 0);
        assert!(ring.is_empty());
    }
}

#[test]
fn test_full_ring_reads_back_completely() {
    for backing in backings() {
        let ring = ring(backing, 1);
        let cap = ring.capacity();
        let data = pattern(cap, 6);

        assert_eq!(ring.write(&data).unwrap(), cap);
        assert!(!ring.is_empty(), "a full ring is not empty");
        assert_eq!(ring.len(), cap);

        let mut out = vec![0u8; cap];
        assert_eq!(ring.read(&mut out).unwrap(), cap);
        assert_eq!(out, data);
        assert!(ring.is_empty());
    }
}

#[test]
fn test_transfer_across_the_wrap_point() {
    for backing in backings() {
        let ring = ring(backing, 1);
        let cap = ring.capacity();

        // Park both cursors three bytes before the end.
        let lead = pattern(cap - 3, 7);
        assert_eq!(ring.write(&lead).unwrap(), cap - 3);
        let mut sink = vec![0u8; cap - 3];
        assert_eq!(ring.read(&mut sink).unwrap(), cap - 3);
        assert!(ring.is_empty());

        let data = b"ABCDEFGH";
        assert_eq!(ring.write(data).unwrap(), 8);
        let mut out = [0u8; 8];
        assert_eq!(ring.read(&mut out).unwrap(), 8);
        assert_eq!(&out, data, "backing {backing:?}");
    }
}

#[test]
fn test_short_read() {
    for backing in backings() {
        let ring = ring(backing, 100);
        ring.write(b"hello").unwrap();

        let mut out = [0u8; 100];
        let n = ring.read(&mut out).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&out[..n], b"hello");
    }
}

#[test]
fn test_partial_reads_preserve_order() {
    let ring = ring(BackingKind::default(), 100);
    ring.write(b"0123456789").unwrap();

    let mut out = [0u8; 4];
    assert_eq!(ring.read(&mut out).unwrap(), 4);
    assert_eq!(&out, b"0123");
    assert_eq!(ring.len(), 6);
    assert!(!ring.is_empty());

    assert_eq!(ring.read(&mut out).unwrap(), 4);
    assert_eq!(&out, b"4567");
    assert_eq!(ring.read(&mut out).unwrap(), 2);
    assert_eq!(&out[..2], b"89");
    assert!(ring.is_empty());
}

#[test]
fn test_zero_length_operations() {
    let ring = ring(BackingKind::default(), 100);

    assert_eq!(ring.write(&[]).unwrap(), 0);
    assert!(ring.is_empty(), "an empty write must not mark the ring non-empty");

    // Returns at once even though the ring is empty.
    assert_eq!(ring.read(&mut []).unwrap(), 0);

    ring.write(b"abc").unwrap();
    assert_eq!(ring.read(&mut []).unwrap(), 0);
    assert_eq!(ring.len(), 3);
}

#[test]
fn test_try_read_and_read_timeout_on_empty_ring() {
    let ring = ring(BackingKind::default(), 100);
    let mut out = [0u8; 16];

    assert_eq!(ring.try_read(&mut out).unwrap(), 0);

    let start = Instant::now();
    assert_eq!(ring.read_timeout(&mut out, Duration::from_millis(30)).unwrap(), 0);
    assert!(start.elapsed() >= Duration::from_millis(30));

    ring.write(b"ready").unwrap();
    assert_eq!(ring.read_timeout(&mut out, Duration::from_secs(5)).unwrap(), 5);
    assert_eq!(&out[..5], b"ready");
}

#[test]
fn test_long_stream_single_thread() {
    for backing in backings() {
        let ring = ring(backing, 5000);
        let cap = ring.capacity();
        let total = 25 * cap + 17;

        let input: Vec<u8> = (0..total).map(|_| fastrand::u8(..)).collect();
        let mut output = Vec::with_capacity(total);
        let mut written = 0;
        let mut buf = vec![0u8; cap];

        while output.len() < total {
            if written < total {
                let chunk = fastrand::usize(1..=cap).min(total - written);
                let n = ring.write(&input[written..written + chunk]).unwrap();
                assert!(n == 0 || n == chunk, "partial write of {n}/{chunk}");
                written += n;
            }
            let want = fastrand::usize(1..=cap);
            let n = ring.try_read(&mut buf[..want]).unwrap();
            output.extend_from_slice(&buf[..n]);
        }

        assert_eq!(output, input, "backing {backing:?}");
        assert!(ring.is_empty());
    }
}

#[test]
fn test_builder_and_config() {
    let ring = RingBuilder::new()
        .with_capacity(3000)
        .with_backing(BackingKind::SplitCopy)
        .build()
        .unwrap();
    assert_eq!(ring.backing(), Some(BackingKind::SplitCopy));
    assert_eq!(ring.capacity(), page_size());
    assert_eq!(ring.config().backing, BackingKind::SplitCopy);

    let err = RingBuilder::new().with_capacity(0).build().unwrap_err();
    assert!(matches!(err, RingError::InvalidCapacity { requested: 0, .. }));

    let ring = ByteRing::with_config(RingConfig {
        backing: BackingKind::Auto,
        ..RingConfig::default()
    });
    ring.initialize(1).unwrap();
    let expected = if cfg!(unix) {
        BackingKind::Mirrored
    } else {
        BackingKind::SplitCopy
    };
    assert_eq!(ring.backing(), Some(expected));
}

#[test]
fn test_debug_output() {
    let ring = ByteRing::new();
    let text = format!("{ring:?}");
    assert!(text.contains("ByteRing"));
    assert!(text.contains("cursors"));
}

#[test]
fn test_error_converts_to_io_error() {
    let err: io::Error = RingError::NotInitialized.into();
    assert_eq!(err.kind(), io::ErrorKind::NotConnected);

    let err: io::Error = ByteRing::new().initialize(0).unwrap_err().into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}
