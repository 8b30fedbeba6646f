use std::collections::HashSet;

use nwins::{NWinsError, ReplayBuffer};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_buffer_keeps_most_recent_items() {
    let mut buffer = ReplayBuffer::new(5).unwrap();
    for item in 0..12 {
        buffer.push(item);
    }
    assert_eq!(buffer.len(), 5);
    assert_eq!(buffer.capacity(), 5);
    assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![7, 8, 9, 10, 11]);
}

#[test]
fn test_buffer_below_capacity() {
    let mut buffer = ReplayBuffer::new(10).unwrap();
    buffer.extend(0..3);
    assert_eq!(buffer.len(), 3);
    assert!(!buffer.is_empty());
    assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

    buffer.clear();
    assert!(buffer.is_empty());
}

#[test]
fn test_zero_capacity_is_rejected() {
    assert!(matches!(
        ReplayBuffer::<u32>::new(0),
        Err(NWinsError::InvalidArgument(_))
    ));
}

#[test]
fn test_rand_batch_draws_distinct_current_items() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut buffer = ReplayBuffer::new(20).unwrap();
    buffer.extend(0..50);
    let contents: HashSet<i32> = buffer.iter().copied().collect();

    for size in [0, 1, 7, 20] {
        let batch = buffer.rand_batch(size, &mut rng);
        assert_eq!(batch.len(), size);
        let distinct: HashSet<i32> = batch.iter().map(|&&item| item).collect();
        assert_eq!(distinct.len(), size);
        assert!(distinct.is_subset(&contents));
    }
}

#[test]
fn test_rand_batch_larger_than_buffer_returns_everything() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut buffer = ReplayBuffer::new(8).unwrap();
    buffer.extend(0..4);

    let mut batch: Vec<i32> = buffer.rand_batch(10, &mut rng).into_iter().copied().collect();
    batch.sort_unstable();
    assert_eq!(batch, vec![0, 1, 2, 3]);
}

#[test]
fn test_rand_batch_covers_the_buffer() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut buffer = ReplayBuffer::new(6).unwrap();
    buffer.extend(0..6);

    let mut seen = HashSet::new();
    for _ in 0..100 {
        seen.extend(buffer.rand_batch(1, &mut rng).into_iter().copied());
    }
    assert_eq!(seen.len(), 6);
}
