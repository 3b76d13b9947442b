//! CPU and memory exercises run by the orchestrator alongside the pool.

use crate::system::SystemInfo;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Instant;

/// Hex characters kept from each link of a hash chain
pub const HASH_PREFIX_LEN: usize = 16;
/// Inserts performed by [`simulate_memory_operations`]
pub const MEMORY_OPERATIONS: usize = 5000;
/// Links in the report's hash chain
pub const HASH_SAMPLES: usize = 500;
/// Fibonacci index computed for the report
pub const FIBONACCI_INDEX: u32 = 40;
/// Upper bound (inclusive) of the report's prime sieve
pub const PRIME_LIMIT: usize = 20_000;

/// Build a SHA-256 chain of `len` links.
///
/// The chain starts from the text of a random float. Each link hashes the
/// raw digest bytes of the previous one and keeps the first
/// [`HASH_PREFIX_LEN`] hex characters.
pub fn generate_hash_chain(len: usize) -> Vec<String> {
    hash_chain_from(fastrand::f64().to_string().as_bytes(), len)
}

/// [`generate_hash_chain`] with an explicit seed
pub fn hash_chain_from(seed: &[u8], len: usize) -> Vec<String> {
    let mut chain = Vec::with_capacity(len);
    let mut digest = Sha256::digest(seed);
    for _ in 0..len {
        let mut link = hex::encode(&digest);
        link.truncate(HASH_PREFIX_LEN);
        chain.push(link);
        digest = Sha256::digest(&digest);
    }
    chain
}

/// Fill a map with random byte buffers and return its length.
///
/// Keys are `key_{i}_{r}` with `r` in `1..=1000`, so all keys are distinct
/// and the result is always [`MEMORY_OPERATIONS`].
pub fn simulate_memory_operations() -> usize {
    let mut rng = fastrand::Rng::new();
    let mut memory: HashMap<String, Vec<u8>> = HashMap::with_capacity(MEMORY_OPERATIONS);
    for i in 0..MEMORY_OPERATIONS {
        let key = format!("key_{}_{}", i, rng.u32(1..=1000));
        let len = rng.usize(64..=256);
        let value: Vec<u8> = std::iter::repeat_with(|| rng.u8(..)).take(len).collect();
        memory.insert(key, value);
    }
    memory.len()
}

/// Iterative Fibonacci, `fibonacci(0) == 0`
pub fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        (a, b) = (b, a.wrapping_add(b));
    }
    a
}

/// Primes up to and including `limit` (sieve of Eratosthenes)
pub fn prime_sieve(limit: usize) -> Vec<usize> {
    if limit < 2 {
        return Vec::new();
    }
    let mut sieve = vec![true; limit + 1];
    sieve[0] = false;
    sieve[1] = false;

    let mut i = 2;
    while i * i <= limit {
        if sieve[i] {
            for multiple in (i * i..=limit).step_by(i) {
                sieve[multiple] = false;
            }
        }
        i += 1;
    }

    sieve
        .iter()
        .enumerate()
        .filter_map(|(n, &is_prime)| is_prime.then_some(n))
        .collect()
}

/// Results of the analysis exercises
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    /// Host snapshot
    pub system_info: SystemInfo,
    /// Hash chain links
    pub hash_samples: Vec<String>,
    /// Entries created by the memory exercise
    pub memory_objects: usize,
    /// `fibonacci(40)`
    pub fibonacci: u64,
    /// Number of primes up to 20000
    pub primes: usize,
    /// Workers running when the analysis ran
    pub worker_count: usize,
}

impl AnalysisReport {
    /// Run every exercise
    pub fn run(started_at: Instant, worker_count: usize) -> Self {
        Self {
            system_info: SystemInfo::collect(started_at),
            hash_samples: generate_hash_chain(HASH_SAMPLES),
            memory_objects: simulate_memory_operations(),
            fibonacci: fibonacci(FIBONACCI_INDEX),
            primes: prime_sieve(PRIME_LIMIT).len(),
            worker_count,
        }
    }
}
