//! Identifier generation for users, jobs and applications.
//!
//! Stores take an `Arc<dyn IdGenerator>` so tests can swap the random
//! generator for a deterministic counter.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Namespace for name-based user ids derived from an email address.
const USER_NAMESPACE: Uuid = Uuid::from_u128(0x5f1c_2a7e_93d4_4b0e_8a61_0c7d_e2f4_9b38);

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random v4 identifiers. Default for the running service.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Monotonic counter encoded into the low bits of a UUID.
/// Never repeats within a process, even for back-to-back calls.
#[derive(Debug, Default)]
pub struct SequentialGenerator {
    counter: AtomicU64,
}

impl SequentialGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialGenerator {
    fn next_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(u128::from(n))
    }
}

/// Stable id for an email address: the same (case-insensitive) email always
/// maps to the same user id.
pub fn user_id_for_email(email: &str) -> Uuid {
    Uuid::new_v5(&USER_NAMESPACE, email.trim().to_lowercase().as_bytes())
}
