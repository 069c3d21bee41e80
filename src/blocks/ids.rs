//! block id allocation

use rand::Rng;

use super::tree::BlockProgram;
use super::types::BlockId;

/// exclusive upper bound for random block ids (ten decimal digits)
const RANDOM_ID_SPACE: u64 = 10_000_000_000;

/// hands out ids that are not yet used in a program
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_dummy: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next_dummy: 1 }
    }

    /// random base-36 id for a user block
    pub fn block_id(&mut self, program: &BlockProgram) -> BlockId {
        let mut rng = rand::thread_rng();
        loop {
            let id = to_base36(rng.gen_range(0..RANDOM_ID_SPACE));
            if !program.contains_id(&id) {
                return id;
            }
        }
    }

    /// sequential `DUMMY_<n>` id for a floating holder
    pub fn dummy_id(&mut self, program: &BlockProgram) -> BlockId {
        loop {
            let id = format!("DUMMY_{}", self.next_dummy);
            self.next_dummy += 1;
            if !program.contains_id(&id) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
