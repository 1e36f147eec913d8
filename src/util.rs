use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::stable_pair;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        for id in ["A", "B", "the-ancient-one", ""] {
            let first = stable_pair(id);
            let second = stable_pair(id);
            assert_eq!(first, second);
            assert!(first.0 >= -1.0 && first.0 <= 1.0);
            assert!(first.1 >= -1.0 && first.1 <= 1.0);
        }
    }

    #[test]
    fn stable_pair_separates_distinct_ids() {
        assert_ne!(stable_pair("A"), stable_pair("B"));
    }
}
