//! Locally generated identifiers.

use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate an offline id: `offline_<unix-millis>_<9 base-36 chars>`.
///
/// Ids sort roughly by creation time and are unique per device with
/// overwhelming probability. They double as idempotency tokens.
#[must_use]
pub fn generate_offline_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("offline_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_offline_id_shape() {
        let id = generate_offline_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "offline");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_offline_ids_unique() {
        let ids: HashSet<String> = (0..500).map(|_| generate_offline_id()).collect();
        assert_eq!(ids.len(), 500);
    }
}
