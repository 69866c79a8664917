use chrono::{DateTime, Utc};

use crate::game::types::PlayerRecord;

/// Restores one point of spiritual power per `interval_secs` elapsed since
/// the record was last saved, capped at the maximum. Returns the points
/// restored.
///
/// When anything is restored `updated_at` moves to `now`, so applying this
/// twice at the same instant restores nothing the second time.
pub fn apply_passive_regen(player: &mut PlayerRecord, now: DateTime<Utc>, interval_secs: u64) -> u32 {
    if interval_secs == 0 || player.spiritual_power >= player.max_spiritual_power {
        return 0;
    }
    let elapsed = (now - player.last_saved_at()).num_seconds();
    if elapsed <= 0 {
        return 0;
    }
    let points = (elapsed as u64 / interval_secs).min(u64::from(u32::MAX)) as u32;
    let restored = player.restore_spiritual_power(points);
    if restored > 0 {
        player.updated_at = now;
    }
    restored
}
