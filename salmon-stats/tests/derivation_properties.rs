use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use salmon_stats::constants::BOSS_IDS;
use salmon_stats::result::{RawBossEliminations, RawPlayerResult, RawSpecialUse};
use salmon_stats::{BossId, RawMatchResult, Stat, derive};

const SAMPLE_SIZE: usize = 500;

/// A roster whose kill counts never exceed the spawn counts.
fn random_result(rng: &mut SmallRng) -> RawMatchResult {
    let players = rng.gen_range(1..=4);
    let waves = rng.gen_range(1..=3);
    let mut boss_appearances = BTreeMap::new();
    let mut kills: Vec<BTreeMap<BossId, u32>> = vec![BTreeMap::new(); players];

    for boss in BOSS_IDS {
        if rng.gen_bool(0.2) {
            continue;
        }
        let spawned: u32 = rng.gen_range(0..=12);
        boss_appearances.insert(boss, spawned);
        let mut remaining = spawned;
        for counts in &mut kills {
            if remaining == 0 || rng.gen_bool(0.3) {
                continue;
            }
            let killed = rng.gen_range(0..=remaining);
            remaining -= killed;
            counts.insert(boss, killed);
        }
    }

    let player_results = kills
        .into_iter()
        .enumerate()
        .map(|(seat, counts)| RawPlayerResult {
            player_id: format!("player-{seat}"),
            name: None,
            weapon_id: 40,
            special_id: rng.gen_range(0..10),
            special_uses: (0..rng.gen_range(0..=waves))
                .map(|_| RawSpecialUse {
                    id: None,
                    count: rng.gen_range(0..=3),
                })
                .collect(),
            boss_eliminations: RawBossEliminations { counts },
            death: rng.gen_range(0..=6),
            golden_eggs: if rng.gen_bool(0.1) { 0 } else { rng.gen_range(0..40) },
            power_eggs: rng.gen_range(0..2_000),
            rescue: rng.gen_range(0..=5),
        })
        .collect();

    RawMatchResult {
        id: None,
        schedule_id: "2022050107".to_string(),
        start_at: None,
        end_at: None,
        clear_waves: waves,
        danger_rate: None,
        fail_reason_id: None,
        player_results,
        boss_appearances,
        waves: Vec::new(),
        member_accounts: Vec::new(),
    }
}

#[test]
fn scalar_highest_matches_roster_max() {
    let mut rng = SmallRng::seed_from_u64(0x5A1_0000);
    for _ in 0..SAMPLE_SIZE {
        let raw = random_result(&mut rng);
        raw.validate().expect("generated result validates");
        let result = derive(raw);
        for stat in Stat::ALL {
            let max = result
                .player_results()
                .iter()
                .map(|p| p.stat(stat))
                .max()
                .unwrap_or(0);
            assert_eq!(result.highest().of(stat), max);
            assert_eq!(result.highest().winner(stat), Some(max).filter(|m| *m > 0));
            for player in result.player_results() {
                let value = player.stat(stat);
                assert_eq!(result.has_most(stat, value), value > 0 && value == max);
            }
        }
    }
}

#[test]
fn boss_highest_and_totals_are_per_category() {
    let mut rng = SmallRng::seed_from_u64(0xB055);
    for _ in 0..SAMPLE_SIZE {
        let result = derive(random_result(&mut rng));
        for boss in BOSS_IDS {
            let per_player: Vec<u32> = result
                .player_results()
                .iter()
                .map(|p| p.eliminations_of(boss))
                .collect();
            let max = per_player.iter().copied().max().unwrap_or(0);
            let total: u32 = per_player.iter().sum();
            assert_eq!(result.highest().of_boss(boss), max, "boss {boss}");
            assert_eq!(result.total_boss_elimination(boss), total, "boss {boss}");
            assert!(
                total <= result.total_boss_spawn(boss),
                "boss {boss}: {total} kills > {} spawns",
                result.total_boss_spawn(boss)
            );
        }
    }
}

#[test]
fn appeared_bosses_are_canonical_and_spawned() {
    let mut rng = SmallRng::seed_from_u64(0xA77E);
    for _ in 0..SAMPLE_SIZE {
        let result = derive(random_result(&mut rng));
        let appeared = result.appeared_boss_ids();
        let expected: Vec<BossId> = BOSS_IDS
            .into_iter()
            .filter(|boss| result.boss_appearances().get(boss).copied().unwrap_or(0) > 0)
            .collect();
        assert_eq!(appeared, expected);
    }
}

#[test]
fn least_deaths_marks_every_tie() {
    let mut rng = SmallRng::seed_from_u64(0xDEAD);
    for _ in 0..SAMPLE_SIZE {
        let result = derive(random_result(&mut rng));
        let min = result
            .player_results()
            .iter()
            .map(|p| p.death)
            .min()
            .expect("roster is never empty");
        let marked = result
            .player_results()
            .iter()
            .filter(|p| result.has_least_deaths(p.death))
            .count();
        let tied = result
            .player_results()
            .iter()
            .filter(|p| p.death == min)
            .count();
        assert_eq!(marked, tied);
        assert!(marked >= 1);
    }
}

#[test]
fn specials_per_wave_cover_every_player_in_order() {
    let mut rng = SmallRng::seed_from_u64(0x5BEC);
    for _ in 0..SAMPLE_SIZE {
        let result = derive(random_result(&mut rng));
        for wave in 0..=4 {
            let usages = result.specials_used_in_wave(wave);
            assert_eq!(usages.len(), result.player_results().len());
            for (usage, player) in usages.iter().zip(result.player_results()) {
                assert_eq!(usage.special_id, player.special_id);
                let recorded = wave
                    .checked_sub(1)
                    .and_then(|idx| player.special_uses.get(idx))
                    .map_or(0, |u| u.count);
                assert_eq!(usage.count, recorded);
            }
        }
    }
}
