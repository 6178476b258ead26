// Integration tests for the waiver engine.
//
// These drive `run_analysis` and the bidding helpers through the public
// API with a small but complete league snapshot: nine categories, a
// schedule, injuries, news, recent box scores, bid history and budgets.

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use hoopcast_basketball::bidding::budget::compute_budget_status;
use hoopcast_basketball::bidding::history::{split_outliers, BidHistoryAnalysis, TierStats};
use hoopcast_basketball::bidding::suggest::{apply_adjustments, suggest_bid, BidContext};
use hoopcast_basketball::bidding::tiers::TierTable;
use hoopcast_basketball::pipeline::run_analysis;
use hoopcast_basketball::valuation::adjust::{compose, CandidateSignals};
use hoopcast_basketball::valuation::availability::{Availability, AvailabilityFlag, RecentActivity};
use hoopcast_basketball::valuation::needs::{need_score, RosterStrength};
use hoopcast_basketball::valuation::schedule::schedule_multiplier;
use hoopcast_basketball::valuation::zscore::NormalizedScore;
use hoopcast_core::config::{BidStrategy, BiddingConfig, EngineConfig, FaabConfig, NeedConfig, ScheduleConfig};
use hoopcast_core::records::*;

// ===========================================================================
// Test helpers
// ===========================================================================

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
}

/// Per-game line: pts, reb, ast, stl, blk, fg3m, tov, (fgm, fga), (ftm, fta).
fn make_player(
    name: &str,
    team: &str,
    gp: u32,
    counting: [f64; 7],
    fg: (f64, f64),
    ft: (f64, f64),
) -> PlayerSeasonRecord {
    let [pts, reb, ast, stl, blk, fg3m, tov] = counting;
    let stats = [
        ("PTS", pts),
        ("REB", reb),
        ("AST", ast),
        ("STL", stl),
        ("BLK", blk),
        ("FG3M", fg3m),
        ("TOV", tov),
        ("FGM", fg.0),
        ("FGA", fg.1),
        ("FG_PCT", fg.0 / fg.1),
        ("FTM", ft.0),
        ("FTA", ft.1),
        ("FT_PCT", ft.0 / ft.1),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    PlayerSeasonRecord {
        player_id: name.to_lowercase().replace(' ', "_"),
        name: name.into(),
        team: team.into(),
        games_played: gp,
        team_games_played: Some(40),
        minutes: 28.0,
        status: None,
        stats,
    }
}

fn make_line(player_id: &str, days_ago: i64, started: bool, pts: f64, reb: f64) -> RecentGameLine {
    RecentGameLine {
        player_id: player_id.into(),
        game_date: as_of() - Duration::days(days_ago),
        started,
        stats: [("PTS".to_string(), pts), ("REB".to_string(), reb)].into_iter().collect(),
    }
}

fn make_injury(name: &str, status: InjuryStatus, blurb: &str) -> InjuryReport {
    InjuryReport {
        player_name: name.into(),
        team: "UNK".into(),
        status,
        blurb: blurb.into(),
        suspension_games: None,
        return_imminent: false,
        extended_absence: false,
    }
}

fn make_bid(name: &str, amount: u32, team: &str, day: u32) -> HistoricalBidRecord {
    HistoricalBidRecord {
        player_name: name.into(),
        amount,
        team: team.into(),
        timestamp: Some(Utc.with_ymd_and_hms(2026, 1, day, 9, 0, 0).unwrap()),
    }
}

/// Games for the week of Jan 12: BOS x4, LAL x3, MIA x2, DEN x4.
fn make_schedule() -> Vec<ScheduledGame> {
    let game = |d: u32, home: &str, away: &str| ScheduledGame {
        date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
        home: home.into(),
        away: away.into(),
    };
    vec![
        game(12, "BOS", "LAL"),
        game(13, "DEN", "MIA"),
        game(14, "BOS", "DEN"),
        game(15, "LAL", "DEN"),
        game(16, "BOS", "MIA"),
        game(17, "LAL", "BOS"),
        game(18, "DEN", "ORL"),
    ]
}

fn make_snapshot() -> LeagueSnapshot {
    let players = vec![
        // My roster.
        make_player("Anchor Guard", "BOS", 38, [24.0, 4.0, 7.0, 1.2, 0.3, 2.8, 2.5], (8.5, 18.0), (5.0, 5.8)),
        make_player("Stretch Four", "LAL", 36, [15.0, 6.0, 2.0, 0.8, 0.6, 2.2, 1.4], (5.5, 12.0), (2.0, 2.5)),
        make_player("Backup Wing", "MIA", 30, [9.0, 3.0, 1.5, 0.6, 0.2, 1.2, 1.0], (3.4, 8.0), (1.0, 1.4)),
        // Free agents.
        make_player("Glass Cleaner", "DEN", 37, [11.0, 11.5, 1.5, 0.7, 1.9, 0.1, 1.3], (4.6, 8.0), (1.5, 2.6)),
        make_player("Microwave Scorer", "BOS", 34, [18.0, 3.0, 2.5, 0.9, 0.2, 2.6, 1.8], (6.5, 15.0), (3.5, 4.0)),
        make_player("Quiet Vet", "MIA", 39, [8.0, 4.0, 3.0, 1.0, 0.4, 1.0, 0.9], (3.0, 6.8), (1.0, 1.3)),
        make_player("Rim Runner", "LAL", 14, [10.0, 9.0, 1.0, 0.5, 1.5, 0.0, 1.1], (4.2, 6.5), (1.5, 2.8)),
        make_player("Out For Year", "DEN", 20, [20.0, 8.0, 5.0, 1.1, 0.8, 1.5, 2.0], (7.5, 15.0), (3.0, 3.6)),
        make_player("Sprained Ankle", "BOS", 35, [13.0, 5.0, 4.0, 1.3, 0.4, 1.8, 1.6], (5.0, 11.0), (2.0, 2.4)),
        // Rostered elsewhere.
        make_player("Their Star", "DEN", 40, [28.0, 10.0, 8.0, 1.5, 1.0, 2.0, 3.2], (10.0, 19.0), (6.0, 7.0)),
        // Below eligibility.
        make_player("Two Game Rookie", "LAL", 2, [30.0, 15.0, 10.0, 3.0, 3.0, 5.0, 1.0], (12.0, 20.0), (4.0, 4.0)),
    ];

    LeagueSnapshot {
        as_of: as_of(),
        players,
        recent_games: vec![
            make_line("microwave_scorer", 1, true, 31.0, 4.0),
            make_line("microwave_scorer", 3, true, 26.0, 5.0),
            make_line("microwave_scorer", 5, false, 24.0, 3.0),
            make_line("glass_cleaner", 2, false, 9.0, 13.0),
            make_line("quiet_vet", 12, false, 6.0, 3.0),
        ],
        injuries: vec![
            make_injury("Out For Year", InjuryStatus::OutForSeason, "Torn ACL, season-ending surgery."),
            make_injury("Sprained Ankle", InjuryStatus::DayToDay, "Game-time decision Thursday."),
        ],
        news: vec![NewsItem {
            player_name: "Glass Cleaner".into(),
            headline: "Glass Cleaner moving into starting lineup".into(),
            text: "Coach confirmed he will start at center.".into(),
        }],
        trends: vec![OwnershipTrend {
            player_name: "Microwave Scorer".into(),
            percent_owned: 35.0,
            percent_owned_delta: 18.0,
        }],
        schedule: make_schedule(),
        game_weeks: Vec::new(),
        bids: vec![
            make_bid("Glass Cleaner", 6, "Team 2", 5),
            make_bid("Microwave Scorer", 4, "Team 3", 6),
            make_bid("Quiet Vet", 1, "Team 4", 7),
            make_bid("Rim Runner", 2, "Team 2", 8),
            make_bid("Sprained Ankle", 3, "Team 5", 9),
            make_bid("Returning Star", 61, "Team 3", 10),
            make_bid("Quiet Vet", 0, "My Team", 12),
            make_bid("Backup Wing", 2, "My Team", 13),
        ],
        settings: LeagueSettings {
            name: "Integration League".into(),
            num_teams: Some(4),
            current_week: Some(13),
            end_week: Some(23),
            playoff_start_week: Some(21),
            uses_faab: Some(true),
            stat_ids: Vec::new(),
            max_weekly_adds: Some(4),
        },
        my_roster: vec!["Anchor Guard".into(), "Stretch Four".into(), "Backup Wing".into()],
        owned_players: vec!["Their Star".into()],
        my_team: "My Team".into(),
        my_remaining_budget: Some(80),
        league_budgets: vec![
            ManagerBudget { team: "My Team".into(), remaining: 80 },
            ManagerBudget { team: "Team 2".into(), remaining: 40 },
            ManagerBudget { team: "Team 3".into(), remaining: 120 },
            ManagerBudget { team: "Team 4".into(), remaining: 75 },
        ],
        my_transactions_this_week: None,
    }
}

fn make_config(snapshot: &LeagueSnapshot) -> EngineConfig {
    EngineConfig::default().from_league_settings(&snapshot.settings)
}

fn make_score(zs: &[(&str, f64)]) -> NormalizedScore {
    let zscores: std::collections::BTreeMap<String, f64> =
        zs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    NormalizedScore {
        player_id: "p".into(),
        name: "P".into(),
        team: "BOS".into(),
        total: zscores.values().sum(),
        zscores,
        eligible: true,
    }
}

// ===========================================================================
// Full pipeline
// ===========================================================================

#[test]
fn pipeline_is_idempotent() {
    let snapshot = make_snapshot();
    let config = make_config(&snapshot);
    let first = run_analysis(&snapshot, &config).unwrap();
    let second = run_analysis(&snapshot, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn season_ending_injury_never_appears() {
    let snapshot = make_snapshot();
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();
    assert_eq!(report.excluded, vec!["Out For Year"]);
    assert!(report.recommendations.iter().all(|r| r.name != "Out For Year"));
    assert!(report.recommendations.iter().all(|r| r.injury_mult != 0.0));
}

#[test]
fn owned_and_ineligible_players_are_not_candidates() {
    let snapshot = make_snapshot();
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();
    let names: Vec<&str> = report.recommendations.iter().map(|r| r.name.as_str()).collect();
    for absent in ["Their Star", "Two Game Rookie", "Anchor Guard", "Backup Wing"] {
        assert!(!names.contains(&absent), "{absent} should not be ranked");
    }
    assert_eq!(report.recommendations.len(), 5);
    let ranks: Vec<usize> = report.recommendations.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    assert!(report
        .recommendations
        .windows(2)
        .all(|w| w[0].adj_score >= w[1].adj_score));
}

#[test]
fn signals_reach_the_recommendations() {
    let snapshot = make_snapshot();
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();
    let find = |name: &str| report.recommendations.iter().find(|r| r.name == name).unwrap();

    let center = find("Glass Cleaner");
    assert!(center.news_labels.contains(&"Starting".to_string()));
    assert!(center.news_labels.contains(&"13 REB".to_string()));
    assert_eq!(center.games_this_week, 4);

    let scorer = find("Microwave Scorer");
    assert!(scorer.is_trending);
    assert!(scorer.trending_boost > 0.0);
    assert!(scorer.news_labels.contains(&"31 PTS".to_string()));

    let ankle = find("Sprained Ankle");
    assert_eq!(ankle.injury_label, Some("DTD"));
    assert_eq!(ankle.injury_mult, 0.95);

    let vet = find("Quiet Vet");
    assert_eq!(vet.recent_activity, RecentActivity::Inactive);

    let runner = find("Rim Runner");
    assert_eq!(runner.availability_flag, AvailabilityFlag::Fragile);
}

#[test]
fn bidding_sections_are_populated() {
    let snapshot = make_snapshot();
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();

    assert_eq!(report.bid_history.summary.premium_count, 1);
    assert_eq!(report.bid_history.summary.free_pickups, 1);
    assert!(!report.bid_history.tiers.percentile_based);

    let budget = report.budget.as_ref().unwrap();
    assert_eq!(budget.weeks_remaining, 8);
    assert_eq!(budget.max_single_bid, 40);
    let standing = budget.standing.as_ref().unwrap();
    assert_eq!((standing.rank, standing.size), (2, 4));

    // Two of my adds since Monday Jan 12, limit taken from the league.
    assert_eq!(report.transaction_limit.used, 2);
    assert_eq!(report.transaction_limit.limit, 4);

    assert_eq!(report.bid_suggestions.len(), report.recommendations.len());
    for s in &report.bid_suggestions {
        assert!(s.suggested_bid >= 1);
        assert_eq!(s.strategy, BidStrategy::Competitive);
        assert_eq!(s.premium_range.as_ref().unwrap().max, 61);
    }
}

#[test]
fn roster_analysis_offers_drops_and_impacts() {
    let snapshot = make_snapshot();
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();
    assert_eq!(report.team_needs.roster_size, 3);
    assert_eq!(report.weakest_categories.len(), 3);
    assert_eq!(report.droppables.len(), 3);
    assert_eq!(report.droppables[0].name, "Backup Wing");
    assert_eq!(report.roster_impacts.len(), 3);
    assert_eq!(report.roster_impacts[0].add, report.recommendations[0].name);
}

#[test]
fn faab_disabled_skips_suggestions() {
    let mut snapshot = make_snapshot();
    snapshot.settings.uses_faab = Some(false);
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();
    assert!(report.bid_suggestions.is_empty());
    assert!(report.budget.is_none());
}

#[test]
fn report_serializes_with_readable_labels() {
    let snapshot = make_snapshot();
    let report = run_analysis(&snapshot, &make_config(&snapshot)).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["as_of"], "2026-01-14");
    assert_eq!(value["league_name"], "Integration League");
    let ankle = value["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "Sprained Ankle")
        .unwrap();
    assert_eq!(ankle["injury_label"], "DTD");
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn raising_a_weak_category_never_lowers_adj_score() {
    let weakest = vec!["BLK".to_string(), "REB".to_string(), "FT_PCT".to_string()];
    let cfg = NeedConfig::default();
    let availability = Availability {
        rate: 0.9,
        flag: AvailabilityFlag::Healthy,
        recent: RecentActivity::Active,
        days_since_last_game: Some(1),
        multiplier: 1.0,
    };
    let mut previous = f64::NEG_INFINITY;
    for step in 0..20 {
        let blk = -2.0 + step as f64 * 0.25;
        let score = make_score(&[("PTS", 0.8), ("BLK", blk), ("REB", -0.3)]);
        let rec = compose(CandidateSignals {
            score: &score,
            need_score: need_score(&score, &weakest, &cfg),
            availability,
            injury: None,
            schedule_mult: 1.05,
            games_this_week: 4,
            news: None,
            hot: None,
            trending: None,
        })
        .unwrap();
        assert!(rec.adj_score >= previous);
        previous = rec.adj_score;
    }
}

#[test]
fn tiers_are_monotonic_for_percentile_tables() {
    let pool: Vec<f64> = (0..40).map(|i| (i as f64 * 0.37).sin() * 4.0 + 2.0).collect();
    let table = TierTable::from_pool(&pool, &BiddingConfig::default());
    assert!(table.percentile_based);
    let position = |score: f64| {
        let name = table.assign(score);
        table.tiers.iter().position(|t| t.name == name).unwrap()
    };
    let mut prev = position(-10.0);
    for i in -100..150 {
        let idx = position(i as f64 * 0.1);
        assert!(idx <= prev);
        prev = idx;
    }
}

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn outlier_threshold_example() {
    let (standard, premium, threshold) = split_outliers(&[1, 1, 2, 2, 3, 3, 4, 50], 1.5, 15.0);
    assert_eq!(threshold, Some(15.0));
    assert_eq!(premium, vec![50]);
    assert_eq!(standard.len(), 7);
}

#[test]
fn aggressive_bid_example() {
    // Tier "Solid" with median 8, p25 4, p75 15 over six bids.
    let records: Vec<HistoricalBidRecord> = [4, 4, 8, 8, 15, 15]
        .into_iter()
        .map(|a| HistoricalBidRecord {
            player_name: "Solid Pick".into(),
            amount: a,
            team: "T".into(),
            timestamp: None,
        })
        .collect();
    let cfg = BiddingConfig {
        premium_floor: 100.0,
        ..BiddingConfig::default()
    };
    let analysis = BidHistoryAnalysis::analyze(
        &records,
        &|_: &str| Some(3.0),
        TierTable::from_specs(&cfg.default_tiers),
        &cfg,
    );
    let stats: &TierStats = analysis.tier_stats("Solid").unwrap();
    assert_eq!((stats.median, stats.p25, stats.p75, stats.count), (8.0, Some(4), Some(15), 6));

    let s = suggest_bid("X", "BOS", 3.0, &analysis, BidStrategy::Aggressive, 1, &BidContext::default());
    assert_eq!(s.suggested_bid, 15);
}

#[test]
fn budget_cap_example() {
    let settings = LeagueSettings {
        current_week: Some(10),
        end_week: Some(23),
        playoff_start_week: Some(21),
        ..LeagueSettings::default()
    };
    let budget = compute_budget_status(20, &settings, as_of(), "Me", &[], &FaabConfig::default());
    assert_eq!(budget.max_single_bid, 10);
    let ctx = BidContext {
        budget: Some(&budget),
        ..BidContext::default()
    };
    assert_eq!(apply_adjustments(40, &ctx), 10);
}

#[test]
fn scaled_bid_stays_within_budget_caps() {
    let settings = LeagueSettings {
        current_week: Some(10),
        end_week: Some(23),
        playoff_start_week: Some(21),
        ..LeagueSettings::default()
    };
    let roster = RosterStrength {
        avg_z: -2.0,
        strong_cats: Vec::new(),
        weak_cats: vec!["PTS".into()],
        label: "Weak roster",
        bid_factor: 1.3,
    };

    let budget = compute_budget_status(20, &settings, as_of(), "Me", &[], &FaabConfig::default());
    let ctx = BidContext {
        budget: Some(&budget),
        schedule_games: Some(6),
        roster: Some(&roster),
        ..BidContext::default()
    };
    // 10 after the budget step, 16 after schedule and roster, capped back to 10.
    assert_eq!(apply_adjustments(40, &ctx), 10);

    let whole_budget = FaabConfig {
        max_bid_percent: 1.0,
        ..FaabConfig::default()
    };
    let budget = compute_budget_status(20, &settings, as_of(), "Me", &[], &whole_budget);
    assert_eq!(budget.max_single_bid, 20);
    let ctx = BidContext {
        budget: Some(&budget),
        ..ctx
    };
    assert_eq!(apply_adjustments(40, &ctx), 20);
}

#[test]
fn schedule_delta_example() {
    let m = schedule_multiplier(5, 3.5, None, &ScheduleConfig::default());
    assert!((m - 1.15).abs() < 1e-9);
}
