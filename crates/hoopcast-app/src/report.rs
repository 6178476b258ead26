// Plain-text rendering of an analysis report.

use std::fmt::Write;

use hoopcast_basketball::pipeline::AnalysisReport;
use hoopcast_basketball::valuation::adjust::AdjustedRecommendation;
use hoopcast_basketball::valuation::availability::{AvailabilityFlag, RecentActivity};

const NAME_WIDTH: usize = 22;
const RULE: &str = "----------------------------------------------------------------------------";

/// Render the full report. `top_n` bounds the ranked table.
pub fn render_text(report: &AnalysisReport, top_n: usize) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report, top_n);
    out
}

fn write_report(out: &mut String, report: &AnalysisReport, top_n: usize) -> std::fmt::Result {
    writeln!(out, "{} | waiver report as of {}", report.league_name, report.as_of)?;
    writeln!(
        out,
        "pool {} | candidates {} | ranked {}",
        report.pool_size,
        report.candidates_considered,
        report.recommendations.len()
    )?;
    if !report.excluded.is_empty() {
        writeln!(out, "excluded (out for season): {}", report.excluded.join(", "))?;
    }

    write_rankings(out, &report.recommendations, top_n)?;
    write_roster(out, report)?;
    write_bidding(out, report)?;
    Ok(())
}

fn write_rankings(out: &mut String, recs: &[AdjustedRecommendation], top_n: usize) -> std::fmt::Result {
    section(out, "TOP PICKUPS")?;
    if recs.is_empty() {
        return writeln!(out, "no eligible free agents");
    }
    writeln!(
        out,
        "{:>3}  {:<w$} {:<4} {:>6} {:>6} {:>5} {:>5} {:>3}  {}",
        "#",
        "Player",
        "Team",
        "Adj",
        "Z",
        "Avail",
        "Sched",
        "G",
        "Notes",
        w = NAME_WIDTH
    )?;
    for rec in recs.iter().take(top_n) {
        writeln!(
            out,
            "{:>3}  {:<w$} {:<4} {:>6.2} {:>6.2} {:>5.2} {:>5.3} {:>3}  {}",
            rec.rank,
            truncate(&rec.name, NAME_WIDTH),
            rec.team,
            rec.adj_score,
            rec.z_total,
            rec.avail_mult,
            rec.schedule_mult,
            rec.games_this_week,
            notes(rec),
            w = NAME_WIDTH
        )?;
    }
    Ok(())
}

/// Compact flags column: availability, injury, news, hot and trending.
fn notes(rec: &AdjustedRecommendation) -> String {
    let mut parts: Vec<String> = Vec::new();
    if rec.availability_flag != AvailabilityFlag::Healthy {
        parts.push(rec.availability_flag.label().to_string());
    }
    if rec.recent_activity != RecentActivity::Active {
        parts.push(rec.recent_activity.label().to_string());
    }
    if let Some(note) = &rec.injury_note {
        parts.push(note.clone());
    }
    if !rec.news_labels.is_empty() {
        parts.push(format!("news {} (x{:.2})", rec.news_labels.join("/"), rec.news_mult));
    }
    if rec.is_hot {
        if let Some(delta) = rec.z_delta {
            parts.push(format!("HOT +{delta:.2}z"));
        }
    }
    if rec.is_trending {
        parts.push("trending".to_string());
    }
    parts.join("; ")
}

fn write_roster(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    section(out, "MY ROSTER")?;
    if report.team_needs.is_empty() {
        return writeln!(out, "no roster players matched; need weighting skipped");
    }

    let strength = &report.roster_strength;
    writeln!(
        out,
        "{} roster players | strength {} (avg z {:+.2}, bid factor x{:.2})",
        report.team_needs.roster_size, strength.label, strength.avg_z, strength.bid_factor
    )?;
    let needs: Vec<String> = report
        .team_needs
        .categories
        .iter()
        .map(|c| format!("{} {:+.2}", c.name, c.avg_z))
        .collect();
    writeln!(out, "category z (weakest first): {}", needs.join(", "))?;
    writeln!(out, "targeting: {}", report.weakest_categories.join(", "))?;
    if !strength.strong_cats.is_empty() {
        writeln!(out, "strong: {}", strength.strong_cats.join(", "))?;
    }
    if !strength.weak_cats.is_empty() {
        writeln!(out, "weak: {}", strength.weak_cats.join(", "))?;
    }

    if !report.droppables.is_empty() {
        writeln!(out)?;
        writeln!(out, "Drop candidates:")?;
        for drop in &report.droppables {
            let z = drop
                .z_total
                .map_or_else(|| "n/a".to_string(), |z| format!("{z:+.2}"));
            let forced = if drop.forced { " (configured)" } else { "" };
            writeln!(out, "  {:<w$} z {}{}", drop.name, z, forced, w = NAME_WIDTH)?;
        }
    }

    for impact in &report.roster_impacts {
        let gains: Vec<String> = impact
            .gains()
            .into_iter()
            .map(|(cat, d)| format!("{cat} {d:+.2}"))
            .collect();
        writeln!(
            out,
            "  add {} / drop {}: net {:+.2}{}",
            impact.add,
            impact.drop,
            impact.net,
            if gains.is_empty() {
                String::new()
            } else {
                format!(" ({})", gains.join(", "))
            }
        )?;
    }
    Ok(())
}

fn write_bidding(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    section(out, "FAAB")?;

    let summary = &report.bid_history.summary;
    match (summary.median, summary.mean, summary.max) {
        (Some(median), Some(mean), Some(max)) => writeln!(
            out,
            "league bids: {} paid, {} free | median ${:.1}, mean ${:.1}, max ${} ({} premium)",
            summary.faab_bids, summary.free_pickups, median, mean, max, summary.premium_count
        )?,
        _ => writeln!(out, "league bids: no paid history")?,
    }

    if let Some(budget) = &report.budget {
        writeln!(
            out,
            "budget: ${} of ${} | {} weeks left (${:.1}/wk) | {} x{:.2} | max bid ${}{}",
            budget.remaining_budget,
            budget.total_budget,
            budget.weeks_remaining,
            budget.weekly_budget,
            budget.status.label(),
            budget.budget_factor,
            budget.max_single_bid,
            if budget.is_playoffs { " | playoffs" } else { "" }
        )?;
        if let Some(standing) = &budget.standing {
            writeln!(
                out,
                "league standing: #{} of {} by remaining budget",
                standing.rank, standing.size
            )?;
        }
    }
    writeln!(out, "{}", report.transaction_limit.message)?;

    if report.bid_suggestions.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(
        out,
        "{:<w$} {:<10} {:>5} {:>5}  {:<6}  {}",
        "Player",
        "Tier",
        "Base",
        "Bid",
        "Conf",
        "Reason",
        w = NAME_WIDTH
    )?;
    for s in &report.bid_suggestions {
        writeln!(
            out,
            "{:<w$} {:<10} {:>5} {:>5}  {:<6}  {}",
            truncate(&s.player, NAME_WIDTH),
            s.tier,
            format!("${}", s.base_bid),
            format!("${}", s.suggested_bid),
            s.confidence.label(),
            s.reason,
            w = NAME_WIDTH
        )?;
    }
    if let Some(range) = report.bid_suggestions.first().and_then(|s| s.premium_range.as_ref()) {
        writeln!(
            out,
            "premium pickups: {} bids, ${}-${} (median ${:.0})",
            range.count, range.min, range.max, range.median
        )?;
    }
    Ok(())
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{RULE}")
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut s: String = name.chars().take(width - 1).collect();
        s.push('.');
        s
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
