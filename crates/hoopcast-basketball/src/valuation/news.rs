// News and box-score signals.
//
// Injury blurbs and news articles are scanned for role, breakout, return
// and setback phrases; each matched label contributes its multiplier once
// and the multipliers compound. Recent standout box scores and starts add
// positive signals that merge by taking the larger multiplier.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use hoopcast_core::records::{NewsItem, RecentGameLine};
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::round_to;

// ---------------------------------------------------------------------------
// Keyword rules
// ---------------------------------------------------------------------------

struct KeywordRule {
    pattern: &'static str,
    label: &'static str,
    multiplier: f64,
    /// Phrases that cancel a match when they directly precede it.
    unless_preceded_by: &'static [&'static str],
}

const fn rule(pattern: &'static str, label: &'static str, multiplier: f64) -> KeywordRule {
    KeywordRule {
        pattern,
        label,
        multiplier,
        unless_preceded_by: &[],
    }
}

/// Positive rules first, then negative. Order matters only for which rule
/// claims a shared label first.
const KEYWORD_RULES: &[KeywordRule] = &[
    // Starting lineup / expanded role
    rule(r"\bstart(?:ing|ed|s)?\b.*\b(?:lineup|role|five|center|forward|guard)\b", "Starting", 1.15),
    rule(r"\bmov(?:ed|ing)\b.*\bstart(?:ing)?\b", "Starting", 1.15),
    rule(r"\binsert(?:ed)?\b.*\bstart(?:ing)?\b", "Starting", 1.15),
    rule(r"\bearn(?:ed|ing)\b.*\bstart(?:ing)?\b", "Starting", 1.15),
    rule(r"\bpromot(?:ed|ion)\b.*\b(?:start|role|lineup)\b", "Starting", 1.15),
    rule(r"\bstep(?:ping)?\s+into\b.*\bstart(?:ing)?\b", "Starting", 1.15),
    rule(r"\benter(?:ing|ed)\b.*\bstart(?:ing)?\b", "Starting", 1.15),
    rule(r"\brun\s+away\s+with\b.*\bstart(?:ing)?\b", "Starting", 1.12),
    rule(r"\bexpand(?:ed|ing)\b.*\brole\b", "Expanded Role", 1.10),
    rule(r"\bbig(?:ger)?\s+(?:opportunity|role)\b", "Expanded Role", 1.10),
    rule(r"\bfeatured\s+role\b", "Featured Role", 1.10),
    rule(r"\bgreen\s+light\b", "Green Light", 1.08),
    rule(r"\bnext\s+man\s+up\b", "Next Man Up", 1.12),
    // Breakout performances
    rule(r"\bcareer[- ]?high\b", "Career High", 1.12),
    rule(r"\bseason[- ]?high\b", "Season High", 1.10),
    rule(r"\bbest\s+game\b", "Best Game", 1.10),
    rule(r"\bbreakout\b", "Breakout", 1.10),
    rule(r"\b(?:3[0-9]|4[0-9]|5[0-9])\+?\s*(?:points?|pts)\b", "Big Scoring", 1.08),
    rule(r"\btriple[- ]?double\b", "Triple-Double", 1.08),
    rule(r"\bdouble[- ]?double\b", "Double-Double", 1.05),
    // Returning from injury
    rule(r"\breturn(?:ed|ing|s)?\s+(?:to\s+)?(?:action|practice|lineup|play|court)\b", "Returning", 1.10),
    rule(r"\bexpect(?:ed|s)?\s+(?:to\s+)?return\b", "Expected Return", 1.08),
    rule(r"\bnearing\s+(?:a\s+)?return\b", "Near Return", 1.08),
    rule(r"\btrending\b.*\breturn\b", "Near Return", 1.08),
    rule(r"\beligible\s+(?:to\s+)?return\b", "Eligible Return", 1.08),
    rule(r"\bcleared\b.*\b(?:play|return|action|practice|contact)\b", "Cleared", 1.12),
    rule(r"\bfull\s+(?:participant|practice|contact)\b", "Full Practice", 1.08),
    rule(r"\b(?:no|without|lifted)\s+(?:minutes?\s+)?restrictions?\b", "No Restrictions", 1.10),
    rule(r"\bramp(?:ing)?\s+up\b", "Ramping Up", 1.06),
    rule(r"\b(?:making|make|made)?\s*(?:his\s+)?debut\b", "Debut", 1.08),
    // Minutes
    rule(r"\bincreas(?:ed|ing)\b.*\bminutes\b", "More Minutes", 1.10),
    rule(r"\bmore\s+minutes\b", "More Minutes", 1.08),
    rule(r"\buptick\b.*\b(?:playing\s+time|minutes)\b", "More Minutes", 1.08),
    // Pickup buzz
    rule(r"\b(?:must[- ]?add|must[- ]?roster|waiver[- ]?wire)\b", "Waiver Buzz", 1.10),
    rule(r"\b(?:pick\s*up|scoop\s+up|add\s+him)\b", "Pickup Buzz", 1.08),
    // Next-day starters
    rule(r"\bwill\s+start\b", "Will Start", 1.12),
    rule(r"\bexpected\s+to\s+start\b", "Exp. Starter", 1.10),
    rule(r"\bprojected\s+(?:to\s+)?start\b", "Proj. Starter", 1.10),
    rule(r"\b(?:starting|will\s+get)\s+(?:the\s+)?nod\b", "Starting Nod", 1.10),
    rule(r"\b(?:in|back\s+in)\s+the\s+starting\s+lineup\b", "In Starting Lineup", 1.12),
    // Benched / demoted
    rule(r"\b(?:back|moved|sent|demoted)\b.*\bbench\b", "Benched", 0.85),
    rule(r"\blos(?:t|ing|e)\b.*\bstart(?:ing)?\b", "Lost Starting Role", 0.85),
    rule(r"\bcoming\s+off\s+(?:the\s+)?bench\b", "Bench Role", 0.88),
    rule(r"\breduced\b.*\b(?:role|minutes)\b", "Reduced Role", 0.88),
    // Rest
    rule(r"\bload\s+management\b", "Load Mgmt", 0.90),
    rule(r"\brest(?:ing|ed)?\b.*\b(?:game|tonight|tomorrow)\b", "Resting", 0.92),
    KeywordRule {
        pattern: r"\bminutes?\s+(?:restriction|limit)\b",
        label: "Mins Restriction",
        multiplier: 0.90,
        unless_preceded_by: &["no", "without", "lifted"],
    },
    // Extended absence
    rule(r"\bre[- ]?evaluat(?:ed|ion|e)\b", "Re-Evaluation", 0.82),
    rule(r"\bweek[- ]?to[- ]?week\b", "Week-to-Week", 0.78),
    rule(r"\bno\s+timetable\b", "No Timeline", 0.72),
    rule(r"\bindefinitely\b", "Indefinite", 0.65),
    rule(r"\bsecond\s+opinion\b", "Second Opinion", 0.80),
    rule(r"\bre[- ]?aggravat(?:ed|ion|e)\b", "Re-Injury", 0.75),
    rule(r"\bseason[- ]?ending\b", "Season-Ending", 0.0),
    // Trades
    rule(r"\btrad(?:ed|e)\b.*\b(?:to|from)\b", "Traded", 0.92),
    rule(r"\btrade\s+deadline\b", "Trade Deadline", 0.95),
    rule(r"\b(?:g[- ]?league|two[- ]?way|sent\s+down)\b", "G-League", 0.70),
    rule(r"\b(?:arrest(?:ed)?|charged|suspended|suspension)\b", "Suspended", 0.60),
    // Not playing
    rule(r"\bdnp\b", "DNP", 0.80),
    rule(r"\bshut\s+down\b", "Shut Down", 0.0),
    rule(
        r"\b(?:will\s+)?sit\s+(?:out\s+)?(?:tomorrow|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        "Sitting Tomorrow",
        0.80,
    ),
    rule(r"\bruled\s+out\b", "Ruled Out", 0.75),
    rule(r"\bwill\s+(?:not|miss)\b.*\b(?:tomorrow|next\s+game)\b", "Out Tomorrow", 0.78),
];

static COMPILED_RULES: LazyLock<Vec<(Regex, &'static KeywordRule)>> = LazyLock::new(|| {
    KEYWORD_RULES
        .iter()
        .filter_map(|rule| match Regex::new(&format!("(?i){}", rule.pattern)) {
            Ok(re) => Some((re, rule)),
            Err(e) => {
                warn!("dropping news rule {}: {}", rule.label, e);
                None
            }
        })
        .collect()
});

fn rule_matches(re: &Regex, rule: &KeywordRule, text: &str) -> bool {
    if rule.unless_preceded_by.is_empty() {
        return re.is_match(text);
    }
    re.find_iter(text).any(|m| {
        let before = text[..m.start()].trim_end().to_lowercase();
        !rule
            .unless_preceded_by
            .iter()
            .any(|word| before.ends_with(word) && ends_on_word_boundary(&before, word))
    })
}

fn ends_on_word_boundary(text: &str, word: &str) -> bool {
    let prefix = &text[..text.len() - word.len()];
    prefix.chars().last().map_or(true, |c| !c.is_alphanumeric())
}

/// `(label, multiplier)` for every rule matching `text`, each label once.
pub fn scan_keywords(text: &str) -> Vec<(&'static str, f64)> {
    let mut hits: Vec<(&'static str, f64)> = Vec::new();
    if text.trim().is_empty() {
        return hits;
    }
    for (re, rule) in COMPILED_RULES.iter() {
        if hits.iter().any(|(label, _)| *label == rule.label) {
            continue;
        }
        if rule_matches(re, rule, text) {
            hits.push((rule.label, rule.multiplier));
        }
    }
    hits
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsSignal {
    pub multiplier: f64,
    pub labels: Vec<String>,
}

impl NewsSignal {
    fn from_hits(hits: &[(&'static str, f64)]) -> Option<Self> {
        if hits.is_empty() {
            return None;
        }
        let product: f64 = hits.iter().map(|(_, m)| m).product();
        Some(NewsSignal {
            multiplier: round_to(product, 3),
            labels: hits.iter().map(|(l, _)| l.to_string()).collect(),
        })
    }

    /// Compounded keyword signal for one piece of text.
    pub fn from_text(text: &str) -> Option<Self> {
        Self::from_hits(&scan_keywords(text))
    }

    pub fn summary(&self) -> String {
        self.labels.join(", ")
    }

    /// Fold in a positive signal: new labels are appended and the larger
    /// multiplier wins.
    fn merge_max(&mut self, labels: &[String], multiplier: f64) {
        for label in labels {
            if !self.labels.contains(label) {
                self.labels.push(label.clone());
            }
        }
        self.multiplier = round_to(self.multiplier.max(multiplier), 3);
    }
}

/// Strongest article signal: the one farthest from neutral.
pub fn strongest_article_signal(articles: &[&NewsItem]) -> Option<NewsSignal> {
    let mut best: Option<NewsSignal> = None;
    for article in articles {
        let text = format!("{} {}", article.headline, article.text);
        let Some(signal) = NewsSignal::from_text(&text) else {
            continue;
        };
        let stronger = match &best {
            Some(current) => (signal.multiplier - 1.0).abs() > (current.multiplier - 1.0).abs(),
            None => true,
        };
        if stronger {
            best = Some(signal);
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Box-score standouts
// ---------------------------------------------------------------------------

/// Days back from the snapshot date that count as "recent" box scores.
const STANDOUT_WINDOW_DAYS: i64 = 3;
const RECENT_STARTER_MULTIPLIER: f64 = 1.08;

/// `(stat key, display, [(min value, multiplier)])`, tiers highest first.
const STANDOUT_THRESHOLDS: &[(&str, &str, &[(f64, f64)])] = &[
    ("PTS", "PTS", &[(30.0, 1.08), (22.0, 1.05), (15.0, 1.03)]),
    ("REB", "REB", &[(12.0, 1.06), (8.0, 1.04)]),
    ("AST", "AST", &[(10.0, 1.06), (6.0, 1.04)]),
    ("STL", "STL", &[(4.0, 1.06), (3.0, 1.04)]),
    ("BLK", "BLK", &[(4.0, 1.06), (3.0, 1.04)]),
    ("FG3M", "3PM", &[(6.0, 1.06), (4.0, 1.04)]),
];

/// Standout hits for one game: the highest tier reached per stat.
pub fn standout_hits(line: &RecentGameLine) -> Vec<(String, f64)> {
    STANDOUT_THRESHOLDS
        .iter()
        .filter_map(|(key, display, tiers)| {
            let value = line.stat(key);
            tiers
                .iter()
                .find(|(min, _)| value >= *min)
                .map(|(_, mult)| (format!("{} {}", value as i64, display), *mult))
        })
        .collect()
}

/// Standout and recent-start signal from the last few days of box scores.
pub fn box_score_signal(lines: &[&RecentGameLine], as_of: NaiveDate) -> Option<NewsSignal> {
    let window_start = as_of - Duration::days(STANDOUT_WINDOW_DAYS);
    let mut recent: Vec<&RecentGameLine> = lines
        .iter()
        .copied()
        .filter(|l| l.game_date >= window_start && l.game_date <= as_of && l.is_game_played())
        .collect();
    recent.sort_by_key(|l| l.game_date);

    let mut signal: Option<NewsSignal> = None;
    for line in &recent {
        for (label, mult) in standout_hits(line) {
            match signal.as_mut() {
                Some(s) => s.merge_max(&[label], mult),
                None => {
                    signal = Some(NewsSignal {
                        multiplier: mult,
                        labels: vec![label],
                    })
                }
            }
        }
    }

    if recent.last().is_some_and(|l| l.started) {
        let label = "Recent Starter".to_string();
        match signal.as_mut() {
            Some(s) => s.merge_max(&[label], RECENT_STARTER_MULTIPLIER),
            None => {
                signal = Some(NewsSignal {
                    multiplier: RECENT_STARTER_MULTIPLIER,
                    labels: vec![label],
                })
            }
        }
    }
    signal
}

/// Combined news signal for one player.
///
/// Steps:
/// 1. Keyword signal from the injury blurb.
/// 2. Otherwise the strongest keyword signal across news articles.
/// 3. Box-score standouts and a recent start merge in by taking the larger
///    multiplier.
pub fn player_news_signal(
    injury_blurb: Option<&str>,
    articles: &[&NewsItem],
    recent_lines: &[&RecentGameLine],
    as_of: NaiveDate,
) -> Option<NewsSignal> {
    let mut signal = injury_blurb
        .and_then(NewsSignal::from_text)
        .or_else(|| strongest_article_signal(articles));

    if let Some(box_signal) = box_score_signal(recent_lines, as_of) {
        match signal.as_mut() {
            Some(s) => s.merge_max(&box_signal.labels, box_signal.multiplier),
            None => signal = Some(box_signal),
        }
    }
    signal
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
