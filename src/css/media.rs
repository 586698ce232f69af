//! Media query merging and mobile-first sorting.
//!
//! Works on the top-level rule list of a parsed [`lightningcss`] stylesheet.
//! Blocks are grouped by their printed query text, so queries that
//! lightningcss normalises to the same text are merged as well.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use lightningcss::rules::media::MediaRule;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::PrinterOptions;
use lightningcss::traits::ToCss;
use regex::Regex;

use super::CssError;

/// Root font size used to convert `em`/`rem` breakpoints to pixels
const ROOT_FONT_SIZE_PX: f64 = 16.0;

/// Breakpoints extracted from a media query, used as its sort key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaOrder {
    pub print: bool,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

impl MediaOrder {
    /// Extract breakpoints from query text.
    ///
    /// Understands both `min-width: 40em` and range syntax such as
    /// `width >= 640px` or `400px <= width <= 700px`.
    pub fn parse(query: &str) -> Self {
        let mut order = MediaOrder { print: print_regex().is_match(query), ..Default::default() };

        for caps in prefixed_regex().captures_iter(query) {
            let value = to_px(&caps[3], caps.get(4).map(|m| m.as_str()));
            order.set(&caps[1] == "min", &caps[2], value);
        }

        for caps in range_regex().captures_iter(query) {
            let value = to_px(&caps[3], caps.get(4).map(|m| m.as_str()));
            order.set(caps[2].starts_with('>'), &caps[1], value);
        }

        for caps in reversed_range_regex().captures_iter(query) {
            let value = to_px(&caps[1], caps.get(2).map(|m| m.as_str()));
            // `400px <= width` bounds from below
            order.set(caps[3].starts_with('<'), &caps[4], value);
        }

        order
    }

    fn set(&mut self, is_min: bool, dimension: &str, value: f64) {
        let slot = match (is_min, dimension) {
            (true, "width") => &mut self.min_width,
            (false, "width") => &mut self.max_width,
            (true, _) => &mut self.min_height,
            (false, _) => &mut self.max_height,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Coarse bucket: min-width, max-width, min-height, max-height, other, print.
    fn bucket(&self) -> u8 {
        if self.print {
            5
        } else if self.min_width.is_some() {
            0
        } else if self.max_width.is_some() {
            1
        } else if self.min_height.is_some() {
            2
        } else if self.max_height.is_some() {
            3
        } else {
            4
        }
    }
}

/// Mobile-first ordering of two media queries.
///
/// `min-width` queries come first, smallest breakpoint first, then
/// `max-width` queries from the widest down, then the height equivalents,
/// then queries without a breakpoint, and `print` last. Ties fall back to
/// the query text.
pub fn compare_queries(a: &str, b: &str) -> Ordering {
    let (oa, ob) = (MediaOrder::parse(a), MediaOrder::parse(b));
    let (ba, bb) = (oa.bucket(), ob.bucket());

    let by_value = match (ba, bb) {
        (0, 0) => cmp_f64(oa.min_width, ob.min_width),
        (1, 1) => cmp_f64(ob.max_width, oa.max_width),
        (2, 2) => cmp_f64(oa.min_height, ob.min_height),
        (3, 3) => cmp_f64(ob.max_height, oa.max_height),
        _ => ba.cmp(&bb),
    };

    by_value.then_with(|| a.cmp(b))
}

/// Merge identical top-level `@media` blocks, move them after every other
/// rule and order them mobile-first.
pub fn sort_media_queries(rules: &mut CssRuleList<'_>) -> Result<(), CssError> {
    let mut others = Vec::new();
    let mut groups: Vec<(String, MediaRule<'_>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for rule in std::mem::take(&mut rules.0) {
        match rule {
            CssRule::Media(media) => {
                let text = query_text(&media)?;
                match index.get(&text) {
                    Some(&i) => groups[i].1.rules.0.extend(media.rules.0),
                    None => {
                        index.insert(text.clone(), groups.len());
                        groups.push((text, media));
                    }
                }
            }
            other => others.push(other),
        }
    }

    groups.sort_by(|(a, _), (b, _)| compare_queries(a, b));
    others.extend(groups.into_iter().map(|(_, media)| CssRule::Media(media)));
    rules.0 = others;
    Ok(())
}

/// Merge identical top-level `@media` blocks in place, without reordering.
///
/// A later block is folded into the earlier one only when none of the rules
/// between them set a property it also sets, so the cascade is unchanged.
/// Otherwise it stays where it is and becomes the merge target for the next
/// block with the same query.
pub fn merge_media_queries(rules: &mut CssRuleList<'_>) -> Result<(), CssError> {
    let mut merged: Vec<CssRule<'_>> = Vec::with_capacity(rules.0.len());
    let mut target: HashMap<String, usize> = HashMap::new();

    for rule in std::mem::take(&mut rules.0) {
        let CssRule::Media(media) = rule else {
            merged.push(rule);
            continue;
        };
        let text = query_text(&media)?;

        if let Some(&i) = target.get(&text) {
            let moved = PropertyFamilies::of_rules(&media.rules.0);
            let crossed = PropertyFamilies::of_rules(&merged[i + 1..]);
            if !moved.conflicts_with(&crossed) {
                if let CssRule::Media(earlier) = &mut merged[i] {
                    earlier.rules.0.extend(media.rules.0);
                    continue;
                }
            }
        }

        target.insert(text, merged.len());
        merged.push(CssRule::Media(media));
    }

    rules.0 = merged;
    Ok(())
}

/// Properties set by a group of rules, reduced to their shorthand family
/// (`margin-top` and `margin` are both `margin`).
#[derive(Debug, Default)]
struct PropertyFamilies {
    names: HashSet<String>,
    /// Set when a rule could interact with anything (`all`, layers, nesting)
    opaque: bool,
}

impl PropertyFamilies {
    fn of_rules(rules: &[CssRule<'_>]) -> Self {
        let mut families = Self::default();
        families.collect(rules);
        families
    }

    fn collect(&mut self, rules: &[CssRule<'_>]) {
        for rule in rules {
            match rule {
                CssRule::Style(style) => {
                    let block = &style.declarations;
                    for property in block.declarations.iter().chain(&block.important_declarations) {
                        self.add(property.property_id().name());
                    }
                    self.collect(&style.rules.0);
                }
                CssRule::Media(media) => self.collect(&media.rules.0),
                CssRule::Supports(supports) => self.collect(&supports.rules.0),
                CssRule::Keyframes(_)
                | CssRule::FontFace(_)
                | CssRule::FontPaletteValues(_)
                | CssRule::FontFeatureValues(_)
                | CssRule::CounterStyle(_)
                | CssRule::Property(_)
                | CssRule::Ignored => {}
                _ => self.opaque = true,
            }
        }
    }

    fn add(&mut self, name: &str) {
        if name == "all" {
            self.opaque = true;
        } else {
            self.names.insert(property_family(name).to_string());
        }
    }

    fn conflicts_with(&self, other: &PropertyFamilies) -> bool {
        if self.names.is_empty() && !self.opaque {
            return false;
        }
        self.opaque || other.opaque || self.names.iter().any(|name| other.names.contains(name))
    }
}

/// Shorthand family of a property name, ignoring vendor prefixes.
fn property_family(name: &str) -> &str {
    if name.starts_with("--") {
        return name;
    }
    let unprefixed = match name.strip_prefix('-') {
        Some(rest) => rest.split_once('-').map_or(rest, |(_, property)| property),
        None => name,
    };
    match unprefixed {
        "line-height" => "font",
        "top" | "right" | "bottom" | "left" => "inset",
        "row-gap" | "column-gap" => "gap",
        "align-content" | "align-items" | "align-self" => "place",
        "justify-content" | "justify-items" | "justify-self" => "place",
        _ => {
            match unprefixed.split('-').next().unwrap_or(unprefixed) {
                "column" => "columns",
                family => family,
            }
        }
    }
}

fn query_text(media: &MediaRule<'_>) -> Result<String, CssError> {
    media.query.to_css_string(PrinterOptions::default()).map_err(|e| CssError::Print(e.to_string()))
}

fn cmp_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn to_px(number: &str, unit: Option<&str>) -> f64 {
    let value: f64 = number.parse().unwrap_or(0.0);
    match unit {
        Some("em") | Some("rem") => value * ROOT_FONT_SIZE_PX,
        _ => value,
    }
}

fn print_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bprint\b").expect("static regex"))
}

fn prefixed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(min|max)-(width|height)\s*:\s*(-?\d*\.?\d+)(px|em|rem)?")
            .expect("static regex")
    })
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(width|height)\s*(>=|<=|>|<)\s*(-?\d*\.?\d+)(px|em|rem)?")
            .expect("static regex")
    })
}

fn reversed_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(-?\d*\.?\d+)(px|em|rem)?\s*(>=|<=|>|<)\s*(width|height)\b")
            .expect("static regex")
    })
}
