//! # Weekly-Table Row Parser
//!
//! Parses the text of one weekly-table row into a typed [`TideRow`], then
//! filters it down to the day's high-tide timestamps.
//!
//! A row looks like this (newlines in the DOM text are normalized to
//! spaces first):
//!
//! ```text
//! Mon 22 3:36am ▼ 0.98 ft 9:09am ▲ 6.56 ft 3:41pm ▼ 1.64 ft 9:17pm ▲ 7.55 ft ▲ 5:57am ▼ 7:35pm
//! ```
//!
//! That is: a weekday abbreviation, a day-of-month number, 3 or 4
//! "time, direction glyph, height" groups, and finally sunrise (▲) and
//! sunset (▼) times. The 4th tide group is optional because not every day
//! has four tidal extrema. The grammar is fixed, not configurable; any text
//! that deviates from it means the site's layout changed and the row fails
//! with [`TidesError::MalformedRow`].
//!
//! The parser is a hand-written tokenizer rather than one monolithic
//! pattern, so the 3-vs-4 group variability and the high/low filtering can
//! be tested in isolation.

use crate::datetime_utils::{combine, parse_clock, resolve_day};
use crate::error::TidesError;
use crate::{TideKind, TideReading, TideRow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Direction glyph the site uses for a rising (high) tide and for sunrise.
pub const HIGH_GLYPH: char = '▲';
/// Direction glyph the site uses for a falling (low) tide and for sunset.
pub const LOW_GLYPH: char = '▼';

impl TideRow {
    /// Parse one row of the weekly table into its typed structure.
    ///
    /// Embedded newlines are normalized to spaces before tokenizing. Fails
    /// with [`TidesError::MalformedRow`] when the text does not match the
    /// fixed row grammar.
    pub fn parse(text: &str) -> Result<TideRow, TidesError> {
        let normalized = text.replace('\n', " ");
        let mut parser = RowTokens::new(&normalized);

        let weekday = parser.take_weekday()?;
        let day_of_month = parser.take_day_number()?;

        let mut tides = Vec::with_capacity(4);
        loop {
            match parser.peek() {
                Some(tok) if tok.starts_with(HIGH_GLYPH) => break,
                Some(_) => {
                    if tides.len() == 4 {
                        return Err(parser.fail("more than 4 tide groups"));
                    }
                    let time = parser.take_time("tide")?;
                    let kind = parser.take_direction()?;
                    let height_ft = parser.take_height()?;
                    tides.push(TideReading {
                        time,
                        kind,
                        height_ft,
                    });
                }
                None => return Err(parser.fail("missing sunrise/sunset section")),
            }
        }
        if tides.len() < 3 {
            return Err(parser.fail(format!("expected 3 or 4 tide groups, found {}", tides.len())));
        }

        let sunrise = parser.take_marked_time(HIGH_GLYPH, "sunrise")?;
        let sunset = parser.take_marked_time(LOW_GLYPH, "sunset")?;
        if let Some(extra) = parser.peek() {
            return Err(parser.fail(format!("unexpected trailing text {:?}", extra)));
        }

        Ok(TideRow {
            weekday,
            day_of_month,
            tides,
            sunrise,
            sunset,
        })
    }
}

/// Parse one row and return the day's high-tide timestamps, in source
/// (chronological) order.
///
/// `today` anchors the bare day-of-month number to a calendar date. Low
/// tides are discarded. A day must yield at least 1 and at most 2 high
/// tides; any other count fails with [`TidesError::MalformedRow`].
pub fn high_tide_times(text: &str, today: NaiveDate) -> Result<Vec<NaiveDateTime>, TidesError> {
    let row = TideRow::parse(text)?;

    let date = resolve_day(today, row.day_of_month).ok_or_else(|| TidesError::MalformedRow {
        text: text.replace('\n', " "),
        reason: format!("day {} is not valid for the resolved month", row.day_of_month),
    })?;

    let highs: Vec<NaiveDateTime> = row
        .tides
        .iter()
        .filter(|t| t.kind == TideKind::High)
        .map(|t| combine(date, t.time))
        .collect();

    if highs.is_empty() {
        return Err(TidesError::MalformedRow {
            text: text.replace('\n', " "),
            reason: "no high tides in row".to_string(),
        });
    }
    if highs.len() > 2 {
        return Err(TidesError::MalformedRow {
            text: text.replace('\n', " "),
            reason: format!("{} high tides in row, expected at most 2", highs.len()),
        });
    }

    Ok(highs)
}

/// Whitespace tokenizer with one-token lookahead over a normalized row.
struct RowTokens<'a> {
    text: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> RowTokens<'a> {
    fn new(text: &'a str) -> Self {
        RowTokens {
            text,
            tokens: text.split_whitespace().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self, what: &str) -> Result<&'a str, TidesError> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                Ok(tok)
            }
            None => Err(self.fail(format!("missing {}", what))),
        }
    }

    fn fail(&self, reason: impl Into<String>) -> TidesError {
        TidesError::MalformedRow {
            text: self.text.to_string(),
            reason: reason.into(),
        }
    }

    fn take_weekday(&mut self) -> Result<Weekday, TidesError> {
        let tok = self.next("weekday")?;
        match tok {
            "Mon" => Ok(Weekday::Mon),
            "Tue" => Ok(Weekday::Tue),
            "Wed" => Ok(Weekday::Wed),
            "Thu" => Ok(Weekday::Thu),
            "Fri" => Ok(Weekday::Fri),
            "Sat" => Ok(Weekday::Sat),
            "Sun" => Ok(Weekday::Sun),
            other => Err(self.fail(format!("expected weekday abbreviation, got {:?}", other))),
        }
    }

    fn take_day_number(&mut self) -> Result<u32, TidesError> {
        let tok = self.next("day of month")?;
        tok.parse::<u32>()
            .ok()
            .filter(|d| (1..=31).contains(d))
            .ok_or_else(|| self.fail(format!("expected day of month, got {:?}", tok)))
    }

    /// Consume a clock time. The am/pm marker may be part of the same token
    /// ("3:36am") or the following one ("3:36 am").
    fn take_time(&mut self, what: &str) -> Result<NaiveTime, TidesError> {
        let tok = self.next(what)?;
        if let Some(time) = parse_clock(tok) {
            return Ok(time);
        }
        if tok.contains(':') {
            if let Some(marker) = self.peek() {
                let joined = format!("{}{}", tok, marker);
                if let Some(time) = parse_clock(&joined) {
                    self.pos += 1;
                    return Ok(time);
                }
            }
        }
        Err(self.fail(format!("expected {} time, got {:?}", what, tok)))
    }

    fn take_direction(&mut self) -> Result<TideKind, TidesError> {
        let tok = self.next("tide direction marker")?;
        if tok.len() == HIGH_GLYPH.len_utf8() {
            if tok.starts_with(HIGH_GLYPH) {
                return Ok(TideKind::High);
            }
            if tok.starts_with(LOW_GLYPH) {
                return Ok(TideKind::Low);
            }
        }
        Err(self.fail(format!("expected tide direction marker, got {:?}", tok)))
    }

    /// Consume a tide height with its unit, which may be attached
    /// ("0.98ft") or a separate token ("0.98 ft"). The unit is discarded.
    fn take_height(&mut self) -> Result<f32, TidesError> {
        let tok = self.next("tide height")?;
        let digits = tok.strip_suffix("ft").unwrap_or(tok);
        let height: f32 = digits
            .parse()
            .map_err(|_| self.fail(format!("expected tide height, got {:?}", tok)))?;
        if digits.len() == tok.len() {
            // Unit was not attached to the number; it must be the next token.
            match self.next("tide height unit")? {
                "ft" => {}
                other => return Err(self.fail(format!("expected height unit, got {:?}", other))),
            }
        }
        Ok(height)
    }

    /// Consume a glyph-marked time (sunrise/sunset). The glyph may be its
    /// own token ("▲ 5:57am") or attached to the time ("▲5:57am").
    fn take_marked_time(&mut self, glyph: char, what: &str) -> Result<NaiveTime, TidesError> {
        let tok = match self.peek() {
            Some(tok) => tok,
            None => return Err(self.fail(format!("missing {} marker", what))),
        };
        match tok.strip_prefix(glyph) {
            Some("") => {
                self.pos += 1;
                self.take_time(what)
            }
            Some(rest) => {
                // Rewrite the token in place with the glyph stripped, then
                // reuse the plain time path (handles a split am/pm marker).
                self.tokens[self.pos] = rest;
                self.take_time(what)
            }
            None => Err(self.fail(format!("expected {} marker {:?}, got {:?}", what, glyph, tok))),
        }
    }
}
