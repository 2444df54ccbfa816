//! Option-chain aggregation
//!
//! Decodes an NSE-style option-chain document and reduces it to
//! open-interest totals, put-call ratio, max-pain strike, a per-strike
//! implied-volatility table and the strikes with the most open interest.
//!
//! Decoding is lenient: rows without a usable strike are skipped and
//! counted, and a malformed call or put leg is dropped on its own without
//! taking the other leg of the row with it.

use ordered_float::OrderedFloat;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::error::AnalyticsError;

/// Number of strikes reported in [`ChainAggregate::top_oi_strikes`]
pub const TOP_OI_LIMIT: usize = 5;

/// One side (call or put) of a strike row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainLeg {
    #[serde(rename = "openInterest", default, deserialize_with = "de_open_interest")]
    pub open_interest: Option<u64>,
    /// Implied volatility in percentage points
    #[serde(rename = "impliedVolatility", default)]
    pub implied_volatility: Option<f64>,
}

/// A single strike row of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    #[serde(rename = "strikePrice")]
    pub strike: f64,
    #[serde(rename = "CE", alias = "CALL", default)]
    pub call: Option<ChainLeg>,
    #[serde(rename = "PE", alias = "PUT", default)]
    pub put: Option<ChainLeg>,
}

/// Decoded option-chain snapshot, rows kept in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionChainSnapshot {
    pub rows: Vec<ChainRow>,
    /// Spot reported alongside the chain, if any
    pub underlying_value: Option<f64>,
    /// Rows dropped while decoding
    pub skipped_rows: usize,
    /// Call or put legs dropped while decoding
    pub malformed_legs: usize,
}

impl OptionChainSnapshot {
    pub fn new(rows: Vec<ChainRow>) -> Self {
        Self {
            rows,
            underlying_value: None,
            skipped_rows: 0,
            malformed_legs: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode from a JSON string
    pub fn from_json_str(content: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| AnalyticsError::InvalidChain(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Decode from a JSON document shaped `{"records": {"data": [...]}}`.
    ///
    /// `null` and `{}` decode to an empty snapshot. Only a top level that
    /// is neither null nor an object is rejected.
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        let root = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(AnalyticsError::InvalidChain(format!(
                    "expected an object at top level, found {}",
                    json_kind(other)
                )))
            }
        };

        let records = root.get("records");
        let underlying_value = records
            .and_then(|r| r.get("underlyingValue"))
            .and_then(Value::as_f64);

        let raw_rows = records
            .and_then(|r| r.get("data"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(raw_rows.len());
        let mut skipped_rows = 0;
        let mut malformed_legs = 0;

        for (idx, raw) in raw_rows.iter().enumerate() {
            let decoded = decode_row(raw);
            malformed_legs += decoded.malformed_legs;
            match decoded.row {
                Some(row) => rows.push(row),
                None => {
                    debug!(row = idx, "Skipping malformed option chain row");
                    skipped_rows += 1;
                }
            }
        }

        if skipped_rows > 0 || malformed_legs > 0 {
            warn!(
                skipped = skipped_rows,
                malformed_legs,
                kept = rows.len(),
                "Option chain contained malformed rows"
            );
        }

        Ok(Self {
            rows,
            underlying_value,
            skipped_rows,
            malformed_legs,
        })
    }
}

struct DecodedRow {
    row: Option<ChainRow>,
    malformed_legs: usize,
}

/// Decode one row. Each leg decodes independently; a row is dropped only
/// when its strike is unusable or every leg it carries is malformed.
fn decode_row(raw: &Value) -> DecodedRow {
    let strike = raw
        .get("strikePrice")
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite());

    let Some(strike) = strike else {
        return DecodedRow {
            row: None,
            malformed_legs: 0,
        };
    };

    let call = decode_leg(raw, &["CE", "CALL"]);
    let put = decode_leg(raw, &["PE", "PUT"]);
    let malformed_legs = [&call, &put]
        .iter()
        .filter(|leg| matches!(leg, LegDecode::Malformed))
        .count();

    let row = ChainRow {
        strike,
        call: call.into_leg(),
        put: put.into_leg(),
    };

    let row = if malformed_legs > 0 && row.call.is_none() && row.put.is_none() {
        None
    } else {
        Some(row)
    };

    DecodedRow {
        row,
        malformed_legs,
    }
}

enum LegDecode {
    Absent,
    Malformed,
    Quoted(ChainLeg),
}

impl LegDecode {
    fn into_leg(self) -> Option<ChainLeg> {
        match self {
            LegDecode::Quoted(leg) => Some(leg),
            LegDecode::Absent | LegDecode::Malformed => None,
        }
    }
}

fn decode_leg(raw: &Value, keys: &[&str]) -> LegDecode {
    let Some(side) = keys.iter().find_map(|k| raw.get(*k)) else {
        return LegDecode::Absent;
    };

    match side {
        Value::Null => LegDecode::Absent,
        // `{}` on a side means the side is not quoted
        Value::Object(map) if map.is_empty() => LegDecode::Absent,
        Value::Object(_) => match ChainLeg::deserialize(side) {
            Ok(leg) if leg.implied_volatility.map_or(true, f64::is_finite) => {
                LegDecode::Quoted(leg)
            }
            _ => LegDecode::Malformed,
        },
        _ => LegDecode::Malformed,
    }
}

/// Open interest as a non-negative integer. Integral floats such as
/// `1200.0` are accepted.
fn de_open_interest<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("invalid open interest: {number}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Implied volatility quoted at one strike, in percentage points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeIv {
    pub call: Option<f64>,
    pub put: Option<f64>,
}

impl StrikeIv {
    /// Mean of whichever sides are quoted
    pub fn mean(&self) -> Option<f64> {
        match (self.call, self.put) {
            (Some(c), Some(p)) => Some((c + p) / 2.0),
            (Some(c), None) => Some(c),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }
}

/// Open interest accumulated at one strike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeOi {
    pub strike: f64,
    pub call_oi: u64,
    pub put_oi: u64,
}

impl StrikeOi {
    pub fn combined(&self) -> u64 {
        self.call_oi.saturating_add(self.put_oi)
    }
}

/// Per-strike implied volatility, ordered by strike
pub type StrikeIvTable = BTreeMap<OrderedFloat<f64>, StrikeIv>;

/// Aggregate view of one chain snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainAggregate {
    pub total_call_oi: u64,
    pub total_put_oi: u64,
    /// Total put OI / total call OI; `None` when call OI is zero
    pub put_call_ratio: Option<f64>,
    /// First strike, in chain order, with the largest combined OI
    pub max_pain_strike: Option<f64>,
    pub strike_iv_table: StrikeIvTable,
    /// Up to five strikes by combined OI, descending. Ties keep chain order.
    pub top_oi_strikes: Vec<StrikeOi>,
}

impl ChainAggregate {
    pub fn iv_at(&self, strike: f64) -> Option<&StrikeIv> {
        self.strike_iv_table.get(&OrderedFloat(strike))
    }
}

/// Reduce a chain snapshot to its aggregate view.
///
/// An absent or empty snapshot gives an aggregate with every field absent.
pub fn parse_chain(snapshot: Option<&OptionChainSnapshot>) -> ChainAggregate {
    let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
        return ChainAggregate::default();
    };

    let mut total_call_oi: u64 = 0;
    let mut total_put_oi: u64 = 0;
    // Strikes in first-encounter order, with an index for duplicates
    let mut strike_oi: Vec<StrikeOi> = Vec::new();
    let mut positions: HashMap<OrderedFloat<f64>, usize> = HashMap::new();
    let mut strike_iv_table = StrikeIvTable::new();

    for row in &snapshot.rows {
        if row.call.is_none() && row.put.is_none() {
            continue;
        }

        let key = OrderedFloat(row.strike);
        let idx = *positions.entry(key).or_insert_with(|| {
            strike_oi.push(StrikeOi {
                strike: row.strike,
                call_oi: 0,
                put_oi: 0,
            });
            strike_oi.len() - 1
        });

        if let Some(call) = &row.call {
            let oi = call.open_interest.unwrap_or(0);
            total_call_oi = total_call_oi.saturating_add(oi);
            strike_oi[idx].call_oi = strike_oi[idx].call_oi.saturating_add(oi);
            if let Some(iv) = call.implied_volatility {
                strike_iv_table.entry(key).or_default().call = Some(iv);
            }
        }

        if let Some(put) = &row.put {
            let oi = put.open_interest.unwrap_or(0);
            total_put_oi = total_put_oi.saturating_add(oi);
            strike_oi[idx].put_oi = strike_oi[idx].put_oi.saturating_add(oi);
            if let Some(iv) = put.implied_volatility {
                strike_iv_table.entry(key).or_default().put = Some(iv);
            }
        }
    }

    let put_call_ratio = if total_call_oi == 0 {
        None
    } else {
        Some(total_put_oi as f64 / total_call_oi as f64)
    };

    let mut max_pain_strike = None;
    let mut max_total: Option<u64> = None;
    for entry in &strike_oi {
        let total = entry.combined();
        if max_total.map_or(true, |m| total > m) {
            max_total = Some(total);
            max_pain_strike = Some(entry.strike);
        }
    }

    let mut top_oi_strikes = strike_oi;
    top_oi_strikes.sort_by(|a, b| b.combined().cmp(&a.combined()));
    top_oi_strikes.truncate(TOP_OI_LIMIT);

    ChainAggregate {
        total_call_oi,
        total_put_oi,
        put_call_ratio,
        max_pain_strike,
        strike_iv_table,
        top_oi_strikes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leg(oi: u64, iv: Option<f64>) -> Option<ChainLeg> {
        Some(ChainLeg {
            open_interest: Some(oi),
            implied_volatility: iv,
        })
    }

    fn row(strike: f64, call: Option<ChainLeg>, put: Option<ChainLeg>) -> ChainRow {
        ChainRow { strike, call, put }
    }

    #[test]
    fn test_empty_and_absent_snapshot() {
        for agg in [
            parse_chain(None),
            parse_chain(Some(&OptionChainSnapshot::default())),
            parse_chain(Some(&OptionChainSnapshot::from_value(&json!({})).unwrap())),
        ] {
            assert_eq!(agg.put_call_ratio, None);
            assert_eq!(agg.max_pain_strike, None);
            assert!(agg.strike_iv_table.is_empty());
            assert!(agg.top_oi_strikes.is_empty());
        }
    }

    #[test]
    fn test_max_pain_first_strike_wins_ties() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(48500.0, leg(60, None), leg(40, None)),
            row(48600.0, leg(100, None), leg(200, None)),
            row(48700.0, leg(150, None), leg(150, None)),
            row(48800.0, leg(25, None), leg(25, None)),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.max_pain_strike, Some(48600.0));
    }

    #[test]
    fn test_max_pain_with_all_zero_oi() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(100.0, leg(0, None), None),
            row(200.0, leg(0, None), None),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.max_pain_strike, Some(100.0));
        assert_eq!(agg.put_call_ratio, None);
    }

    #[test]
    fn test_put_call_ratio() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(48600.0, leg(100, None), leg(150, None)),
            row(48700.0, leg(300, None), leg(450, None)),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.total_call_oi, 400);
        assert_eq!(agg.total_put_oi, 600);
        assert!((agg.put_call_ratio.unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_pcr_absent_without_calls() {
        let snapshot = OptionChainSnapshot::new(vec![row(48600.0, None, leg(150, None))]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.put_call_ratio, None);
        assert_eq!(agg.max_pain_strike, Some(48600.0));
    }

    #[test]
    fn test_missing_open_interest_counts_as_zero() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(48600.0, Some(ChainLeg::default()), leg(10, None)),
            row(48700.0, leg(20, None), None),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.total_call_oi, 20);
        assert_eq!(agg.total_put_oi, 10);
    }

    #[test]
    fn test_iv_table_only_for_quoted_strikes() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(48600.0, leg(10, Some(14.2)), leg(10, None)),
            row(48700.0, leg(10, None), leg(10, None)),
            row(48800.0, None, leg(10, Some(15.8))),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.strike_iv_table.len(), 2);
        assert_eq!(
            agg.iv_at(48600.0),
            Some(&StrikeIv {
                call: Some(14.2),
                put: None
            })
        );
        assert!(agg.iv_at(48700.0).is_none());
        assert_eq!(agg.iv_at(48800.0).and_then(StrikeIv::mean), Some(15.8));
    }

    #[test]
    fn test_duplicate_strikes_accumulate() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(48600.0, leg(10, Some(12.0)), None),
            row(48700.0, leg(100, None), None),
            row(48600.0, leg(95, Some(13.0)), None),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.max_pain_strike, Some(48600.0));
        assert_eq!(agg.top_oi_strikes[0].combined(), 105);
        assert_eq!(agg.iv_at(48600.0).unwrap().call, Some(13.0));
    }

    #[test]
    fn test_top_oi_sorted_and_truncated() {
        let rows = (0..8)
            .map(|i| row(48000.0 + 100.0 * i as f64, leg(10 * (i + 1), None), None))
            .collect();
        let agg = parse_chain(Some(&OptionChainSnapshot::new(rows)));

        let combined: Vec<u64> = agg.top_oi_strikes.iter().map(StrikeOi::combined).collect();
        assert_eq!(combined, vec![80, 70, 60, 50, 40]);
        assert_eq!(agg.top_oi_strikes[0].strike, 48700.0);
    }

    #[test]
    fn test_top_oi_ties_keep_chain_order() {
        let snapshot = OptionChainSnapshot::new(vec![
            row(100.0, leg(5, None), None),
            row(200.0, leg(9, None), None),
            row(300.0, leg(9, None), None),
        ]);

        let agg = parse_chain(Some(&snapshot));
        let strikes: Vec<f64> = agg.top_oi_strikes.iter().map(|s| s.strike).collect();
        assert_eq!(strikes, vec![200.0, 300.0, 100.0]);
    }

    #[test]
    fn test_decode_nse_document() {
        let doc = json!({
            "records": {
                "underlyingValue": 48762.35,
                "data": [
                    {
                        "strikePrice": 48700,
                        "CE": {"openInterest": 1200, "impliedVolatility": 13.5, "lastPrice": 210.0},
                        "PE": {"openInterest": 1500, "impliedVolatility": 14.1}
                    },
                    {"strikePrice": 48800, "CALL": {"openInterest": 900}, "PUT": {}},
                    {"CE": {"openInterest": 5}},
                    {"strikePrice": "bad", "CE": {"openInterest": 5}},
                    {"strikePrice": 48900, "CE": {"openInterest": -3}},
                    42,
                    {
                        "strikePrice": 49000,
                        "CE": {"openInterest": 400.0},
                        "PE": {"openInterest": 700, "impliedVolatility": 15.0}
                    },
                    {
                        "strikePrice": 49100,
                        "CE": {"openInterest": 12.5, "impliedVolatility": 12.0},
                        "PE": {"openInterest": 300, "impliedVolatility": 16.2}
                    }
                ]
            }
        });

        let snapshot = OptionChainSnapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.rows.len(), 4);
        assert_eq!(snapshot.skipped_rows, 4);
        assert_eq!(snapshot.malformed_legs, 2);
        assert_eq!(snapshot.underlying_value, Some(48762.35));
        assert!(snapshot.rows[1].call.is_some());
        assert!(snapshot.rows[1].put.is_none());

        // Integral float OI is accepted
        assert_eq!(snapshot.rows[2].call.as_ref().unwrap().open_interest, Some(400));

        // A fractional OI drops the call leg only
        assert!(snapshot.rows[3].call.is_none());
        assert_eq!(snapshot.rows[3].put.as_ref().unwrap().open_interest, Some(300));

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.total_call_oi, 1200 + 900 + 400);
        assert_eq!(agg.total_put_oi, 1500 + 700 + 300);
        assert_eq!(agg.iv_at(49100.0).and_then(StrikeIv::mean), Some(16.2));
    }

    #[test]
    fn test_malformed_leg_keeps_other_leg() {
        let doc = json!({
            "records": {
                "data": [
                    {
                        "strikePrice": 100,
                        "CE": {"openInterest": "n/a"},
                        "PE": {"openInterest": 900, "impliedVolatility": 14.0}
                    }
                ]
            }
        });

        let snapshot = OptionChainSnapshot::from_value(&doc).unwrap();
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.skipped_rows, 0);
        assert_eq!(snapshot.malformed_legs, 1);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.total_put_oi, 900);
        assert_eq!(agg.max_pain_strike, Some(100.0));
        assert_eq!(agg.iv_at(100.0).and_then(StrikeIv::mean), Some(14.0));
    }

    #[test]
    fn test_open_interest_sums_saturate() {
        let huge = 10_000_000_000_000_000_000_u64;
        let snapshot = OptionChainSnapshot::new(vec![
            row(100.0, leg(huge, None), leg(huge, None)),
            row(200.0, leg(huge, None), None),
        ]);

        let agg = parse_chain(Some(&snapshot));
        assert_eq!(agg.total_call_oi, u64::MAX);
        assert_eq!(agg.total_put_oi, huge);
        assert_eq!(agg.max_pain_strike, Some(100.0));
        assert_eq!(agg.top_oi_strikes[0].combined(), u64::MAX);
        assert!(agg.put_call_ratio.is_some());
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(OptionChainSnapshot::from_value(&json!([1, 2, 3])).is_err());
        assert!(OptionChainSnapshot::from_json_str("not json").is_err());
        assert!(OptionChainSnapshot::from_value(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_decode_tolerates_missing_data() {
        let doc = json!({"records": {"data": "oops"}});
        let snapshot = OptionChainSnapshot::from_value(&doc).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.skipped_rows, 0);
    }
}
