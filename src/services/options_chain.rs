use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::Settings;
use crate::error::OptWatchError;

use super::ig_feed::PriceFeed;

/// Standard monthly option epics: underlying code, one-letter series tag,
/// the 4-digit strike and a C/P flag, e.g. `OP.D.SPX1.4500P.IP`.
static MONTHLY_EPIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OP\.D\.SPX.\.\d\d\d\d[CP]\.IP").expect("monthly epic pattern"));

const LADDER_ROWS: i64 = 5;
const STRIKE_STEP: i64 = 100;
const EXPIRY_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionSide {
    Put,
    Call,
}

impl OptionSide {
    pub fn query_word(self) -> &'static str {
        match self {
            OptionSide::Put => "Put",
            OptionSide::Call => "Call",
        }
    }

    /// Puts ladder down from the money, calls ladder up.
    fn step(self) -> i64 {
        match self {
            OptionSide::Put => -STRIKE_STEP,
            OptionSide::Call => STRIKE_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub strike: i64,

    // One bid per expiry column; `None` where the feed had no quote.
    pub bids: Vec<Option<f64>>,
}

/// Strike-indexed price matrix with expiries as columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionsMatrix {
    pub side: OptionSide,
    pub expiries: Vec<String>,
    pub rows: Vec<MatrixRow>,
    pub underlying_mid: f64,
}

/// Build the out-of-the-money price matrix for one side of the book.
///
/// Stateless: one reference snapshot fixes the at-the-money strike, the
/// first search fixes the expiry columns (first three distinct expiries
/// among standard monthly epics, in result order), and each further rung
/// of the ladder is a fresh search. Any feed failure aborts the whole
/// aggregation; there is no partial matrix.
pub async fn build_matrix(
    feed: &dyn PriceFeed,
    settings: &Settings,
    side: OptionSide,
) -> Result<OptionsMatrix, OptWatchError> {
    let daily = feed.snapshot(&settings.reference_epic).await?;

    let mut atm = ((daily.bid + daily.offer) / 200.0).floor() as i64 * STRIKE_STEP;
    if side == OptionSide::Call {
        atm += STRIKE_STEP;
    }

    let mut results = feed.search(&option_query(settings, atm, side)).await?;

    let mut expiries: Vec<String> = Vec::new();
    for quote in results.iter().filter(|q| MONTHLY_EPIC.is_match(&q.epic)) {
        if !expiries.contains(&quote.expiry) {
            expiries.push(quote.expiry.clone());
        }
        if expiries.len() == EXPIRY_COLUMNS {
            break;
        }
    }

    let mut rows = Vec::with_capacity(LADDER_ROWS as usize);
    for rung in 0..LADDER_ROWS {
        let strike = atm + rung * side.step();

        // The at-the-money rung reuses the search that fixed the columns.
        if rung > 0 {
            results = feed.search(&option_query(settings, strike, side)).await?;
        }

        let bids = expiries
            .iter()
            .map(|expiry| results.iter().find(|q| q.expiry == *expiry).map(|q| q.bid))
            .collect();

        rows.push(MatrixRow { strike, bids });
    }

    let mid = (daily.bid + daily.offer) / 2.0;

    Ok(OptionsMatrix {
        side,
        expiries,
        rows,
        underlying_mid: (mid * 100.0).round() / 100.0,
    })
}

fn option_query(settings: &Settings, strike: i64, side: OptionSide) -> String {
    format!("{} {} {}", settings.underlying_query, strike, side.query_word())
}
