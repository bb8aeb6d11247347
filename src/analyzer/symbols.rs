use std::sync::LazyLock;

use regex::Regex;

/// Sports-context denylist, checked before any symbol mapping. Suppresses
/// false positives like "Win the Stanley Cup" where a team or league name
/// contains a ticker substring.
static SPORTS_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(win|wins|won|winner|lose|loss|championship|league|cup|final|stanley cup|nba|nfl|mlb|nhl|tennis|golf|olympic|tournament|match|game|team|player|coach)\b",
    )
    .expect("invalid sports-context pattern")
});

/// Ordered (pattern, Binance symbol) mappings. First match wins, so more
/// specific patterns must precede shorter ones that could be substrings.
const SYMBOL_PATTERNS: &[(&str, &str)] = &[
    (r"\bbitcoin\b|\bbtc\b", "BTCUSDT"),
    (r"\bethereum\b|\beth\b", "ETHUSDT"),
    (r"\bsolana\b|\bsol\b", "SOLUSDT"),
    (r"\bpolkadot\b|\bdot\b", "DOTUSDT"),
    (r"\bcardano\b|\bada\b", "ADAUSDT"),
    (r"\bavalanche\b|\bavax\b", "AVAXUSDT"),
    (r"\bchainlink\b|\blink\b", "LINKUSDT"),
    (r"\bpolygon\b|\bmatic\b", "MATICUSDT"),
    (r"\blitecoin\b|\bltc\b", "LTCUSDT"),
    (r"\bdogecoin\b|\bdoge\b", "DOGEUSDT"),
    (r"\bshiba?\b|\bshib\b", "SHIBUSDT"),
    (r"\barbitrum\b|\barb\b", "ARBUSDT"),
    (r"\boptimism\b|\bop\b", "OPUSDT"),
    (r"\bcurve\b|\bcrv\b", "CRVUSDT"),
    (r"\buniswap\b|\buni\b", "UNIUSDT"),
    (r"\baave\b", "AAVEUSDT"),
    (r"\bcompound\b|\bcomp\b", "COMPUSDT"),
    (r"\bmaker\b|\bmkr\b", "MKRUSDT"),
    (r"\bripple\b|\bxrp\b", "XRPUSDT"),
    (r"\bstellar\b|\bxlm\b", "XLMUSDT"),
    (r"\bmonero\b|\bxmr\b", "XMRUSDT"),
    (r"\bzcash\b|\bzec\b", "ZECUSDT"),
    (r"\bdash\b", "DASHUSDT"),
    (r"\betc\b", "ETCUSDT"),
    (r"\bneo\b", "NEOUSDT"),
    (r"\biota\b|\bmiota\b", "IOTAUSDT"),
    (r"\btron\b|\btrx\b", "TRXUSDT"),
    (r"\beos\b", "EOSUSDT"),
    (r"\bcosmos\b|\batom\b", "ATOMUSDT"),
    (r"\btezos\b|\bxtz\b", "XTZUSDT"),
    (r"\bflow\b", "FLOWUSDT"),
    (r"\bchiliz\b|\bchz\b", "CHZUSDT"),
    (r"\bthe\s+sandbox\b|\bsand\b", "SANDUSDT"),
    (r"\bdecentraland\b|\bmana\b", "MANAUSDT"),
    (r"\baxie\s+infinity\b|\baxs\b", "AXSUSDT"),
];

static SYMBOL_REGEXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SYMBOL_PATTERNS
        .iter()
        .map(|(pattern, symbol)| {
            (
                Regex::new(pattern).expect("invalid symbol pattern"),
                *symbol,
            )
        })
        .collect()
});

/// Dollar price targets like "$100k" or "$0.50" — a market quoting a price
/// with no recognizable coin name is assumed to be about BTC.
static PRICE_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\d+(?:\.\d+)?").expect("invalid price-target pattern"));

/// Broad crypto-relatedness keywords: every coin name/ticker from the symbol
/// table plus generic ecosystem terms. Independent of symbol extraction — a
/// market can pass this filter yet have no extractable trading symbol.
static CRYPTO_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(bitcoin|btc|ethereum|eth|solana|sol|polkadot|dot|cardano|ada|avalanche|avax|chainlink|link|polygon|matic|litecoin|ltc|dogecoin|doge|shiba|shib|arbitrum|arb|optimism|op|curve|crv|uniswap|uni|aave|compound|comp|maker|mkr|ripple|xrp|stellar|xlm|monero|xmr|zcash|zec|dash|etc|neo|iota|trx|eos|cosmos|atom|tezos|xtz|flow|chiliz|chz|sandbox|sand|decentraland|mana|axie|axs|crypto|blockchain|defi|nft|web3)\b",
    )
    .expect("invalid crypto-keywords pattern")
});

fn normalized(question: &str, event_slug: Option<&str>) -> String {
    format!("{} {}", question, event_slug.unwrap_or("")).to_lowercase()
}

/// Best-effort trading symbol for a market. Denylist first, then the
/// ordered mapping table, then the dollar-price-target fallback.
pub fn extract_symbol(question: &str, event_slug: Option<&str>) -> Option<&'static str> {
    let text = normalized(question, event_slug);

    if SPORTS_CONTEXT.is_match(&text) {
        return None;
    }

    for (pattern, symbol) in SYMBOL_REGEXES.iter() {
        if pattern.is_match(&text) {
            return Some(symbol);
        }
    }

    if PRICE_TARGET.is_match(&text) {
        return Some("BTCUSDT");
    }

    None
}

/// Whether a market belongs in the crypto batch at all. Applied before
/// classification; matching here does not guarantee an extractable symbol.
pub fn is_crypto_related(question: &str, event_slug: Option<&str>) -> bool {
    CRYPTO_KEYWORDS.is_match(&normalized(question, event_slug))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
