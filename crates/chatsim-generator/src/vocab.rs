//! Fixed vocabularies the synthesizer draws from.
//!
//! Changing the length or order of any list changes generated output for
//! every seed.

use chatsim_core::Role;

pub const TOKENS: &[&str] = &[
    "BTC", "ETH", "SOL", "LTC", "DOGE", "XRP", "ADA", "BNB", "MATIC", "AVAX",
];

pub const INDICATORS: &[&str] = &[
    "RSI",
    "MACD",
    "EMA 200",
    "VWAP",
    "Bollinger Bands",
    "Stoch RSI",
    "OBV",
    "Ichimoku",
];

pub const TIMEFRAMES: &[&str] = &["1m", "5m", "15m", "1h", "4h", "1D", "1W"];

pub const ORDER_TYPES: &[&str] = &["limit", "market", "stop-limit", "trailing stop", "OCO"];

pub const EMOJI: &[&str] = &[
    "🚀", "💎", "🔥", "📉", "📈", "🤖", "🔒", "⚠️", "✅", "❌", "🐳",
];

/// Direct templated phrases.
pub const PHRASES: &[&str] = &[
    "Anyone watching {token}?",
    "Set a stop at {stop}.",
    "TP at {tp}.",
    "FOMO incoming 🚀",
    "Diamond hands.",
    "Paper hands everywhere 😅",
    "{token} {indicator} on the {timeframe} is screaming.",
    "Placed a {order} on {token} at {price}.",
    "{token} holding {price} like a champ.",
    "Closed my {token} long, TP {tp} hit ✅",
];

/// Filler words for token salad.
pub const FILLER_WORDS: &[&str] = &[
    "check", "signal", "buy", "sell", "watch", "nice", "yikes", "rekt", "hold", "wait", "now",
    "looks",
];

pub const QUESTIONS: &[&str] = &[
    "Anyone using {indicator} on the {timeframe} for {token}?",
    "Is {token} a {order} buy here?",
    "Where are you putting the stop on {token}?",
    "TP on {token} at {tp} or higher?",
    "Is the {timeframe} {indicator} on {token} bullish?",
    "{token} breaking out or fakeout?",
];

pub const ATTACHMENT_FILES: &[&str] = &[
    "chart.png",
    "setup.jpg",
    "pnl.png",
    "screenshot.png",
    "signal.pdf",
    "orderbook.png",
];

/// Fixed admin/mod identities: `(name, display name, role)`.
pub const SPECIAL_SENDERS: &[(&str, &str, Role)] = &[
    ("profit_hunters", "Profit Hunters", Role::Admin),
    ("kitty_star", "Kitty Star", Role::Mod),
];
