// src/config/defaults.rs
//! Compiled-in feed list and keyword lists used when no override file is present.

pub const DEFAULT_FEED_URLS: &[&str] = &[
    "http://feeds.bbci.co.uk/news/rss.xml",
    "https://rss.cnn.com/rss/edition.rss",
    "https://www.aljazeera.com/xml/rss/all.xml",
    "https://www.france24.com/fr/actualites/rss",
    "https://www.reuters.com/rssFeed/worldNews",
    "https://apnews.com/apf-topnews",
    "https://www.afp.com/en/rss",
    "https://www.xinhuanet.com/english/rss",
    "https://tass.com/rss/v2.xml",
    "https://rss.nytimes.com/services/xml/rss/nyt/World.xml",
    "https://www.theguardian.com/world/rss",
    "https://www.nhk.or.jp/rss/news/cat0.xml",
    "https://www.ansa.it/sito/ansait_rss.xml",
    "https://www.abc.net.au/news/feed/51120/rss.xml",
    "https://www.ctvnews.ca/rss/world/",
    "https://www.elpais.com/rss/feed.html?feed=elpais/internacional",
    "https://www.globo.com/rss/",
    "https://www.sbs.com.au/news/feed",
    "https://www.dailymaverick.co.za",
    "https://www.hindustantimes.com/rss/world-news/rssfeed.xml",
];

/// Full-weight keywords. Compared as written (no case folding on this side).
pub const DEFAULT_PRIMARY_KEYWORDS: &[&str] = &[
    "war", "guerre", "Война", "guerra", "武争", "krieg", "حرب", "värn", "bellum", "vojna",
    "warszawa", "oorlog",
];

/// Half-weight keywords. Duplicates across language groups are intentional:
/// every list entry is scanned on its own.
pub const DEFAULT_SECONDARY_KEYWORDS: &[&str] = &[
    // fr
    "conflit", "tensions", "attentat", "bombe", "terroriste", "terrorisme", "morts",
    // it
    "conflitto", "tensiones", "attacco", "bomba", "terrorista", "terrorismo", "morti",
    // cs
    "konflikt", "napětí", "útok", "bomba", "terorista", "terorismus", "mrtví",
    // ru
    "конфликт", "напряжение", "теракт", "бомба", "террорист", "терроризм", "смерти",
    // zh
    "冲突", "紧张", "袭击", "炸弹", "恐怖分子", "恐怖主义", "死亡",
    // pt
    "conflito", "tensões", "atentado", "bomba", "terrorista", "terrorismo", "mortos",
];

pub const DEFAULT_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 1;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lists_have_expected_sizes() {
        assert_eq!(DEFAULT_FEED_URLS.len(), 20);
        assert_eq!(DEFAULT_PRIMARY_KEYWORDS.len(), 12);
        assert_eq!(DEFAULT_SECONDARY_KEYWORDS.len(), 42);
        // "bomba" is listed for it, cs and pt
        let bombas = DEFAULT_SECONDARY_KEYWORDS
            .iter()
            .filter(|k| **k == "bomba")
            .count();
        assert_eq!(bombas, 3);
    }
}
